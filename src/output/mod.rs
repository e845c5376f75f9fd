// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deferred Values
//!
//! Resource identifiers, ARNs and generated credentials only exist once the
//! orchestration engine has provisioned the resource that produces them. This
//! module models such values as [`Output<T>`]: a single-assignment value that
//! resolves at most once and is shared by every consumer.
//!
//! # Core Concepts
//!
//! ```text
//! vpc.id()  ──apply──>  subnet args  ──resolve──>  subnet.id()
//!    │                                               │
//!    └──────────────── all2 ─────────────────────────┘──> route table args
//! ```
//!
//! - **Producers** hand out `Output<T>` values (see
//!   [`crate::engine::ResourceHandle`]).
//! - **Consumers** register pure transformations with [`Output::apply`],
//!   [`Output::try_apply`] or [`Output::flat_apply`], or join several
//!   outputs with the [`combinators`].
//! - A transformation runs exactly once, after all of its inputs resolved,
//!   on whichever task first awaits it.
//!
//! # Laws
//!
//! ```text
//! o.apply(id) == o
//! o.apply(f).apply(g) == o.apply(|x| g(f(x)))
//! ```
//!
//! # Example
//!
//! ```rust
//! use cim_infrastructure_aws::output::{all2, Output};
//!
//! # tokio_test::block_on(async {
//! let host = Output::resolved("db.internal".to_string());
//! let port = Output::resolved(5432u16);
//!
//! let url = all2(&host, &port).apply(|(h, p)| format!("postgres://{h}:{p}"));
//! assert_eq!(url.resolve().await.unwrap(), "postgres://db.internal:5432");
//! # });
//! ```

pub mod combinators;

pub use combinators::{all, all2, all3};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::future::Future;

use crate::errors::{InfrastructureError, InfrastructureResult};

type Resolution<T> = Shared<BoxFuture<'static, InfrastructureResult<T>>>;

/// A value that becomes available once its upstream dependencies resolve
///
/// Cloning an `Output` is cheap and every clone observes the same
/// resolution, including the same error when resolution fails.
pub struct Output<T> {
    resolution: Resolution<T>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            resolution: self.resolution.clone(),
        }
    }
}

impl<T> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Output<{}>", std::any::type_name::<T>())
    }
}

impl<T> Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// An output that is already known
    pub fn resolved(value: T) -> Self {
        Self::from_future(async move { Ok(value) })
    }

    /// An output whose resolution has already failed
    pub fn failed(error: InfrastructureError) -> Self {
        Self::from_future(async move { Err(error) })
    }

    /// Wrap a computation that produces the value
    ///
    /// The future is not polled until the output (or something derived
    /// from it) is resolved, and it is polled to completion at most once.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = InfrastructureResult<T>> + Send + 'static,
    {
        Self {
            resolution: future.boxed().shared(),
        }
    }

    /// Register a pure transformation of the resolved value
    pub fn apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let source = self.resolution.clone();
        Output::from_future(async move { source.await.map(f) })
    }

    /// Register a transformation that may reject the resolved value
    pub fn try_apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> InfrastructureResult<U> + Send + 'static,
    {
        let source = self.resolution.clone();
        Output::from_future(async move { source.await.and_then(f) })
    }

    /// Register a transformation that itself produces a deferred value
    pub fn flat_apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Output<U> + Send + 'static,
    {
        let source = self.resolution.clone();
        Output::from_future(async move {
            let value = source.await?;
            f(value).resolution.await
        })
    }

    /// Wait for the value
    pub async fn resolve(&self) -> InfrastructureResult<T> {
        self.resolution.clone().await
    }

    /// The value, if resolution has already completed
    pub fn peek(&self) -> Option<InfrastructureResult<T>> {
        self.resolution.peek().cloned()
    }

    pub(crate) fn into_resolution(self) -> Resolution<T> {
        self.resolution
    }
}

impl<T> Default for Output<T>
where
    T: Default + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::resolved(T::default())
    }
}

impl<T> From<T> for Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn from(value: T) -> Self {
        Self::resolved(value)
    }
}

impl From<&str> for Output<String> {
    fn from(value: &str) -> Self {
        Self::resolved(value.to_string())
    }
}

/// Configuration files carry literal values; they deserialize as outputs
/// that are already resolved.
impl<'de, T> Deserialize<'de> for Output<T>
where
    T: Deserialize<'de> + Clone + Send + Sync + 'static,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Output::resolved)
    }
}

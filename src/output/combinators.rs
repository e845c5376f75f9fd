// Copyright (c) 2025 - Cowboy AI, Inc.
//! Output Combinators
//!
//! Join several deferred values into one. The joined output resolves once
//! every input has resolved and fails with the first input failure.
//!
//! - `all` - Join a homogeneous list, preserving input order
//! - `all2` - Join two outputs into a pair
//! - `all3` - Join three outputs into a triple

use futures::future::{try_join, try_join3, try_join_all};

use super::Output;

/// Join a list of outputs, preserving order
///
/// # Examples
///
/// ```rust
/// use cim_infrastructure_aws::output::{all, Output};
///
/// # tokio_test::block_on(async {
/// let ids = all(vec![Output::resolved("subnet-a"), Output::resolved("subnet-b")]);
/// assert_eq!(ids.resolve().await.unwrap(), vec!["subnet-a", "subnet-b"]);
/// # });
/// ```
pub fn all<T, I>(outputs: I) -> Output<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Output<T>>,
{
    let resolutions: Vec<_> = outputs.into_iter().map(Output::into_resolution).collect();
    Output::from_future(async move { try_join_all(resolutions).await })
}

/// Join two outputs into a pair
pub fn all2<A, B>(a: &Output<A>, b: &Output<B>) -> Output<(A, B)>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    let a = a.clone().into_resolution();
    let b = b.clone().into_resolution();
    Output::from_future(async move { try_join(a, b).await })
}

/// Join three outputs into a triple
pub fn all3<A, B, C>(a: &Output<A>, b: &Output<B>, c: &Output<C>) -> Output<(A, B, C)>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    let a = a.clone().into_resolution();
    let b = b.clone().into_resolution();
    let c = c.clone().into_resolution();
    Output::from_future(async move { try_join3(a, b, c).await })
}

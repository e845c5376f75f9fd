// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Deferred Values
//!
//! An `Output` behaves like a lazily evaluated, memoized result: transforms
//! compose, joins keep their input order, failures propagate to everything
//! derived from them and the producing computation runs at most once.

use cim_infrastructure_aws::output::{all, all2};
use cim_infrastructure_aws::{InfrastructureError, Output};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn resolve<T: Clone + Send + Sync + 'static>(output: &Output<T>) -> Result<T, InfrastructureError> {
    tokio_test::block_on(output.resolve())
}

fn failure() -> InfrastructureError {
    InfrastructureError::upstream("create aws:ec2/vpc:Vpc main-vpc", "simulated provider failure")
}

proptest! {
    /// Property: apply on a known value is plain function application
    #[test]
    fn prop_apply_on_resolved(value in any::<i64>()) {
        let output = Output::resolved(value).apply(|v| v.wrapping_mul(3));
        prop_assert_eq!(resolve(&output).unwrap(), value.wrapping_mul(3));
    }

    /// Property: apply(f).apply(g) == apply(g . f)
    #[test]
    fn prop_apply_composes(value in any::<i32>(), offset in any::<i32>()) {
        let source = Output::resolved(value);

        let chained = source.apply(move |v| v.wrapping_add(offset)).apply(|v| v.to_string());
        let composed = source.apply(move |v| v.wrapping_add(offset).to_string());

        prop_assert_eq!(resolve(&chained).unwrap(), resolve(&composed).unwrap());
    }

    /// Property: flat_apply with resolved is the identity
    #[test]
    fn prop_flat_apply_identity(value in ".*") {
        let source = Output::resolved(value.clone());
        let flattened = source.flat_apply(Output::resolved);
        prop_assert_eq!(resolve(&flattened).unwrap(), value);
    }

    /// Property: all keeps length and order of its inputs
    #[test]
    fn prop_all_preserves_order(values in prop::collection::vec(any::<u32>(), 0..32)) {
        let joined = all(values.iter().copied().map(Output::resolved));
        prop_assert_eq!(resolve(&joined).unwrap(), values);
    }

    /// Property: one failed input fails the whole join with its error
    #[test]
    fn prop_all_propagates_failure(
        values in prop::collection::vec(any::<u32>(), 1..16),
        index in any::<prop::sample::Index>(),
    ) {
        let broken = index.index(values.len());
        let outputs = values.iter().enumerate().map(|(i, v)| {
            if i == broken {
                Output::failed(failure())
            } else {
                Output::resolved(*v)
            }
        });

        prop_assert_eq!(resolve(&all(outputs)).unwrap_err(), failure());
    }

    /// Property: a rejected try_apply fails every downstream output
    #[test]
    fn prop_try_apply_rejection_propagates(value in any::<u16>(), other in any::<u16>()) {
        let rejected: Output<u16> = Output::resolved(value).try_apply(|v| {
            Err(InfrastructureError::invalid_format("Port", v.to_string(), "rejected"))
        });
        let downstream = all2(&rejected, &Output::resolved(other)).apply(|(a, b)| a as u32 + b as u32);

        let err = resolve(&downstream).unwrap_err();
        prop_assert_eq!(err.field(), Some("Port"));
    }

    /// Property: the producer runs once however many times it is resolved
    #[test]
    fn prop_resolution_is_memoized(value in any::<u64>(), readers in 1usize..8) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let output = Output::from_future(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        });

        prop_assert!(output.peek().is_none());
        for _ in 0..readers {
            prop_assert_eq!(resolve(&output.clone()).unwrap(), value);
        }
        prop_assert_eq!(resolve(&output.apply(|v| v)).unwrap(), value);

        prop_assert_eq!(runs.load(Ordering::SeqCst), 1);
        prop_assert_eq!(output.peek().map(|r| r.unwrap()), Some(value));
    }
}

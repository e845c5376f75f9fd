// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Entry Point
//!
//! This test suite uses proptest to verify properties that must hold for
//! all valid inputs: deferred value laws, container definition encoding and
//! Dockerfile label extraction.

mod property;

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod container_definitions;
mod docker_labels;
mod output_laws;

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Dockerfile Label Extraction

use cim_infrastructure_aws::docker_labels::parse_labels;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn label_key() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9.-]{0,24}"
}

fn label_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:/,.=_ -]{0,32}"
}

fn instruction() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("FROM alpine:3.20".to_string()),
        Just("RUN apk add --no-cache ca-certificates".to_string()),
        Just("EXPOSE 8080".to_string()),
        "# [a-z ]{0,20}",
    ]
}

proptest! {
    /// Property: quoted LABEL lines come back verbatim, later keys win
    #[test]
    fn prop_labels_extracted(labels in prop::collection::vec((label_key(), label_value()), 0..12)) {
        let dockerfile: String = labels
            .iter()
            .map(|(key, value)| format!("LABEL {key}=\"{value}\"\n"))
            .collect();

        let expected: BTreeMap<String, String> = labels.into_iter().collect();
        prop_assert_eq!(parse_labels(&dockerfile), expected);
    }

    /// Property: other instructions never produce labels
    #[test]
    fn prop_non_label_lines_ignored(lines in prop::collection::vec(instruction(), 0..20)) {
        prop_assert!(parse_labels(&lines.join("\n")).is_empty());
    }

    /// Property: CRLF line endings parse like LF
    #[test]
    fn prop_crlf_equivalent(labels in prop::collection::vec((label_key(), label_value()), 0..8)) {
        let lines: Vec<String> = labels
            .iter()
            .map(|(key, value)| format!("LABEL {key}={value}"))
            .collect();

        prop_assert_eq!(parse_labels(&lines.join("\r\n")), parse_labels(&lines.join("\n")));
    }
}

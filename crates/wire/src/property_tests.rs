// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chunk boundaries never change what the decoder produces.

use crate::{encode_run_event, SseDecoder};
use proptest::prelude::*;
use rw_core::test_support::log_event;

proptest! {
    #[test]
    fn chunking_is_transparent(
        lines in prop::collection::vec("[a-zA-Z0-9 \u{e9}\u{4e2d}]{0,16}", 1..6),
        cut in 1usize..7,
    ) {
        let stream: String = lines
            .iter()
            .filter_map(|line| encode_run_event(&log_event("run-1", line)).ok())
            .collect();

        let mut whole = SseDecoder::new();
        whole.push(stream.as_bytes());
        let expected: Vec<_> = std::iter::from_fn(|| whole.next_frame()).collect();

        let mut chunked = SseDecoder::new();
        let mut actual = Vec::new();
        for chunk in stream.as_bytes().chunks(cut) {
            chunked.push(chunk);
            actual.extend(std::iter::from_fn(|| chunked.next_frame()));
        }

        prop_assert_eq!(actual, expected);
        prop_assert_eq!(chunked.buffered(), 0);
    }
}

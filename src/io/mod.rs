// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - OFF mesh reading and writing

mod off;

pub use off::{parse_off, read_off, read_off_from, to_off_string, write_off, write_off_to};

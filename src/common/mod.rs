// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Tom F. (https://github.com/tomtom215/duckdb-behavioral)

//! Common types and utilities shared by the expression model and the matcher.

pub mod event;
pub mod timestamp;

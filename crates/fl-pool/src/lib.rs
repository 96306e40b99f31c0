// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! FieldLink Buffer Pool
//!
//! A fixed-capacity arena issuing zero-initialized, size-tagged message
//! buffers with:
//!
//! - **Owning handles**: allocations are returned as [`Buffer`] values that
//!   carry their payload and provenance; there is no pointer arithmetic and
//!   a buffer cannot be read after it has been freed
//! - **Bounded waits**: allocation supports non-blocking and
//!   blocking-with-timeout operation; interrupt-context callers never block
//! - **Double-free detection**: a per-allocation tag catches duplicate and
//!   mismatched frees without corrupting the arena accounting
//! - **Statistics**: usage counters and a rolling window of recent
//!   allocation sizes, snapshot-readable by diagnostic shells
//!
//! The pool is a fixed arena, not a general allocator: the byte budget and
//! slot count are compile-time constants in `fl_common::constants`.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

#[cfg(any(test, feature = "std"))]
extern crate std;

mod buffer;
mod pool;
mod stats;

pub use buffer::{Buffer, BufferToken};
pub use pool::{BufferPool, CONTEXT_UNUSED};
pub use stats::PoolStats;

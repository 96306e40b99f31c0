// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! FieldLink Common Library
//!
//! This crate provides the shared foundation for the FieldLink messaging
//! framework:
//!
//! - **Errors**: unified error type used across all components
//! - **Logging**: circular log buffer with level filtering and log macros
//! - **Time**: tick/millisecond types and bounded-wait timeouts
//! - **Platform**: architecture glue (tick source, interrupt context, reset)
//! - **Fault**: system assertion handler with controlled warm restart
//!
//! # Features
//!
//! - `std`: Enable standard library support (disabled by default for embedded)
//! - `cortex-m`: ARM Cortex-M platform glue
//! - `defmt`: Enable defmt formatting support for embedded debugging
//!
//! No heap allocations are performed - all buffers use fixed-size arrays or
//! heapless collections.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "std")]
extern crate std;

pub mod arch;
pub mod config;
pub mod constants;
pub mod errors;
pub mod fault;
pub mod log;
pub mod time;
pub mod types;
pub mod version;

// Re-export commonly used items
pub use errors::{Error, Result};
pub use time::{Millis, Ticks, Timeout};
pub use types::ExecContext;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

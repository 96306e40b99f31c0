// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! System configuration for the FieldLink framework
//!
//! Sizing limits (pool budget, queue depth, registry capacity) are
//! compile-time constants in [`crate::constants`]; this module holds the
//! runtime-choosable knobs an application fixes once at bring-up.

use crate::log::LogLevel;
use crate::time::Timeout;

/// System-wide configuration
#[derive(Debug, Clone, Copy)]
pub struct SystemConfig {
    /// Scheduler/platform tick rate in Hz
    pub tick_rate_hz: u32,
    /// Default receive timeout for message receivers
    pub rx_timeout: Timeout,
    /// Minimum level recorded by the global log buffer
    pub min_log_level: LogLevel,
}

impl SystemConfig {
    /// Default configuration (1 ms tick, 1 s receive timeout)
    pub const DEFAULT: Self = Self {
        tick_rate_hz: crate::constants::TICK_RATE_HZ,
        rx_timeout: Timeout::Ticks(1000),
        min_log_level: LogLevel::Info,
    };
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

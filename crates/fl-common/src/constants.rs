// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! System-wide constants for the FieldLink framework
//!
//! This module defines compile-time sizing used throughout the system.
//! All sizes and limits are chosen for constrained embedded targets.

// =============================================================================
// Buffer Pool
// =============================================================================

/// Buffer pool byte budget
pub const POOL_SIZE: usize = 4096;

/// Maximum number of simultaneously live pool buffers
pub const MAX_POOL_BUFFERS: usize = 32;

/// Maximum usable size of a single pool buffer in bytes
pub const MAX_BUFFER_SIZE: usize = 128;

/// Number of recent allocation sizes kept in the statistics window
pub const POOL_STATS_WINDOW: usize = 8;

// =============================================================================
// Message Routing
// =============================================================================

/// Maximum number of registered message receivers
pub const MAX_RECEIVERS: usize = 32;

/// Depth of each receiver's message queue
pub const MSG_QUEUE_DEPTH: usize = 8;

// =============================================================================
// Time
// =============================================================================

/// System tick rate (1000 Hz = 1 ms tick)
pub const TICK_RATE_HZ: u32 = 1000;

// =============================================================================
// Logging
// =============================================================================

/// Maximum log message length
pub const MAX_LOG_MESSAGE_LEN: usize = 96;

/// Log buffer size (number of entries)
pub const LOG_BUFFER_SIZE: usize = 32;

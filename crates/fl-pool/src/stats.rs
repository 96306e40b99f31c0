// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Buffer pool usage statistics

use core::fmt;

use fl_common::constants::{POOL_SIZE, POOL_STATS_WINDOW};

/// Snapshot of buffer pool usage counters
///
/// `space_available` tracks the byte budget; the `window` holds the sizes of
/// the most recent allocations (oldest overwritten first). Diagnostic
/// shells render the snapshot through its `Display` implementation.
#[derive(Debug, Clone, Copy)]
pub struct PoolStats {
    /// One-time initialization has run
    pub initialized: bool,
    /// Bytes currently available in the arena budget
    pub space_available: i32,
    /// Low-water mark of `space_available` (failed takes included)
    pub min_space_available: i32,
    /// Smallest allocation size seen
    pub min_size: i32,
    /// Largest allocation size seen
    pub max_size: i32,
    /// Total successful allocations
    pub allocs: u32,
    /// Currently live allocations
    pub cur_allocs: u32,
    /// High-water mark of live allocations
    pub max_allocs: u32,
    /// Total failed allocations
    pub take_failures: u32,
    /// Size requested by the most recent failed allocation
    pub last_fail_size: i32,
    /// Rolling window of recent allocation sizes
    pub window: [u16; POOL_STATS_WINDOW],
    /// Next write position in `window`
    pub windex: usize,
}

impl PoolStats {
    pub(crate) const fn new() -> Self {
        Self {
            initialized: false,
            space_available: POOL_SIZE as i32,
            min_space_available: POOL_SIZE as i32,
            min_size: POOL_SIZE as i32,
            max_size: 0,
            allocs: 0,
            cur_allocs: 0,
            max_allocs: 0,
            take_failures: 0,
            last_fail_size: 0,
            window: [0; POOL_STATS_WINDOW],
            windex: 0,
        }
    }

    pub(crate) fn record_take(&mut self, size: usize) {
        let size = size as i32;
        self.space_available -= size;
        self.min_space_available = self.min_space_available.min(self.space_available);
        self.min_size = self.min_size.min(size);
        self.max_size = self.max_size.max(size);
        self.allocs += 1;
        self.cur_allocs += 1;
        self.max_allocs = self.max_allocs.max(self.cur_allocs);
        self.window[self.windex] = size as u16;
        self.windex += 1;
        if self.windex >= POOL_STATS_WINDOW {
            self.windex = 0;
        }
    }

    pub(crate) fn record_take_failure(&mut self, size: usize) {
        self.take_failures += 1;
        self.last_fail_size = size as i32;
        self.min_space_available = self
            .min_space_available
            .min(self.space_available - size as i32);
    }

    pub(crate) fn record_give(&mut self, size: usize) {
        self.space_available += size as i32;
        self.cur_allocs = self.cur_allocs.saturating_sub(1);
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "stats initialized     {}", u8::from(self.initialized))?;
        writeln!(f, "space available       {}", self.space_available)?;
        writeln!(f, "min space available   {}", self.min_space_available)?;
        writeln!(f, "min alloced size      {}", self.min_size)?;
        writeln!(f, "max alloced size      {}", self.max_size)?;
        writeln!(f, "total allocs          {}", self.allocs)?;
        writeln!(f, "current allocations   {}", self.cur_allocs)?;
        writeln!(f, "max allocations       {}", self.max_allocs)?;
        writeln!(f, "take failures         {}", self.take_failures)?;
        writeln!(f, "last fail size        {}", self.last_fail_size)?;
        write!(f, "List of recently allocated sizes:")?;
        for size in &self.window {
            write!(f, " {}", size)?;
        }
        Ok(())
    }
}

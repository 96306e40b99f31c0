// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Fixed-capacity buffer pool

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};

use critical_section::Mutex;
use heapless::Vec;

use fl_common::constants::{MAX_BUFFER_SIZE, MAX_POOL_BUFFERS, POOL_SIZE};
use fl_common::time::Ticks;
use fl_common::{arch, log_err, log_wrn, sys_fault, Error, ExecContext, Result, Timeout};

use crate::buffer::{Buffer, BufferToken};
use crate::stats::PoolStats;

/// Context string for call sites that don't supply one
pub const CONTEXT_UNUSED: &str = "NA";

const MODULE: &str = "buffer_pool";

#[derive(Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    InUse { size: u16, tag: u16 },
}

struct PoolInner {
    slots: [SlotState; MAX_POOL_BUFFERS],
    next_tag: u16,
    stats: PoolStats,
}

/// Fixed-capacity arena issuing zero-initialized, size-tagged buffers
///
/// All statistics updates run inside a short critical section held only
/// around the metadata, never around a wait. The pool itself never blocks
/// a caller that asked for `Timeout::NoWait` or is in interrupt context.
pub struct BufferPool {
    inner: Mutex<RefCell<PoolInner>>,
    take_failed: AtomicBool,
}

impl BufferPool {
    /// Create an empty pool with the full byte budget available
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(PoolInner {
                slots: [SlotState::Free; MAX_POOL_BUFFERS],
                next_tag: 1,
                stats: PoolStats::new(),
            })),
            take_failed: AtomicBool::new(false),
        }
    }

    /// Idempotent one-time statistics reset; run before the first allocation
    pub fn init(&self) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if !inner.stats.initialized {
                inner.stats.initialized = true;
                inner.stats.space_available = POOL_SIZE as i32;
                inner.stats.min_space_available = POOL_SIZE as i32;
                inner.stats.min_size = POOL_SIZE as i32;
            }
        });
    }

    /// Allocate a zero-filled buffer of `size` usable bytes, waiting up to
    /// `timeout` for space
    ///
    /// The wait is coerced to no-wait in interrupt context. On failure a
    /// warning tagged with `context` is logged, the failure statistics are
    /// updated, and `None` is returned.
    pub fn try_take_timeout(
        &self,
        size: usize,
        timeout: Timeout,
        ctx: ExecContext,
        context: &'static str,
    ) -> Option<Buffer> {
        let timeout = if ctx.is_interrupt() {
            Timeout::NoWait
        } else {
            timeout
        };

        if size <= MAX_BUFFER_SIZE {
            let deadline = timeout.deadline(Ticks::new(arch::now_ticks()));
            loop {
                if let Some(buffer) = self.try_alloc(size) {
                    return Some(buffer);
                }
                match deadline {
                    Some(d) if Ticks::new(arch::now_ticks()) >= d => break,
                    _ => arch::idle(),
                }
            }
        }

        /* A timeout can occur even when there is space available. */
        log_wrn!(MODULE, "allocate failure size: {} context: {}", size, context);
        critical_section::with(|cs| {
            self.inner
                .borrow_ref_mut(cs)
                .stats
                .record_take_failure(size);
        });
        None
    }

    /// Non-blocking allocation
    pub fn try_take(&self, size: usize, context: &'static str) -> Option<Buffer> {
        self.try_take_timeout(size, Timeout::NoWait, ExecContext::Thread, context)
    }

    /// Allocation for call sites where failure is unrecoverable
    ///
    /// On failure this raises the system fault (once; repeated failures do
    /// not re-enter the fault handler) and yields `None` if the handler
    /// returns.
    pub fn take(&self, size: usize) -> Option<Buffer> {
        let buffer = self.try_take(size, CONTEXT_UNUSED);

        if buffer.is_none() {
            /* Prevent recursive entry */
            if !self.take_failed.swap(true, Ordering::AcqRel) {
                log_err!(MODULE, "buffer pool too small");
                sys_fault!();
            }
        }
        buffer
    }

    /// Return a buffer to the arena
    pub fn free(&self, buffer: Buffer) {
        let token = buffer.token();
        drop(buffer);
        self.free_token(token);
    }

    /// Return an allocation to the arena by token
    ///
    /// This is the structural free the queue machinery uses; it is also
    /// where double-free detection lives. A token naming a slot that is
    /// already free is logged as a possible duplicate free, a mismatched
    /// tag as a corruption; in both cases the arena accounting stays
    /// consistent.
    pub fn free_token(&self, token: BufferToken) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let index = token.slot as usize;

            if index >= MAX_POOL_BUFFERS {
                log_err!(MODULE, "free with invalid slot {}", index);
                return;
            }

            match inner.slots[index] {
                SlotState::Free => {
                    log_err!(MODULE, "possible duplicate free (slot {})", index);
                }
                SlotState::InUse { size, tag } => {
                    if tag != token.tag {
                        log_err!(MODULE, "buffer free tag mismatch (slot {})", index);
                    }
                    inner.slots[index] = SlotState::Free;
                    inner.stats.record_give(size as usize);
                }
            }
        });
    }

    /// Copy a snapshot of the pool statistics
    ///
    /// Only index 0 is currently valid.
    pub fn stats(&self, index: u8) -> Result<PoolStats> {
        if index != 0 {
            return Err(Error::InvalidParameter);
        }
        Ok(critical_section::with(|cs| self.inner.borrow_ref(cs).stats))
    }

    fn try_alloc(&self, size: usize) -> Option<Buffer> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);

            if inner.stats.space_available < size as i32 {
                return None;
            }
            let slot = inner
                .slots
                .iter()
                .position(|s| matches!(s, SlotState::Free))?;

            let tag = inner.next_tag;
            inner.next_tag = if inner.next_tag == u16::MAX {
                1
            } else {
                inner.next_tag + 1
            };
            inner.slots[slot] = SlotState::InUse {
                size: size as u16,
                tag,
            };
            inner.stats.record_take(size);

            let mut data = Vec::new();
            // Cannot fail: size <= MAX_BUFFER_SIZE is checked by the caller
            data.resize(size, 0).ok()?;
            Some(Buffer::new(
                BufferToken {
                    slot: slot as u8,
                    tag,
                },
                data,
            ))
        })
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Integration tests for fl-pool
//!
//! These exercise the arena accounting, bounded waits, and the double-free
//! detection on the host platform. Tests that inspect the process-global
//! log buffer or install the fault handler are serialized.

use fl_common::arch::stub;
use fl_common::constants::{MAX_POOL_BUFFERS, POOL_SIZE};
use fl_common::time::Ticks;
use fl_common::{ExecContext, Timeout};
use fl_pool::BufferPool;
use serial_test::serial;

fn fresh_pool() -> BufferPool {
    let pool = BufferPool::new();
    pool.init();
    pool
}

fn exhaust(pool: &BufferPool) -> Vec<fl_pool::Buffer> {
    let mut held = Vec::new();
    for _ in 0..MAX_POOL_BUFFERS {
        held.push(pool.try_take(1, "exhaust").expect("slot"));
    }
    held
}

mod accounting_tests {
    use super::*;

    #[test]
    fn test_within_capacity_sequences_always_succeed() {
        let pool = fresh_pool();

        for round in 0..8 {
            let mut held = Vec::new();
            for i in 0..4 {
                let size = 16 * (i + 1);
                let mut buffer = pool
                    .try_take(size, "sequence")
                    .expect("capacity never exceeded");
                assert!(buffer.size() >= size);
                // Dirty the memory so reuse in a later round must re-zero it
                buffer.as_mut_slice().fill(0xFF);
                held.push(buffer);
            }
            for buffer in held {
                pool.free(buffer);
            }
            assert_eq!(pool.stats(0).unwrap().cur_allocs, 0, "round {}", round);
        }
    }

    #[test]
    fn test_reused_memory_is_zero_filled() {
        let pool = fresh_pool();

        let mut first = pool.try_take(32, "dirty").unwrap();
        first.as_mut_slice().fill(0xAB);
        pool.free(first);

        let second = pool.try_take(32, "reuse").unwrap();
        assert!(second.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_budget_exhaustion_records_last_fail_size() {
        let pool = fresh_pool();
        // Consume the whole byte budget in MAX_BUFFER_SIZE chunks
        let mut held = Vec::new();
        let chunk = fl_common::constants::MAX_BUFFER_SIZE;
        for _ in 0..(POOL_SIZE / chunk) {
            held.push(pool.try_take(chunk, "budget").expect("within budget"));
        }

        assert!(pool.try_take(chunk, "over budget").is_none());

        let stats = pool.stats(0).unwrap();
        assert_eq!(stats.space_available, 0);
        assert_eq!(stats.last_fail_size, chunk as i32);
        assert!(stats.take_failures >= 1);

        for buffer in held {
            pool.free(buffer);
        }
        assert_eq!(pool.stats(0).unwrap().space_available, POOL_SIZE as i32);
    }

    #[test]
    fn test_display_snapshot_shape() {
        let pool = fresh_pool();
        let buffer = pool.try_take(24, "display").unwrap();

        let rendered = format!("{}", pool.stats(0).unwrap());
        assert!(rendered.contains("space available"));
        assert!(rendered.contains("current allocations   1"));
        assert!(rendered.contains("recently allocated sizes"));

        pool.free(buffer);
    }
}

mod wait_tests {
    use super::*;

    #[test]
    fn test_bounded_wait_expires_on_mock_clock() {
        let pool = fresh_pool();
        let held = exhaust(&pool);

        let start = Ticks::new(stub::now_ticks());
        let result = pool.try_take_timeout(1, Timeout::Ticks(50), ExecContext::Thread, "bounded");
        let now = Ticks::new(stub::now_ticks());

        assert!(result.is_none());
        assert!(start.has_elapsed(now, 50), "wait loop must reach the deadline");

        for buffer in held {
            pool.free(buffer);
        }
    }

    #[test]
    fn test_interrupt_context_coerces_to_no_wait() {
        let pool = fresh_pool();
        let held = exhaust(&pool);

        // Forever from an ISR must not spin; it degrades to a single
        // attempt. Returning at all (instead of hanging) is the property.
        let result =
            pool.try_take_timeout(1, Timeout::Forever, ExecContext::Interrupt, "from isr");
        assert!(result.is_none());

        for buffer in held {
            pool.free(buffer);
        }
    }
}

mod double_free_tests {
    use super::*;
    use fl_common::log;

    fn log_contains(needle: &str) -> bool {
        log::with_buffer(|buffer| {
            buffer
                .iter()
                .any(|entry| entry.message.as_str().contains(needle))
        })
    }

    #[test]
    #[serial]
    fn test_duplicate_free_is_detected_and_harmless() {
        let pool = fresh_pool();

        let buffer = pool.try_take(40, "dup").unwrap();
        let token = buffer.token();
        pool.free(buffer);

        let before = pool.stats(0).unwrap();
        pool.free_token(token);
        assert!(log_contains("possible duplicate free"));

        // The duplicate must not disturb the accounting an unrelated
        // allocation observes
        let after = pool.stats(0).unwrap();
        assert_eq!(after.space_available, before.space_available);
        assert_eq!(after.cur_allocs, before.cur_allocs);

        let unrelated = pool.try_take(40, "after dup").unwrap();
        assert!(unrelated.as_slice().iter().all(|&b| b == 0));
        pool.free(unrelated);
    }

    #[test]
    #[serial]
    fn test_stale_token_is_detected_but_freed() {
        let pool = fresh_pool();

        let first = pool.try_take(8, "stale a").unwrap();
        let stale = first.token();
        pool.free(first);

        // The slot is recycled under a new tag
        let second = pool.try_take(8, "stale b").unwrap();
        pool.free_token(stale);
        assert!(log_contains("tag mismatch"));

        // Best-effort semantics: the slot went back regardless, so the
        // second handle's own free is now the duplicate
        pool.free(second);
        assert!(log_contains("possible duplicate free"));
    }
}

mod fatal_take_tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use fl_common::fault;

    static FAULTS: AtomicUsize = AtomicUsize::new(0);

    fn counting_handler(_file: &'static str, _line: u32) {
        FAULTS.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    #[serial]
    fn test_fatal_take_raises_once() {
        fault::set_handler(counting_handler);

        let pool = fresh_pool();
        let mut held = exhaust(&pool);

        let before = FAULTS.load(Ordering::Relaxed);
        assert!(pool.take(1).is_none());
        let after_first = FAULTS.load(Ordering::Relaxed);
        assert_eq!(after_first, before + 1);

        // Repeated failure must not re-enter the fault handler
        assert!(pool.take(1).is_none());
        assert_eq!(FAULTS.load(Ordering::Relaxed), after_first);

        // Recovery after a free still works
        pool.free(held.pop().unwrap());
        let recovered = pool.take(1).expect("slot available again");
        pool.free(recovered);
        for buffer in held {
            pool.free(buffer);
        }
    }
}

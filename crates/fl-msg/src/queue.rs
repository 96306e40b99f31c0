// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Per-task message queue
//!
//! A fixed-depth FIFO ring holding messages by value. Pushing transfers
//! ownership of the message (and its pool buffer) into the queue; popping
//! transfers it out to the receiver. The ring is guarded by a short
//! critical section; bounded waits poll outside the lock.

use core::cell::RefCell;

use critical_section::Mutex;

use fl_common::constants::MSG_QUEUE_DEPTH;
use fl_common::time::Ticks;
use fl_common::{arch, Timeout};

use crate::message::Msg;

struct QueueInner {
    slots: [Option<Msg>; MSG_QUEUE_DEPTH],
    head: usize,
    tail: usize,
    count: usize,
}

/// Fixed-depth FIFO message queue
pub struct MsgQueue {
    inner: Mutex<RefCell<QueueInner>>,
}

impl MsgQueue {
    /// Create an empty queue
    #[must_use]
    pub const fn new() -> Self {
        const NONE: Option<Msg> = None;
        Self {
            inner: Mutex::new(RefCell::new(QueueInner {
                slots: [NONE; MSG_QUEUE_DEPTH],
                head: 0,
                tail: 0,
                count: 0,
            })),
        }
    }

    /// Append a message without waiting
    ///
    /// On a full queue the message is handed back to the caller, which
    /// keeps ownership of its buffer.
    pub fn try_push(&self, msg: Msg) -> Result<(), Msg> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.count >= MSG_QUEUE_DEPTH {
                return Err(msg);
            }
            let tail = inner.tail;
            inner.slots[tail] = Some(msg);
            inner.tail = (tail + 1) % MSG_QUEUE_DEPTH;
            inner.count += 1;
            Ok(())
        })
    }

    /// Append a message, waiting up to `timeout` for space
    pub fn push(&self, msg: Msg, timeout: Timeout) -> Result<(), Msg> {
        let deadline = timeout.deadline(Ticks::new(arch::now_ticks()));
        let mut msg = msg;
        loop {
            match self.try_push(msg) {
                Ok(()) => return Ok(()),
                Err(back) => msg = back,
            }
            match deadline {
                Some(d) if Ticks::new(arch::now_ticks()) >= d => return Err(msg),
                _ => arch::idle(),
            }
        }
    }

    /// Remove the oldest message without waiting
    pub fn try_pop(&self) -> Option<Msg> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.count == 0 {
                return None;
            }
            let head = inner.head;
            let msg = inner.slots[head].take();
            inner.head = (head + 1) % MSG_QUEUE_DEPTH;
            inner.count -= 1;
            msg
        })
    }

    /// Remove the oldest message, waiting up to `timeout` for one to arrive
    pub fn pop(&self, timeout: Timeout) -> Option<Msg> {
        let deadline = timeout.deadline(Ticks::new(arch::now_ticks()));
        loop {
            if let Some(msg) = self.try_pop() {
                return Some(msg);
            }
            match deadline {
                Some(d) if Ticks::new(arch::now_ticks()) >= d => return None,
                _ => arch::idle(),
            }
        }
    }

    /// Current number of queued messages
    #[must_use]
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).count)
    }

    /// Check whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue depth
    #[must_use]
    pub const fn capacity() -> usize {
        MSG_QUEUE_DEPTH
    }
}

impl Default for MsgQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Msg, MsgCode, TaskId};
    use fl_pool::BufferPool;

    fn plain_msg(pool: &BufferPool, code: u8) -> Msg {
        Msg::new(pool.take(0).unwrap(), MsgCode::new(code), TaskId::new(1))
    }

    #[test]
    fn test_fifo_order() {
        let pool = BufferPool::new();
        pool.init();
        let queue = MsgQueue::new();

        for code in 10..13 {
            queue.try_push(plain_msg(&pool, code)).ok().unwrap();
        }
        assert_eq!(queue.len(), 3);

        for code in 10..13 {
            let msg = queue.try_pop().expect("queued");
            assert_eq!(msg.header().code, MsgCode::new(code));
            pool.free(msg.into_buffer());
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_full_queue_returns_message() {
        let pool = BufferPool::new();
        pool.init();
        let queue = MsgQueue::new();

        for _ in 0..MSG_QUEUE_DEPTH {
            queue.try_push(plain_msg(&pool, 9)).ok().unwrap();
        }

        let overflow = plain_msg(&pool, 9);
        let back = queue.try_push(overflow).err().expect("full");
        pool.free(back.into_buffer());

        while let Some(msg) = queue.try_pop() {
            pool.free(msg.into_buffer());
        }
    }

    #[test]
    fn test_pop_timeout_expires() {
        let queue = MsgQueue::new();
        assert!(queue.pop(Timeout::Ticks(10)).is_none());
        assert!(queue.pop(Timeout::NoWait).is_none());
    }

    #[test]
    fn test_wraparound_reuses_slots() {
        let pool = BufferPool::new();
        pool.init();
        let queue = MsgQueue::new();

        // Cycle more messages than the depth through the ring
        for code in 1..=(2 * MSG_QUEUE_DEPTH as u8) {
            queue.try_push(plain_msg(&pool, code)).ok().unwrap();
            let msg = queue.try_pop().unwrap();
            assert_eq!(msg.header().code, MsgCode::new(code));
            pool.free(msg.into_buffer());
        }
        assert_eq!(pool.stats(0).unwrap().cur_allocs, 0);
    }
}

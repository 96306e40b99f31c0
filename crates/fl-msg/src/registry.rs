// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Message router and receiver registry
//!
//! The registry is a fixed-capacity table mapping task identities to
//! receiver descriptors. It has a two-phase lifecycle:
//!
//! 1. **Bring-up**: a [`RegistryBuilder`] registers receivers and tasks.
//!    Registration is append-only and exclusive (`&mut self`); violations
//!    (out-of-range identity, duplicate registration) are programming
//!    errors and raise the system fault.
//! 2. **Frozen**: [`RegistryBuilder::freeze`] produces the [`Registry`]
//!    whose descriptor table is immutable, so routing lookups from any
//!    context need no locking. Only the per-slot queue rings and timer
//!    state retain interior mutability behind short critical sections.
//!
//! Routing offers three delivery shapes: targeted [`Registry::send`],
//! dispatcher-discovered [`Registry::unicast`], and per-task-copy
//! [`Registry::broadcast`].

use fl_pool::BufferPool;

use fl_common::constants::MAX_RECEIVERS;
use fl_common::{arch, log_err, log_wrn, sys_fault, Error, ExecContext, Result, Timeout};

use crate::message::{options, Msg, MsgCode, TaskId};
use crate::queue::MsgQueue;
use crate::timer::TimerCell;

const MODULE: &str = "router";

/// Outcome of a message handler
///
/// Ownership of the message decides the free: handing it back (`Done`,
/// `Failed`) lets the receiver loop free the buffer; `Consumed` means the
/// handler moved the message elsewhere (a reply, a hand-off) and the loop
/// must not touch it.
pub enum DispatchResult {
    /// Handled; the loop frees the buffer
    Done(Msg),
    /// Ordinary failure; the loop frees the buffer
    Failed(Msg),
    /// Ownership was transferred out of the loop
    Consumed,
}

/// Context passed to message handlers
pub struct DispatchCtx<'a> {
    /// The frozen registry, for sends and replies from handler bodies
    pub registry: &'a Registry,
    /// The buffer pool the message came from
    pub pool: &'a BufferPool,
    /// The receiver the message was dispatched to
    pub receiver: &'a ReceiverDesc,
}

/// Message handler: receives the message by value
pub type MsgHandler = fn(&DispatchCtx<'_>, Msg) -> DispatchResult;

/// Per-task dispatcher mapping a message code to a handler
///
/// Implement as a `match` over the task's codes so the lookup cost is
/// independent of how many codes exist. Routing also consults the
/// dispatcher to discover interest without invoking the handler.
pub type MsgDispatcher = fn(MsgCode) -> Option<MsgHandler>;

/// Optional broadcast acceptance predicate
///
/// In general a task shouldn't have a handler for a message it doesn't
/// want. A task that blocks for long periods may still want to filter the
/// broadcasts it accepts to keep its queue small.
pub type BroadcastFilter = fn(&Msg) -> bool;

/// Message receiver descriptor
#[derive(Clone, Copy)]
pub struct ReceiverDesc {
    /// Task identity; unique, dense, below the registry capacity
    pub id: TaskId,
    /// How long the receive loop blocks waiting for a message
    pub rx_timeout: Timeout,
    /// Handler lookup by message code
    pub dispatcher: MsgDispatcher,
    /// Optional broadcast acceptance predicate
    pub accept_broadcast: Option<BroadcastFilter>,
}

pub(crate) struct Slot {
    pub(crate) desc: ReceiverDesc,
    pub(crate) queue: MsgQueue,
    pub(crate) timer: Option<TimerCell>,
}

/// Bring-up phase of the registry: mutable, append-only registration
pub struct RegistryBuilder {
    slots: [Option<Slot>; MAX_RECEIVERS],
    unknown_handler: MsgHandler,
    event_filter: Option<TaskId>,
}

impl RegistryBuilder {
    /// Create an empty registry builder
    #[must_use]
    pub const fn new() -> Self {
        const NONE: Option<Slot> = None;
        Self {
            slots: [NONE; MAX_RECEIVERS],
            unknown_handler: default_unknown_handler,
            event_filter: None,
        }
    }

    /// Register a message receiver under its identity
    ///
    /// Out-of-range and duplicate identities are programming errors: they
    /// raise the system fault and leave the table unchanged.
    pub fn register_receiver(&mut self, desc: ReceiverDesc) -> Result<()> {
        let index = desc.id.0 as usize;
        if index >= MAX_RECEIVERS {
            sys_fault!();
            return Err(Error::ReceiverIdOutOfRange);
        }
        if self.slots[index].is_some() {
            sys_fault!();
            return Err(Error::DuplicateReceiver);
        }

        /* Ids are constant, so spend a sparse table on them: routing never
         * needs a scan to find a receiver. */
        self.slots[index] = Some(Slot {
            desc,
            queue: MsgQueue::new(),
            timer: None,
        });
        Ok(())
    }

    /// Register a task: a receiver plus an owned periodic timer
    ///
    /// The timer is created stopped with the given initial duration and
    /// repeat period (in ticks); the task starts it explicitly.
    pub fn register_task(&mut self, desc: ReceiverDesc, duration: u32, period: u32) -> Result<()> {
        let index = desc.id.0 as usize;
        self.register_receiver(desc)?;
        if let Some(slot) = &mut self.slots[index] {
            slot.timer = Some(TimerCell::new(duration, period));
        }
        Ok(())
    }

    /// Replace the handler invoked for messages no dispatcher claims
    pub fn set_unknown_handler(&mut self, handler: MsgHandler) {
        self.unknown_handler = handler;
    }

    /// Route untargeted filtered sends to this task instead of broadcasting
    pub fn set_event_filter(&mut self, id: TaskId) {
        self.event_filter = Some(id);
    }

    /// End bring-up: freeze the descriptor table for lock-free routing
    #[must_use]
    pub fn freeze(self) -> Registry {
        Registry {
            slots: self.slots,
            unknown_handler: self.unknown_handler,
            event_filter: self.event_filter,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen message registry and router
pub struct Registry {
    pub(crate) slots: [Option<Slot>; MAX_RECEIVERS],
    unknown_handler: MsgHandler,
    event_filter: Option<TaskId>,
}

impl Registry {
    pub(crate) fn slot(&self, id: TaskId) -> Option<&Slot> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    /// Check whether a receiver is registered under the identity
    #[must_use]
    pub fn is_registered(&self, id: TaskId) -> bool {
        self.slot(id).is_some()
    }

    /// The queue handle of a registered receiver
    ///
    /// Most commonly used with [`enqueue`] by a task sending to itself.
    #[must_use]
    pub fn queue_handle(&self, id: TaskId) -> Option<&MsgQueue> {
        self.slot(id).map(|slot| &slot.queue)
    }

    /// The configured event-filter task, if any
    #[must_use]
    pub const fn event_filter(&self) -> Option<TaskId> {
        self.event_filter
    }

    /// Send a message to a single task by identity
    ///
    /// The destination must be a registered identity; anything else is a
    /// programming error on this internal routing path and raises the
    /// system fault. The enqueue itself never blocks. On failure the
    /// message comes back to the caller, which keeps ownership.
    pub fn send(&self, rx_id: TaskId, mut msg: Msg) -> core::result::Result<(), Msg> {
        if !rx_id.in_range() {
            sys_fault!();
            return Err(msg);
        }
        let Some(slot) = self.slot(rx_id) else {
            sys_fault!();
            return Err(msg);
        };

        msg.header_mut().rx_id = rx_id;
        enqueue(&slot.queue, msg, Timeout::NoWait, ExecContext::Thread)
    }

    /// Send a message to the single task whose dispatcher claims its code
    ///
    /// Scans registered application tasks in ascending identity order and
    /// delivers to the first claimant. Prevents indirect coupling of tasks
    /// by identity at the cost of a scan over the (small, static)
    /// registry. If no dispatcher claims the code the message comes back
    /// unmodified.
    pub fn unicast(&self, mut msg: Msg) -> core::result::Result<(), Msg> {
        let code = msg.header().code;

        for index in (TaskId::APP_START.0 as usize)..MAX_RECEIVERS {
            let Some(slot) = &self.slots[index] else {
                continue;
            };

            /* The handler isn't called here. It is only used to find the
             * task the message belongs to. */
            if (slot.desc.dispatcher)(code).is_some() {
                msg.header_mut().rx_id = slot.desc.id;
                return enqueue(&slot.queue, msg, Timeout::NoWait, ExecContext::Thread);
            }
        }
        Err(msg)
    }

    /// Deliver an independent copy of the message to every accepting task
    ///
    /// A task accepts when its dispatcher claims the code and its optional
    /// acceptance predicate (if any) passes. Each copy is allocated with
    /// `msg_size` payload bytes and enqueued without waiting; a failed
    /// copy or enqueue is logged and the scan continues. The original is
    /// freed only when at least one delivery succeeded; otherwise it comes
    /// back and the caller must free it.
    ///
    /// Must not be called from interrupt context: the per-task duplication
    /// is not interrupt-safe in this design.
    pub fn broadcast(
        &self,
        pool: &BufferPool,
        msg: Msg,
        msg_size: usize,
    ) -> core::result::Result<(), Msg> {
        if arch::in_interrupt() {
            sys_fault!();
            return Err(msg);
        }

        let code = msg.header().code;
        let mut delivered = false;

        for index in (TaskId::APP_START.0 as usize)..MAX_RECEIVERS {
            let Some(slot) = &self.slots[index] else {
                continue;
            };

            /* The handler isn't called here. It is only used to determine
             * if a task should receive a broadcast message. */
            if (slot.desc.dispatcher)(code).is_none() {
                continue;
            }
            let accept = slot
                .desc
                .accept_broadcast
                .map_or(true, |accept| accept(&msg));
            if !accept {
                continue;
            }

            let Some(mut copy_buf) = pool.try_take(msg_size, "broadcast") else {
                continue;
            };
            let n = msg_size.min(msg.payload().size());
            copy_buf.as_mut_slice()[..n].copy_from_slice(&msg.payload().as_slice()[..n]);
            copy_buf.set_used(msg.payload().used().min(n));

            let mut header = *msg.header();
            header.rx_id = slot.desc.id;
            let copy = Msg::from_parts(header, msg.callback(), copy_buf);

            match enqueue(&slot.queue, copy, Timeout::NoWait, ExecContext::Thread) {
                Ok(()) => delivered = true,
                Err(copy) => pool.free(copy.into_buffer()),
            }
        }

        /* Free the original only when at least one copy was routed; on
         * failure the free must occur in application code. */
        if delivered {
            pool.free(msg.into_buffer());
            Ok(())
        } else {
            Err(msg)
        }
    }

    /// Check whether a receiver's queue is empty
    ///
    /// Unknown identities read as empty.
    #[must_use]
    pub fn is_queue_empty(&self, id: TaskId) -> bool {
        match self.slot(id) {
            Some(slot) => slot.queue.is_empty(),
            None => true,
        }
    }

    /// Drain and free every pending message for a task
    ///
    /// Used for state resets before a reconfiguration. Returns the number
    /// of messages purged.
    pub fn flush(&self, pool: &BufferPool, id: TaskId) -> usize {
        let Some(slot) = self.slot(id) else {
            return 0;
        };

        let mut purged = 0;
        while let Some(msg) = slot.queue.try_pop() {
            pool.free(msg.into_buffer());
            purged += 1;
        }
        purged
    }

    /// One blocking receive-and-dispatch cycle for a task
    ///
    /// Blocks on the receiver's queue up to its configured timeout; a
    /// timeout with no message is not an error and dispatches nothing. On
    /// a message, the handler chosen by the task's dispatcher runs, then a
    /// carried callback (if any) runs in this task's context, then the
    /// buffer is freed unless the handler consumed the message. Messages
    /// no dispatcher claims go to the unknown-message handler.
    pub fn receive_and_dispatch(&self, pool: &BufferPool, id: TaskId) -> Result<()> {
        let Some(slot) = self.slot(id) else {
            sys_fault!();
            return Err(Error::ReceiverNotRegistered);
        };

        let Some(msg) = slot.queue.pop(slot.desc.rx_timeout) else {
            return Ok(());
        };

        let header = *msg.header();
        let callback = msg.callback();
        let ctx = DispatchCtx {
            registry: self,
            pool,
            receiver: &slot.desc,
        };

        let result = match (slot.desc.dispatcher)(header.code) {
            Some(handler) => {
                let result = handler(&ctx, msg);
                if header.options & options::CALLBACK != 0 {
                    if let Some(callback) = callback {
                        /* Runs in the receiving task's context; the
                         * receiver may not know about the callback. */
                        (callback.func)(callback.data);
                    }
                }
                result
            }
            None => (self.unknown_handler)(&ctx, msg),
        };

        match result {
            DispatchResult::Done(msg) | DispatchResult::Failed(msg) => {
                pool.free(msg.into_buffer());
            }
            DispatchResult::Consumed => {}
        }
        Ok(())
    }
}

/// Put a message directly on a queue, bypassing the router
///
/// This is the lowest-level primitive; [`Registry::send`] and friends are
/// layered on it. A message whose code is the invalid sentinel is a
/// programming error and raises the system fault. Interrupt context
/// coerces the wait to no-wait. On failure the queue occupancy is logged
/// and the message comes back to the caller.
pub fn enqueue(
    queue: &MsgQueue,
    msg: Msg,
    timeout: Timeout,
    ctx: ExecContext,
) -> core::result::Result<(), Msg> {
    if !msg.header().code.is_valid() {
        sys_fault!();
        return Err(msg);
    }

    let timeout = if ctx.is_interrupt() {
        Timeout::NoWait
    } else {
        timeout
    };

    match queue.push(msg, timeout) {
        Ok(()) => Ok(()),
        Err(msg) => {
            log_err!(
                MODULE,
                "unable to queue message code {} to task {} ({}/{})",
                msg.header().code,
                msg.header().rx_id,
                queue.len(),
                MsgQueue::capacity()
            );
            Err(msg)
        }
    }
}

fn default_unknown_handler(ctx: &DispatchCtx<'_>, msg: Msg) -> DispatchResult {
    log_wrn!(
        MODULE,
        "unknown message {} sent to task: {}",
        msg.header().code,
        ctx.receiver.id
    );
    DispatchResult::Failed(msg)
}

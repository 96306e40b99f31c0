// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Per-task periodic timers
//!
//! A task registered with [`crate::RegistryBuilder::register_task`] owns a
//! periodic timer. On expiry the timer self-sends a plain message with the
//! periodic code, source and destination both the owning task. The port's
//! tick interrupt drives expiry by calling [`Registry::process_timers`];
//! timer state is guarded by a short critical section and expiry sends run
//! outside it.
//!
//! A missed periodic tick is treated as a serious fault, not a recoverable
//! condition: failure to allocate or send the tick message raises the
//! system fault.

use core::cell::RefCell;

use critical_section::Mutex;

use fl_pool::BufferPool;

use fl_common::constants::MAX_RECEIVERS;
use fl_common::time::Ticks;
use fl_common::{log_err, log_inf, sys_fault, Error, ExecContext, Result, Timeout};

use crate::message::{Msg, MsgCode, TaskId};
use crate::registry::Registry;

const MODULE: &str = "router";

struct TimerState {
    /// Ticks until the first expiry after a start
    duration: u32,
    /// Repeat period in ticks; 0 means one-shot
    period: u32,
    deadline: u64,
    running: bool,
}

pub(crate) struct TimerCell {
    state: Mutex<RefCell<TimerState>>,
}

impl TimerCell {
    pub(crate) const fn new(duration: u32, period: u32) -> Self {
        Self {
            state: Mutex::new(RefCell::new(TimerState {
                duration,
                period,
                deadline: 0,
                running: false,
            })),
        }
    }
}

impl Registry {
    /// Start a task's periodic timer
    ///
    /// The first expiry happens `duration` ticks after `now`; later
    /// expiries follow every `period` ticks. Starting a receiver that was
    /// registered without a timer is a programming error.
    pub fn start_timer(&self, id: TaskId, now: Ticks) -> Result<()> {
        self.with_timer(id, |state| {
            log_inf!(
                MODULE,
                "timer start task {} duration {} period {}",
                id,
                state.duration,
                state.period
            );
            state.deadline = now.as_u64().saturating_add(u64::from(state.duration));
            state.running = true;
        })
    }

    /// Stop a task's periodic timer
    pub fn stop_timer(&self, id: TaskId) -> Result<()> {
        self.with_timer(id, |state| {
            state.running = false;
        })
    }

    /// Reconfigure a task's timer and restart it
    pub fn change_timer_period(
        &self,
        id: TaskId,
        duration: u32,
        period: u32,
        now: Ticks,
    ) -> Result<()> {
        self.with_timer(id, |state| {
            state.duration = duration;
            state.period = period;
            state.deadline = now.as_u64().saturating_add(u64::from(duration));
            state.running = true;
        })
    }

    /// Fire every expired timer
    ///
    /// Called from the port's tick interrupt (tests call it directly). A
    /// timer that is late by several periods fires once per missed period,
    /// with drift-free deadline arithmetic.
    pub fn process_timers(&self, pool: &BufferPool, now: Ticks) {
        for index in 0..MAX_RECEIVERS {
            let Some(slot) = &self.slots[index] else {
                continue;
            };
            let Some(timer) = &slot.timer else {
                continue;
            };

            // Take the expiry decision under the lock, send outside it
            let fires = critical_section::with(|cs| {
                let mut state = timer.state.borrow_ref_mut(cs);
                let mut fires = 0u32;
                while state.running && state.deadline <= now.as_u64() {
                    fires += 1;
                    if state.period == 0 {
                        state.running = false;
                    } else {
                        state.deadline += u64::from(state.period);
                    }
                }
                fires
            });

            for _ in 0..fires {
                self.fire_periodic(pool, slot.desc.id);
            }
        }
    }

    fn fire_periodic(&self, pool: &BufferPool, id: TaskId) {
        let Some(buffer) =
            pool.try_take_timeout(0, Timeout::NoWait, ExecContext::Interrupt, "periodic_timer")
        else {
            log_err!(MODULE, "periodic tick allocation failed for task {}", id);
            sys_fault!();
            return;
        };

        let mut msg = Msg::new(buffer, MsgCode::PERIODIC, id);
        msg.header_mut().rx_id = id;
        match self.send(id, msg) {
            Ok(()) => {}
            Err(msg) => {
                log_err!(MODULE, "periodic tick send failed for task {}", id);
                pool.free(msg.into_buffer());
                sys_fault!();
            }
        }
    }

    fn with_timer(&self, id: TaskId, f: impl FnOnce(&mut TimerState)) -> Result<()> {
        let Some(slot) = self.slot(id) else {
            sys_fault!();
            return Err(Error::ReceiverNotRegistered);
        };
        let Some(timer) = &slot.timer else {
            sys_fault!();
            return Err(Error::NoTimer);
        };

        critical_section::with(|cs| f(&mut timer.state.borrow_ref_mut(cs)));
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! High-level messaging API
//!
//! Thin convenience wrappers over the router primitives. Unlike the raw
//! primitives, every wrapper frees the message on any failure path, so
//! callers never need to free on error. Variants that route over known-good
//! internal paths additionally assert success.

use fl_pool::BufferPool;

use fl_common::{sys_assert, Error, Result};

use crate::message::{Callback, Msg, MsgCode, TaskId};
use crate::registry::Registry;

/// Send a message whose destination is already set; asserts on failure
pub fn send(registry: &Registry, pool: &BufferPool, msg: Msg) -> Result<()> {
    let rx_id = msg.header().rx_id;
    let result = deallocate_on_error(pool, registry.send(rx_id, msg), Error::SendFailed);
    sys_assert!(result.is_ok());
    result
}

/// Send without asserting when the destination queue is full
pub fn try_send(registry: &Registry, pool: &BufferPool, msg: Msg) -> Result<()> {
    let rx_id = msg.header().rx_id;
    deallocate_on_error(pool, registry.send(rx_id, msg), Error::SendFailed)
}

/// Set the destination and send; asserts on failure
pub fn send_to(registry: &Registry, pool: &BufferPool, msg: Msg, dest_id: TaskId) -> Result<()> {
    let result = deallocate_on_error(pool, registry.send(dest_id, msg), Error::SendFailed);
    sys_assert!(result.is_ok());
    result
}

/// Unicast by dispatcher discovery; asserts on failure
pub fn unicast(registry: &Registry, pool: &BufferPool, msg: Msg) -> Result<()> {
    let result = deallocate_on_error(pool, registry.unicast(msg), Error::NoRoute);
    sys_assert!(result.is_ok());
    result
}

/// Allocate a plain message and send it to an explicit destination
pub fn create_and_send(
    registry: &Registry,
    pool: &BufferPool,
    tx_id: TaskId,
    rx_id: TaskId,
    code: MsgCode,
) -> Result<()> {
    let Some(buffer) = pool.take(0) else {
        return Err(Error::PoolExhausted);
    };

    let msg = Msg::new(buffer, code, tx_id);
    let result = deallocate_on_error(pool, registry.send(rx_id, msg), Error::SendFailed);
    sys_assert!(result.is_ok());
    result
}

/// Shorter form of [`create_and_send`] for a task messaging itself
pub fn create_and_send_to_self(
    registry: &Registry,
    pool: &BufferPool,
    id: TaskId,
    code: MsgCode,
) -> Result<()> {
    let Some(buffer) = pool.take(0) else {
        return Err(Error::PoolExhausted);
    };

    let mut msg = Msg::new(buffer, code, id);
    msg.header_mut().rx_id = id;
    let result = deallocate_on_error(pool, registry.send(id, msg), Error::SendFailed);
    sys_assert!(result.is_ok());
    result
}

/// Allocate a plain message and unicast it
pub fn unicast_create_and_send(
    registry: &Registry,
    pool: &BufferPool,
    tx_id: TaskId,
    code: MsgCode,
) -> Result<()> {
    let Some(buffer) = pool.take(0) else {
        return Err(Error::PoolExhausted);
    };

    let msg = Msg::new(buffer, code, tx_id);
    let result = deallocate_on_error(pool, registry.unicast(msg), Error::NoRoute);
    sys_assert!(result.is_ok());
    result
}

/// Allocate a plain message and broadcast it
pub fn create_and_broadcast(
    registry: &Registry,
    pool: &BufferPool,
    tx_id: TaskId,
    code: MsgCode,
) -> Result<()> {
    let Some(buffer) = pool.take(0) else {
        return Err(Error::PoolExhausted);
    };

    let msg = Msg::new(buffer, code, tx_id);
    deallocate_on_error(pool, registry.broadcast(pool, msg, 0), Error::NoAcceptors)
}

/// Answer a request in place: swap source and destination, overwrite the
/// code, and resend the same buffer
///
/// Often used from a handler that returns `Consumed`. The original sender
/// must have populated the source identity.
pub fn reply(registry: &Registry, pool: &BufferPool, mut msg: Msg, code: MsgCode) -> Result<()> {
    let header = msg.header_mut();
    core::mem::swap(&mut header.rx_id, &mut header.tx_id);
    header.code = code;

    let rx_id = msg.header().rx_id;
    let result = deallocate_on_error(pool, registry.send(rx_id, msg), Error::SendFailed);
    sys_assert!(result.is_ok());
    result
}

/// Allocate a callback-carrying message and send it
///
/// The callback runs in the receiver's context after its handler. A
/// reserved destination routes by unicast instead.
pub fn callback_create_and_send(
    registry: &Registry,
    pool: &BufferPool,
    tx_id: TaskId,
    rx_id: TaskId,
    code: MsgCode,
    callback: fn(u32),
    callback_data: u32,
) -> Result<()> {
    let Some(buffer) = pool.take(0) else {
        return Err(Error::PoolExhausted);
    };

    let mut msg = Msg::new(buffer, code, tx_id);
    msg.set_callback(Callback {
        func: callback,
        data: callback_data,
    });

    if rx_id == TaskId::RESERVED {
        deallocate_on_error(pool, registry.unicast(msg), Error::NoRoute)
    } else {
        deallocate_on_error(pool, registry.send(rx_id, msg), Error::SendFailed)
    }
}

/// Send to an explicit target, or fan out when no target is given
///
/// Without a target the message goes to the configured event-filter task
/// if one exists, otherwise it is broadcast. Generalizes point-to-point
/// vs fan-out delivery behind one call.
pub fn filtered_targeted_send(
    registry: &Registry,
    pool: &BufferPool,
    mut msg: Msg,
    target_id: Option<TaskId>,
    msg_size: usize,
) -> Result<()> {
    let result = match target_id {
        Some(target) => {
            /* Targeted message, send only to target */
            deallocate_on_error(pool, registry.send(target, msg), Error::SendFailed)
        }
        None => match registry.event_filter() {
            Some(filter) => {
                /* With filtering, send targeted message to filter */
                deallocate_on_error(pool, registry.send(filter, msg), Error::SendFailed)
            }
            None => {
                /* Without filtering, send broadcast */
                msg.header_mut().rx_id = TaskId::RESERVED;
                deallocate_on_error(pool, registry.broadcast(pool, msg, msg_size), Error::NoAcceptors)
            }
        },
    };

    sys_assert!(result.is_ok());
    result
}

fn deallocate_on_error(
    pool: &BufferPool,
    result: core::result::Result<(), Msg>,
    error: Error,
) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(msg) => {
            pool.free(msg.into_buffer());
            Err(error)
        }
    }
}

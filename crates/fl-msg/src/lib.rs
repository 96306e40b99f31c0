// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! FieldLink Message Router
//!
//! Inter-task messaging core for the FieldLink framework:
//!
//! - **Messages**: typed header (code, destination, source, options) plus an
//!   owned pool buffer payload; optional post-dispatch callback
//! - **Registry**: fixed-capacity table mapping task identities to receiver
//!   descriptors, built during bring-up and then frozen so lookups need no
//!   locking
//! - **Routing**: targeted send, dispatcher-discovered unicast, and
//!   broadcast with an independent copy per accepting task
//! - **Receiver loop**: blocking receive-and-dispatch with type-enforced
//!   buffer ownership transfer
//! - **Timers**: per-task periodic timers that self-send a periodic message
//!   on expiry
//! - **High-level API**: allocate-and-send convenience wrappers that free
//!   the message on every failure path
//!
//! # Usage
//!
//! ```rust,ignore
//! use fl_msg::{Msg, MsgCode, ReceiverDesc, RegistryBuilder, TaskId};
//! use fl_pool::BufferPool;
//!
//! static POOL: BufferPool = BufferPool::new();
//!
//! let mut builder = RegistryBuilder::new();
//! builder.register_receiver(ReceiverDesc {
//!     id: TaskId::new(1),
//!     rx_timeout: fl_common::Timeout::from_millis(500),
//!     dispatcher: my_dispatcher,
//!     accept_broadcast: None,
//! })?;
//! let registry = builder.freeze();
//!
//! // Per-task loop
//! loop {
//!     registry.receive_and_dispatch(&POOL, TaskId::new(1))?;
//! }
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod events;
pub mod message;
pub mod queue;
pub mod registry;
pub mod sysmsg;
mod timer;

pub use message::{options, Callback, Msg, MsgCode, MsgHeader, TaskId};
pub use queue::MsgQueue;
pub use registry::{
    enqueue, BroadcastFilter, DispatchCtx, DispatchResult, MsgDispatcher, MsgHandler,
    ReceiverDesc, Registry, RegistryBuilder,
};

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Message types
//!
//! A message is a header (code, destination, source, options) plus an owned
//! pool buffer holding the optional payload. Messages move by value through
//! queues; whoever holds the `Msg` owns its buffer.

use core::fmt;

use fl_pool::Buffer;

use fl_common::constants::MAX_RECEIVERS;

/// Task identity: a dense small integer naming a registered receiver
///
/// Identity 0 is reserved; routing a message to it indicates a problem.
/// Application identities start at [`TaskId::APP_START`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskId(pub u8);

impl TaskId {
    /// Reserved identity; never a valid destination
    pub const RESERVED: TaskId = TaskId(0);

    /// First identity available to application tasks
    pub const APP_START: TaskId = TaskId(1);

    /// Create a new task identity
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Check that the identity is inside the registry range
    #[must_use]
    pub const fn in_range(&self) -> bool {
        (self.0 as usize) < MAX_RECEIVERS
    }

    /// Check whether this is the reserved identity
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        self.0 == Self::RESERVED.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message code identifying what a message means
///
/// Codes below [`MsgCode::APP_START`] belong to the framework; applications
/// mint their own codes from `APP_START` upward. The zero code is the
/// reserved invalid sentinel and must never enter a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MsgCode(pub u8);

impl MsgCode {
    /// Reserved invalid sentinel
    pub const INVALID: MsgCode = MsgCode(0);
    /// Periodic timer tick, self-sent by a task's timer
    pub const PERIODIC: MsgCode = MsgCode(1);
    /// Software reset request
    pub const SW_RESET: MsgCode = MsgCode(2);
    /// Watchdog challenge
    pub const WATCHDOG_CHALLENGE: MsgCode = MsgCode(3);
    /// Watchdog response
    pub const WATCHDOG_RESPONSE: MsgCode = MsgCode(4);
    /// A monitored value changed
    pub const VALUE_CHANGED: MsgCode = MsgCode(5);
    /// Factory reset request
    pub const FACTORY_RESET: MsgCode = MsgCode(6);
    /// First code available to application messages
    pub const APP_START: MsgCode = MsgCode(8);

    /// Create a new message code
    #[must_use]
    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    /// Check that the code is not the invalid sentinel
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 != Self::INVALID.0
    }
}

impl fmt::Display for MsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message option flags
pub mod options {
    /// No options
    pub const NONE: u8 = 0;
    /// Message carries a post-dispatch callback
    pub const CALLBACK: u8 = 1 << 0;
}

/// Message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MsgHeader {
    /// What the message means
    pub code: MsgCode,
    /// Destination task
    pub rx_id: TaskId,
    /// Source task
    pub tx_id: TaskId,
    /// Option flags
    pub options: u8,
}

/// Post-dispatch callback carried by a message
///
/// The callback runs in the receiving task's context immediately after the
/// handler returns. The receiver may not know about it; it can be used to
/// give a semaphore or set an event on the sender's behalf.
#[derive(Debug, Clone, Copy)]
pub struct Callback {
    /// Function invoked after dispatch
    pub func: fn(u32),
    /// Opaque word passed to the function
    pub data: u32,
}

/// A routable message owning its pool buffer
pub struct Msg {
    header: MsgHeader,
    callback: Option<Callback>,
    payload: Buffer,
}

impl Msg {
    /// Create a message in a freshly taken buffer
    ///
    /// The destination is initialized to the reserved identity (routing
    /// stamps the real destination) and options to none.
    #[must_use]
    pub fn new(payload: Buffer, code: MsgCode, tx_id: TaskId) -> Self {
        Self {
            header: MsgHeader {
                code,
                rx_id: TaskId::RESERVED,
                tx_id,
                options: options::NONE,
            },
            callback: None,
            payload,
        }
    }

    pub(crate) fn from_parts(header: MsgHeader, callback: Option<Callback>, payload: Buffer) -> Self {
        Self {
            header,
            callback,
            payload,
        }
    }

    /// The message header
    #[must_use]
    pub const fn header(&self) -> &MsgHeader {
        &self.header
    }

    /// Mutable access to the message header
    pub fn header_mut(&mut self) -> &mut MsgHeader {
        &mut self.header
    }

    /// Attach a post-dispatch callback and set the callback option flag
    pub fn set_callback(&mut self, callback: Callback) {
        self.callback = Some(callback);
        self.header.options |= options::CALLBACK;
    }

    /// The attached callback, if any
    #[must_use]
    pub const fn callback(&self) -> Option<Callback> {
        self.callback
    }

    /// The payload buffer
    #[must_use]
    pub const fn payload(&self) -> &Buffer {
        &self.payload
    }

    /// Mutable access to the payload buffer
    pub fn payload_mut(&mut self) -> &mut Buffer {
        &mut self.payload
    }

    /// Give up the message and recover its buffer (for freeing)
    #[must_use]
    pub fn into_buffer(self) -> Buffer {
        self.payload
    }
}

impl fmt::Debug for Msg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Msg")
            .field("header", &self.header)
            .field("payload", &self.payload)
            .finish()
    }
}

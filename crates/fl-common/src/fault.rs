// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! System fault (assertion) handling
//!
//! Defensive faults are programming errors: out-of-range identities,
//! duplicate registration, an invalid message code entering a queue. They
//! are never retried. [`raise`] logs the failing file and line, then invokes
//! the installed fault handler; the default handler requests a warm restart
//! so the system returns to a known-good state instead of continuing in a
//! possibly-corrupted one.
//!
//! Applications (and tests) may install their own handler with
//! [`set_handler`], the equivalent of overriding the weak assertion hook on
//! the embedded build.

use core::cell::Cell;

use critical_section::Mutex;

use crate::arch;
use crate::log_err;

/// Fault handler signature: failing source file and line
pub type FaultHandler = fn(file: &'static str, line: u32);

static HANDLER: Mutex<Cell<Option<FaultHandler>>> = Mutex::new(Cell::new(None));

/// Install a fault handler, replacing the default warm-restart behavior
pub fn set_handler(handler: FaultHandler) {
    critical_section::with(|cs| HANDLER.borrow(cs).set(Some(handler)));
}

/// Raise a system fault
///
/// Logs the failing location, then runs the installed handler. Without an
/// installed handler the system performs a controlled warm restart and this
/// function does not return.
pub fn raise(file: &'static str, line: u32) {
    log_err!("fault", "assertion: line: {} {}", line, file);

    let handler = critical_section::with(|cs| HANDLER.borrow(cs).get());
    match handler {
        Some(handler) => handler(file, line),
        None => arch::request_reset(),
    }
}

/// Raise a system fault when the condition does not hold
#[macro_export]
macro_rules! sys_assert {
    ($cond:expr) => {
        if !($cond) {
            $crate::fault::raise(file!(), line!());
        }
    };
}

/// Force a system fault
#[macro_export]
macro_rules! sys_fault {
    () => {
        $crate::fault::raise(file!(), line!())
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    static FAULTS: AtomicU32 = AtomicU32::new(0);

    fn counting_handler(_file: &'static str, _line: u32) {
        FAULTS.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn test_installed_handler_runs() {
        set_handler(counting_handler);

        let before = FAULTS.load(Ordering::Relaxed);
        sys_assert!(1 + 1 == 2);
        assert_eq!(FAULTS.load(Ordering::Relaxed), before);

        sys_fault!();
        assert!(FAULTS.load(Ordering::Relaxed) > before);
    }
}

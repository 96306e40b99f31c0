// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Integration tests for fl-common
//!
//! These exercise the shared foundation on the host platform: the log
//! buffer, time arithmetic, timeouts, and the fault hook.

mod log_tests {
    use fl_common::log::{LogBuffer, LogLevel};

    #[test]
    fn test_entries_render_with_module_tag() {
        let mut buffer = LogBuffer::new();
        buffer.log(
            LogLevel::Warn,
            0x1234,
            "router",
            format_args!("queue {} full", 7),
        );

        let entry = buffer.iter().next().expect("one entry");
        let rendered = format!("{}", entry);
        assert!(rendered.contains("[router]"));
        assert!(rendered.contains("queue 7 full"));
        assert!(rendered.contains('W'));
    }

    #[test]
    fn test_clear_resets_buffer() {
        let mut buffer = LogBuffer::new();
        buffer.log(LogLevel::Error, 0, "test", format_args!("x"));
        assert!(!buffer.is_empty());

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.iter().count(), 0);
    }
}

mod time_tests {
    use fl_common::{Millis, Ticks, Timeout};

    #[test]
    fn test_no_wait_deadline_already_expired() {
        let now = Ticks::new(42);
        let deadline = Timeout::NoWait.deadline(now).expect("finite");
        assert!(now >= deadline);
    }

    #[test]
    fn test_millis_round_trip_at_tick_rate() {
        // The default tick rate is 1 kHz, so a one-second duration is
        // exactly 1000 ticks.
        assert_eq!(Millis::from_secs(1).as_ticks(), 1000);
        assert_eq!(Timeout::from_millis(1500), Timeout::Ticks(1500));
    }
}

mod fault_tests {
    use core::sync::atomic::{AtomicUsize, Ordering};
    use fl_common::fault;

    static SEEN: AtomicUsize = AtomicUsize::new(0);

    fn recording_handler(file: &'static str, _line: u32) {
        assert!(!file.is_empty());
        SEEN.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn test_raise_routes_to_installed_handler() {
        fault::set_handler(recording_handler);
        let before = SEEN.load(Ordering::Relaxed);
        fault::raise(file!(), line!());
        assert!(SEEN.load(Ordering::Relaxed) > before);
    }
}

mod context_tests {
    use fl_common::ExecContext;

    #[test]
    fn test_context_flags() {
        assert!(ExecContext::Interrupt.is_interrupt());
        assert!(!ExecContext::Thread.is_interrupt());
    }
}

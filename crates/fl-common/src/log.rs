// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Logging infrastructure for the FieldLink framework
//!
//! This module provides a lightweight, no_std compatible logging system.
//! Logs are written to a circular buffer and can be retrieved for debugging
//! or rendered by a diagnostic shell.
//!
//! Call sites use the [`log_err!`](crate::log_err), [`log_wrn!`](crate::log_wrn),
//! [`log_inf!`](crate::log_inf) and [`log_dbg!`](crate::log_dbg) macros, which
//! stamp the entry with the platform tick count and the module tag.

use core::cell::RefCell;
use core::fmt::{self, Write};

use critical_section::Mutex;
use heapless::String;

use crate::arch;
use crate::constants::{LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LEN};

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LogLevel {
    /// Errors that require immediate attention
    Error = 0,
    /// Warnings about potential issues
    Warn = 1,
    /// Informational messages
    Info = 2,
    /// Debug messages (development only)
    Debug = 3,
}

impl LogLevel {
    /// Get the log level name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    /// Get a short prefix for the log level
    #[must_use]
    pub const fn prefix(&self) -> char {
        match self {
            Self::Error => 'E',
            Self::Warn => 'W',
            Self::Info => 'I',
            Self::Debug => 'D',
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log entry structure
#[derive(Clone)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Timestamp in system ticks
    pub timestamp: u32,
    /// Module/component name
    pub module: &'static str,
    /// Log message
    pub message: String<MAX_LOG_MESSAGE_LEN>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:08X}] {} [{}] {}",
            self.timestamp,
            self.level.prefix(),
            self.module,
            self.message
        )
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Circular log buffer
pub struct LogBuffer {
    entries: [Option<LogEntry>; LOG_BUFFER_SIZE],
    write_index: usize,
    count: usize,
    min_level: LogLevel,
}

impl LogBuffer {
    /// Create a new empty log buffer
    #[must_use]
    pub const fn new() -> Self {
        const NONE: Option<LogEntry> = None;
        Self {
            entries: [NONE; LOG_BUFFER_SIZE],
            write_index: 0,
            count: 0,
            min_level: LogLevel::Info,
        }
    }

    /// Set the minimum log level
    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Get the minimum log level
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Check if a log level should be recorded
    #[must_use]
    pub const fn should_log(&self, level: LogLevel) -> bool {
        (level as u8) <= (self.min_level as u8)
    }

    /// Write a formatted entry
    pub fn log(
        &mut self,
        level: LogLevel,
        timestamp: u32,
        module: &'static str,
        args: fmt::Arguments<'_>,
    ) {
        if !self.should_log(level) {
            return;
        }

        let mut message = String::<MAX_LOG_MESSAGE_LEN>::new();
        // Truncation on overflow is acceptable for diagnostics
        let _ = message.write_fmt(args);

        self.entries[self.write_index] = Some(LogEntry {
            level,
            timestamp,
            module,
            message,
        });
        self.write_index = (self.write_index + 1) % LOG_BUFFER_SIZE;
        if self.count < LOG_BUFFER_SIZE {
            self.count += 1;
        }
    }

    /// Get the number of entries
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Check if buffer is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = None;
        }
        self.write_index = 0;
        self.count = 0;
    }

    /// Iterate over entries (oldest first)
    pub fn iter(&self) -> LogBufferIter<'_> {
        LogBufferIter {
            buffer: self,
            index: 0,
            remaining: self.count,
        }
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over log buffer entries
pub struct LogBufferIter<'a> {
    buffer: &'a LogBuffer,
    index: usize,
    remaining: usize,
}

impl<'a> Iterator for LogBufferIter<'a> {
    type Item = &'a LogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let start_index = if self.buffer.count < LOG_BUFFER_SIZE {
            0
        } else {
            self.buffer.write_index
        };

        let actual_index = (start_index + self.index) % LOG_BUFFER_SIZE;
        self.index += 1;
        self.remaining -= 1;

        self.buffer.entries[actual_index].as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

// ============================================================================
// Process-global log buffer
// ============================================================================

static GLOBAL: Mutex<RefCell<LogBuffer>> = Mutex::new(RefCell::new(LogBuffer::new()));

/// Write an entry to the global log buffer, stamped with the platform tick
pub fn emit(level: LogLevel, module: &'static str, args: fmt::Arguments<'_>) {
    let timestamp = arch::now_ticks() as u32;
    critical_section::with(|cs| {
        GLOBAL.borrow_ref_mut(cs).log(level, timestamp, module, args);
    });
}

/// Set the minimum level recorded by the global log buffer
pub fn set_min_level(level: LogLevel) {
    critical_section::with(|cs| GLOBAL.borrow_ref_mut(cs).set_min_level(level));
}

/// Run a closure with shared access to the global log buffer
///
/// Used by diagnostic consumers (and tests) to inspect recent entries.
pub fn with_buffer<R>(f: impl FnOnce(&LogBuffer) -> R) -> R {
    critical_section::with(|cs| f(&GLOBAL.borrow_ref(cs)))
}

/// Clear the global log buffer
pub fn clear() {
    critical_section::with(|cs| GLOBAL.borrow_ref_mut(cs).clear());
}

/// Log at error level
#[macro_export]
macro_rules! log_err {
    ($module:expr, $($arg:tt)*) => {
        $crate::log::emit($crate::log::LogLevel::Error, $module, core::format_args!($($arg)*))
    };
}

/// Log at warning level
#[macro_export]
macro_rules! log_wrn {
    ($module:expr, $($arg:tt)*) => {
        $crate::log::emit($crate::log::LogLevel::Warn, $module, core::format_args!($($arg)*))
    };
}

/// Log at info level
#[macro_export]
macro_rules! log_inf {
    ($module:expr, $($arg:tt)*) => {
        $crate::log::emit($crate::log::LogLevel::Info, $module, core::format_args!($($arg)*))
    };
}

/// Log at debug level
#[macro_export]
macro_rules! log_dbg {
    ($module:expr, $($arg:tt)*) => {
        $crate::log::emit($crate::log::LogLevel::Debug, $module, core::format_args!($($arg)*))
    };
}

// ============================================================================
// Tests
// ============================================================================

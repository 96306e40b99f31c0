// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Platform glue for the FieldLink framework
//!
//! This module provides the small set of platform services the framework
//! needs:
//!
//! - A monotonic tick counter (fed by the platform tick interrupt)
//! - Interrupt-context detection
//! - An idle hook used inside bounded wait loops
//! - A warm system restart request
//!
//! Supported platforms:
//! - ARM Cortex-M (feature: `cortex-m`)
//! - Host stub (default, used for development and testing)

// ============================================================================
// ARM Cortex-M
// ============================================================================

#[cfg(feature = "cortex-m")]
#[allow(unsafe_code)]
pub mod cortex_m {
    //! Cortex-M platform glue.
    //!
    //! The application's SysTick handler must call [`systick_tick`] once per
    //! tick for [`now_ticks`] to advance.

    use core::arch::asm;
    use core::sync::atomic::{AtomicU32, Ordering};

    static TICK_COUNT: AtomicU32 = AtomicU32::new(0);

    /// Advance the system tick counter. Call from the SysTick handler.
    pub fn systick_tick() {
        TICK_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current system tick count
    #[must_use]
    pub fn now_ticks() -> u64 {
        u64::from(TICK_COUNT.load(Ordering::Relaxed))
    }

    /// Check whether the CPU is executing an exception handler
    #[must_use]
    pub fn in_interrupt() -> bool {
        let ipsr: u32;
        // SAFETY: Reading the IPSR special register has no side effects.
        unsafe {
            asm!("mrs {}, IPSR", out(reg) ipsr, options(nomem, nostack, preserves_flags));
        }
        (ipsr & 0x1FF) != 0
    }

    /// Idle hook for bounded wait loops
    pub fn idle() {
        // SAFETY: WFI suspends the core until the next interrupt; it has no
        // memory effects.
        unsafe {
            asm!("wfi", options(nomem, nostack, preserves_flags));
        }
    }

    /// Request a warm system restart via AIRCR.SYSRESETREQ
    pub fn request_reset() -> ! {
        const AIRCR: *mut u32 = 0xE000_ED0C as *mut u32;
        const VECTKEY_SYSRESETREQ: u32 = 0x05FA_0004;

        // SAFETY: AIRCR is the architectural application interrupt and reset
        // control register. Writing VECTKEY with SYSRESETREQ requests a
        // system reset; the loop below covers the latency until it takes
        // effect.
        unsafe {
            core::ptr::write_volatile(AIRCR, VECTKEY_SYSRESETREQ);
        }
        loop {
            idle();
        }
    }
}

#[cfg(feature = "cortex-m")]
pub use cortex_m::{idle, in_interrupt, now_ticks, request_reset};

// ============================================================================
// Host stub
// ============================================================================

#[cfg(not(feature = "cortex-m"))]
pub mod stub {
    //! Stub platform glue for host builds and tests.
    //!
    //! The tick counter is a mock that only moves when [`advance_ticks`] is
    //! called, and [`idle`] advances it by one tick so that bounded waits
    //! terminate deterministically without a live clock.

    use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    static MOCK_TICKS: AtomicU64 = AtomicU64::new(0);
    static INTERRUPT_CONTEXT: AtomicBool = AtomicBool::new(false);

    /// Get the current mock tick count
    #[must_use]
    pub fn now_ticks() -> u64 {
        MOCK_TICKS.load(Ordering::Relaxed)
    }

    /// Advance the mock tick counter
    pub fn advance_ticks(n: u64) {
        MOCK_TICKS.fetch_add(n, Ordering::Relaxed);
    }

    /// Check the simulated interrupt-context flag
    #[must_use]
    pub fn in_interrupt() -> bool {
        INTERRUPT_CONTEXT.load(Ordering::Relaxed)
    }

    /// Set the simulated interrupt-context flag
    pub fn set_interrupt_context(active: bool) {
        INTERRUPT_CONTEXT.store(active, Ordering::Relaxed);
    }

    /// Idle hook: advances the mock clock by one tick
    pub fn idle() {
        advance_ticks(1);
    }

    /// Warm restart request: on the host there is nothing to restart
    pub fn request_reset() -> ! {
        panic!("system warm restart requested");
    }
}

#[cfg(not(feature = "cortex-m"))]
pub use stub::{idle, in_interrupt, now_ticks, request_reset};

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Ticks;

    #[test]
    fn test_mock_clock_advances() {
        let start = now_ticks();
        stub::advance_ticks(10);
        assert!(now_ticks() >= start + 10);
    }

    #[test]
    fn test_idle_makes_progress() {
        let start = Ticks::new(now_ticks());
        idle();
        idle();
        assert!(start.elapsed(Ticks::new(now_ticks())) >= 2);
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Owning buffer handle issued by the pool

use heapless::Vec;

use fl_common::constants::MAX_BUFFER_SIZE;

/// Provenance of a pool allocation: the slot it occupies and the tag minted
/// when it was taken
///
/// The token is what [`crate::BufferPool::free_token`] checks to detect
/// duplicate or mismatched frees. Only the pool can resolve a token back to
/// arena state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferToken {
    pub(crate) slot: u8,
    pub(crate) tag: u16,
}

/// An owned, zero-initialized allocation from the buffer pool
///
/// The buffer tracks both its allocated size (fixed at take time) and a
/// used length the producer fills in, matching the size/length pair of
/// buffer-carrying messages. Ownership follows the holder: moving the
/// buffer is the only way to transfer it, and freeing consumes it.
pub struct Buffer {
    token: BufferToken,
    data: Vec<u8, MAX_BUFFER_SIZE>,
    used: usize,
}

impl Buffer {
    pub(crate) fn new(token: BufferToken, data: Vec<u8, MAX_BUFFER_SIZE>) -> Self {
        Self {
            token,
            data,
            used: 0,
        }
    }

    /// Allocated size in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes the producer has filled in
    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Set the used length, clamped to the allocated size
    pub fn set_used(&mut self, used: usize) {
        self.used = used.min(self.data.len());
    }

    /// View the full allocated region
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Mutably view the full allocated region
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// The allocation's pool provenance
    #[must_use]
    pub const fn token(&self) -> BufferToken {
        self.token
    }
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("token", &self.token)
            .field("size", &self.size())
            .field("used", &self.used)
            .finish()
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Veridian Systems Inc.

//! Event message payload
//!
//! Sensor and control events travel as a small fixed-layout payload inside
//! an ordinary message. The event value is a 4-byte word viewed as whatever
//! the event type implies; larger state must go through the configuration
//! store, not through messages.

use fl_common::{Error, Result};
use fl_pool::Buffer;

/// Event type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EventType {
    /// Reserved (invalid) event
    Reserved = 0,
    /// Air temperature reading
    Temperature = 1,
    /// Air humidity reading
    Humidity = 2,
    /// Battery level reading
    BatteryLevel = 3,
    /// Battery transitioned to good
    BatteryGood = 4,
    /// Battery transitioned to bad
    BatteryBad = 5,
    /// Soil electrical conductivity reading
    SoilEc = 6,
    /// Soil temperature reading
    SoilTemperature = 7,
    /// Soil humidity reading
    SoilHumidity = 8,
    /// Soil pH reading
    SoilPh = 9,
    /// Water flow reading
    WaterFlow = 10,
}

impl From<u8> for EventType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Temperature,
            2 => Self::Humidity,
            3 => Self::BatteryLevel,
            4 => Self::BatteryGood,
            5 => Self::BatteryBad,
            6 => Self::SoilEc,
            7 => Self::SoilTemperature,
            8 => Self::SoilHumidity,
            9 => Self::SoilPh,
            10 => Self::WaterFlow,
            _ => Self::Reserved,
        }
    }
}

/// Event value: one 4-byte word with typed views
///
/// The views reinterpret the same bits; which one is meaningful depends on
/// the event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventData(u32);

impl EventData {
    /// Store an unsigned value
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    /// Store a signed value
    #[must_use]
    pub const fn from_i32(value: i32) -> Self {
        Self(value as u32)
    }

    /// Store a float value
    #[must_use]
    pub fn from_f32(value: f32) -> Self {
        Self(value.to_bits())
    }

    /// Store a 16-bit value (upper half reserved)
    #[must_use]
    pub const fn from_u16(value: u16) -> Self {
        Self(value as u32)
    }

    /// View as unsigned
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// View as signed
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0 as i32
    }

    /// View as float
    #[must_use]
    pub fn as_f32(&self) -> f32 {
        f32::from_bits(self.0)
    }

    /// View as 16-bit
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

/// Event message payload: type, value, source index, and timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventMsg {
    /// What kind of event this is
    pub event_type: EventType,
    /// Event value
    pub data: EventData,
    /// Source identifier (sensor index, channel, ...)
    pub id: u32,
    /// Capture time in seconds
    pub timestamp: u32,
}

impl EventMsg {
    /// Serialized payload size in bytes
    pub const WIRE_SIZE: usize = 13;

    /// Serialize into a message payload buffer
    ///
    /// Fails with [`Error::BufferTooSmall`] if the buffer cannot hold the
    /// event layout.
    pub fn write_to(&self, buffer: &mut Buffer) -> Result<()> {
        if buffer.size() < Self::WIRE_SIZE {
            return Err(Error::BufferTooSmall);
        }

        let bytes = buffer.as_mut_slice();
        bytes[0] = self.event_type as u8;
        bytes[1..5].copy_from_slice(&self.data.as_u32().to_le_bytes());
        bytes[5..9].copy_from_slice(&self.id.to_le_bytes());
        bytes[9..13].copy_from_slice(&self.timestamp.to_le_bytes());
        buffer.set_used(Self::WIRE_SIZE);
        Ok(())
    }

    /// Deserialize from a message payload buffer
    pub fn read_from(buffer: &Buffer) -> Result<Self> {
        if buffer.used() < Self::WIRE_SIZE {
            return Err(Error::BufferTooSmall);
        }

        let bytes = buffer.as_slice();
        Ok(Self {
            event_type: EventType::from(bytes[0]),
            data: EventData::from_u32(u32::from_le_bytes([
                bytes[1], bytes[2], bytes[3], bytes[4],
            ])),
            id: u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]),
            timestamp: u32::from_le_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fl_pool::BufferPool;

    #[test]
    fn test_event_payload_roundtrip() {
        let pool = BufferPool::new();
        pool.init();

        let event = EventMsg {
            event_type: EventType::SoilHumidity,
            data: EventData::from_f32(41.5),
            id: 2,
            timestamp: 1_700_000_000,
        };

        let mut buffer = pool.take(EventMsg::WIRE_SIZE).unwrap();
        event.write_to(&mut buffer).unwrap();
        assert_eq!(buffer.used(), EventMsg::WIRE_SIZE);

        let decoded = EventMsg::read_from(&buffer).unwrap();
        assert_eq!(decoded, event);
        assert!((decoded.data.as_f32() - 41.5).abs() < f32::EPSILON);

        pool.free(buffer);
    }

    #[test]
    fn test_undersized_buffer_rejected() {
        let pool = BufferPool::new();
        pool.init();

        let event = EventMsg {
            event_type: EventType::Temperature,
            data: EventData::from_i32(-7),
            id: 0,
            timestamp: 0,
        };

        let mut buffer = pool.take(4).unwrap();
        assert_eq!(event.write_to(&mut buffer), Err(Error::BufferTooSmall));
        assert_eq!(EventMsg::read_from(&buffer).unwrap_err(), Error::BufferTooSmall);

        pool.free(buffer);
    }

    #[test]
    fn test_unknown_event_type_maps_to_reserved() {
        assert_eq!(EventType::from(200), EventType::Reserved);
        assert_eq!(EventType::from(6), EventType::SoilEc);
    }
}

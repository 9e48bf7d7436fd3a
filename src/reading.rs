//! Sensor reading data model and payload decoding.
//!
//! Payloads arrive as small JSON objects published by the sensor node:
//!
//! ```json
//! {"co2": 650, "thi": 72.5}
//! ```
//!
//! Decoding is zero-alloc and bounded: a payload larger than
//! [`PAYLOAD_BUDGET`] is rejected outright instead of growing memory, and a
//! payload missing either required field (or carrying a non-numeric or
//! negative value) is rejected without touching the previously decoded
//! reading. Values pass through as received; no unit conversion happens here.

use serde::Deserialize;

use crate::Millis;

/// Upper bound on accepted payload size, in bytes. Doubles as the capacity
/// of the [`Payload`] buffer the transport hands over.
pub const PAYLOAD_BUDGET: usize = 2048;

/// Raw payload bytes as received from the broker.
pub type Payload = heapless::Vec<u8, PAYLOAD_BUDGET>;

/// One decoded sensor reading. Immutable once constructed; each successful
/// decode replaces the previous reading wholesale. Absence of data is always
/// `Option::<Reading>::None`, never a sentinel value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// CO2 concentration in ppm.
    pub co2: u32,
    /// Temperature-humidity index, as published.
    pub thi: f32,
    /// Monotonic timestamp of the decode.
    pub received_at_millis: Millis,
}

/// Why a payload was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload exceeds [`PAYLOAD_BUDGET`].
    Oversize,
    /// Not valid JSON, or a required field is missing or non-numeric.
    Malformed,
}

/// Wire shape of a reading. `co2` is unsigned so a negative concentration is
/// rejected at the parse layer rather than checked afterwards.
#[derive(Deserialize)]
struct RawReading {
    co2: u32,
    thi: f32,
}

/// Decode a raw payload into a [`Reading`] stamped with `now`.
pub fn decode_reading(payload: &[u8], now: Millis) -> Result<Reading, DecodeError> {
    if payload.len() > PAYLOAD_BUDGET {
        return Err(DecodeError::Oversize);
    }
    let (raw, _consumed) =
        serde_json_core::de::from_slice::<RawReading>(payload).map_err(|_| DecodeError::Malformed)?;
    Ok(Reading {
        co2: raw.co2,
        thi: raw.thi,
        received_at_millis: now,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_payload() {
        let reading = decode_reading(br#"{"co2": 650, "thi": 72.5}"#, 1234).unwrap();
        assert_eq!(reading.co2, 650);
        assert_eq!(reading.thi, 72.5);
        assert_eq!(reading.received_at_millis, 1234);
    }

    #[test]
    fn test_decode_integer_thi() {
        let reading = decode_reading(br#"{"co2": 650, "thi": 72}"#, 0).unwrap();
        assert_eq!(reading.thi, 72.0);
    }

    #[test]
    fn test_decode_missing_thi() {
        assert_eq!(decode_reading(br#"{"co2": 700}"#, 0), Err(DecodeError::Malformed));
    }

    #[test]
    fn test_decode_missing_co2() {
        assert_eq!(decode_reading(br#"{"thi": 70.1}"#, 0), Err(DecodeError::Malformed));
    }

    #[test]
    fn test_decode_non_numeric_field() {
        assert_eq!(
            decode_reading(br#"{"co2": "high", "thi": 72.5}"#, 0),
            Err(DecodeError::Malformed)
        );
    }

    #[test]
    fn test_decode_negative_co2() {
        assert_eq!(
            decode_reading(br#"{"co2": -1, "thi": 72.5}"#, 0),
            Err(DecodeError::Malformed)
        );
    }

    #[test]
    fn test_decode_empty_payload() {
        assert_eq!(decode_reading(b"", 0), Err(DecodeError::Malformed));
    }

    #[test]
    fn test_decode_oversize_payload() {
        // Valid JSON padded past the budget must be rejected before parsing.
        let mut payload = vec![b' '; PAYLOAD_BUDGET - 10];
        payload.extend_from_slice(br#"{"co2": 650, "thi": 72.5}"#);
        assert!(payload.len() > PAYLOAD_BUDGET);
        assert_eq!(decode_reading(&payload, 0), Err(DecodeError::Oversize));
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let reading =
            decode_reading(br#"{"co2": 420, "thi": 65.0, "battery_mv": 3700}"#, 0).unwrap();
        assert_eq!(reading.co2, 420);
    }
}

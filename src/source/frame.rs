use crate::snapshot::{DeviceError, LedState, Snapshot};
use chrono::Utc;
use std::collections::BTreeMap;

/// Start-of-frame marker.
pub const FRAME_START: u8 = 0xFF;
/// Frame type carrying a full status record.
pub const STATUS_FRAME: u8 = 0x20;

/// Payload bytes of a status frame: eight little-endian scaled u16/i16
/// readings, a charge word, and three bitmask bytes.
const STATUS_PAYLOAD_LEN: usize = 21;

/// Incremental decoder for the device's framed byte stream.
///
/// Frames are `[0xFF, len, type, payload.., cksum]` where the checksum byte
/// makes the whole frame sum to zero modulo 256. Garbage between frames is
/// skipped; a frame that fails the checksum or carries an out-of-range value
/// is reported as an invalid snapshot, never as an error.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every snapshot completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Snapshot> {
        self.buf.extend_from_slice(bytes);
        let mut out = Vec::new();

        loop {
            match self.buf.iter().position(|&b| b == FRAME_START) {
                Some(0) => {}
                Some(skip) => {
                    self.buf.drain(..skip);
                }
                None => {
                    self.buf.clear();
                    break;
                }
            }

            if self.buf.len() < 2 {
                break;
            }
            let len = self.buf[1] as usize;
            let total = 3 + len + 1;
            if self.buf.len() < total {
                break;
            }

            let frame: Vec<u8> = self.buf.drain(..total).collect();
            let sum = frame.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
            if sum != 0 {
                out.push(Snapshot::default());
                continue;
            }

            match frame[2] {
                STATUS_FRAME if len == STATUS_PAYLOAD_LEN => {
                    out.push(decode_status(&frame[3..3 + len]));
                }
                // Other frame kinds belong to the device protocol layer.
                _ => {}
            }
        }

        out
    }
}

fn decode_status(p: &[u8]) -> Snapshot {
    let unsigned = |i: usize| u16::from_le_bytes([p[i], p[i + 1]]) as f64;
    let signed = |i: usize| i16::from_le_bytes([p[i], p[i + 1]]) as f64;

    let charge_raw = u16::from_le_bytes([p[16], p[17]]);
    if charge_raw > 1000 {
        // Charge fraction out of range marks the whole frame as garbage.
        return Snapshot::default();
    }

    let on_mask = p[18];
    let blink_mask = p[19];
    let error_mask = p[20];

    let mut leds = BTreeMap::new();
    let mut leds_on = Vec::new();
    for id in 0..8u8 {
        let bit = 1u8 << id;
        let state = if on_mask & bit != 0 {
            LedState::On
        } else if blink_mask & bit != 0 {
            LedState::Blink
        } else {
            LedState::Off
        };
        leds.insert(id, state);
        if state == LedState::On {
            leds_on.push(id);
        }
    }

    Snapshot {
        valid: true,
        in_voltage: unsigned(0) / 100.0,
        in_current: signed(2) / 100.0,
        in_frequency: unsigned(4) / 100.0,
        out_voltage: unsigned(6) / 100.0,
        out_current: signed(8) / 100.0,
        out_frequency: unsigned(10) / 100.0,
        bat_voltage: unsigned(12) / 100.0,
        bat_current: signed(14) / 100.0,
        charge_state: charge_raw as f64 / 1000.0,
        leds,
        leds_on,
        errors: decode_errors(error_mask),
        timestamp: Utc::now(),
    }
}

fn decode_errors(mask: u8) -> Vec<DeviceError> {
    let mut errors = Vec::new();
    if mask & 0x01 != 0 {
        errors.push(DeviceError::LowBattery);
    }
    if mask & 0x02 != 0 {
        errors.push(DeviceError::Overload);
    }
    if mask & 0x04 != 0 {
        errors.push(DeviceError::OverTemperature);
    }
    if mask & 0x08 != 0 {
        errors.push(DeviceError::VoltageSense);
    }
    errors
}

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Indicator LED ids as reported by the inverter status frame.
pub const LED_MAINS: u8 = 0;
pub const LED_ABSORPTION: u8 = 1;
pub const LED_BULK: u8 = 2;
pub const LED_FLOAT: u8 = 3;
pub const LED_INVERTER: u8 = 4;
pub const LED_OVERLOAD: u8 = 5;
pub const LED_LOW_BATTERY: u8 = 6;
pub const LED_TEMPERATURE: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    Off,
    On,
    Blink,
}

impl LedState {
    pub fn name(&self) -> &'static str {
        match self {
            LedState::Off => "off",
            LedState::On => "on",
            LedState::Blink => "blink",
        }
    }
}

/// Device-side error conditions carried inside a valid snapshot.
///
/// These are content, not control flow: they are surfaced verbatim to the
/// display and report layers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    #[error("battery voltage too low")]
    LowBattery,

    #[error("inverter overload")]
    Overload,

    #[error("temperature too high")]
    OverTemperature,

    #[error("voltage sense error")]
    VoltageSense,
}

/// One telemetry snapshot from the inverter, produced once per poll cycle.
///
/// A snapshot with `valid == false` represents a transient decode failure;
/// its numeric fields are meaningless and consumers must skip it without
/// treating it as an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub valid: bool,

    pub in_voltage: f64,
    pub in_current: f64,
    pub in_frequency: f64,

    pub out_voltage: f64,
    pub out_current: f64,
    pub out_frequency: f64,

    pub bat_voltage: f64,
    pub bat_current: f64,

    /// Battery state of charge as a fraction in 0..=1.
    pub charge_state: f64,

    /// State of every known indicator LED, keyed by LED id.
    pub leds: BTreeMap<u8, LedState>,

    /// Ids of the LEDs currently lit, in reporting order.
    pub leds_on: Vec<u8>,

    pub errors: Vec<DeviceError>,

    pub timestamp: DateTime<Utc>,
}

impl Default for Snapshot {
    /// The zero-value snapshot served before the first poll completes.
    fn default() -> Self {
        Self {
            valid: false,
            in_voltage: 0.0,
            in_current: 0.0,
            in_frequency: 0.0,
            out_voltage: 0.0,
            out_current: 0.0,
            out_frequency: 0.0,
            bat_voltage: 0.0,
            bat_current: 0.0,
            charge_state: 0.0,
            leds: BTreeMap::new(),
            leds_on: Vec::new(),
            errors: Vec::new(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_invalid() {
        let snapshot = Snapshot::default();
        assert!(!snapshot.valid);
        assert_eq!(snapshot.out_voltage, 0.0);
        assert!(snapshot.leds_on.is_empty());
        assert!(snapshot.errors.is_empty());
    }

    #[test]
    fn test_device_error_descriptions() {
        assert_eq!(
            DeviceError::LowBattery.to_string(),
            "battery voltage too low"
        );
        assert_eq!(DeviceError::Overload.to_string(), "inverter overload");
    }
}

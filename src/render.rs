use crate::snapshot::{self, Snapshot};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Label used when a snapshot names an indicator id the table does not know.
pub const UNKNOWN_LED: &str = "unknown led";

/// Display record for one status-page request. All numeric fields are
/// pre-formatted with three decimals, and the battery charge is a percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub date: String,

    pub out_current: String,
    pub out_voltage: String,
    pub out_power: String,

    pub in_current: String,
    pub in_voltage: String,
    pub in_power: String,

    pub in_min_out: String,

    pub bat_voltage: String,
    pub bat_current: String,
    pub bat_power: String,
    pub bat_charge: String,

    pub in_freq: String,
    pub out_freq: String,

    pub leds: Vec<String>,
    pub errors: Vec<String>,
}

/// Pure snapshot-to-display formatter.
///
/// The indicator-name table is injected at construction so that callers can
/// swap in device-specific labels; `Formatter::default()` carries the
/// standard inverter LED names.
#[derive(Debug, Clone)]
pub struct Formatter {
    led_names: BTreeMap<u8, String>,
}

impl Default for Formatter {
    fn default() -> Self {
        let led_names = [
            (snapshot::LED_MAINS, "mains"),
            (snapshot::LED_ABSORPTION, "absorption"),
            (snapshot::LED_BULK, "bulk"),
            (snapshot::LED_FLOAT, "float"),
            (snapshot::LED_INVERTER, "inverter"),
            (snapshot::LED_OVERLOAD, "overload"),
            (snapshot::LED_LOW_BATTERY, "low battery"),
            (snapshot::LED_TEMPERATURE, "temperature"),
        ]
        .into_iter()
        .map(|(id, name)| (id, name.to_string()))
        .collect();

        Self::new(led_names)
    }
}

impl Formatter {
    pub fn new(led_names: BTreeMap<u8, String>) -> Self {
        Self { led_names }
    }

    fn led_name(&self, id: u8) -> &str {
        self.led_names
            .get(&id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LED)
    }

    /// Build the display record for the status page.
    pub fn page_view(&self, status: &Snapshot) -> PageView {
        let out_power = status.out_voltage * status.out_current;
        let in_power = status.in_voltage * status.in_current;

        PageView {
            date: status.timestamp.to_rfc2822(),

            out_current: format!("{:.3}", status.out_current),
            out_voltage: format!("{:.3}", status.out_voltage),
            out_power: format!("{:.3}", out_power),

            in_current: format!("{:.3}", status.in_current),
            in_voltage: format!("{:.3}", status.in_voltage),
            in_power: format!("{:.3}", in_power),

            in_min_out: format!("{:.3}", in_power - out_power),

            bat_voltage: format!("{:.3}", status.bat_voltage),
            bat_current: format!("{:.3}", status.bat_current),
            bat_power: format!("{:.3}", status.bat_voltage * status.bat_current),
            bat_charge: format!("{:.3}", status.charge_state * 100.0),

            in_freq: format!("{:.3}", status.in_frequency),
            out_freq: format!("{:.3}", status.out_frequency),

            leds: status
                .leds_on
                .iter()
                .map(|id| self.led_name(*id).to_string())
                .collect(),

            errors: status.errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Build the multi-line console report for one snapshot.
    pub fn text_report(&self, status: &Snapshot) -> String {
        let mut out = String::new();

        let _ = writeln!(
            out,
            "Bat Volt: {:.2}V Bat Cur: {:.2}A",
            status.bat_voltage, status.bat_current
        );
        let _ = writeln!(
            out,
            "In Volt: {:.2}V In Cur: {:.2}A In Freq {:.2}Hz",
            status.in_voltage, status.in_current, status.in_frequency
        );
        let _ = writeln!(
            out,
            "Out Volt: {:.2}V Out Cur: {:.2}A Out Freq {:.2}Hz",
            status.out_voltage, status.out_current, status.out_frequency
        );
        let _ = writeln!(
            out,
            "In Power {:.2}W Out Power {:.2}W",
            status.in_voltage * status.in_current,
            status.out_voltage * status.out_current
        );
        let _ = writeln!(out, "Charge State: {:.2}%", status.charge_state * 100.0);

        out.push_str("LEDs state:");
        for (id, state) in &status.leds {
            let _ = write!(out, " {} {}", self.led_name(*id), state.name());
        }

        out.push_str("\nErrors:");
        for error in &status.errors {
            let _ = write!(out, " {}", error);
        }
        out.push('\n');

        out
    }
}

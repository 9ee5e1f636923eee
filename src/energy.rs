use crate::snapshot::Snapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Instantaneous power on each leg of the inverter, in watts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PowerSample {
    in_w: f64,
    out_w: f64,
    bat_w: f64,
}

impl PowerSample {
    fn of(snapshot: &Snapshot) -> Self {
        Self {
            in_w: snapshot.in_voltage * snapshot.in_current,
            out_w: snapshot.out_voltage * snapshot.out_current,
            bat_w: snapshot.bat_voltage * snapshot.bat_current,
        }
    }
}

/// Energy accumulated since the last report read, in watt-hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EnergyReport {
    pub in_wh: f64,
    pub out_wh: f64,
    pub bat_wh: f64,
}

/// Running energy totals owned by the hub.
///
/// Power is integrated with the left-rectangle rule: each valid sample
/// contributes its predecessor's power over the elapsed interval. The first
/// valid sample after a reset only seeds the reference point.
#[derive(Debug, Default)]
pub struct EnergyTotals {
    totals: EnergyReport,
    last: Option<(DateTime<Utc>, PowerSample)>,
}

impl EnergyTotals {
    /// Fold one valid snapshot into the totals.
    pub fn update(&mut self, snapshot: &Snapshot) {
        let sample = PowerSample::of(snapshot);

        if let Some((prev_ts, prev)) = self.last {
            let hours = (snapshot.timestamp - prev_ts).num_milliseconds() as f64 / 3_600_000.0;
            // A non-monotonic device clock must not subtract energy.
            if hours > 0.0 {
                self.totals.in_wh += prev.in_w * hours;
                self.totals.out_wh += prev.out_w * hours;
                self.totals.bat_wh += prev.bat_w * hours;
            }
        }

        self.last = Some((snapshot.timestamp, sample));
    }

    /// Zero the totals and clear the integration reference point. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn report(&self) -> EnergyReport {
        self.totals
    }
}

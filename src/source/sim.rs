use super::{Source, SourceHandle};
use crate::snapshot::{self, LedState, Snapshot};
use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc;

impl Source {
    /// Spawn a source producing plausible synthetic telemetry, for demos and
    /// for running the services without an inverter on the desk.
    pub fn simulated(interval: Duration) -> Source {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            let mut tick: u64 = 0;
            loop {
                tokio::time::sleep(interval).await;
                if tx.send(synthetic_snapshot(tick)).await.is_err() {
                    return;
                }
                tick += 1;
            }
        });

        Source {
            rx,
            handle: SourceHandle { task },
        }
    }
}

/// A gently drifting reading around typical mains-charging values.
pub(crate) fn synthetic_snapshot(tick: u64) -> Snapshot {
    let phase = tick as f64 * 0.1;

    let mut leds = BTreeMap::new();
    leds.insert(snapshot::LED_MAINS, LedState::On);
    leds.insert(snapshot::LED_FLOAT, LedState::Blink);

    Snapshot {
        valid: true,
        in_voltage: 235.0 + 2.0 * phase.sin(),
        in_current: 2.1 + 0.2 * phase.cos(),
        in_frequency: 50.0,
        out_voltage: 230.0 + 1.5 * phase.sin(),
        out_current: 2.0 + 0.1 * phase.cos(),
        out_frequency: 50.0,
        bat_voltage: 26.0 + 0.5 * (phase * 0.3).sin(),
        bat_current: 5.0 + 1.0 * (phase * 0.2).cos(),
        charge_state: (0.8 + 0.15 * (phase * 0.05).sin()).clamp(0.0, 1.0),
        leds,
        leds_on: vec![snapshot::LED_MAINS],
        errors: Vec::new(),
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_snapshot_is_valid_and_in_range() {
        for tick in 0..200 {
            let s = synthetic_snapshot(tick);
            assert!(s.valid);
            assert!((0.0..=1.0).contains(&s.charge_state));
            assert!(s.out_voltage > 200.0 && s.out_voltage < 260.0);
        }
    }

    #[tokio::test]
    async fn test_simulated_source_delivers_and_closes() {
        let source = Source::simulated(Duration::from_millis(1));
        let (mut rx, handle) = source.split();

        let snapshot = rx.recv().await.expect("expected a synthetic snapshot");
        assert!(snapshot.valid);

        handle.close().await;
    }
}

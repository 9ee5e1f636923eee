use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use inverter_web::{EnergyReport, Hub, HubHandle, MetricsExporter, Snapshot};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::sync::mpsc;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap()
}

fn reference_snapshot(ts: DateTime<Utc>) -> Snapshot {
    Snapshot {
        valid: true,
        out_voltage: 230.0,
        out_current: 2.0,
        out_frequency: 50.0,
        in_voltage: 235.0,
        in_current: 2.1,
        in_frequency: 50.0,
        bat_voltage: 26.0,
        bat_current: 5.0,
        charge_state: 0.80,
        timestamp: ts,
        ..Snapshot::default()
    }
}

/// Poll the hub until `latest` carries the expected timestamp. The hub
/// serves whatever is current, so an arrival sitting in the channel may not
/// have been folded in yet when the request lands.
async fn wait_for_snapshot(handle: &HubHandle, ts: DateTime<Utc>) -> Snapshot {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let snapshot = handle.snapshot().await.unwrap();
            if snapshot.timestamp == ts {
                return snapshot;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("hub never served the expected snapshot")
}

#[tokio::test]
async fn test_render_request_sees_each_arrival_in_order() {
    let (tx, rx) = mpsc::channel(1);
    let (handle, hub) = Hub::spawn(rx, MetricsExporter::new().unwrap());

    // Before any arrival: the zero-value snapshot.
    let initial = handle.snapshot().await.unwrap();
    assert!(!initial.valid);

    for n in 0..5 {
        let ts = base_time() + ChronoDuration::seconds(n);
        tx.send(reference_snapshot(ts)).await.unwrap();
        let served = wait_for_snapshot(&handle, ts).await;
        assert!(served.valid);
    }

    hub.stop().await;
}

#[tokio::test]
async fn test_concurrent_render_requests_see_identical_snapshot() {
    let (tx, rx) = mpsc::channel(1);
    let (handle, hub) = Hub::spawn(rx, MetricsExporter::new().unwrap());

    let ts = base_time();
    tx.send(reference_snapshot(ts)).await.unwrap();
    wait_for_snapshot(&handle, ts).await;

    let (a, b, c) = tokio::join!(handle.snapshot(), handle.snapshot(), handle.snapshot());
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert_eq!(a, b);
    assert_eq!(b, c);

    hub.stop().await;
}

#[tokio::test]
async fn test_energy_report_accumulates_and_resets_on_read() {
    let (tx, rx) = mpsc::channel(1);
    let (handle, hub) = Hub::spawn(rx, MetricsExporter::new().unwrap());

    let first = base_time();
    let second = base_time() + ChronoDuration::hours(1);

    tx.send(reference_snapshot(first)).await.unwrap();
    wait_for_snapshot(&handle, first).await;
    tx.send(reference_snapshot(second)).await.unwrap();
    wait_for_snapshot(&handle, second).await;

    // One hour at the first sample's powers.
    let report = handle.energy_report().await.unwrap();
    assert!((report.out_wh - 460.0).abs() < 1e-6);
    assert!((report.in_wh - 493.5).abs() < 1e-6);
    assert!((report.bat_wh - 130.0).abs() < 1e-6);

    // Reading reset the totals; an immediate second read is all zeroes.
    let report = handle.energy_report().await.unwrap();
    assert_eq!(report, EnergyReport::default());

    hub.stop().await;
}

#[tokio::test]
async fn test_invalid_snapshot_does_not_perturb_totals() {
    let (tx, rx) = mpsc::channel(1);
    let (handle, hub) = Hub::spawn(rx, MetricsExporter::new().unwrap());

    let first = base_time();
    let last = base_time() + ChronoDuration::hours(1);

    tx.send(reference_snapshot(first)).await.unwrap();
    wait_for_snapshot(&handle, first).await;

    // An invalid snapshot in between must be stored as latest but must not
    // touch the accumulator.
    let invalid_ts = base_time() + ChronoDuration::minutes(30);
    let invalid = Snapshot {
        timestamp: invalid_ts,
        ..Snapshot::default()
    };
    tx.send(invalid).await.unwrap();
    let served = wait_for_snapshot(&handle, invalid_ts).await;
    assert!(!served.valid);

    tx.send(reference_snapshot(last)).await.unwrap();
    wait_for_snapshot(&handle, last).await;

    let report = handle.energy_report().await.unwrap();
    assert!((report.out_wh - 460.0).abs() < 1e-6);

    hub.stop().await;
}

#[tokio::test]
async fn test_stop_quiesces_the_loop() {
    let (tx, rx) = mpsc::channel(1);
    let (handle, hub) = Hub::spawn(rx, MetricsExporter::new().unwrap());

    hub.stop().await;

    assert!(handle.snapshot().await.is_err());
    assert!(handle.energy_report().await.is_err());
    assert!(tx.send(reference_snapshot(base_time())).await.is_err());
}

#[tokio::test]
async fn test_end_to_end_formatting_of_distributed_snapshot() {
    let (tx, rx) = mpsc::channel(1);
    let (handle, hub) = Hub::spawn(rx, MetricsExporter::new().unwrap());
    let formatter = inverter_web::Formatter::default();

    // An invalid snapshot first: it must produce a quiescent page, not a
    // report of garbage numbers.
    let invalid_ts = base_time();
    tx.send(Snapshot {
        timestamp: invalid_ts,
        ..Snapshot::default()
    })
    .await
    .unwrap();
    wait_for_snapshot(&handle, invalid_ts).await;

    let ts = base_time() + ChronoDuration::seconds(1);
    tx.send(reference_snapshot(ts)).await.unwrap();
    let served = wait_for_snapshot(&handle, ts).await;

    let view = formatter.page_view(&served);
    assert_eq!(view.out_power, "460.000");
    assert_eq!(view.in_power, "493.500");
    assert_eq!(view.in_min_out, "33.500");
    assert_eq!(view.bat_power, "130.000");
    assert_eq!(view.bat_charge, "80.000");

    hub.stop().await;
}

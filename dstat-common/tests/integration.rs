//! Integration tests for dstat-common library.

use chrono::NaiveDate;
use dstat_common::{
    BatteryStatus, CpuLoad, CpuPerf, NetworkRates, PowerReading, SnapshotRecord, Volume, bar,
    fragment, scaled,
};

#[test]
fn test_full_snapshot_workflow() {
    let time = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    let record = SnapshotRecord {
        timestamp: 1_735_732_800_000,
        network: Some(NetworkRates {
            tx_bytes: 1024,
            rx_bytes: 2048,
            quality: Some(50),
        }),
        cpu: Some(CpuLoad { percent: 7 }),
        perf: Some(CpuPerf {
            mhz: 2400,
            setperf: 50,
        }),
        power: Some(PowerReading::Battery(BatteryStatus {
            on_ac: false,
            percent: 82,
            minutes_remaining: Some(194),
        })),
        temperature: Some(54.2),
        volume: Some(Volume::Level(63)),
        time: Some(time),
        line: "CPU 7%".to_string(),
    };

    let json = record.to_json().expect("JSON encode failed");
    assert!(!json.contains('\n'));

    let decoded: SnapshotRecord = serde_json::from_str(&json).expect("JSON decode failed");
    assert_eq!(decoded.network, record.network);
    assert_eq!(decoded.cpu, record.cpu);
    assert_eq!(decoded.perf, record.perf);
    assert_eq!(decoded.power, record.power);
    assert_eq!(decoded.volume, Some(Volume::Level(63)));
    assert_eq!(decoded.time, Some(time));
    assert_eq!(decoded.line, "CPU 7%");
}

#[test]
fn test_fragment_helpers_compose() {
    let text = format!("↑ {}/s ↓ {}/s", scaled(1024), scaled(2048));
    assert_eq!(fragment(text).unwrap(), "↑ 1.0K/s ↓ 2.0K/s");

    let text = format!("♫ {}% {}", 55, bar(55));
    assert_eq!(fragment(text).unwrap(), "♫ 55% ▅");
}

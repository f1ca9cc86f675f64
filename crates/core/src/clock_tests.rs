// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_is_monotonic() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    assert!(clock.now() > t1);
}

#[test]
fn fake_clock_advances_both_clocks() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    let w1 = clock.utc_now();
    clock.advance(Duration::from_secs(90));
    assert!(clock.now().duration_since(t1) >= Duration::from_secs(90));
    assert_eq!((clock.utc_now() - w1).num_seconds(), 90);
}

#[test]
fn fake_clock_clones_share_time() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let w1 = clock1.utc_now();
    clock2.advance(Duration::from_secs(30));
    assert_eq!((clock1.utc_now() - w1).num_seconds(), 30);
}

#[test]
fn fake_clock_set_utc() {
    let clock = FakeClock::new();
    let target = Utc.timestamp_opt(1_800_000_000, 0).single().unwrap();
    clock.set_utc(target);
    assert_eq!(clock.utc_now(), target);
}

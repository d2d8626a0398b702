//! Behavioral specifications for the feeding-schedule engine.
//!
//! These tests wire the real poller against the in-memory adapters and walk
//! whole scenarios: seeding, firing, recovery, and pathological rows.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use tend_adapters::{
    MemoryNotificationSink, MemoryScheduleStore, TracedNotificationSink, TracedScheduleStore,
};
use tend_core::{
    Animal, DayOfWeek, FakeClock, FeedingSchedule, Frequency, OwnerId, ScheduleId,
    SequentialIdGen,
};
use tend_engine::{PollerConfig, SchedulePoller, ScanReport};

type Sink = MemoryNotificationSink<FakeClock, SequentialIdGen>;

// 2026-03-02 is a Monday.
fn utc(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, h, m, 0).unwrap()
}

fn tod(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

struct World {
    store: MemoryScheduleStore,
    sink: Sink,
    clock: FakeClock,
    poller: SchedulePoller<MemoryScheduleStore, Sink, FakeClock>,
}

fn world_at(now: DateTime<Utc>) -> World {
    let clock = FakeClock::at(now);
    let store = MemoryScheduleStore::new();
    let sink = MemoryNotificationSink::new(clock.clone(), SequentialIdGen::new("notif"));
    let poller = SchedulePoller::new(store.clone(), sink.clone(), clock.clone());
    World {
        store,
        sink,
        clock,
        poller,
    }
}

fn next_due_of(store: &MemoryScheduleStore, id: &str) -> DateTime<Utc> {
    store.schedule(&ScheduleId::new(id)).unwrap().next_due
}

#[tokio::test]
async fn a_day_in_the_life_of_the_poller() {
    // Monday 06:00. Three animals, three feeding plans.
    let mut w = world_at(utc(2, 6, 0));
    w.store.add_animal(Animal::new("hedgehog", "Pokey", "alice"));
    w.store.add_animal(Animal::new("gecko", "Tangerine", "alice"));
    w.store.add_animal(Animal::new("ferret", "Noodle", "bob"));

    // Pokey: every 6 hours, grid anchored at 06:00.
    w.store.add_schedule(
        FeedingSchedule::new("pokey-feed", "hedgehog", Frequency::EveryXHours, utc(2, 6, 0))
            .with_hours_interval(6),
    );
    // Tangerine: daily at 09:00.
    w.store.add_schedule(
        FeedingSchedule::new("tangerine-feed", "gecko", Frequency::Daily, utc(2, 9, 0))
            .with_time_of_day(tod(9)),
    );
    // Noodle: weekly, Wednesdays at 09:00.
    w.store.add_schedule(
        FeedingSchedule::new("noodle-feed", "ferret", Frequency::Weekly, utc(4, 9, 0))
            .with_day_of_week(DayOfWeek::Wed)
            .with_time_of_day(tod(9)),
    );

    // 06:00: only the hourly plan is due.
    let report = w.poller.tick().await;
    assert_eq!(report.due, 1);
    assert_eq!(w.sink.notifications().len(), 1);
    assert_eq!(w.sink.notifications()[0].message, "It's time to feed Pokey");
    assert_eq!(next_due_of(&w.store, "pokey-feed"), utc(2, 12, 0));

    // 09:05: the daily plan fires and rolls to tomorrow.
    w.clock.set(utc(2, 9, 5));
    let report = w.poller.tick().await;
    assert_eq!(report.due, 1);
    assert_eq!(
        w.sink.notifications()[1].message,
        "It's time to feed Tangerine"
    );
    assert_eq!(next_due_of(&w.store, "tangerine-feed"), utc(3, 9, 0));

    // Wednesday 09:30: the weekly plan fires and books next Wednesday. The
    // hourly and daily plans have been accumulating lateness; all three fire.
    w.clock.set(utc(4, 9, 30));
    let report = w.poller.tick().await;
    assert_eq!(report.due, 3);
    assert_eq!(next_due_of(&w.store, "noodle-feed"), utc(11, 9, 0));

    // Every notification went to the right inbox.
    let notifications = w.sink.notifications();
    let owners: Vec<&OwnerId> = notifications.iter().map(|n| &n.owner).collect();
    assert!(owners.contains(&&OwnerId::new("alice")));
    assert!(owners.contains(&&OwnerId::new("bob")));
    assert!(notifications.iter().all(|n| !n.is_read));
}

#[tokio::test]
async fn overdue_schedule_catches_up_one_tick_at_a_time() {
    // The hourly grid stays anchored even when the poller was down for hours.
    let mut w = world_at(utc(2, 20, 15));
    w.store.add_animal(Animal::new("hedgehog", "Pokey", "alice"));
    w.store.add_schedule(
        FeedingSchedule::new("pokey-feed", "hedgehog", Frequency::EveryXHours, utc(2, 6, 0))
            .with_hours_interval(6),
    );

    // One tick fires the schedule exactly once, however overdue it is.
    let report = w.poller.tick().await;
    assert_eq!(report, ScanReport { due: 1, notified: 1, advanced: 1, skipped: 0 });
    assert_eq!(next_due_of(&w.store, "pokey-feed"), utc(2, 12, 0));

    // Still overdue: the next ticks walk the grid forward without skipping
    // slots and without double-firing inside one tick.
    w.poller.tick().await;
    w.poller.tick().await;
    assert_eq!(next_due_of(&w.store, "pokey-feed"), utc(3, 0, 0));
    assert_eq!(w.sink.notifications().len(), 3);
}

#[tokio::test]
async fn interrupted_save_is_delivered_at_least_once() {
    let mut w = world_at(utc(2, 9, 0));
    w.store.add_animal(Animal::new("ferret", "Noodle", "bob"));
    w.store.add_schedule(
        FeedingSchedule::new("noodle-feed", "ferret", Frequency::EveryXHours, utc(2, 8, 0))
            .with_hours_interval(12),
    );

    // The notification lands, then the process "crashes" before the save.
    w.store.set_fail_saves(true);
    let report = w.poller.tick().await;
    assert_eq!(report.notified, 1);
    assert_eq!(report.advanced, 0);
    assert_eq!(next_due_of(&w.store, "noodle-feed"), utc(2, 8, 0));

    // On recovery the same occurrence is re-notified exactly once more and
    // then advances. Two notifications total: at-least-once, never zero.
    w.store.set_fail_saves(false);
    w.clock.advance(Duration::minutes(1));
    let report = w.poller.tick().await;
    assert_eq!(report.notified, 1);
    assert_eq!(report.advanced, 1);
    assert_eq!(w.sink.notifications().len(), 2);
    assert_eq!(next_due_of(&w.store, "noodle-feed"), utc(2, 20, 0));
}

#[tokio::test]
async fn one_bad_row_never_blocks_the_batch() {
    let mut w = world_at(utc(2, 9, 0));
    w.store.add_animal(Animal::new("hedgehog", "Pokey", "alice"));
    w.store.add_animal(Animal::new("ferret", "Noodle", "bob"));
    // Corrupt row: weekly with no day of week.
    w.store.add_schedule(
        FeedingSchedule::new("bad-feed", "hedgehog", Frequency::Weekly, utc(2, 8, 0))
            .with_time_of_day(tod(9)),
    );
    w.store.add_schedule(
        FeedingSchedule::new("noodle-feed", "ferret", Frequency::EveryXHours, utc(2, 8, 0))
            .with_hours_interval(6),
    );

    let report = w.poller.tick().await;

    // Both fired; the corrupt row was deferred a day instead of stalling.
    assert_eq!(report.due, 2);
    assert_eq!(report.advanced, 2);
    assert_eq!(next_due_of(&w.store, "bad-feed"), utc(3, 9, 0));
    assert_eq!(next_due_of(&w.store, "noodle-feed"), utc(2, 14, 0));
}

#[tokio::test]
async fn poller_composes_with_traced_adapters() {
    let clock = FakeClock::at(utc(2, 9, 0));
    let store = MemoryScheduleStore::new();
    store.add_animal(Animal::new("gecko", "Tangerine", "alice"));
    store.add_schedule(
        FeedingSchedule::new("tangerine-feed", "gecko", Frequency::Daily, utc(2, 8, 0))
            .with_time_of_day(tod(8)),
    );
    let sink = MemoryNotificationSink::new(clock.clone(), SequentialIdGen::new("notif"));

    let mut poller = SchedulePoller::new(
        TracedScheduleStore::new(store.clone()),
        TracedNotificationSink::new(sink.clone()),
        clock,
    );

    let report = poller.tick().await;

    assert_eq!(report.advanced, 1);
    assert_eq!(sink.notifications().len(), 1);
    assert_eq!(next_due_of(&store, "tangerine-feed"), utc(3, 8, 0));
}

#[tokio::test]
async fn run_loop_starts_and_stops_on_demand() {
    let clock = FakeClock::at(utc(2, 9, 0));
    let store = MemoryScheduleStore::new();
    store.add_animal(Animal::new("gecko", "Tangerine", "alice"));
    store.add_schedule(
        FeedingSchedule::new("tangerine-feed", "gecko", Frequency::Daily, utc(2, 9, 0))
            .with_time_of_day(tod(9)),
    );
    let sink = MemoryNotificationSink::new(clock.clone(), SequentialIdGen::new("notif"));
    let mut poller = SchedulePoller::new(store.clone(), sink.clone(), clock).with_config(
        PollerConfig {
            interval: std::time::Duration::from_millis(10),
        },
    );

    let (tx, rx) = tokio::sync::watch::channel(false);
    let handle = tokio::spawn(async move { poller.run(rx).await });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    tx.send(true).unwrap();
    tokio::time::timeout(std::time::Duration::from_secs(1), handle)
        .await
        .unwrap()
        .unwrap();

    // Fired once on the immediate first scan, then nothing was due.
    assert_eq!(sink.notifications().len(), 1);
}

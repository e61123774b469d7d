//! Integration tests for limit enforcement across a simulated day.

use mindfultime_core::{App, AppCategory, Database, Event, LimitMonitor};

const USER: &str = "test-user";

fn seed_app(db: &Database, id: &str, daily_limit: u32) {
    db.insert_app(
        USER,
        &App {
            id: id.to_string(),
            name: id.to_string(),
            package_name: format!("com.example.{id}"),
            category: AppCategory::Entertainment,
            daily_limit,
            used_time: 0,
            is_blocked: false,
        },
    )
    .unwrap();
}

#[test]
fn usage_accumulates_until_block_then_reset_clears() {
    let db = Database::open_memory().unwrap();
    seed_app(&db, "video", 60);
    let monitor = LimitMonitor::new(&db, USER);

    // Three half-hour sittings; the second one crosses the limit.
    assert!(monitor.record_usage("video", 30).unwrap().is_empty());
    let events = monitor.record_usage("video", 30).unwrap();
    assert!(matches!(events.as_slice(), [Event::AppBlocked { .. }]));

    // Further usage while blocked does not re-emit a block event.
    assert!(monitor.record_usage("video", 10).unwrap().is_empty());

    let app = db.app(USER, "video").unwrap().unwrap();
    assert_eq!(app.used_time, 70);
    assert!(app.is_blocked);
    assert_eq!(monitor.remaining_time("video").unwrap(), 0);

    // Midnight rollover.
    monitor.reset_daily().unwrap();
    let app = db.app(USER, "video").unwrap().unwrap();
    assert_eq!(app.used_time, 0);
    assert!(!app.is_blocked);
    assert_eq!(monitor.remaining_time("video").unwrap(), 60);
}

#[test]
fn sweep_catches_externally_written_usage() {
    let db = Database::open_memory().unwrap();
    seed_app(&db, "game", 30);
    seed_app(&db, "chat", 30);
    let monitor = LimitMonitor::new(&db, USER);

    // The usage-tracking boundary writes used_time directly.
    db.set_app_used_time(USER, "game", 45).unwrap();

    let events = monitor.sweep().unwrap();
    assert_eq!(events.len(), 1);
    assert!(db.app(USER, "game").unwrap().unwrap().is_blocked);
    assert!(!db.app(USER, "chat").unwrap().unwrap().is_blocked);

    // A second sweep is idempotent.
    assert!(monitor.sweep().unwrap().is_empty());
}

#[test]
fn earned_time_reopens_a_blocked_app() {
    let db = Database::open_memory().unwrap();
    seed_app(&db, "social", 30);
    let monitor = LimitMonitor::new(&db, USER);

    monitor.record_usage("social", 30).unwrap();
    assert!(db.app(USER, "social").unwrap().unwrap().is_blocked);

    let events = monitor.add_time("social", 15).unwrap();
    assert!(matches!(events.as_slice(), [Event::AppUnblocked { .. }]));
    assert_eq!(monitor.remaining_time("social").unwrap(), 15);
}

//! Scheduler behaviour driven through a scripted transfer.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use common::{FakeTransfer, InstantTransfer, RecordingEmitter, id, request};
use tuneload_download::{
    DownloadError, DownloadEvent, DownloadScheduler, DownloadSchedulerConfig,
    DownloadSchedulerDeps, DownloadSchedulerPort, ProgressCallback, build_download_scheduler,
};

fn setup(
    max_concurrent: u32,
) -> (
    Arc<DownloadScheduler>,
    Arc<FakeTransfer>,
    Arc<RecordingEmitter>,
) {
    let transfer = FakeTransfer::new();
    let emitter = RecordingEmitter::new();
    let scheduler = build_download_scheduler(DownloadSchedulerDeps {
        transfer: Arc::clone(&transfer),
        event_emitter: Arc::clone(&emitter),
        config: DownloadSchedulerConfig::new().with_max_concurrent(max_concurrent),
    })
    .expect("valid config");
    (scheduler, transfer, emitter)
}

fn recorder() -> (ProgressCallback, Arc<Mutex<Vec<u8>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: ProgressCallback = Arc::new(move |percent| sink.lock().unwrap().push(percent));
    (callback, seen)
}

#[test]
fn burst_beyond_capacity_queues_in_arrival_order() {
    let (scheduler, transfer, emitter) = setup(3);
    for name in ["a", "b", "c", "d", "e"] {
        scheduler.start_download(request(name), None);
    }

    assert_eq!(scheduler.active_count(), 3);
    assert_eq!(scheduler.pending_count(), 2);
    assert_eq!(transfer.opened_ids(), vec!["a", "b", "c"]);
    assert_eq!(emitter.events_for("d"), vec![DownloadEvent::queued("d", 1)]);
    assert_eq!(emitter.events_for("e"), vec![DownloadEvent::queued("e", 2)]);

    transfer.succeed("a");
    transfer.succeed("b");

    assert_eq!(transfer.opened_ids(), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(scheduler.active_count(), 3);
    assert_eq!(scheduler.pending_count(), 0);
}

#[test]
fn queued_downloads_start_at_zero_progress() {
    let (scheduler, _transfer, _emitter) = setup(1);
    scheduler.start_download(request("a"), None);
    scheduler.start_download(request("b"), None);

    assert!(scheduler.is_queued(&id("b")));
    assert_eq!(scheduler.progress(&id("b")), Some(0));
}

#[test]
fn duplicate_start_of_active_id_is_ignored() {
    let (scheduler, transfer, emitter) = setup(3);
    scheduler.start_download(request("a"), None);
    transfer.tick("a", 50, Some(100));

    scheduler.start_download(request("a"), None);

    assert_eq!(transfer.open_count("a"), 1);
    assert_eq!(scheduler.active_count(), 1);
    assert_eq!(scheduler.progress(&id("a")), Some(50));
    assert_eq!(
        emitter.events_for("a"),
        vec![DownloadEvent::started("a"), DownloadEvent::progress("a", 50)]
    );
}

#[test]
fn back_to_back_starts_open_one_transfer() {
    let (scheduler, transfer, _emitter) = setup(3);
    scheduler.start_download(request("a"), None);
    scheduler.start_download(request("a"), None);

    assert_eq!(transfer.open_count("a"), 1);
    assert!(scheduler.is_active(&id("a")));
}

#[test]
fn duplicate_start_of_queued_id_is_ignored() {
    let (scheduler, _transfer, emitter) = setup(1);
    scheduler.start_download(request("a"), None);
    scheduler.start_download(request("b"), None);
    scheduler.start_download(request("b"), None);

    assert_eq!(scheduler.pending_count(), 1);
    assert_eq!(emitter.events_for("b"), vec![DownloadEvent::queued("b", 1)]);
}

#[test]
fn cancel_active_admits_exactly_one() {
    let (scheduler, transfer, emitter) = setup(2);
    for name in ["a", "b", "c", "d"] {
        scheduler.start_download(request(name), None);
    }
    transfer.tick("a", 10, Some(100));

    scheduler.cancel_download(&id("a"));

    assert!(transfer.is_paused("a"));
    assert_eq!(scheduler.progress(&id("a")), None);
    assert!(!scheduler.is_active(&id("a")));
    assert_eq!(transfer.opened_ids(), vec!["a", "b", "c"]);
    assert!(scheduler.is_queued(&id("d")));
    assert_eq!(
        emitter.events_for("a").last(),
        Some(&DownloadEvent::cancelled("a"))
    );
}

#[test]
fn cancel_queued_never_opens_a_transfer() {
    let (scheduler, transfer, emitter) = setup(1);
    scheduler.start_download(request("a"), None);
    scheduler.start_download(request("b"), None);

    scheduler.cancel_download(&id("b"));

    assert!(!scheduler.is_queued(&id("b")));
    assert_eq!(scheduler.progress(&id("b")), None);
    assert_eq!(
        emitter.events_for("b"),
        vec![DownloadEvent::queued("b", 1), DownloadEvent::cancelled("b")]
    );

    transfer.succeed("a");
    assert_eq!(transfer.open_count("b"), 0);
    assert_eq!(scheduler.active_count(), 0);
}

#[test]
fn cancel_unknown_id_is_a_noop() {
    let (scheduler, _transfer, emitter) = setup(2);
    scheduler.start_download(request("a"), None);
    let before = emitter.events().len();

    scheduler.cancel_download(&id("ghost"));

    assert_eq!(emitter.events().len(), before);
    assert!(scheduler.is_active(&id("a")));
}

#[test]
fn cancel_all_clears_every_structure() {
    let (scheduler, transfer, emitter) = setup(2);
    for name in ["a", "b", "c"] {
        scheduler.start_download(request(name), None);
    }
    transfer.tick("a", 30, Some(100));

    scheduler.cancel_all_downloads();

    for name in ["a", "b", "c"] {
        assert_eq!(scheduler.progress(&id(name)), None, "progress for {name}");
        assert_eq!(
            emitter.events_for(name).last(),
            Some(&DownloadEvent::cancelled(name))
        );
    }
    assert!(transfer.is_paused("a"));
    assert!(transfer.is_paused("b"));
    assert_eq!(transfer.open_count("c"), 0);
    assert!(scheduler.snapshot().is_idle());
}

#[test]
fn clear_downloads_is_repeatable() {
    let (scheduler, transfer, _emitter) = setup(1);
    scheduler.start_download(request("a"), None);
    scheduler.start_download(request("b"), None);

    scheduler.clear_downloads();
    scheduler.clear_downloads();

    assert!(scheduler.snapshot().is_idle());
    assert_eq!(scheduler.progress(&id("b")), None);
    assert_eq!(transfer.opened_ids(), vec!["a"]);
}

#[test]
fn progress_is_monotonic_and_ends_at_hundred() {
    let (scheduler, transfer, emitter) = setup(1);
    let (callback, seen) = recorder();
    scheduler.start_download(request("a"), Some(callback));

    transfer.tick("a", 10, Some(100));
    transfer.tick("a", 50, Some(100));
    transfer.tick("a", 30, Some(100));
    transfer.tick("a", 99, Some(100));
    transfer.succeed("a");

    assert_eq!(*seen.lock().unwrap(), vec![10, 50, 50, 99, 100]);
    assert_eq!(scheduler.progress(&id("a")), Some(100));
    assert!(!scheduler.is_active(&id("a")));
    assert_eq!(
        emitter.events_for("a"),
        vec![
            DownloadEvent::started("a"),
            DownloadEvent::progress("a", 10),
            DownloadEvent::progress("a", 50),
            DownloadEvent::progress("a", 99),
            DownloadEvent::progress("a", 100),
            DownloadEvent::completed("a"),
        ]
    );
}

#[test]
fn full_tick_before_success_reports_hundred_once() {
    let (scheduler, transfer, emitter) = setup(1);
    let (callback, seen) = recorder();
    scheduler.start_download(request("a"), Some(callback));

    transfer.tick("a", 4096, Some(4096));
    transfer.succeed("a");

    assert_eq!(*seen.lock().unwrap(), vec![100]);
    let hundreds = emitter
        .events_for("a")
        .into_iter()
        .filter(|e| *e == DownloadEvent::progress("a", 100))
        .count();
    assert_eq!(hundreds, 1);
}

#[test]
fn unknown_size_stays_at_zero_until_success() {
    let (scheduler, transfer, _emitter) = setup(1);
    scheduler.start_download(request("a"), None);

    transfer.tick("a", 1024, None);
    transfer.tick("a", 2048, Some(0));
    assert_eq!(scheduler.progress(&id("a")), Some(0));

    transfer.succeed("a");
    assert_eq!(scheduler.progress(&id("a")), Some(100));
}

#[test]
fn capacity_two_scenario() {
    let (scheduler, transfer, _emitter) = setup(2);
    for name in ["A", "B", "C", "D"] {
        scheduler.start_download(request(name), None);
    }

    let snapshot = scheduler.snapshot();
    let active: Vec<_> = snapshot.active.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(active, vec!["A", "B"]);
    assert_eq!(snapshot.pending, vec![id("C"), id("D")]);

    transfer.succeed("A");
    let snapshot = scheduler.snapshot();
    let active: Vec<_> = snapshot.active.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(active, vec!["B", "C"]);
    assert_eq!(snapshot.pending, vec![id("D")]);

    scheduler.cancel_download(&id("B"));
    let snapshot = scheduler.snapshot();
    let active: Vec<_> = snapshot.active.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(active, vec!["C", "D"]);
    assert!(snapshot.pending.is_empty());
}

#[test]
fn cancel_before_first_tick_ignores_late_events() {
    let (scheduler, transfer, emitter) = setup(3);
    scheduler.start_download(request("E"), None);

    scheduler.cancel_download(&id("E"));
    assert!(transfer.is_paused("E"));

    transfer.tick("E", 50, Some(100));
    transfer.succeed("E");

    assert_eq!(scheduler.progress(&id("E")), None);
    assert!(!scheduler.is_active(&id("E")));
    assert!(!scheduler.is_queued(&id("E")));
    assert_eq!(
        emitter.events_for("E"),
        vec![DownloadEvent::started("E"), DownloadEvent::cancelled("E")]
    );
}

#[test]
fn stale_observer_cannot_touch_a_restarted_download() {
    let (scheduler, transfer, _emitter) = setup(2);
    scheduler.start_download(request("a"), None);
    let first = transfer.latest("a");

    scheduler.cancel_download(&id("a"));
    scheduler.start_download(request("a"), None);

    first.observer.on_progress(90, Some(100));
    first.observer.on_finished(Ok(()));

    assert_eq!(transfer.open_count("a"), 2);
    assert_eq!(scheduler.progress(&id("a")), Some(0));
    assert!(scheduler.is_active(&id("a")));
}

#[test]
fn failure_removes_progress_and_admits_next() {
    let (scheduler, transfer, emitter) = setup(1);
    scheduler.start_download(request("a"), None);
    scheduler.start_download(request("b"), None);
    transfer.tick("a", 40, Some(100));

    transfer.fail("a", DownloadError::network_with_status("gone", 410));

    assert_eq!(scheduler.progress(&id("a")), None);
    assert!(scheduler.is_active(&id("b")));
    match emitter.events_for("a").last() {
        Some(DownloadEvent::DownloadFailed { error, .. }) => {
            assert_eq!(error, "Network error (HTTP 410): gone");
        }
        other => panic!("expected failure event, got {other:?}"),
    }

    transfer.succeed("a");
    assert_eq!(scheduler.progress(&id("a")), None);
}

#[test]
fn open_failure_frees_the_slot() {
    let (scheduler, transfer, emitter) = setup(1);
    transfer.fail_open_for("a");

    scheduler.start_download(request("a"), None);

    assert!(!scheduler.is_active(&id("a")));
    assert_eq!(scheduler.progress(&id("a")), None);
    assert!(matches!(
        emitter.events_for("a").as_slice(),
        [
            DownloadEvent::DownloadStarted { .. },
            DownloadEvent::DownloadFailed { .. }
        ]
    ));

    scheduler.start_download(request("b"), None);
    assert!(scheduler.is_active(&id("b")));
}

#[test]
fn transfer_reported_cancel_is_a_cancellation() {
    let (scheduler, transfer, emitter) = setup(1);
    scheduler.start_download(request("a"), None);

    transfer.fail("a", DownloadError::Cancelled);

    assert_eq!(scheduler.progress(&id("a")), None);
    assert_eq!(
        emitter.events_for("a").last(),
        Some(&DownloadEvent::cancelled("a"))
    );
}

#[test]
fn restart_after_completion_begins_at_zero() {
    let (scheduler, transfer, _emitter) = setup(1);
    scheduler.start_download(request("a"), None);
    transfer.succeed("a");
    assert_eq!(scheduler.progress(&id("a")), Some(100));

    scheduler.start_download(request("a"), None);

    assert_eq!(scheduler.progress(&id("a")), Some(0));
    assert_eq!(transfer.open_count("a"), 2);
}

#[test]
fn cancel_after_completion_keeps_final_progress() {
    let (scheduler, transfer, emitter) = setup(1);
    scheduler.start_download(request("a"), None);
    transfer.succeed("a");

    scheduler.cancel_download(&id("a"));

    assert_eq!(scheduler.progress(&id("a")), Some(100));
    assert_eq!(
        emitter.events_for("a").last(),
        Some(&DownloadEvent::completed("a"))
    );
}

#[test]
fn callbacks_may_reenter_the_scheduler() {
    let (scheduler, transfer, _emitter) = setup(1);
    let weak = Arc::downgrade(&scheduler);
    let callback: ProgressCallback = Arc::new(move |percent| {
        if percent >= 50 {
            if let Some(scheduler) = weak.upgrade() {
                scheduler.cancel_download(&id("a"));
            }
        }
    });

    scheduler.start_download(request("a"), Some(callback));
    scheduler.start_download(request("b"), None);
    transfer.tick("a", 60, Some(100));

    assert!(!scheduler.is_active(&id("a")));
    assert!(scheduler.is_active(&id("b")));
    assert_eq!(scheduler.progress(&id("a")), None);
}

#[test]
fn synchronous_outcomes_inside_open_are_handled() {
    let transfer = InstantTransfer::new();
    let emitter = RecordingEmitter::new();
    let scheduler = build_download_scheduler(DownloadSchedulerDeps {
        transfer: Arc::clone(&transfer),
        event_emitter: Arc::clone(&emitter),
        config: DownloadSchedulerConfig::new().with_max_concurrent(1),
    })
    .unwrap();

    for name in ["a", "b", "c"] {
        scheduler.start_download(request(name), None);
    }

    assert_eq!(transfer.opened_ids(), vec!["a", "b", "c"]);
    assert!(scheduler.snapshot().is_idle());
    for name in ["a", "b", "c"] {
        assert_eq!(scheduler.progress(&id(name)), Some(100));
    }
    assert_eq!(
        emitter.events_for("a"),
        vec![
            DownloadEvent::started("a"),
            DownloadEvent::progress("a", 50),
            DownloadEvent::progress("a", 100),
            DownloadEvent::completed("a"),
        ]
    );
}

#[test]
fn usable_through_the_port() {
    let (scheduler, transfer, _emitter) = setup(1);
    let port: Arc<dyn DownloadSchedulerPort> = scheduler;

    port.start_download(request("a"), None);
    port.start_download(request("b"), None);
    transfer.tick("a", 25, Some(100));

    assert_eq!(port.progress(&id("a")), Some(25));
    assert_eq!(port.snapshot().pending, vec![id("b")]);

    port.clear_downloads();
    assert!(port.snapshot().is_idle());
}

#[test]
fn concurrent_starts_never_exceed_capacity() {
    let (scheduler, transfer, _emitter) = setup(3);

    let threads: Vec<_> = (0..8)
        .map(|n| {
            let scheduler = Arc::clone(&scheduler);
            std::thread::spawn(move || {
                for m in 0..10 {
                    scheduler.start_download(request(&format!("t{n}-{m}")), None);
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    assert_eq!(scheduler.active_count(), 3);
    assert_eq!(scheduler.pending_count(), 77);
    assert_eq!(transfer.opened_ids().len(), 3);
}

#[test]
fn long_queue_of_open_failures_drains_without_nesting() {
    const QUEUED: usize = 10_000;
    let (scheduler, transfer, emitter) = setup(1);
    scheduler.start_download(request("first"), None);
    for n in 0..QUEUED {
        let name = format!("q{n}");
        transfer.fail_open_for(&name);
        scheduler.start_download(request(&name), None);
    }
    assert_eq!(scheduler.pending_count(), QUEUED);

    transfer.succeed("first");

    assert!(scheduler.snapshot().is_idle());
    assert_eq!(scheduler.progress(&id("q9999")), None);
    let failed = emitter
        .events()
        .iter()
        .filter(|e| matches!(e, DownloadEvent::DownloadFailed { .. }))
        .count();
    assert_eq!(failed, QUEUED);
}

#[test]
fn long_queue_finishing_inside_open_completes_in_order() {
    const QUEUED: usize = 10_000;
    let (scheduler, transfer, emitter) = setup(1);
    scheduler.start_download(request("first"), None);
    for n in 0..QUEUED {
        let name = format!("q{n}");
        transfer.finish_in_open_for(&name);
        scheduler.start_download(request(&name), None);
    }

    transfer.succeed("first");

    assert!(scheduler.snapshot().is_idle());
    assert_eq!(transfer.opened_ids().len(), QUEUED + 1);
    assert_eq!(transfer.opened_ids()[1], "q0");
    assert_eq!(transfer.opened_ids()[QUEUED], "q9999");
    assert_eq!(scheduler.progress(&id("q9999")), Some(100));
    assert_eq!(
        emitter.events_for("q42").last(),
        Some(&DownloadEvent::completed("q42"))
    );
}

#[test]
fn mixed_start_cancel_finish_bursts_keep_capacity() {
    const CAPACITY: usize = 3;
    const IDS: usize = 24;
    let (scheduler, transfer, _emitter) = setup(3);
    let done = Arc::new(AtomicBool::new(false));

    let checker = {
        let scheduler = Arc::clone(&scheduler);
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                let snapshot = scheduler.snapshot();
                assert!(snapshot.active.len() <= CAPACITY);
                for active in &snapshot.active {
                    assert!(!snapshot.pending.contains(&active.id));
                }
            }
        })
    };

    let workers: Vec<_> = (0..8)
        .map(|n| {
            let scheduler = Arc::clone(&scheduler);
            let transfer = Arc::clone(&transfer);
            std::thread::spawn(move || {
                for m in 0..300 {
                    let name = format!("t{}", (n * 7 + m) % IDS);
                    match (n + m) % 3 {
                        0 => scheduler.start_download(request(&name), None),
                        1 => scheduler.cancel_download(&id(&name)),
                        _ => {
                            transfer.try_succeed(&name);
                        }
                    }
                    assert!(scheduler.active_count() <= CAPACITY);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    checker.join().unwrap();

    assert!(scheduler.active_count() <= CAPACITY);
    for n in 0..IDS {
        let name = id(&format!("t{n}"));
        assert!(!(scheduler.is_active(&name) && scheduler.is_queued(&name)));
    }
    if scheduler.active_count() < CAPACITY {
        assert_eq!(scheduler.pending_count(), 0);
    }

    scheduler.clear_downloads();
    assert!(scheduler.snapshot().is_idle());
}

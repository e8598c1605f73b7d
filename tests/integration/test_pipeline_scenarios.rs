//! End-to-end pipeline runs through the library API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rstest::rstest;
use turnstile_lib::TurnstileError;
use turnstile_lib::pipeline::{Item, Pipeline, PipelineConfig, PipelineEvents, StageSpec};

use crate::helpers::Occupancy;

const WORK: Duration = Duration::from_micros(20);

#[derive(Default)]
struct Announcements {
    finished: Mutex<Vec<(usize, usize)>>,
    announced: AtomicUsize,
    announced_total: AtomicUsize,
}

impl PipelineEvents for Announcements {
    fn on_finished(&self, item: &Item, completed: usize) {
        self.finished.lock().push((item.id(), completed));
    }

    fn on_all_finished(&self, total: usize) {
        self.announced.fetch_add(1, Ordering::SeqCst);
        self.announced_total.store(total, Ordering::SeqCst);
    }
}

#[test]
fn test_twelve_passengers_through_three_pools() {
    let tracker = Occupancy::new(12, 3);
    let events = Arc::new(Announcements::default());
    let stages = Occupancy::stages(&tracker, &[2, 3, 1], Duration::from_micros(200));

    let outcome = Pipeline::new(PipelineConfig::new(12).with_work(WORK), stages)
        .unwrap()
        .with_events(events.clone())
        .run()
        .unwrap();

    assert_eq!(outcome.items, 12);
    assert_eq!(outcome.completed, 12);
    assert!(outcome.announced);
    assert_eq!(events.announced.load(Ordering::SeqCst), 1);
    assert_eq!(events.announced_total.load(Ordering::SeqCst), 12);

    let reports: Vec<(&str, usize, u64)> =
        outcome.stages.iter().map(|s| (s.name.as_str(), s.workers, s.visits)).collect();
    assert_eq!(reports, vec![("stage-1", 2, 12), ("stage-2", 3, 12), ("stage-3", 1, 12)]);

    assert_eq!(tracker.violations(), 0, "an item was in two stages at once");
    tracker.assert_each_visited_once(12);
    assert!(tracker.peak(0) <= 2);
    assert!(tracker.peak(1) <= 3);
    assert_eq!(tracker.peak(2), 1);
}

#[rstest]
fn test_no_loss_no_duplication(
    #[values(1, 5, 100)] items: usize,
    #[values(vec![1], vec![2, 3, 1])] pools: Vec<usize>,
) {
    let tracker = Occupancy::new(items, pools.len());
    let events = Arc::new(Announcements::default());
    let stages = Occupancy::stages(&tracker, &pools, Duration::ZERO);

    let outcome = Pipeline::new(PipelineConfig::new(items).with_work(WORK), stages)
        .unwrap()
        .with_events(events.clone())
        .run()
        .unwrap();

    assert_eq!(outcome.completed, items);
    assert_eq!(outcome.total_visits(), (items * pools.len()) as u64);
    assert_eq!(tracker.violations(), 0);
    tracker.assert_each_visited_once(items);

    // Every item finished once and the completion counts are 1..=items.
    let finished = events.finished.lock();
    let mut ids: Vec<usize> = finished.iter().map(|&(id, _)| id).collect();
    let mut counts: Vec<usize> = finished.iter().map(|&(_, count)| count).collect();
    ids.sort_unstable();
    counts.sort_unstable();
    let expected: Vec<usize> = (1..=items).collect();
    assert_eq!(ids, expected);
    assert_eq!(counts, expected);
}

#[test]
fn test_announcement_fires_exactly_once_per_run() {
    let events = Arc::new(Announcements::default());
    let pipeline = Pipeline::new(
        PipelineConfig::new(20).with_work(Duration::from_micros(1)),
        vec![StageSpec::new("a", 4), StageSpec::new("b", 4)],
    )
    .unwrap()
    .with_events(events.clone());

    for run in 1..=25 {
        let outcome = pipeline.run().unwrap();
        assert!(outcome.announced);
        assert_eq!(events.announced.load(Ordering::SeqCst), run);
    }
}

#[test]
fn test_single_item_single_stage_single_worker() {
    let events = Arc::new(Announcements::default());
    let outcome =
        Pipeline::new(PipelineConfig::new(1).with_work(WORK), vec![StageSpec::new("only", 1)])
            .unwrap()
            .with_events(events.clone())
            .run()
            .unwrap();

    assert_eq!(outcome.completed, 1);
    assert_eq!(outcome.stages[0].visits, 1);
    assert_eq!(*events.finished.lock(), vec![(1, 1)]);
    assert_eq!(events.announced.load(Ordering::SeqCst), 1);
}

#[test]
fn test_more_workers_than_items() {
    let outcome = Pipeline::new(
        PipelineConfig::new(2).with_work(WORK),
        vec![StageSpec::new("wide", 16), StageSpec::new("narrow", 1)],
    )
    .unwrap()
    .run()
    .unwrap();
    assert_eq!(outcome.completed, 2);
    assert_eq!(outcome.total_visits(), 4);
}

#[rstest]
#[case::zero_items(0, vec![2, 3, 1])]
#[case::no_stages(12, vec![])]
#[case::zero_workers(12, vec![2, 0, 1])]
fn test_invalid_configuration_starts_nothing(#[case] items: usize, #[case] pools: Vec<usize>) {
    let hook_calls = Arc::new(AtomicUsize::new(0));
    let stages = pools
        .iter()
        .map(|&workers| {
            let hook_calls = Arc::clone(&hook_calls);
            StageSpec::new("stage", workers).with_process(move |_: &Item| {
                hook_calls.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    match Pipeline::new(PipelineConfig::new(items), stages) {
        Err(TurnstileError::InvalidParameter { .. }) => {}
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("configuration should have been rejected"),
    }
    assert_eq!(hook_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_panicking_hook_reports_stage_and_item() {
    let stages = vec![
        StageSpec::new("baggage", 2),
        StageSpec::new("security", 3).with_process(|item: &Item| {
            assert!(item.id() != 7, "prohibited item in bag");
        }),
        StageSpec::new("boarding", 1),
    ];
    let err = Pipeline::new(PipelineConfig::new(12).with_work(WORK), stages)
        .unwrap()
        .run()
        .unwrap_err();

    assert!(!err.is_configuration());
    let message = err.to_string();
    assert!(message.contains("security"), "{message}");
    assert!(message.contains("#7"), "{message}");
    assert!(message.contains("prohibited item in bag"), "{message}");
}

#[test]
fn test_watchdog_does_not_disturb_a_healthy_run() {
    let config = PipelineConfig::new(30)
        .with_work(Duration::from_micros(50))
        .with_stall_timeout(Some(Duration::from_millis(1)));
    let outcome =
        Pipeline::new(config, vec![StageSpec::new("a", 1), StageSpec::new("b", 2)]).unwrap().run();
    assert_eq!(outcome.unwrap().completed, 30);
}

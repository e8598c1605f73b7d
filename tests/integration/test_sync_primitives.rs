//! Multi-threaded behavior of the blocking primitives.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use turnstile_lib::sync::{BlockingBuffer, BoundedQueue, CountingSemaphore, CyclicBarrier, OnceFlag};

#[test]
fn test_parked_waiter_is_released_only_by_post() {
    let semaphore = Arc::new(CountingSemaphore::new(0));
    let passed = Arc::new(AtomicBool::new(false));

    let waiter = {
        let (semaphore, passed) = (Arc::clone(&semaphore), Arc::clone(&passed));
        thread::spawn(move || {
            semaphore.wait();
            passed.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!passed.load(Ordering::SeqCst), "waiter proceeded without a permit");
    semaphore.post();
    waiter.join().unwrap();
    assert!(passed.load(Ordering::SeqCst));
    assert_eq!(semaphore.available(), 0);
}

#[test]
fn test_barrier_releases_whole_party_each_generation() {
    const PARTY: usize = 8;
    const ROUNDS: usize = 5;
    let barrier = Arc::new(CyclicBarrier::new(PARTY));
    let arrived = Arc::new(AtomicUsize::new(0));
    let leaders = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..PARTY)
        .map(|_| {
            let (barrier, arrived, leaders) =
                (Arc::clone(&barrier), Arc::clone(&arrived), Arc::clone(&leaders));
            thread::spawn(move || {
                for round in 0..ROUNDS {
                    arrived.fetch_add(1, Ordering::SeqCst);
                    let result = barrier.wait();
                    // Nobody leaves a generation before the whole party arrived.
                    assert!(arrived.load(Ordering::SeqCst) >= PARTY * (round + 1));
                    assert_eq!(result.generation(), round as u64);
                    if result.is_leader() {
                        leaders.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(barrier.generation(), ROUNDS as u64);
    assert_eq!(leaders.load(Ordering::SeqCst), ROUNDS);
    assert_eq!(barrier.waiting(), 0);
}

#[test]
fn test_once_flag_has_a_single_winner_under_contention() {
    let flag = Arc::new(OnceFlag::new());
    let winners = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(CyclicBarrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let (flag, winners, barrier) =
                (Arc::clone(&flag), Arc::clone(&winners), Arc::clone(&barrier));
            thread::spawn(move || {
                barrier.wait();
                if flag.try_fire() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert!(flag.has_fired());
}

#[test]
fn test_each_pushed_element_reaches_exactly_one_popper() {
    const PER_PRODUCER: usize = 250;
    let queue = Arc::new(BoundedQueue::new(4 * PER_PRODUCER));

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.push(p * PER_PRODUCER + i);
                }
            })
        })
        .collect();
    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || (0..PER_PRODUCER).map(|_| queue.pop()).collect::<Vec<_>>())
        })
        .collect();

    for handle in producers {
        handle.join().unwrap();
    }
    let mut seen: Vec<usize> = consumers.into_iter().flat_map(|h| h.join().unwrap()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..4 * PER_PRODUCER).collect::<Vec<_>>());
    assert!(queue.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_blocking_buffer_preserves_order(
        items in proptest::collection::vec(any::<u16>(), 1..200),
        capacity in 1usize..8,
    ) {
        let buffer = Arc::new(BlockingBuffer::new(capacity));
        let producer = {
            let (buffer, items) = (Arc::clone(&buffer), items.clone());
            thread::spawn(move || {
                items.into_iter().map(|item| buffer.push(item)).max().unwrap_or(0)
            })
        };
        let received: Vec<u16> = (0..items.len()).map(|_| buffer.pop()).collect();
        let peak = producer.join().unwrap();

        prop_assert_eq!(received, items);
        prop_assert!(peak <= capacity);
        prop_assert!(buffer.is_empty());
    }
}

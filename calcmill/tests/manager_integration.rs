//! Integration tests for the computation buffer under real concurrency.
//!
//! These tests verify the blocking behaviour that unit tests cannot reach
//! single-threaded: backpressure on full queues, consumers parked on
//! unfinished results, cancellation waking blocked consumers, and stop
//! releasing every waiting thread.
//!
//! Blocking is observed through `mpsc` channels with `recv_timeout`: a
//! short timeout that elapses shows the operation is still parked, a long
//! one that succeeds shows it was released.

use calcmill::computation::{Computation, ComputationResult, ComputationType, RequestId};
use calcmill::manager::{ComputationManager, Stopped};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Long enough for a released thread to run on a loaded CI machine.
const RELEASE_TIMEOUT: Duration = Duration::from_secs(5);
/// Long enough that a parked thread would have run if it were runnable.
const PARKED_TIMEOUT: Duration = Duration::from_millis(200);

fn payload(kind: ComputationType, values: Vec<f64>) -> Computation {
    Computation::new(kind, values)
}

#[test]
fn test_single_submission_single_engine_round_trip() {
    let manager = Arc::new(ComputationManager::default());

    let engine = {
        let manager = manager.clone();
        thread::spawn(move || {
            let request = manager.fetch_work(ComputationType::A).unwrap();
            manager.provide_result(ComputationResult::new(request.id(), 3.14));
        })
    };

    let id = manager
        .request_computation(payload(ComputationType::A, vec![1.0]))
        .unwrap();
    assert_eq!(id.as_u64(), 0);

    let result = manager.next_result().unwrap();
    assert_eq!(result.id(), id);
    assert_eq!(result.value(), 3.14);

    engine.join().unwrap();
}

#[test]
fn test_interleaved_types_preserve_global_result_order() {
    let manager = Arc::new(ComputationManager::default());

    let ids = [
        manager
            .request_computation(payload(ComputationType::A, vec![1.0]))
            .unwrap(),
        manager
            .request_computation(payload(ComputationType::B, vec![2.0]))
            .unwrap(),
        manager
            .request_computation(payload(ComputationType::A, vec![3.0]))
            .unwrap(),
    ];

    let first_a = manager.fetch_work(ComputationType::A).unwrap();
    let only_b = manager.fetch_work(ComputationType::B).unwrap();
    let second_a = manager.fetch_work(ComputationType::A).unwrap();

    // Engines finish newest first.
    manager.provide_result(ComputationResult::new(second_a.id(), 0.2));
    manager.provide_result(ComputationResult::new(only_b.id(), 0.1));
    manager.provide_result(ComputationResult::new(first_a.id(), 0.0));

    // Delivery still follows submission order.
    for expected in ids {
        assert_eq!(manager.next_result().unwrap().id(), expected);
    }
}

#[test]
fn test_full_queue_applies_backpressure_until_work_is_fetched() {
    let manager = Arc::new(ComputationManager::new(2));

    manager
        .request_computation(payload(ComputationType::A, vec![1.0]))
        .unwrap();
    manager
        .request_computation(payload(ComputationType::A, vec![2.0]))
        .unwrap();

    let (submitted_sender, submitted_receiver) = mpsc::channel();
    let blocked_client = {
        let manager = manager.clone();
        thread::spawn(move || {
            let outcome = manager.request_computation(payload(ComputationType::A, vec![3.0]));
            let _ = submitted_sender.send(outcome);
        })
    };

    // The queue is at capacity: the third submission stays parked.
    assert_eq!(
        submitted_receiver.recv_timeout(PARKED_TIMEOUT),
        Err(RecvTimeoutError::Timeout)
    );

    // An engine draining one request frees the slot.
    let request = manager.fetch_work(ComputationType::A).unwrap();
    assert_eq!(request.id().as_u64(), 0);

    let outcome = submitted_receiver
        .recv_timeout(RELEASE_TIMEOUT)
        .expect("submission should be released by the fetch");
    assert_eq!(outcome.map(RequestId::as_u64), Ok(2));

    blocked_client.join().unwrap();
}

#[test]
fn test_abort_in_flight_is_cooperative_and_discards_the_result() {
    let manager = Arc::new(ComputationManager::default());

    let id = manager
        .request_computation(payload(ComputationType::A, vec![1.0; 64]))
        .unwrap();
    let request = manager.fetch_work(ComputationType::A).unwrap();

    // The engine is mid-computation and keeps polling.
    assert!(manager.should_continue(id));
    manager.abort_computation(id);
    assert!(!manager.should_continue(id));

    // An engine that never polled finishes anyway; the result is dropped.
    manager.provide_result(ComputationResult::new(request.id(), 42.0));

    // With nothing else submitted, a consumer stays parked until stop.
    let (outcome_sender, outcome_receiver) = mpsc::channel();
    let consumer = {
        let manager = manager.clone();
        thread::spawn(move || {
            let _ = outcome_sender.send(manager.next_result());
        })
    };
    assert_eq!(
        outcome_receiver.recv_timeout(PARKED_TIMEOUT),
        Err(RecvTimeoutError::Timeout)
    );

    manager.stop();
    assert_eq!(
        outcome_receiver.recv_timeout(RELEASE_TIMEOUT),
        Ok(Err(Stopped))
    );
    consumer.join().unwrap();
}

#[test]
fn test_abort_of_blocking_head_releases_later_result() {
    let manager = Arc::new(ComputationManager::default());

    let head = manager
        .request_computation(payload(ComputationType::A, vec![1.0]))
        .unwrap();
    let next = manager
        .request_computation(payload(ComputationType::A, vec![2.0]))
        .unwrap();

    manager.fetch_work(ComputationType::A).unwrap();
    manager.fetch_work(ComputationType::A).unwrap();

    let (result_sender, result_receiver) = mpsc::channel();
    let consumer = {
        let manager = manager.clone();
        thread::spawn(move || {
            let _ = result_sender.send(manager.next_result());
        })
    };

    // The second submission finishes first; the consumer still waits on
    // the unfinished head.
    manager.provide_result(ComputationResult::new(next, 7.0));
    assert_eq!(
        result_receiver.recv_timeout(PARKED_TIMEOUT),
        Err(RecvTimeoutError::Timeout)
    );

    // Aborting the head unblocks delivery of the finished successor.
    manager.abort_computation(head);
    let result = result_receiver
        .recv_timeout(RELEASE_TIMEOUT)
        .expect("consumer should be released by the abort")
        .expect("buffer is not stopped");
    assert_eq!(result.id(), next);
    assert_eq!(result.value(), 7.0);

    consumer.join().unwrap();
}

#[test]
fn test_stop_releases_every_blocked_thread() {
    let manager = Arc::new(ComputationManager::new(1));

    // Fill the type-A queue so further submissions block.
    manager
        .request_computation(payload(ComputationType::A, vec![1.0]))
        .unwrap();

    let (outcome_sender, outcome_receiver) = mpsc::channel();

    let mut blocked = Vec::new();
    for _ in 0..2 {
        let manager = manager.clone();
        let outcome_sender = outcome_sender.clone();
        blocked.push(thread::spawn(move || {
            let outcome = manager
                .request_computation(payload(ComputationType::A, vec![2.0]))
                .map(|_| ());
            let _ = outcome_sender.send(outcome);
        }));
    }
    // And one engine parked on an empty queue of another type.
    {
        let manager = manager.clone();
        let outcome_sender = outcome_sender.clone();
        blocked.push(thread::spawn(move || {
            let outcome = manager.fetch_work(ComputationType::B).map(|_| ());
            let _ = outcome_sender.send(outcome);
        }));
    }

    // All three are parked.
    assert_eq!(
        outcome_receiver.recv_timeout(PARKED_TIMEOUT),
        Err(RecvTimeoutError::Timeout)
    );

    manager.stop();
    for _ in 0..3 {
        assert_eq!(
            outcome_receiver.recv_timeout(RELEASE_TIMEOUT),
            Ok(Err(Stopped))
        );
    }
    for handle in blocked {
        handle.join().unwrap();
    }

    // Stop is terminal for later calls too.
    assert_eq!(
        manager.request_computation(payload(ComputationType::C, vec![1.0])),
        Err(Stopped)
    );
}

#[test]
fn test_no_results_are_lost_or_reordered_under_concurrency() {
    let manager = Arc::new(ComputationManager::default());
    let clients = 3;
    let requests_per_client = 30;
    let total = clients * requests_per_client;

    // One engine per type, each echoing the first payload value.
    let engines: Vec<_> = ComputationType::ALL
        .into_iter()
        .map(|kind| {
            let manager = manager.clone();
            thread::spawn(move || loop {
                match manager.fetch_work(kind) {
                    Ok(request) => {
                        let value = request.data().first().copied().unwrap_or(0.0);
                        manager.provide_result(ComputationResult::new(request.id(), value));
                    }
                    Err(Stopped) => break,
                }
            })
        })
        .collect();

    let consumer = {
        let manager = manager.clone();
        thread::spawn(move || {
            let mut delivered = Vec::with_capacity(total);
            for _ in 0..total {
                delivered.push(manager.next_result().unwrap());
            }
            delivered
        })
    };

    let submitters: Vec<_> = (0..clients)
        .map(|client_index| {
            let manager = manager.clone();
            thread::spawn(move || {
                let mut ids = Vec::with_capacity(requests_per_client);
                for i in 0..requests_per_client {
                    let kind = ComputationType::ALL[(client_index + i) % ComputationType::COUNT];
                    let value = (client_index * requests_per_client + i) as f64;
                    ids.push(
                        manager
                            .request_computation(payload(kind, vec![value]))
                            .unwrap(),
                    );
                }
                ids
            })
        })
        .collect();

    let mut submitted: Vec<RequestId> = Vec::with_capacity(total);
    for submitter in submitters {
        let ids = submitter.join().unwrap();
        // Each client sees its own ids strictly increasing.
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        submitted.extend(ids);
    }

    let delivered = consumer.join().unwrap();
    manager.stop();
    for engine in engines {
        engine.join().unwrap();
    }

    // Globally: ids are a gap-free prefix of the naturals...
    submitted.sort();
    let expected: Vec<u64> = (0..total as u64).collect();
    assert_eq!(
        submitted.iter().map(|id| id.as_u64()).collect::<Vec<_>>(),
        expected
    );

    // ...and the single consumer saw every one of them, in ascending order.
    assert_eq!(delivered.len(), total);
    assert!(delivered.windows(2).all(|pair| pair[0].id() < pair[1].id()));
    assert_eq!(
        delivered.iter().map(|r| r.id().as_u64()).collect::<Vec<_>>(),
        expected
    );
}

#[test]
fn test_aborted_ids_never_reach_the_consumer() {
    let manager = Arc::new(ComputationManager::default());

    let keep_a = manager
        .request_computation(payload(ComputationType::A, vec![1.0]))
        .unwrap();
    let drop_b = manager
        .request_computation(payload(ComputationType::B, vec![2.0]))
        .unwrap();
    let keep_c = manager
        .request_computation(payload(ComputationType::C, vec![3.0]))
        .unwrap();

    // Abort while still queued: the id vanishes before any engine sees it.
    manager.abort_computation(drop_b);

    for kind in [ComputationType::A, ComputationType::C] {
        let request = manager.fetch_work(kind).unwrap();
        manager.provide_result(ComputationResult::new(request.id(), 0.0));
    }

    assert_eq!(manager.next_result().unwrap().id(), keep_a);
    assert_eq!(manager.next_result().unwrap().id(), keep_c);
    assert!(manager.is_idle());
}

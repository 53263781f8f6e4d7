//! End-to-end scenarios for the melody sequencer, driven the way a host
//! drives it: start, then a mix of polling ticks and stop notifications.

use chrono::{TimeZone, Utc};
use melody_core::host::{ActionSlot, Stance, StopReason};
use melody_sequencer::application::driver::MelodyDriver;
use melody_sequencer::domain::config::{END_LIMIT, MAX_ACTIONS, RETRYABLE_STOP_CODE, REWIND_LIMIT};
use melody_sequencer::domain::events::{EndReason, MelodyEventKind};
use melody_test_support::{ManualClock, ScriptedHost};

const RETRYABLE: StopReason = StopReason(RETRYABLE_STOP_CODE);
const CANCELLED: StopReason = StopReason(0);

fn driver(populated: &[u8]) -> MelodyDriver<ScriptedHost, ManualClock> {
    MelodyDriver::new(
        ScriptedHost::bard(populated),
        ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()),
    )
}

fn slots(indices: &[u8]) -> Vec<ActionSlot> {
    indices.iter().copied().map(ActionSlot).collect()
}

fn end_reason(driver: &mut MelodyDriver<ScriptedHost, ManualClock>) -> Option<EndReason> {
    driver
        .take_events()
        .into_iter()
        .find_map(|event| match event.kind {
            MelodyEventKind::RunEnded(ended) => Some(ended.reason),
            _ => None,
        })
}

#[test]
fn test_start_accepts_every_length_up_to_limit() {
    for len in 1..=MAX_ACTIONS {
        // Arrange
        let mut driver = driver(&[0, 1, 2, 3, 4]);
        let requested: Vec<u8> = (0..5).take(len).collect();

        // Act
        let accepted = driver.start(&slots(&requested));

        // Assert
        assert!(accepted, "length {len}");
        assert_eq!(driver.status().actions.len(), len);
    }
}

#[test]
fn test_six_actions_rejected_and_idle_state_unchanged() {
    let mut driver = driver(&[1]);

    let accepted = driver.start(&slots(&[1, 1, 1, 1, 1, 1]));

    assert!(!accepted);
    assert!(!driver.status().active);
    assert_eq!(
        driver.host().messages(),
        vec!["A melody can only consist of 5 songs"]
    );
}

#[test]
fn test_two_song_melody_rewinds_then_ends_on_cancel() {
    // Arrange
    let mut driver = driver(&[2, 4]);
    assert!(driver.start(&slots(&[2, 4])));

    // Act / Assert: first tick plays slot 2.
    driver.poll();
    assert_eq!(driver.host().performed(), &[ActionSlot(2)]);
    assert_eq!(driver.status().current_index, Some(0));

    // A retryable interruption replays slot 2.
    driver.on_stop_notified(RETRYABLE);
    driver.poll();
    assert_eq!(driver.host().performed(), &[ActionSlot(2), ActionSlot(2)]);

    // A deliberate cancellation ends everything.
    driver.on_stop_notified(CANCELLED);
    assert!(driver.status().actions.is_empty());
    assert_eq!(end_reason(&mut driver), Some(EndReason::Interrupted { code: 0 }));
    assert_eq!(
        driver.host().messages().last().copied(),
        Some("Your melody has ended.")
    );
}

#[test]
fn test_eighth_consecutive_failure_moves_on() {
    // Arrange
    let mut driver = driver(&[0, 1, 2]);
    assert!(driver.start(&slots(&[0, 1, 2])));
    driver.poll();

    // Act / Assert: failures 1..=7 keep retrying slot 0.
    for attempt in 1..REWIND_LIMIT {
        driver.on_stop_notified(RETRYABLE);
        driver.poll();
        assert_eq!(driver.status().current_index, Some(0), "attempt {attempt}");
        assert_eq!(driver.host().performed().last(), Some(&ActionSlot(0)));
    }

    // The eighth skips the rewind and the next tick advances.
    driver.on_stop_notified(RETRYABLE);
    assert_eq!(driver.status().retry_count, REWIND_LIMIT);
    driver.poll();
    assert_eq!(driver.status().current_index, Some(1));
    assert_eq!(driver.host().performed().last(), Some(&ActionSlot(1)));
}

#[test]
fn test_end_limit_terminates_on_next_tick() {
    // Arrange
    let mut driver = driver(&[0, 1]);
    assert!(driver.start(&slots(&[0, 1])));
    driver.poll();

    // Act
    for _ in 0..END_LIMIT {
        driver.on_stop_notified(RETRYABLE);
    }
    assert!(driver.status().active);
    driver.poll();

    // Assert
    assert!(driver.status().actions.is_empty());
    assert_eq!(end_reason(&mut driver), Some(EndReason::RetryLimit));
}

#[test]
fn test_healthy_cast_prevents_termination() {
    // Arrange
    let mut driver = driver(&[0]);
    assert!(driver.start(&slots(&[0])));
    driver.poll();
    for _ in 0..END_LIMIT - 1 {
        driver.on_stop_notified(RETRYABLE);
    }
    driver.poll();

    // Act: the replayed action casts cleanly for over a second.
    driver.host_mut().cast_window = Some(true);
    driver.poll();
    driver.clock().advance_ms(1_001);
    driver.poll();

    // Assert
    assert_eq!(driver.status().retry_count, 0);
    driver.on_stop_notified(RETRYABLE);
    driver.host_mut().cast_window = Some(false);
    driver.clock().advance_ms(150);
    driver.poll();
    assert!(driver.status().active);
}

#[test]
fn test_index_stays_in_range_under_mixed_traffic() {
    let mut driver = driver(&[0, 1, 2]);
    assert!(driver.start(&slots(&[0, 1, 2])));

    for step in 0..60_u32 {
        if step % 3 == 0 {
            driver.on_stop_notified(RETRYABLE);
        }
        if step % 7 == 0 {
            driver.host_mut().cast_window = Some(true);
            driver.poll();
            driver.clock().advance_ms(2_000);
            driver.poll();
            driver.host_mut().cast_window = Some(false);
            driver.clock().advance_ms(200);
        }
        driver.poll();

        let status = driver.status();
        assert!(status.active, "step {step}");
        let index = status.current_index.expect("a tick has advanced");
        assert!(index < status.actions.len(), "step {step}");
    }
}

#[test]
fn test_sitting_mid_run_ends_regardless_of_retries() {
    // Arrange
    let mut driver = driver(&[0, 1]);
    assert!(driver.start(&slots(&[0, 1])));
    driver.poll();
    driver.on_stop_notified(RETRYABLE);

    // Act
    driver.host_mut().entity_mut().stance = Stance::Sitting;
    driver.poll();

    // Assert
    assert!(!driver.status().active);
    assert_eq!(driver.status().retry_count, 0);
    assert_eq!(end_reason(&mut driver), Some(EndReason::Sitting));
}

#[test]
fn test_end_on_idle_driver_is_silent() {
    let mut driver = driver(&[0]);

    driver.end();
    driver.on_world_exit();

    assert!(driver.host().notifications().is_empty());
    assert!(driver.take_events().is_empty());
}

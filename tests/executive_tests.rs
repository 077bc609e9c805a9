//! Executive Tests
//!
//! End-to-end behavior of the foreground loop: queue draining, pulse
//! retagging, bus wiring and the display notification stream.

use heapless::spsc::Queue;
use ssb_firmware::config::{
    default_band_table, BandTable, CalibrationData, ENCODER_QUEUE_DEPTH, SWITCH_QUEUE_DEPTH,
};
use ssb_firmware::drivers::encoder::Pulse;
use ssb_firmware::drivers::synth::recording::RecordingSynth;
use ssb_firmware::event::{Event, EventKind};
use ssb_firmware::executive::Executive;
use ssb_firmware::radio::vfo::VfoController;
use ssb_firmware::types::{Mode, TxState};
use ssb_firmware::ui::MenuController;

type TestExecutive<'q> = Executive<'q, RecordingSynth>;

fn band_table() -> BandTable {
    default_band_table()
}

fn new_executive<'q>(
    pulse_queue: &'q mut Queue<Pulse, ENCODER_QUEUE_DEPTH>,
    switch_queue: &'q mut Queue<Event, SWITCH_QUEUE_DEPTH>,
) -> (
    TestExecutive<'q>,
    heapless::spsc::Producer<'q, Pulse, ENCODER_QUEUE_DEPTH>,
    heapless::spsc::Producer<'q, Event, SWITCH_QUEUE_DEPTH>,
) {
    let (pulse_tx, pulse_rx) = pulse_queue.split();
    let (switch_tx, switch_rx) = switch_queue.split();
    let vfo = VfoController::new(RecordingSynth::new(), band_table(), CalibrationData::default());
    let executive = Executive::new(vfo, MenuController::new(), pulse_rx, switch_rx).unwrap();
    (executive, pulse_tx, switch_tx)
}

fn notes(executive: &mut TestExecutive<'_>) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Some(event) = executive.next_notification() {
        kinds.push(event.kind);
    }
    kinds
}

/// Drive the executive through a long knob press arriving on the switch
/// event queue
fn long_press(
    executive: &mut TestExecutive<'_>,
    switch_tx: &mut heapless::spsc::Producer<'_, Event, SWITCH_QUEUE_DEPTH>,
) {
    switch_tx
        .enqueue(Event::new(EventKind::KnobPressed))
        .unwrap();
    switch_tx
        .enqueue(Event::new(EventKind::KnobReleasedLong))
        .unwrap();
    executive.poll().unwrap();
}

fn short_press(
    executive: &mut TestExecutive<'_>,
    switch_tx: &mut heapless::spsc::Producer<'_, Event, SWITCH_QUEUE_DEPTH>,
) {
    switch_tx
        .enqueue(Event::new(EventKind::KnobPressed))
        .unwrap();
    switch_tx
        .enqueue(Event::new(EventKind::KnobReleased))
        .unwrap();
    executive.poll().unwrap();
}

// ============================================================================
// Startup
// ============================================================================

#[test]
fn startup_publishes_initial_display_state() {
    let mut pulse_queue = Queue::new();
    let mut switch_queue = Queue::new();
    let (mut executive, _pulse_tx, _switch_tx) =
        new_executive(&mut pulse_queue, &mut switch_queue);

    assert_eq!(
        notes(&mut executive),
        vec![
            EventKind::FreqUpdate { hz: 7_200_000 },
            EventKind::TxStateUpdate(TxState::Rx),
            EventKind::ModeUpdate(Mode::Lsb),
            EventKind::TuningIncrementUpdate { hz: 1000 },
        ]
    );
}

// ============================================================================
// Queue draining
// ============================================================================

#[test]
fn encoder_pulses_tune_in_fifo_order() {
    let mut pulse_queue = Queue::new();
    let mut switch_queue = Queue::new();
    let (mut executive, mut pulse_tx, _switch_tx) =
        new_executive(&mut pulse_queue, &mut switch_queue);
    let _ = notes(&mut executive);

    pulse_tx.enqueue(Pulse::Cw).unwrap();
    pulse_tx.enqueue(Pulse::Cw).unwrap();
    pulse_tx.enqueue(Pulse::Ccw).unwrap();
    executive.poll().unwrap();

    assert_eq!(
        notes(&mut executive),
        vec![
            EventKind::FreqUpdate { hz: 7_201_000 },
            EventKind::FreqUpdate { hz: 7_202_000 },
            EventKind::FreqUpdate { hz: 7_201_000 },
        ]
    );
    assert_eq!(executive.context().vfo.tuned_freq_hz(), 7_201_000);
}

#[test]
fn switch_events_reach_the_vfo() {
    let mut pulse_queue = Queue::new();
    let mut switch_queue = Queue::new();
    let (mut executive, _pulse_tx, mut switch_tx) =
        new_executive(&mut pulse_queue, &mut switch_queue);
    let _ = notes(&mut executive);

    switch_tx.enqueue(Event::new(EventKind::PttPressed)).unwrap();
    executive.poll().unwrap();

    assert_eq!(executive.context().vfo.tx_state(), TxState::Tx);
    assert!(notes(&mut executive).contains(&EventKind::TxStateUpdate(TxState::Tx)));
}

#[test]
fn empty_queues_poll_cleanly() {
    let mut pulse_queue = Queue::new();
    let mut switch_queue = Queue::new();
    let (mut executive, _pulse_tx, _switch_tx) =
        new_executive(&mut pulse_queue, &mut switch_queue);
    let _ = notes(&mut executive);

    executive.poll().unwrap();
    assert!(notes(&mut executive).is_empty());
}

// ============================================================================
// Pulse retagging
// ============================================================================

#[test]
fn pulses_retag_while_menu_is_active() {
    let mut pulse_queue = Queue::new();
    let mut switch_queue = Queue::new();
    let (mut executive, mut pulse_tx, mut switch_tx) =
        new_executive(&mut pulse_queue, &mut switch_queue);
    let _ = notes(&mut executive);

    long_press(&mut executive, &mut switch_tx);
    assert!(executive.context().menu.active());
    let _ = notes(&mut executive);

    // A clockwise detent now navigates instead of tuning
    pulse_tx.enqueue(Pulse::Cw).unwrap();
    executive.poll().unwrap();

    assert_eq!(
        notes(&mut executive),
        vec![EventKind::MenuRender { group: 0, entry: 1 }]
    );
    assert_eq!(executive.context().vfo.tuned_freq_hz(), 7_200_000);
}

#[test]
fn pulses_tune_again_after_menu_exit() {
    let mut pulse_queue = Queue::new();
    let mut switch_queue = Queue::new();
    let (mut executive, mut pulse_tx, mut switch_tx) =
        new_executive(&mut pulse_queue, &mut switch_queue);
    let _ = notes(&mut executive);

    long_press(&mut executive, &mut switch_tx);
    long_press(&mut executive, &mut switch_tx);
    assert!(!executive.context().menu.active());
    let _ = notes(&mut executive);

    pulse_tx.enqueue(Pulse::Ccw).unwrap();
    executive.poll().unwrap();
    assert_eq!(executive.context().vfo.tuned_freq_hz(), 7_199_000);
}

// ============================================================================
// Menu-driven configuration, end to end
// ============================================================================

#[test]
fn menu_changes_mode_without_touching_increment() {
    let mut pulse_queue = Queue::new();
    let mut switch_queue = Queue::new();
    let (mut executive, mut pulse_tx, mut switch_tx) =
        new_executive(&mut pulse_queue, &mut switch_queue);
    let _ = notes(&mut executive);

    long_press(&mut executive, &mut switch_tx);
    // Select the emission submenu, move to USB, select it
    short_press(&mut executive, &mut switch_tx);
    pulse_tx.enqueue(Pulse::Cw).unwrap();
    executive.poll().unwrap();
    let _ = notes(&mut executive);
    short_press(&mut executive, &mut switch_tx);

    assert_eq!(executive.context().vfo.mode(), Mode::Usb);
    // The short presses navigated the menu; the tuning increment is
    // untouched
    assert_eq!(executive.context().vfo.tuning_increment_hz(), 1000);

    let kinds = notes(&mut executive);
    assert!(kinds.contains(&EventKind::ModeUpdate(Mode::Usb)));
    assert!(kinds.contains(&EventKind::MenuRender { group: 0, entry: 0 }));
}

#[test]
fn short_press_cycles_increment_outside_menu() {
    let mut pulse_queue = Queue::new();
    let mut switch_queue = Queue::new();
    let (mut executive, _pulse_tx, mut switch_tx) =
        new_executive(&mut pulse_queue, &mut switch_queue);
    let _ = notes(&mut executive);

    short_press(&mut executive, &mut switch_tx);
    assert_eq!(executive.context().vfo.tuning_increment_hz(), 10_000);
    assert!(
        notes(&mut executive).contains(&EventKind::TuningIncrementUpdate { hz: 10_000 })
    );
}

// ============================================================================
// Fatal path
// ============================================================================

#[test]
fn announce_fatal_queues_the_banner() {
    let mut pulse_queue = Queue::new();
    let mut switch_queue = Queue::new();
    let (mut executive, _pulse_tx, _switch_tx) =
        new_executive(&mut pulse_queue, &mut switch_queue);
    let _ = notes(&mut executive);

    executive.announce_fatal();
    assert_eq!(notes(&mut executive), vec![EventKind::FatalError]);
}

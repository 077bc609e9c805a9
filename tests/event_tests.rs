//! Event Bus Tests
//!
//! Subscription filtering, dispatch order, re-entrant publication and
//! fail-fast propagation.

use ssb_firmware::config::MAX_SUBSCRIBERS;
use ssb_firmware::event::{BusError, Event, EventBus, EventKind, EventMask, Outbox};
use ssb_firmware::Error;

/// Test context: a log of which subscriber saw which event, in order
#[derive(Default)]
struct Probe {
    log: Vec<(&'static str, EventKind)>,
}

fn encoder_listener(ctx: &mut Probe, event: &Event, _out: &mut Outbox) -> Result<(), Error> {
    ctx.log.push(("encoder", event.kind));
    Ok(())
}

fn switches_listener(ctx: &mut Probe, event: &Event, _out: &mut Outbox) -> Result<(), Error> {
    ctx.log.push(("switches", event.kind));
    Ok(())
}

fn wide_listener(ctx: &mut Probe, event: &Event, _out: &mut Outbox) -> Result<(), Error> {
    ctx.log.push(("wide", event.kind));
    Ok(())
}

fn chaining_listener(ctx: &mut Probe, event: &Event, out: &mut Outbox) -> Result<(), Error> {
    ctx.log.push(("chain", event.kind));
    if event.kind == EventKind::KnobCw {
        out.emit(EventKind::FreqUpdate { hz: 7_201_000 })?;
    }
    Ok(())
}

fn failing_listener(_ctx: &mut Probe, _event: &Event, _out: &mut Outbox) -> Result<(), Error> {
    Err(Error::Bus(BusError::OutboxFull))
}

// ============================================================================
// Subscription / filtering
// ============================================================================

#[test]
fn subscriber_count_grows() {
    let mut bus: EventBus<Probe> = EventBus::new();
    assert_eq!(bus.subscriber_count(), 0);

    bus.subscribe(encoder_listener, EventMask::ENCODER).unwrap();
    bus.subscribe(switches_listener, EventMask::SWITCHES)
        .unwrap();
    assert_eq!(bus.subscriber_count(), 2);
}

#[test]
fn subscriber_table_capacity() {
    let mut bus: EventBus<Probe> = EventBus::new();
    for _ in 0..MAX_SUBSCRIBERS {
        bus.subscribe(wide_listener, EventMask::ALL).unwrap();
    }
    assert_eq!(
        bus.subscribe(wide_listener, EventMask::ALL),
        Err(BusError::SubscribersFull)
    );
}

#[test]
fn overlapping_masks_fire_in_subscription_order() {
    let mut bus: EventBus<Probe> = EventBus::new();
    bus.subscribe(encoder_listener, EventMask::ENCODER).unwrap();
    bus.subscribe(wide_listener, EventMask::ENCODER | EventMask::SWITCHES)
        .unwrap();
    // Disjoint mask: must never fire
    bus.subscribe(switches_listener, EventMask::SWITCHES)
        .unwrap();

    let mut probe = Probe::default();
    bus.publish(&mut probe, &Event::new(EventKind::KnobCw))
        .unwrap();

    assert_eq!(
        probe.log,
        vec![("encoder", EventKind::KnobCw), ("wide", EventKind::KnobCw)]
    );
}

#[test]
fn none_mask_never_fires() {
    let mut bus: EventBus<Probe> = EventBus::new();
    bus.subscribe(wide_listener, EventMask::NONE).unwrap();

    let mut probe = Probe::default();
    bus.publish(&mut probe, &Event::new(EventKind::PttPressed))
        .unwrap();
    assert!(probe.log.is_empty());
}

#[test]
fn all_mask_sees_every_group() {
    let mut bus: EventBus<Probe> = EventBus::new();
    bus.subscribe(wide_listener, EventMask::ALL).unwrap();

    let mut probe = Probe::default();
    for kind in [
        EventKind::KnobCw,
        EventKind::PttPressed,
        EventKind::AgcEnable,
        EventKind::MenuEnter,
    ] {
        bus.publish(&mut probe, &Event::new(kind)).unwrap();
    }
    assert_eq!(probe.log.len(), 4);
}

// ============================================================================
// Re-entrant publication
// ============================================================================

#[test]
fn follow_up_events_recurse_before_later_subscribers() {
    let mut bus: EventBus<Probe> = EventBus::new();
    bus.subscribe(chaining_listener, EventMask::ENCODER).unwrap();
    bus.subscribe(wide_listener, EventMask::ENCODER | EventMask::DISPLAY)
        .unwrap();

    let mut probe = Probe::default();
    bus.publish(&mut probe, &Event::new(EventKind::KnobCw))
        .unwrap();

    // The chained FreqUpdate is dispatched on the same call stack, before
    // the wide subscriber receives the original KnobCw
    assert_eq!(
        probe.log,
        vec![
            ("chain", EventKind::KnobCw),
            ("wide", EventKind::FreqUpdate { hz: 7_201_000 }),
            ("wide", EventKind::KnobCw),
        ]
    );
}

// ============================================================================
// Fail-fast
// ============================================================================

#[test]
fn handler_failure_propagates_to_publisher() {
    let mut bus: EventBus<Probe> = EventBus::new();
    bus.subscribe(failing_listener, EventMask::SWITCHES).unwrap();
    bus.subscribe(switches_listener, EventMask::SWITCHES)
        .unwrap();

    let mut probe = Probe::default();
    let result = bus.publish(&mut probe, &Event::new(EventKind::PttPressed));

    assert_eq!(result, Err(Error::Bus(BusError::OutboxFull)));
    // Dispatch aborted: the later subscriber never ran
    assert!(probe.log.is_empty());
}

// ============================================================================
// Outbox
// ============================================================================

#[test]
fn outbox_overflow_reports() {
    let mut out = Outbox::new();
    for _ in 0..4 {
        out.emit(EventKind::MenuEnter).unwrap();
    }
    assert_eq!(out.emit(EventKind::MenuExit), Err(BusError::OutboxFull));
    assert_eq!(out.events().len(), 4);
}

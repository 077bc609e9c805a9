//! Event bus
//!
//! In-process, single-threaded publish/subscribe dispatch with
//! bitmask-filtered subscriptions. Components never hold references to each
//! other; everything they exchange travels through here as copied event
//! data.
//!
//! Subscribers are plain function pointers over the application context, so
//! the table is `'static`-friendly and nothing captures mutable state. A
//! handler queues follow-up events into its [`Outbox`]; the bus publishes
//! them recursively on the same call stack right after the handler returns,
//! which keeps dispatch synchronous and re-entrant. Cycles are the caller's
//! problem; there is no loop detection.

use crate::config::MAX_SUBSCRIBERS;
use crate::types::{Mode, TxState};
use crate::Error;

/// Event category, one bit per group in an [`EventMask`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventGroup {
    /// Rotary encoder pulses
    Encoder,
    /// Front-panel switch activity and sequencer notifications
    Switches,
    /// VFO configuration commands (mode, AGC)
    Vfo,
    /// Display-bound notifications
    Display,
}

impl EventGroup {
    /// Mask bit for this group
    #[must_use]
    pub const fn bit(self) -> u32 {
        match self {
            Self::Encoder => 1 << 0,
            Self::Switches => 1 << 1,
            Self::Vfo => 1 << 2,
            Self::Display => 1 << 3,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for EventGroup {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Encoder => defmt::write!(f, "ENCODER"),
            Self::Switches => defmt::write!(f, "SWITCHES"),
            Self::Vfo => defmt::write!(f, "VFO"),
            Self::Display => defmt::write!(f, "DISPLAY"),
        }
    }
}

/// Subscription filter over event groups
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventMask(u32);

impl EventMask {
    /// Matches nothing
    pub const NONE: Self = Self(0);
    /// Encoder pulses
    pub const ENCODER: Self = Self(EventGroup::Encoder.bit());
    /// Switch activity
    pub const SWITCHES: Self = Self(EventGroup::Switches.bit());
    /// VFO configuration commands
    pub const VFO: Self = Self(EventGroup::Vfo.bit());
    /// Display notifications
    pub const DISPLAY: Self = Self(EventGroup::Display.bit());
    /// Matches every group
    pub const ALL: Self = Self(u32::MAX);

    /// Check whether events of `group` pass this filter
    #[must_use]
    pub const fn accepts(self, group: EventGroup) -> bool {
        self.0 & group.bit() != 0
    }
}

impl core::ops::BitOr for EventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Event payload: the operation plus any data it carries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Encoder advanced one detent clockwise (tuning)
    KnobCw,
    /// Encoder advanced one detent counter-clockwise (tuning)
    KnobCcw,
    /// Encoder advanced one detent clockwise (menu navigation)
    KnobMenuCw,
    /// Encoder advanced one detent counter-clockwise (menu navigation)
    KnobMenuCcw,
    /// Knob push switch pressed
    KnobPressed,
    /// Knob push switch released before the long-press threshold
    KnobReleased,
    /// Knob push switch held past the long-press threshold and released
    KnobReleasedLong,
    /// Tune button pressed
    TunePressed,
    /// Tune button released
    TuneReleased,
    /// PTT pressed
    PttPressed,
    /// PTT released
    PttReleased,
    /// Transmit sequencer entered the timed-out state
    TxTimedOutEntry,
    /// Transmit sequencer left the timed-out state
    TxTimedOutExit,
    /// Select the given sideband (menu command)
    ModeSelect(Mode),
    /// Enable the receiver AGC (menu command)
    AgcEnable,
    /// Disable the receiver AGC (menu command)
    AgcDisable,
    /// Tuned frequency changed
    FreqUpdate {
        /// New tuned frequency in Hz
        hz: u32,
    },
    /// Operating mode changed
    ModeUpdate(Mode),
    /// Transmit state changed
    TxStateUpdate(TxState),
    /// Tuning increment changed
    TuningIncrementUpdate {
        /// New increment in Hz
        hz: u32,
    },
    /// AGC disable flag changed
    AgcUpdate {
        /// AGC is now disabled
        disabled: bool,
    },
    /// Menu system took ownership of the knob
    MenuEnter,
    /// Menu system released the knob
    MenuExit,
    /// Menu cursor moved; display should redraw the entry
    MenuRender {
        /// Menu group id of the current node
        group: u8,
        /// Selected entry index within the group
        entry: u8,
    },
    /// Unrecoverable fault; the display should show the fatal banner
    FatalError,
}

impl EventKind {
    /// Category of this event
    #[must_use]
    pub const fn group(self) -> EventGroup {
        match self {
            Self::KnobCw | Self::KnobCcw | Self::KnobMenuCw | Self::KnobMenuCcw => {
                EventGroup::Encoder
            }
            Self::KnobPressed
            | Self::KnobReleased
            | Self::KnobReleasedLong
            | Self::TunePressed
            | Self::TuneReleased
            | Self::PttPressed
            | Self::PttReleased
            | Self::TxTimedOutEntry
            | Self::TxTimedOutExit => EventGroup::Switches,
            Self::ModeSelect(_) | Self::AgcEnable | Self::AgcDisable => EventGroup::Vfo,
            Self::FreqUpdate { .. }
            | Self::ModeUpdate(_)
            | Self::TxStateUpdate(_)
            | Self::TuningIncrementUpdate { .. }
            | Self::AgcUpdate { .. }
            | Self::MenuEnter
            | Self::MenuExit
            | Self::MenuRender { .. }
            | Self::FatalError => EventGroup::Display,
        }
    }
}

/// One published event
///
/// Transient: no identity beyond a single `publish` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    /// Operation and payload
    pub kind: EventKind,
}

impl Event {
    /// Wrap an event kind for publication
    #[must_use]
    pub const fn new(kind: EventKind) -> Self {
        Self { kind }
    }

    /// Category of this event
    #[must_use]
    pub const fn group(self) -> EventGroup {
        self.kind.group()
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Event {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Event({})", defmt::Debug2Format(&self.kind));
    }
}

/// Error raised by the bus itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusError {
    /// Subscriber table is full
    SubscribersFull,
    /// A handler emitted more follow-up events than its outbox holds
    OutboxFull,
}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SubscribersFull => write!(f, "subscriber table full"),
            Self::OutboxFull => write!(f, "handler outbox full"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BusError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::SubscribersFull => defmt::write!(f, "subscriber table full"),
            Self::OutboxFull => defmt::write!(f, "handler outbox full"),
        }
    }
}

/// Follow-up events a handler wants published
///
/// Drained by the bus immediately after the handler returns, before any
/// later subscriber sees the triggering event's successors.
#[derive(Debug, Default)]
pub struct Outbox {
    events: heapless::Vec<Event, 4>,
}

impl Outbox {
    /// Create an empty outbox
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: heapless::Vec::new(),
        }
    }

    /// Queue a follow-up event
    ///
    /// # Errors
    ///
    /// [`BusError::OutboxFull`] when the handler emits more events than one
    /// dispatch can carry.
    pub fn emit(&mut self, kind: EventKind) -> Result<(), BusError> {
        self.events
            .push(Event::new(kind))
            .map_err(|_| BusError::OutboxFull)
    }

    /// Queued events in emission order
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Subscriber callback over the application context `C`
///
/// A failure propagates to the publisher and aborts dispatch; the
/// foreground loop treats it as fatal.
pub type Handler<C> = fn(&mut C, &Event, &mut Outbox) -> Result<(), Error>;

struct Subscriber<C> {
    handler: Handler<C>,
    mask: EventMask,
}

/// Publish/subscribe dispatcher
///
/// The subscriber set is append-only and fixed after startup: no dedup, no
/// unsubscribe.
pub struct EventBus<C> {
    subscribers: heapless::Vec<Subscriber<C>, MAX_SUBSCRIBERS>,
}

impl<C> EventBus<C> {
    /// Create a bus with no subscribers
    #[must_use]
    pub const fn new() -> Self {
        Self {
            subscribers: heapless::Vec::new(),
        }
    }

    /// Register a listener for every group set in `mask`
    ///
    /// # Errors
    ///
    /// [`BusError::SubscribersFull`] when the table is out of slots.
    pub fn subscribe(&mut self, handler: Handler<C>, mask: EventMask) -> Result<(), BusError> {
        self.subscribers
            .push(Subscriber { handler, mask })
            .map_err(|_| BusError::SubscribersFull)
    }

    /// Number of registered subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Synchronously deliver `event` to every matching subscriber, in
    /// subscription order
    ///
    /// Follow-up events emitted by a handler recurse through `publish` on
    /// the same call stack before the next subscriber runs.
    ///
    /// # Errors
    ///
    /// The first handler failure, unchanged (fail-fast).
    pub fn publish(&self, ctx: &mut C, event: &Event) -> Result<(), Error> {
        for sub in &self.subscribers {
            if sub.mask.accepts(event.group()) {
                let mut outbox = Outbox::new();
                (sub.handler)(ctx, event, &mut outbox)?;
                for follow in outbox.events() {
                    self.publish(ctx, follow)?;
                }
            }
        }
        Ok(())
    }
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

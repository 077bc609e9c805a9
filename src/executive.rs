//! Foreground Executive
//!
//! The single foreground loop of the firmware. Owns the event bus, the
//! application context (VFO, menu, display notification buffer) and the
//! consumer halves of both interrupt queues. Each `poll` drains the
//! encoder pulse queue and the switch event queue in enqueue order and
//! republishes everything on the bus. All subscriber logic runs here,
//! never in interrupt context.
//!
//! There is no teardown: the executive is constructed once at startup and
//! lives for the life of the process.

use crate::config::{ENCODER_QUEUE_DEPTH, NOTIFY_QUEUE_DEPTH, SWITCH_QUEUE_DEPTH};
use crate::drivers::encoder::Pulse;
use crate::drivers::synth::SynthDriver;
use crate::event::{Event, EventBus, EventKind, EventMask, Outbox};
use crate::radio::vfo::VfoController;
use crate::ui::MenuController;
use crate::Error;
use heapless::spsc::Consumer;
use heapless::Deque;

/// Bounded buffer of display-bound notification events
///
/// Filled by the display subscriber during dispatch, drained by the
/// display collaborator. Overflow drops the newest notification and
/// counts it; the display catches up from live state on the next update.
#[derive(Default)]
pub struct Notifications {
    queue: Deque<Event, NOTIFY_QUEUE_DEPTH>,
    dropped: u32,
}

impl Notifications {
    /// Create an empty buffer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            dropped: 0,
        }
    }

    /// Append a notification; on overflow drop it and count
    pub fn push(&mut self, event: Event) {
        if self.queue.push_back(event).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }

    /// Take the oldest pending notification
    pub fn pop(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    /// Notifications dropped because the buffer was full
    #[must_use]
    pub const fn dropped_count(&self) -> u32 {
        self.dropped
    }
}

/// Application context: every component with process-lifetime state
///
/// Constructed once at startup and passed to each handler; replaces any
/// notion of module-level singletons.
pub struct AppContext<S: SynthDriver> {
    /// Tuning state and synthesizer control
    pub vfo: VfoController<S>,
    /// Menu navigation state
    pub menu: MenuController,
    /// Display-bound notifications
    pub notifications: Notifications,
}

/// VFO subscriber: encoder, switch and configuration events
fn vfo_handler<S: SynthDriver>(
    ctx: &mut AppContext<S>,
    event: &Event,
    out: &mut Outbox,
) -> Result<(), Error> {
    let menu_active = ctx.menu.active();
    ctx.vfo.handle(event, menu_active, out)
}

/// Menu subscriber: encoder and switch events
fn menu_handler<S: SynthDriver>(
    ctx: &mut AppContext<S>,
    event: &Event,
    out: &mut Outbox,
) -> Result<(), Error> {
    ctx.menu.handle(event, out)
}

/// Display subscriber: copies notifications into the outbound buffer
fn notify_handler<S: SynthDriver>(
    ctx: &mut AppContext<S>,
    event: &Event,
    _out: &mut Outbox,
) -> Result<(), Error> {
    ctx.notifications.push(*event);
    Ok(())
}

/// The foreground loop core
pub struct Executive<'q, S: SynthDriver> {
    bus: EventBus<AppContext<S>>,
    ctx: AppContext<S>,
    pulses: Consumer<'q, Pulse, ENCODER_QUEUE_DEPTH>,
    switch_events: Consumer<'q, Event, SWITCH_QUEUE_DEPTH>,
}

impl<'q, S: SynthDriver> Executive<'q, S> {
    /// Wire the bus, run VFO startup, and return the ready executive
    ///
    /// Subscription order fixes dispatch order: VFO, then menu, then the
    /// display forwarder.
    ///
    /// # Errors
    ///
    /// Synthesizer startup failures and bus misconfiguration; both abort
    /// boot.
    pub fn new(
        vfo: VfoController<S>,
        menu: MenuController,
        pulses: Consumer<'q, Pulse, ENCODER_QUEUE_DEPTH>,
        switch_events: Consumer<'q, Event, SWITCH_QUEUE_DEPTH>,
    ) -> Result<Self, Error> {
        let mut bus = EventBus::new();
        bus.subscribe(
            vfo_handler::<S>,
            EventMask::ENCODER | EventMask::SWITCHES | EventMask::VFO,
        )?;
        bus.subscribe(menu_handler::<S>, EventMask::ENCODER | EventMask::SWITCHES)?;
        bus.subscribe(notify_handler::<S>, EventMask::DISPLAY)?;

        let mut executive = Self {
            bus,
            ctx: AppContext {
                vfo,
                menu,
                notifications: Notifications::new(),
            },
            pulses,
            switch_events,
        };
        executive.start()?;
        Ok(executive)
    }

    /// One-time startup: initialize the VFO and publish its first
    /// notifications
    fn start(&mut self) -> Result<(), Error> {
        let mut out = Outbox::new();
        self.ctx.vfo.init(&mut out)?;
        for event in out.events() {
            self.bus.publish(&mut self.ctx, event)?;
        }
        Ok(())
    }

    /// One foreground iteration: drain both queues, publish FIFO per queue
    ///
    /// Encoder pulses are retagged as menu navigation while the menu owns
    /// the knob. Ordering between the two queues is not guaranteed.
    ///
    /// # Errors
    ///
    /// The first handler failure, unchanged. The caller must treat it as
    /// fatal.
    pub fn poll(&mut self) -> Result<(), Error> {
        while let Some(pulse) = self.pulses.dequeue() {
            let kind = match (pulse, self.ctx.menu.active()) {
                (Pulse::Cw, false) => EventKind::KnobCw,
                (Pulse::Ccw, false) => EventKind::KnobCcw,
                (Pulse::Cw, true) => EventKind::KnobMenuCw,
                (Pulse::Ccw, true) => EventKind::KnobMenuCcw,
            };
            self.bus.publish(&mut self.ctx, &Event::new(kind))?;
        }
        while let Some(event) = self.switch_events.dequeue() {
            self.bus.publish(&mut self.ctx, &event)?;
        }
        Ok(())
    }

    /// Queue the fatal-error banner for the display
    ///
    /// Called on the way down after `poll` fails, before the process logs
    /// and halts. Bypasses the bus: dispatch is no longer trustworthy.
    pub fn announce_fatal(&mut self) {
        self.ctx
            .notifications
            .push(Event::new(EventKind::FatalError));
    }

    /// Take the oldest pending display notification
    pub fn next_notification(&mut self) -> Option<Event> {
        self.ctx.notifications.pop()
    }

    /// Shared view of the application context
    #[must_use]
    pub const fn context(&self) -> &AppContext<S> {
        &self.ctx
    }
}

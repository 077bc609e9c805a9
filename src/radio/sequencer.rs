//! Switch Sampler and Transmit Sequencer
//!
//! Runs from 10 ms timer-interrupt context. Each tick samples the three
//! front-panel switch lines, turns per-line transitions into semantic
//! events, and steps the five-state sequencer that times the mute, PTT-out
//! and tune-out lines around every key transition.
//!
//! The 250 ms gap between muting and keying keeps relay clicks and key-up
//! thumps out of the audio path and rejects spurious key closures; the
//! 10 minute ceiling on a continuous key protects the power amplifier from
//! a stuck PTT line. The output levels are a pure function of the sequencer
//! state; nothing else writes them.
//!
//! Events go into a bounded queue that the foreground executive publishes
//! outside interrupt context, keeping dispatch off the time-critical path.

use crate::config::{KEY_DELAY_MS, KNOB_LONG_PRESS_MS, SWITCH_QUEUE_DEPTH, TX_TIMEOUT_MS};
use crate::event::{Event, EventKind};
use crate::types::{ControlOutputs, Millis, SwitchSample};
use heapless::spsc::Producer;

/// Transmit sequencer state
///
/// Deadlines are absolute instants armed at the transition into the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencerState {
    /// Receive path open, no key held
    Idle,
    /// Key seen; audio muted, waiting out the key delay
    KeyWait {
        /// When the transmitter keys if the line stays asserted
        deadline: Millis,
    },
    /// Transmitter keyed
    Keyed {
        /// When the transmit time-out trips
        deadline: Millis,
        /// TUNE (not PTT) was the asserted line, so tune-out is driven too
        via_tune: bool,
    },
    /// Key released; transmitter down, waiting out the unmute delay
    UnmuteWait {
        /// When the audio path unmutes
        deadline: Millis,
    },
    /// Transmit time-out tripped; everything released until the key clears
    TimedOut,
}

impl SequencerState {
    /// Control line levels for this state
    #[must_use]
    pub const fn outputs(&self) -> ControlOutputs {
        match self {
            Self::Idle | Self::TimedOut => ControlOutputs::RELEASED,
            Self::KeyWait { .. } | Self::UnmuteWait { .. } => ControlOutputs::MUTED,
            Self::Keyed { via_tune, .. } => ControlOutputs {
                mute: true,
                ptt_out: true,
                tune_out: *via_tune,
            },
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SequencerState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Idle => defmt::write!(f, "IDLE"),
            Self::KeyWait { .. } => defmt::write!(f, "KEY_WAIT"),
            Self::Keyed { via_tune, .. } => defmt::write!(f, "KEYED(tune={})", via_tune),
            Self::UnmuteWait { .. } => defmt::write!(f, "UNMUTE_WAIT"),
            Self::TimedOut => defmt::write!(f, "TIMED_OUT"),
        }
    }
}

/// Periodic switch sampler plus the transmit sequencer
///
/// Sole owner of the sequencer state and the previous switch sample.
pub struct SwitchSequencer<'q> {
    last: SwitchSample,
    knob_pressed_at: Option<Millis>,
    state: SequencerState,
    events: Producer<'q, Event, SWITCH_QUEUE_DEPTH>,
    dropped: u32,
}

impl<'q> SwitchSequencer<'q> {
    /// Create a sequencer pushing events into `events`
    #[must_use]
    pub fn new(events: Producer<'q, Event, SWITCH_QUEUE_DEPTH>) -> Self {
        Self {
            last: SwitchSample::default(),
            knob_pressed_at: None,
            state: SequencerState::Idle,
            events,
            dropped: 0,
        }
    }

    /// Current sequencer state
    #[must_use]
    pub const fn state(&self) -> SequencerState {
        self.state
    }

    /// Control line levels for the current state
    #[must_use]
    pub const fn outputs(&self) -> ControlOutputs {
        self.state.outputs()
    }

    /// Events dropped because the queue was full
    #[must_use]
    pub const fn dropped_count(&self) -> u32 {
        self.dropped
    }

    /// One 10 ms tick: detect edges, step the sequencer, remember the sample
    pub fn tick(&mut self, now: Millis, sample: SwitchSample) {
        self.detect_edges(now, sample);
        self.step(now, sample);
        self.last = sample;
    }

    /// Per-line transition detection against the previous sample
    ///
    /// The poll period is the only debounce; a level must survive to the
    /// next tick to register.
    fn detect_edges(&mut self, now: Millis, sample: SwitchSample) {
        if sample.tune != self.last.tune {
            self.emit(if sample.tune {
                EventKind::TunePressed
            } else {
                EventKind::TuneReleased
            });
        }
        if sample.ptt != self.last.ptt {
            self.emit(if sample.ptt {
                EventKind::PttPressed
            } else {
                EventKind::PttReleased
            });
        }
        if sample.knob != self.last.knob {
            if sample.knob {
                self.knob_pressed_at = Some(now);
                self.emit(EventKind::KnobPressed);
            } else {
                let held = self
                    .knob_pressed_at
                    .take()
                    .map_or(0, |pressed| now.since(pressed));
                self.emit(if held >= KNOB_LONG_PRESS_MS {
                    EventKind::KnobReleasedLong
                } else {
                    EventKind::KnobReleased
                });
            }
        }
    }

    /// Sequencer transition on live levels (not edges)
    fn step(&mut self, now: Millis, sample: SwitchSample) {
        match self.state {
            SequencerState::Idle => {
                if sample.any_key() {
                    // Mute asserts immediately via outputs()
                    self.state = SequencerState::KeyWait {
                        deadline: now.plus(KEY_DELAY_MS),
                    };
                }
            }
            SequencerState::KeyWait { deadline } => {
                if !sample.any_key() {
                    // Spurious key: released inside the delay window
                    self.state = SequencerState::Idle;
                } else if deadline.reached_by(now) {
                    self.state = SequencerState::Keyed {
                        deadline: now.plus(TX_TIMEOUT_MS),
                        via_tune: sample.tune,
                    };
                }
            }
            SequencerState::Keyed { deadline, .. } => {
                if !sample.any_key() {
                    self.state = SequencerState::UnmuteWait {
                        deadline: now.plus(KEY_DELAY_MS),
                    };
                } else if deadline.reached_by(now) {
                    self.emit(EventKind::TxTimedOutEntry);
                    self.state = SequencerState::TimedOut;
                }
            }
            SequencerState::UnmuteWait { deadline } => {
                if deadline.reached_by(now) {
                    self.state = SequencerState::Idle;
                }
            }
            SequencerState::TimedOut => {
                if !sample.any_key() {
                    self.emit(EventKind::TxTimedOutExit);
                    self.state = SequencerState::Idle;
                }
            }
        }
    }

    /// Queue an event; on overflow drop it and count
    fn emit(&mut self, kind: EventKind) {
        if self.events.enqueue(Event::new(kind)).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }
    }
}

//! Shared types used across the transceiver control core
//!
//! Domain types for the control firmware: operating mode, transmit state,
//! switch samples, sequencer output levels, and the wraparound-safe
//! millisecond instant used for all deadline arithmetic.

use core::fmt;

/// Sideband selection for SSB voice operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    /// Lower sideband
    #[default]
    Lsb,
    /// Upper sideband
    Usb,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Mode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Lsb => defmt::write!(f, "LSB"),
            Self::Usb => defmt::write!(f, "USB"),
        }
    }
}

/// Transmit/receive state of the radio
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TxState {
    /// Receiving
    #[default]
    Rx,
    /// Transmitting voice (PTT)
    Tx,
    /// Transmitting carrier for antenna tuning
    Tune,
    /// Transmit timed out; receiving until the key is released
    Timeout,
}

impl TxState {
    /// Check whether the state keys the transmit chain
    #[must_use]
    pub const fn is_transmitting(self) -> bool {
        matches!(self, Self::Tx | Self::Tune)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TxState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Rx => defmt::write!(f, "RX"),
            Self::Tx => defmt::write!(f, "TX"),
            Self::Tune => defmt::write!(f, "TUNE"),
            Self::Timeout => defmt::write!(f, "TIMEOUT"),
        }
    }
}

/// Millisecond instant from a free-running monotonic counter
///
/// The counter wraps after ~49.7 days; all comparisons go through
/// wrapping arithmetic so deadlines survive the wrap.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Millis(u32);

impl Millis {
    /// Create an instant from a raw millisecond tick count
    #[must_use]
    pub const fn new(ticks: u32) -> Self {
        Self(ticks)
    }

    /// Get the raw tick count
    #[must_use]
    pub const fn ticks(self) -> u32 {
        self.0
    }

    /// Instant `ms` milliseconds after this one
    #[must_use]
    pub const fn plus(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }

    /// Milliseconds elapsed since `earlier`
    #[must_use]
    pub const fn since(self, earlier: Self) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Treat this instant as a deadline and check whether `now` has reached it
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn reached_by(self, now: Self) -> bool {
        now.0.wrapping_sub(self.0) as i32 >= 0
    }
}

impl fmt::Debug for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ms", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Millis {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} ms", self.0);
    }
}

/// One 10 ms snapshot of the three front-panel switch lines
///
/// Levels are logical: `true` means the switch is held. The active-low
/// GPIO inversion happens at the sampling boundary, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SwitchSample {
    /// Push-to-talk line
    pub ptt: bool,
    /// Antenna-tune line
    pub tune: bool,
    /// Encoder knob push switch
    pub knob: bool,
}

impl SwitchSample {
    /// Build a sample from raw active-low pin levels (`true` = pin high)
    #[must_use]
    pub const fn from_active_low(ptt: bool, tune: bool, knob: bool) -> Self {
        Self {
            ptt: !ptt,
            tune: !tune,
            knob: !knob,
        }
    }

    /// Check whether either transmit key (PTT or TUNE) is held
    #[must_use]
    pub const fn any_key(self) -> bool {
        self.ptt || self.tune
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SwitchSample {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Switches(ptt={}, tune={}, knob={})",
            self.ptt,
            self.tune,
            self.knob
        );
    }
}

/// Levels for the three transmit-path control lines
///
/// Produced exclusively by the switch sequencer as a pure function of its
/// state; the board layer copies them to the GPIO outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ControlOutputs {
    /// Audio mute (asserted around every key transition)
    pub mute: bool,
    /// PTT output to the RF deck
    pub ptt_out: bool,
    /// Tune-carrier output to the RF deck
    pub tune_out: bool,
}

impl ControlOutputs {
    /// All lines released (receive path open)
    pub const RELEASED: Self = Self {
        mute: false,
        ptt_out: false,
        tune_out: false,
    };

    /// Audio muted, transmit path still down
    pub const MUTED: Self = Self {
        mute: true,
        ptt_out: false,
        tune_out: false,
    };
}

#[cfg(feature = "embedded")]
impl defmt::Format for ControlOutputs {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Outputs(mute={}, ptt={}, tune={})",
            self.mute,
            self.ptt_out,
            self.tune_out
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_since_wraps() {
        let earlier = Millis::new(u32::MAX - 5);
        let now = Millis::new(10);
        assert_eq!(now.since(earlier), 16);
    }

    #[test]
    fn deadline_reached_across_wrap() {
        let deadline = Millis::new(u32::MAX - 100).plus(250);
        assert_eq!(deadline.ticks(), 149);

        assert!(!deadline.reached_by(Millis::new(u32::MAX - 10)));
        assert!(!deadline.reached_by(Millis::new(148)));
        assert!(deadline.reached_by(Millis::new(149)));
        assert!(deadline.reached_by(Millis::new(400)));
    }

    #[test]
    fn active_low_sample_inverts() {
        // All pins high = nothing pressed
        let idle = SwitchSample::from_active_low(true, true, true);
        assert_eq!(idle, SwitchSample::default());

        let ptt = SwitchSample::from_active_low(false, true, true);
        assert!(ptt.ptt && !ptt.tune && !ptt.knob);
        assert!(ptt.any_key());
    }
}

//! VFO (Variable Frequency Oscillator) Controller
//!
//! Owns the tuning state (frequency, sideband, transmit state, tuning
//! increment) and computes both synthesizer output frequencies from it.
//!
//! # Transceive oscillator roles
//!
//! The conversion chain is shared between receive and transmit: the same
//! two synthesized clocks serve both directions by swapping roles. Keyed
//! (TX or TUNE), the first oscillator sits on the crystal filter center
//! frequency feeding the balanced modulator while the second converts up
//! to the tuned frequency. Receiving (RX or timeout), the first oscillator
//! does the front-end conversion and the second becomes the BFO.

use crate::config::{
    BandLimits, BandTable, CalibrationData, DEFAULT_BAND, DEFAULT_FREQUENCY_HZ,
    DEFAULT_TUNING_INCREMENT_INDEX, TUNING_INCREMENTS_HZ,
};
use crate::drivers::synth::{hz_to_centihz, ClockOutput, SynthDriver};
use crate::event::{Event, EventKind, Outbox};
use crate::types::{Mode, TxState};
use crate::Error;

/// Frequencies for the two synthesizer outputs, by role order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OscillatorRoles {
    /// First oscillator output in Hz
    pub first_hz: u32,
    /// Second oscillator output in Hz
    pub second_hz: u32,
}

/// Compute both oscillator frequencies for the given tuning state
///
/// `diff` is the non-negative distance between the filter center and the
/// tuned frequency; the conversion frequency is `tuned + cf` for USB and
/// `diff` for LSB. Keyed states put the fixed carrier first, receive
/// states put the converter first.
#[must_use]
pub const fn oscillator_roles(tuned_hz: u32, cf_hz: u32, mode: Mode, tx: TxState) -> OscillatorRoles {
    let diff_hz = cf_hz.abs_diff(tuned_hz);
    let fconv_hz = match mode {
        Mode::Usb => tuned_hz + cf_hz,
        Mode::Lsb => diff_hz,
    };
    if tx.is_transmitting() {
        OscillatorRoles {
            first_hz: cf_hz,
            second_hz: fconv_hz,
        }
    } else {
        OscillatorRoles {
            first_hz: fconv_hz,
            second_hz: cf_hz,
        }
    }
}

/// VFO controller: tuning state plus the synthesizer behind it
///
/// Holds the read-only band table and calibration record supplied at
/// startup and owns the synthesizer driver.
pub struct VfoController<S: SynthDriver> {
    synth: S,
    band_table: BandTable,
    band: &'static str,
    cal: CalibrationData,
    tuned_freq_hz: u32,
    mode: Mode,
    tx_state: TxState,
    increment_index: usize,
    // Last values pushed to the display, for change suppression
    last_mode: Option<Mode>,
    last_tx_state: Option<TxState>,
    agc_disabled: bool,
}

impl<S: SynthDriver> VfoController<S> {
    /// Create a controller on the default band and startup frequency
    #[must_use]
    pub fn new(synth: S, band_table: BandTable, cal: CalibrationData) -> Self {
        Self {
            synth,
            band_table,
            band: DEFAULT_BAND,
            cal,
            tuned_freq_hz: DEFAULT_FREQUENCY_HZ,
            mode: Mode::Lsb,
            tx_state: TxState::Rx,
            increment_index: DEFAULT_TUNING_INCREMENT_INDEX,
            last_mode: None,
            last_tx_state: None,
            agc_disabled: false,
        }
    }

    /// Current tuned frequency in Hz
    #[must_use]
    pub const fn tuned_freq_hz(&self) -> u32 {
        self.tuned_freq_hz
    }

    /// Current sideband
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Current transmit state
    #[must_use]
    pub const fn tx_state(&self) -> TxState {
        self.tx_state
    }

    /// Current tuning increment in Hz
    #[must_use]
    pub const fn tuning_increment_hz(&self) -> u32 {
        TUNING_INCREMENTS_HZ[self.increment_index]
    }

    /// Whether the receiver AGC is currently disabled
    #[must_use]
    pub const fn agc_disabled(&self) -> bool {
        self.agc_disabled
    }

    /// Shared view of the synthesizer driver
    #[must_use]
    pub const fn synth(&self) -> &S {
        &self.synth
    }

    /// One-time startup: configure the synthesizer, set the initial
    /// oscillator frequencies, announce the initial tuning increment
    ///
    /// # Errors
    ///
    /// Propagates synthesizer failures; startup aborts on them.
    pub fn init(&mut self, out: &mut Outbox) -> Result<(), Error> {
        self.synth.initialize(&self.cal)?;
        self.retune(out)?;
        out.emit(EventKind::TuningIncrementUpdate {
            hz: self.tuning_increment_hz(),
        })?;
        Ok(())
    }

    /// React to one published event
    ///
    /// `menu_active` tells the controller the menu owns the knob, so short
    /// presses cycle menu entries instead of the tuning increment.
    ///
    /// # Errors
    ///
    /// Propagates synthesizer failures (fatal).
    pub fn handle(
        &mut self,
        event: &Event,
        menu_active: bool,
        out: &mut Outbox,
    ) -> Result<(), Error> {
        match event.kind {
            EventKind::KnobCw => self.nudge(true, out),
            EventKind::KnobCcw => self.nudge(false, out),
            EventKind::KnobReleased if !menu_active => {
                self.increment_index = (self.increment_index + 1) % TUNING_INCREMENTS_HZ.len();
                out.emit(EventKind::TuningIncrementUpdate {
                    hz: self.tuning_increment_hz(),
                })?;
                Ok(())
            }
            EventKind::PttPressed => self.set_tx_state(TxState::Tx, out),
            EventKind::TunePressed => self.set_tx_state(TxState::Tune, out),
            EventKind::PttReleased | EventKind::TuneReleased => {
                self.set_tx_state(TxState::Rx, out)
            }
            EventKind::TxTimedOutEntry => {
                // Already receiving: nothing to force down
                if self.tx_state == TxState::Rx {
                    Ok(())
                } else {
                    self.set_tx_state(TxState::Timeout, out)
                }
            }
            EventKind::ModeSelect(mode) => {
                self.mode = mode;
                self.retune(out)
            }
            EventKind::AgcEnable => self.set_agc(false, out),
            EventKind::AgcDisable => self.set_agc(true, out),
            _ => Ok(()),
        }
    }

    /// Step the tuned frequency by one increment, up or down
    ///
    /// Applied only when the result lies strictly inside the active band;
    /// otherwise the request is silently discarded. No clamp, no wrap,
    /// no event.
    fn nudge(&mut self, up: bool, out: &mut Outbox) -> Result<(), Error> {
        let step = self.tuning_increment_hz();
        let new_freq = if up {
            self.tuned_freq_hz.checked_add(step)
        } else {
            self.tuned_freq_hz.checked_sub(step)
        };
        match new_freq {
            Some(hz) if self.active_band().contains_interior(hz) => {
                self.tuned_freq_hz = hz;
                self.retune(out)
            }
            _ => Ok(()),
        }
    }

    fn set_tx_state(&mut self, tx_state: TxState, out: &mut Outbox) -> Result<(), Error> {
        self.tx_state = tx_state;
        self.retune(out)
    }

    fn set_agc(&mut self, disabled: bool, out: &mut Outbox) -> Result<(), Error> {
        if self.agc_disabled != disabled {
            self.agc_disabled = disabled;
            out.emit(EventKind::AgcUpdate { disabled })?;
        }
        Ok(())
    }

    /// Limits of the active band
    ///
    /// A band missing from the table tunes nowhere (empty interior), so a
    /// misconfigured table freezes tuning instead of unleashing it.
    fn active_band(&self) -> BandLimits {
        match self.band_table.get(self.band) {
            Some(limits) => *limits,
            None => BandLimits {
                low_limit_hz: 0,
                high_limit_hz: 0,
            },
        }
    }

    /// Push the oscillator plan to the synthesizer and notify the display
    ///
    /// The frequency notification is unconditional; mode and transmit
    /// state only go out when they differ from the last published value.
    fn retune(&mut self, out: &mut Outbox) -> Result<(), Error> {
        let roles = oscillator_roles(
            self.tuned_freq_hz,
            self.cal.cf_frequency_hz,
            self.mode,
            self.tx_state,
        );
        self.synth
            .set_clock(ClockOutput::Clk0, hz_to_centihz(roles.first_hz))?;
        self.synth
            .set_clock(ClockOutput::Clk2, hz_to_centihz(roles.second_hz))?;

        out.emit(EventKind::FreqUpdate {
            hz: self.tuned_freq_hz,
        })?;
        if self.last_tx_state != Some(self.tx_state) {
            self.last_tx_state = Some(self.tx_state);
            out.emit(EventKind::TxStateUpdate(self.tx_state))?;
        }
        if self.last_mode != Some(self.mode) {
            self.last_mode = Some(self.mode);
            out.emit(EventKind::ModeUpdate(self.mode))?;
        }
        Ok(())
    }
}

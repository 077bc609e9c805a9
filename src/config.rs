//! System configuration and hardware constants
//!
//! Compile-time constants for the transceiver control core, plus the
//! read-only calibration and band-plan records supplied at startup by the
//! configuration collaborator.

use heapless::FnvIndexMap;

/// Front-panel switch poll period in milliseconds
///
/// The poll period doubles as the only switch debounce.
pub const SWITCH_POLL_PERIOD_MS: u32 = 10;

/// Delay between muting the audio path and keying the transmitter, and
/// between unkeying and unmuting, in milliseconds
pub const KEY_DELAY_MS: u32 = 250;

/// Knob hold time that registers as a long press, in milliseconds (inclusive)
pub const KNOB_LONG_PRESS_MS: u32 = 1000;

/// Transmit time-out to protect the power amplifier from a stuck key
/// (10 minutes, in milliseconds)
pub const TX_TIMEOUT_MS: u32 = 600_000;

/// Quadrature counts per mechanical encoder detent
pub const ENCODER_DETENT_COUNT: i16 = 4;

/// Capacity of the encoder pulse queue (interrupt -> foreground)
pub const ENCODER_QUEUE_DEPTH: usize = 16;

/// Capacity of the switch event queue (interrupt -> foreground)
pub const SWITCH_QUEUE_DEPTH: usize = 16;

/// Capacity of the display notification buffer
pub const NOTIFY_QUEUE_DEPTH: usize = 16;

/// Maximum number of event bus subscribers
pub const MAX_SUBSCRIBERS: usize = 8;

/// Tuning increment table in Hz, cycled by short knob presses
pub const TUNING_INCREMENTS_HZ: [u32; 4] = [100, 500, 1000, 10_000];

/// Initial index into [`TUNING_INCREMENTS_HZ`] (1 kHz)
pub const DEFAULT_TUNING_INCREMENT_INDEX: usize = 2;

/// Default startup frequency (40m voice segment)
pub const DEFAULT_FREQUENCY_HZ: u32 = 7_200_000;

/// Band the VFO operates in until band switching is wired up
pub const DEFAULT_BAND: &str = "40M";

/// Calibration record for the synthesizer and IF filter
///
/// Supplied by the configuration collaborator at startup and never written
/// by this core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationData {
    /// Synthesizer frequency correction in parts per billion
    pub correction_ppb: i32,
    /// Synthesizer reference crystal frequency in Hz
    pub xtal_freq_hz: u32,
    /// Crystal filter center frequency in Hz
    pub cf_frequency_hz: u32,
    /// Crystal filter bandwidth in Hz
    pub cf_bandwidth_hz: u32,
}

impl Default for CalibrationData {
    fn default() -> Self {
        Self {
            correction_ppb: 0,
            xtal_freq_hz: 25_000_000,
            cf_frequency_hz: 12_288_000,
            cf_bandwidth_hz: 2_000,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for CalibrationData {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Cal(xtal={} Hz, cf={} Hz, corr={} ppb)",
            self.xtal_freq_hz,
            self.cf_frequency_hz,
            self.correction_ppb
        );
    }
}

/// Edge frequencies of one amateur band
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandLimits {
    /// Lower band edge in Hz (exclusive for tuning)
    pub low_limit_hz: u32,
    /// Upper band edge in Hz (exclusive for tuning)
    pub high_limit_hz: u32,
}

impl BandLimits {
    /// Check whether `hz` lies strictly inside the band edges
    #[must_use]
    pub const fn contains_interior(&self, hz: u32) -> bool {
        hz > self.low_limit_hz && hz < self.high_limit_hz
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BandLimits {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}..{} Hz", self.low_limit_hz, self.high_limit_hz);
    }
}

/// Band-plan map: band name to edge frequencies
///
/// Read-only after startup. A single entry today; the map keeps the seam
/// ready for multi-band hardware.
pub type BandTable = FnvIndexMap<&'static str, BandLimits, 4>;

/// Build the default single-band table (40m)
#[must_use]
pub fn default_band_table() -> BandTable {
    let mut table = BandTable::new();
    // Capacity is 4, a single insert cannot fail
    let _ = table.insert(
        "40M",
        BandLimits {
            low_limit_hz: 7_000_000,
            high_limit_hz: 7_300_000,
        },
    );
    table
}

/// GPIO pin assignments
pub mod pins {
    //! RP2040 GPIO numbers matching the control-board schematic

    /// PTT button input (active low)
    pub const CTRL_BUTTON_PTT: u8 = 2;

    /// Tune button input (active low)
    pub const CTRL_BUTTON_TUNE: u8 = 3;

    /// PTT output to the RF deck
    pub const CTRL_PTT_OUT: u8 = 4;

    /// Tune-carrier output to the RF deck
    pub const CTRL_TUNE_OUT: u8 = 5;

    /// Audio mute output
    pub const CTRL_MUTE_OUT: u8 = 6;

    /// AGC disable output
    pub const CTRL_AGC_DISABLE: u8 = 7;

    /// Encoder knob push switch input (active low)
    pub const CTRL_BUTTON_KNOB: u8 = 8;

    /// I2C SDA (synthesizer bus)
    pub const I2C_SDA: u8 = 12;

    /// I2C SCL (synthesizer bus)
    pub const I2C_SCL: u8 = 13;

    /// Encoder in-phase input
    pub const ENCODER_I: u8 = 14;

    /// Encoder quadrature input
    pub const ENCODER_Q: u8 = 15;

    /// On-board indicator LED
    pub const CTRL_LED: u8 = 25;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_interior_excludes_edges() {
        let band = BandLimits {
            low_limit_hz: 7_000_000,
            high_limit_hz: 7_300_000,
        };
        assert!(!band.contains_interior(7_000_000));
        assert!(band.contains_interior(7_000_100));
        assert!(band.contains_interior(7_299_900));
        assert!(!band.contains_interior(7_300_000));
    }

    #[test]
    fn default_table_has_40m() {
        let table = default_band_table();
        let band = table.get(DEFAULT_BAND).unwrap();
        assert_eq!(band.low_limit_hz, 7_000_000);
        assert_eq!(band.high_limit_hz, 7_300_000);
    }
}

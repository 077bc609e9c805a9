//! Clock-generator seam
//!
//! The control core never speaks the synthesizer's register protocol; it
//! hands absolute output frequencies (in hundredths of a hertz, the
//! resolution the chip's divider math wants) to whatever driver sits behind
//! [`SynthDriver`]. Write-only from this side.

use crate::config::CalibrationData;

/// Synthesizer output selector
///
/// The transceive chain uses the two outer outputs; the middle one is
/// unused on this board and stays disabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockOutput {
    /// First oscillator output (carrier in TX, conversion in RX)
    Clk0,
    /// Unused output
    Clk1,
    /// Second oscillator output (conversion in TX, BFO in RX)
    Clk2,
}

impl ClockOutput {
    /// Drive strength this board runs the output at
    #[must_use]
    pub const fn drive(self) -> DriveStrength {
        match self {
            Self::Clk0 | Self::Clk2 => DriveStrength::Ma8,
            Self::Clk1 => DriveStrength::Ma2,
        }
    }

    /// Whether the output is enabled at startup
    #[must_use]
    pub const fn enabled_at_startup(self) -> bool {
        !matches!(self, Self::Clk1)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ClockOutput {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Clk0 => defmt::write!(f, "CLK0"),
            Self::Clk1 => defmt::write!(f, "CLK1"),
            Self::Clk2 => defmt::write!(f, "CLK2"),
        }
    }
}

/// Output drive strength
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriveStrength {
    /// 2 mA (lowest)
    Ma2,
    /// 4 mA
    Ma4,
    /// 6 mA
    Ma6,
    /// 8 mA (highest)
    Ma8,
}

/// Error from the synthesizer driver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthError {
    /// I2C transaction failed
    Bus,
    /// Requested frequency outside the part's divider range
    OutOfRange,
}

impl core::fmt::Display for SynthError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus => write!(f, "bus transaction failed"),
            Self::OutOfRange => write!(f, "frequency out of range"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SynthError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus => defmt::write!(f, "bus transaction failed"),
            Self::OutOfRange => defmt::write!(f, "frequency out of range"),
        }
    }
}

/// Scale a frequency in Hz to the hundredths-of-a-hertz unit the
/// synthesizer driver takes
#[must_use]
pub const fn hz_to_centihz(hz: u32) -> u64 {
    hz as u64 * 100
}

/// Driver interface for the external clock-generator chip
///
/// Implementations own the register protocol and the I2C bus. The core
/// assumes the driver is reliable; errors are fatal, never retried.
pub trait SynthDriver {
    /// One-time startup configuration
    ///
    /// Applies crystal load and reference frequency, the ppb correction
    /// from `cal`, and the per-output drive strengths and enables given by
    /// [`ClockOutput::drive`] and [`ClockOutput::enabled_at_startup`].
    ///
    /// # Errors
    ///
    /// [`SynthError`] when the configuration writes fail.
    fn initialize(&mut self, cal: &CalibrationData) -> Result<(), SynthError>;

    /// Set one output to an absolute frequency in hundredths of a hertz
    ///
    /// # Errors
    ///
    /// [`SynthError`] when the divider write fails or the frequency is
    /// unreachable.
    fn set_clock(&mut self, output: ClockOutput, centihz: u64) -> Result<(), SynthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oscillator_outputs_drive_strong() {
        assert_eq!(ClockOutput::Clk0.drive(), DriveStrength::Ma8);
        assert_eq!(ClockOutput::Clk2.drive(), DriveStrength::Ma8);
        assert!(ClockOutput::Clk0.enabled_at_startup());
        assert!(ClockOutput::Clk2.enabled_at_startup());
    }

    #[test]
    fn unused_output_weak_and_off() {
        assert_eq!(ClockOutput::Clk1.drive(), DriveStrength::Ma2);
        assert!(!ClockOutput::Clk1.enabled_at_startup());
    }

    #[test]
    fn centihz_scaling() {
        assert_eq!(hz_to_centihz(7_200_000), 720_000_000);
        assert_eq!(hz_to_centihz(0), 0);
    }
}

/// Test double recording every call made through the seam
#[cfg(feature = "std")]
pub mod recording {
    //! Host-test support: a [`SynthDriver`](super::SynthDriver) that
    //! records instead of talking to hardware.

    use super::{ClockOutput, SynthDriver, SynthError};
    use crate::config::CalibrationData;

    /// Records initialization and every clock write, in order
    #[derive(Debug, Default)]
    pub struct RecordingSynth {
        /// Calibration passed to `initialize`, if it ran
        pub initialized_with: Option<CalibrationData>,
        /// Clock writes in call order
        pub writes: Vec<(ClockOutput, u64)>,
        /// When set, the next call fails with this error
        pub fail_with: Option<SynthError>,
    }

    impl RecordingSynth {
        /// Create an idle recorder
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Most recent write to `output`, if any
        #[must_use]
        pub fn last_write(&self, output: ClockOutput) -> Option<u64> {
            self.writes
                .iter()
                .rev()
                .find(|(out, _)| *out == output)
                .map(|&(_, centihz)| centihz)
        }

        fn take_failure(&mut self) -> Result<(), SynthError> {
            match self.fail_with.take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    impl SynthDriver for RecordingSynth {
        fn initialize(&mut self, cal: &CalibrationData) -> Result<(), SynthError> {
            self.take_failure()?;
            self.initialized_with = Some(*cal);
            Ok(())
        }

        fn set_clock(&mut self, output: ClockOutput, centihz: u64) -> Result<(), SynthError> {
            self.take_failure()?;
            self.writes.push((output, centihz));
            Ok(())
        }
    }
}

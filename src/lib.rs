//! SSB Transceiver Control-Core Firmware Library
//!
//! Core control logic for an RP2040-based single-sideband transceiver:
//! quadrature encoder decoding, debounced switch sampling, the transmit
//! audio sequencer, transceive local-oscillator computation, and the
//! hierarchical configuration menu, all decoupled through a
//! publish/subscribe event bus.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     INTERRUPT CONTEXT                        │
//! │  Quadrature decoder (PIO)  │  Switch sequencer (10 ms timer) │
//! └───────────────┬────────────┴──────────────┬──────────────────┘
//!                 │  pulse queue              │  event queue
//! ┌───────────────▼───────────────────────────▼──────────────────┐
//! │               FOREGROUND EXECUTIVE (poll loop)               │
//! │                      event bus dispatch                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │   VFO controller   │   Menu controller   │   Display queue   │
//! ├──────────────────────────────────────────────────────────────┤
//! │       Synthesizer seam (trait)  │  GPIO outputs (board)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **One owner per state**: sequencer state, tuning state and the menu
//!   cursor each belong to exactly one component; everything else sees
//!   copied event data.
//! - **Nothing blocks on the hot path**: deadlines against a wrapping
//!   millisecond clock, bounded queues that drop-and-count on overflow.
//! - **Fail-fast**: a handler failure propagates to the foreground loop,
//!   which announces the fault and halts; a corrupted transceiver state is
//!   unsafe to keep running.
//! - **Explicit error handling**: all fallible operations return `Result`.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by the firmware binary (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_rp;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// System configuration, calibration records, and hardware constants
pub mod config;

/// Peripheral drivers and collaborator seams
pub mod drivers;

/// Event bus: publish/subscribe dispatch
pub mod event;

/// Radio control logic: switch sequencer and VFO
pub mod radio;

/// Shared types used across modules
pub mod types;

/// Menu system
pub mod ui;

/// Foreground executive: queue draining and bus wiring
pub mod executive;

use drivers::synth::SynthError;
use event::BusError;

/// Top-level error for the control core
///
/// Anything that reaches the foreground loop through this type is fatal;
/// there is no retry path for hardware I/O.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Event bus misconfiguration or dispatch overflow
    Bus(BusError),
    /// Synthesizer write failed
    Synth(SynthError),
}

impl From<BusError> for Error {
    fn from(err: BusError) -> Self {
        Self::Bus(err)
    }
}

impl From<SynthError> for Error {
    fn from(err: SynthError) -> Self {
        Self::Synth(err)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus(err) => write!(f, "event bus: {err}"),
            Self::Synth(err) => write!(f, "synthesizer: {err}"),
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Bus(err) => defmt::write!(f, "event bus: {}", err),
            Self::Synth(err) => defmt::write!(f, "synthesizer: {}", err),
        }
    }
}

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}

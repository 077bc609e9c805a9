//! Rotary Encoder Decoder
//!
//! Turns raw quadrature phase samples into one direction pulse per
//! mechanical detent. On the board the phase lines are sampled by a PIO
//! state machine independent of the foreground loop; the decoder here is
//! context-free so the same logic runs under test on a host.
//!
//! Decoded pulses cross from interrupt context to the foreground through a
//! bounded single-producer single-consumer queue. Pushing never blocks: a
//! full queue drops the pulse and bumps an error counter, because the
//! sampling path must never stall.

use crate::config::ENCODER_QUEUE_DEPTH;
use heapless::spsc::Producer;

/// One detent's worth of rotation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pulse {
    /// Clockwise detent
    Cw,
    /// Counter-clockwise detent
    Ccw,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Pulse {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Cw => defmt::write!(f, "CW"),
            Self::Ccw => defmt::write!(f, "CCW"),
        }
    }
}

/// Quadrature transition table indexed by `(previous << 2) | current`
///
/// Valid alternating transitions give ±1, repeats and two-bit jumps give 0.
const DIRECTION_TABLE: [i8; 16] = [
    0, 1, -1, 0, //
    -1, 0, 0, 1, //
    1, 0, 0, -1, //
    0, -1, 1, 0,
];

/// Two-phase quadrature decoder
///
/// Accumulation-free: each phase sample yields the signed count delta for
/// that transition.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuadratureDecoder {
    prev: Option<u8>,
}

impl QuadratureDecoder {
    /// Create a decoder that syncs on the first sample
    #[must_use]
    pub const fn new() -> Self {
        Self { prev: None }
    }

    /// Feed one phase sample, returning the count delta (−1, 0 or +1)
    pub fn step(&mut self, a: bool, b: bool) -> i8 {
        let cur = u8::from(a) | (u8::from(b) << 1);
        let delta = match self.prev {
            // First sample only establishes the reference phase
            None => 0,
            Some(prev) => DIRECTION_TABLE[usize::from(prev << 2 | cur)],
        };
        self.prev = Some(cur);
        delta
    }
}

/// Signed position counter that emits one pulse per detent
///
/// Counting up to the detent threshold emits a clockwise pulse and wraps
/// to zero; counting below zero emits a counter-clockwise pulse and wraps
/// to `detent - 1`.
#[derive(Clone, Copy, Debug)]
pub struct DetentAccumulator {
    count: i16,
    detent: i16,
}

impl DetentAccumulator {
    /// Create an accumulator with `detent` counts per mechanical click
    #[must_use]
    pub const fn new(detent: i16) -> Self {
        Self { count: 0, detent }
    }

    /// Apply one count delta, returning a pulse when a detent completes
    pub fn advance(&mut self, delta: i8) -> Option<Pulse> {
        self.count += i16::from(delta);
        if self.count >= self.detent {
            self.count = 0;
            Some(Pulse::Cw)
        } else if self.count < 0 {
            self.count = self.detent - 1;
            Some(Pulse::Ccw)
        } else {
            None
        }
    }

    /// Current intra-detent count
    #[must_use]
    pub const fn count(&self) -> i16 {
        self.count
    }
}

/// Complete encoder front end for interrupt context
///
/// Owns the decoder, the detent accumulator and the producer half of the
/// pulse queue. The foreground executive drains the consumer half once per
/// loop iteration.
pub struct EncoderDecoder<'q> {
    decoder: QuadratureDecoder,
    accumulator: DetentAccumulator,
    pulses: Producer<'q, Pulse, ENCODER_QUEUE_DEPTH>,
    overflows: u32,
}

impl<'q> EncoderDecoder<'q> {
    /// Create an encoder front end pushing into `pulses`
    #[must_use]
    pub fn new(pulses: Producer<'q, Pulse, ENCODER_QUEUE_DEPTH>, detent: i16) -> Self {
        Self {
            decoder: QuadratureDecoder::new(),
            accumulator: DetentAccumulator::new(detent),
            pulses,
            overflows: 0,
        }
    }

    /// Feed one phase sample; never blocks
    ///
    /// A completed detent becomes exactly one queued pulse. When the queue
    /// is full the pulse is dropped and the overflow counter increments.
    pub fn sample(&mut self, a: bool, b: bool) {
        let delta = self.decoder.step(a, b);
        if delta == 0 {
            return;
        }
        if let Some(pulse) = self.accumulator.advance(delta) {
            if self.pulses.enqueue(pulse).is_err() {
                self.overflows = self.overflows.wrapping_add(1);
            }
        }
    }

    /// Pulses dropped because the queue was full
    #[must_use]
    pub const fn overflow_count(&self) -> u32 {
        self.overflows
    }
}

//! Peripheral Drivers
//!
//! The quadrature encoder decoder and the typed seam to the external
//! clock-generator driver.

pub mod encoder;
pub mod synth;

//! SSB Transceiver Main Application
//!
//! Entry point for the RP2040-based SSB transceiver firmware. Wires the
//! GPIO boundary to the control core, spawns the interrupt-context tasks
//! (switch poll, encoder sampling) and runs the foreground executive.

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Duration, Instant, Ticker, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use heapless::spsc::Queue;
use ssb_firmware::config::{
    default_band_table, CalibrationData, ENCODER_DETENT_COUNT, ENCODER_QUEUE_DEPTH,
    SWITCH_POLL_PERIOD_MS, SWITCH_QUEUE_DEPTH,
};
use ssb_firmware::drivers::encoder::{EncoderDecoder, Pulse};
use ssb_firmware::drivers::synth::{ClockOutput, SynthDriver, SynthError};
use ssb_firmware::event::Event;
use ssb_firmware::executive::Executive;
use ssb_firmware::radio::sequencer::SwitchSequencer;
use ssb_firmware::radio::vfo::VfoController;
use ssb_firmware::types::{Millis, SwitchSample};
use ssb_firmware::ui::MenuController;

static PULSE_QUEUE: StaticCell<Queue<Pulse, ENCODER_QUEUE_DEPTH>> = StaticCell::new();
static SWITCH_QUEUE: StaticCell<Queue<Event, SWITCH_QUEUE_DEPTH>> = StaticCell::new();

/// Adapter between the control core and the external clock-generator
/// driver on the I2C bus.
struct ClockGen;

impl SynthDriver for ClockGen {
    fn initialize(&mut self, cal: &CalibrationData) -> Result<(), SynthError> {
        info!("synth init: {}", cal);
        // TODO: forward load capacitance, correction and drive strengths to
        // the si5351 driver once the I2C bring-up lands
        Ok(())
    }

    fn set_clock(&mut self, output: ClockOutput, centihz: u64) -> Result<(), SynthError> {
        info!("synth {}: {} cHz", output, centihz);
        // TODO: forward to the si5351 driver once the I2C bring-up lands
        Ok(())
    }
}

/// Millisecond timestamp for the control core's deadline arithmetic
#[allow(clippy::cast_possible_truncation)]
fn now_ms() -> Millis {
    Millis::new(Instant::now().as_millis() as u32)
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("SSB Transceiver Firmware v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // Control inputs (active low, pulled up)
    let ptt_in = Input::new(p.PIN_2, Pull::Up);
    let tune_in = Input::new(p.PIN_3, Pull::Up);
    let knob_in = Input::new(p.PIN_8, Pull::Up);

    // Control outputs, everything released at boot
    let ptt_out = Output::new(p.PIN_4, Level::Low);
    let tune_out = Output::new(p.PIN_5, Level::Low);
    let mute_out = Output::new(p.PIN_6, Level::Low);
    let agc_disable = Output::new(p.PIN_7, Level::Low);
    let led = Output::new(p.PIN_25, Level::Low);

    // Encoder phase inputs (externally debounced)
    let encoder_i = Input::new(p.PIN_14, Pull::Up);
    let encoder_q = Input::new(p.PIN_15, Pull::Up);

    // Safe mode: TUNE held at power-on stops boot before any subsystem
    // runs, so a bad flash image cannot lock out the programmer
    if tune_in.is_low() {
        warn!("** SAFE MODE ** (TUNE held at power-on)");
        loop {
            Timer::after(Duration::from_secs(1)).await;
        }
    }

    let (pulse_tx, pulse_rx) = PULSE_QUEUE.init(Queue::new()).split();
    let (switch_tx, switch_rx) = SWITCH_QUEUE.init(Queue::new()).split();

    let encoder = EncoderDecoder::new(pulse_tx, ENCODER_DETENT_COUNT);
    let sequencer = SwitchSequencer::new(switch_tx);

    let vfo = VfoController::new(ClockGen, default_band_table(), CalibrationData::default());
    let executive = match Executive::new(vfo, MenuController::new(), pulse_rx, switch_rx) {
        Ok(executive) => executive,
        Err(err) => {
            error!("startup failed: {}", err);
            core::panic!("startup failed");
        }
    };

    spawner.spawn(heartbeat_task(led)).unwrap();
    spawner
        .spawn(switch_poll_task(
            sequencer, ptt_in, tune_in, knob_in, mute_out, ptt_out, tune_out,
        ))
        .unwrap();
    spawner
        .spawn(encoder_task(encoder, encoder_i, encoder_q))
        .unwrap();

    info!("tasks spawned, entering foreground loop");
    foreground_loop(executive, agc_disable).await;
}

/// Foreground executive loop: drain queues, dispatch, service collaborators
async fn foreground_loop(mut executive: Executive<'static, ClockGen>, mut agc_disable: Output<'static>) -> ! {
    loop {
        if let Err(err) = executive.poll() {
            // Fail fast: a corrupted transceiver state is unsafe to run
            executive.announce_fatal();
            while let Some(event) = executive.next_notification() {
                info!("display: {}", event);
            }
            error!("fatal: {}", err);
            core::panic!("control core failure");
        }

        // AGC line follows the VFO's configuration flag
        if executive.context().vfo.agc_disabled() {
            agc_disable.set_high();
        } else {
            agc_disable.set_low();
        }

        // Display collaborator consumes the notification stream
        while let Some(event) = executive.next_notification() {
            info!("display: {}", event);
        }

        Timer::after(Duration::from_millis(1)).await;
    }
}

/// 10 ms switch poll: sample lines, step the sequencer, drive the
/// transmit-path outputs
#[embassy_executor::task]
async fn switch_poll_task(
    mut sequencer: SwitchSequencer<'static>,
    ptt_in: Input<'static>,
    tune_in: Input<'static>,
    knob_in: Input<'static>,
    mut mute_out: Output<'static>,
    mut ptt_out: Output<'static>,
    mut tune_out: Output<'static>,
) {
    let mut ticker = Ticker::every(Duration::from_millis(u64::from(SWITCH_POLL_PERIOD_MS)));
    loop {
        ticker.next().await;
        let sample =
            SwitchSample::from_active_low(ptt_in.is_high(), tune_in.is_high(), knob_in.is_high());
        sequencer.tick(now_ms(), sample);

        let outputs = sequencer.outputs();
        mute_out.set_level(Level::from(outputs.mute));
        ptt_out.set_level(Level::from(outputs.ptt_out));
        tune_out.set_level(Level::from(outputs.tune_out));
    }
}

/// Encoder sampling: the phase lines are externally debounced, so 1 kHz
/// sampling keeps up with hand rotation
#[embassy_executor::task]
async fn encoder_task(
    mut encoder: EncoderDecoder<'static>,
    a_pin: Input<'static>,
    b_pin: Input<'static>,
) {
    let mut ticker = Ticker::every(Duration::from_millis(1));
    loop {
        ticker.next().await;
        encoder.sample(a_pin.is_high(), b_pin.is_high());
    }
}

/// Heartbeat task - blinks LED to show system is running
#[embassy_executor::task]
async fn heartbeat_task(mut led: Output<'static>) {
    loop {
        led.set_high();
        Timer::after(Duration::from_millis(100)).await;
        led.set_low();
        Timer::after(Duration::from_millis(900)).await;
    }
}

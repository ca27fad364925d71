//! Tilt input sources
//!
//! A source pushes raw `(dx, dy)` pairs into an `InputSink` between
//! `start` and `stop`. The runtime subscribes it while the session runs and
//! unsubscribes it on pause.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::InputSink;
use super::time::Periodic;

pub trait TiltSource: Send {
    /// Begin delivering tilt events into `sink`
    fn start(&mut self, sink: InputSink);

    /// Stop delivering. No event is pushed after this returns.
    fn stop(&mut self);
}

/// For hosts that push sensor readings through `Runtime::input_sink`
/// themselves
#[derive(Debug, Default)]
pub struct ManualTilt;

impl TiltSource for ManualTilt {
    fn start(&mut self, _sink: InputSink) {}

    fn stop(&mut self) {}
}

/// Stand-in sensor producing random tilts at a fixed rate
#[derive(Debug)]
pub struct SimulatedTilt {
    period: Duration,
    /// Largest tilt on either axis
    amplitude: f32,
    seed: u64,
    starts: u64,
    worker: Option<Periodic>,
}

impl SimulatedTilt {
    pub fn new(period: Duration, amplitude: f32, seed: u64) -> Self {
        Self {
            period,
            amplitude: amplitude.abs().max(f32::EPSILON),
            seed,
            starts: 0,
            worker: None,
        }
    }
}

impl TiltSource for SimulatedTilt {
    fn start(&mut self, sink: InputSink) {
        self.stop();
        // Each subscription draws a fresh stream
        let mut rng = Pcg32::seed_from_u64(self.seed.wrapping_add(self.starts));
        self.starts += 1;
        let amplitude = self.amplitude;
        self.worker = Some(Periodic::spawn(self.period, move || {
            let dx = rng.random_range(-amplitude..=amplitude);
            let dy = rng.random_range(-amplitude..=amplitude);
            sink.tilt(dx, dy)
        }));
    }

    fn stop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
        }
    }
}

impl Drop for SimulatedTilt {
    fn drop(&mut self) {
        self.stop();
    }
}

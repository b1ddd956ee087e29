use enum_dispatch::enum_dispatch;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::nes::apu::{
  ApuState,
  CPU_CLOCK_HZ,
  channel::{Channel, ChannelType},
  config::NoiseKind,
  register::{RegisterFile, ENABLE_NOISE, NOISE_PERIOD},
  timer::TimerSlot,
};

/// NTSC noise periods in CPU cycles, indexed by the low nibble of $400E.
pub const NOISE_PERIOD_TABLE: [u16; 16] = [
  4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

const MODE_FLAG: u8 = 0b1000_0000;

/// The 2A03 noise shift register.
#[derive(Debug, Clone)]
pub struct Lfsr {
  shift: u16,
  phase: f64,
}

impl Default for Lfsr {
  fn default() -> Self {
    Self {
      shift: 1,
      phase: 0.0,
    }
  }
}

impl Lfsr {
  pub fn shift(&self) -> u16 {
    self.shift
  }

  pub fn clock(&mut self, short_mode: bool) {
    let tap = if short_mode {6} else {1};
    let feedback = (self.shift ^ (self.shift >> tap)) & 1;
    self.shift = (self.shift >> 1) | (feedback << 14);
  }
}

#[derive(Debug, Clone)]
pub struct UniformNoise {
  rng: StdRng,
}

impl UniformNoise {
  pub fn new(seed: u64) -> Self {
    Self {
      rng: StdRng::seed_from_u64(seed),
    }
  }
}

#[enum_dispatch]
#[derive(Debug, Clone)]
pub enum NoiseSource {
  Lfsr,
  UniformNoise,
}

#[enum_dispatch(NoiseSource)]
pub trait NoiseGenerator {
  /// Next output value in [-1, 1] for one sample period.
  fn next_value(&mut self, registers: &RegisterFile, sample_rate: f64) -> f64;
}

impl NoiseSource {
  pub fn from_kind(kind: NoiseKind, seed: u64) -> Self {
    match kind {
      NoiseKind::Lfsr => Lfsr::default().into(),
      NoiseKind::Uniform => UniformNoise::new(seed).into(),
    }
  }
}

impl NoiseGenerator for Lfsr {
  fn next_value(&mut self, registers: &RegisterFile, sample_rate: f64) -> f64 {
    let control = registers.read(NOISE_PERIOD);
    let period = NOISE_PERIOD_TABLE[(control & 0x0F) as usize] as f64;
    self.phase += CPU_CLOCK_HZ / period / sample_rate;
    while self.phase >= 1.0 {
      self.phase -= 1.0;
      self.clock(control & MODE_FLAG != 0);
    }
    if self.shift & 1 == 0 {1.0} else {-1.0}
  }
}

impl NoiseGenerator for UniformNoise {
  fn next_value(&mut self, _registers: &RegisterFile, _sample_rate: f64) -> f64 {
    self.rng.gen_range(-1.0..=1.0)
  }
}

#[derive(Debug, Clone)]
pub struct Noise {
  source: NoiseSource,
}

impl Channel for Noise {
  fn sample(&mut self, state: &ApuState, _time: f64, sample_rate: f64) -> Option<f64> {
    if !state.registers.channel_enabled(ENABLE_NOISE) || !state.timers.is_running(TimerSlot::Noise) {
      return None;
    }
    Some(self.source.next_value(&state.registers, sample_rate))
  }
}

impl Noise {
  pub fn new(source: NoiseSource) -> ChannelType {
    let new = Self {
      source,
    };
    new.into()
  }
}

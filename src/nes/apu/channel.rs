pub mod pulse;
pub mod triangle;
pub mod noise;

use enum_dispatch::enum_dispatch;

use crate::nes::apu::ApuState;

use pulse::Pulse;
use triangle::Triangle;
use noise::Noise;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Voice {
  Pulse1,
  Pulse2,
  Triangle,
  Noise,
  Dmc,
}

impl Voice {
  pub const ALL: [Voice; 5] = [Voice::Pulse1, Voice::Pulse2, Voice::Triangle, Voice::Noise, Voice::Dmc];

  pub fn index(self) -> usize {
    self as usize
  }

  /// Linear approximation of the 2A03 mixer weights.
  pub fn gain(self) -> f64 {
    match self {
      Voice::Pulse1 | Voice::Pulse2 => 0.0752,
      Voice::Triangle => 0.0851,
      Voice::Noise => 0.0494,
      Voice::Dmc => 0.0335,
    }
  }
}

/// One instant of every voice. `None` means the voice is silent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VoiceSamples {
  samples: [Option<f64>; 5],
}

impl VoiceSamples {
  pub fn get(&self, voice: Voice) -> Option<f64> {
    self.samples[voice.index()]
  }

  pub fn set(&mut self, voice: Voice, sample: Option<f64>) {
    self.samples[voice.index()] = sample;
  }

  pub fn active(&self) -> impl Iterator<Item = (Voice, f64)> + '_ {
    Voice::ALL.into_iter().filter_map(|voice| self.get(voice).map(|sample| (voice, sample)))
  }
}

/// Square wave in {-1, 1}, high for the first half of each period.
pub fn square(time: f64, frequency: f64, phase: f64) -> f64 {
  if (time * frequency + phase).fract() < 0.5 {
    1.0
  }
  else {
    -1.0
  }
}

/// Triangle wave in [-1, 1], starting at -1 and peaking half way through the period.
pub fn triangle(time: f64, frequency: f64, phase: f64) -> f64 {
  let position = (time * frequency + phase).fract();
  1.0 - 4.0 * (position - 0.5).abs()
}

/// DMC placeholder, never produces sound.
#[derive(Debug, Clone)]
pub struct NullChannel {}

#[allow(clippy::large_enum_variant)]
#[enum_dispatch]
#[derive(Debug, Clone)]
pub enum ChannelType {
  NullChannel,
  Pulse,
  Triangle,
  Noise,
}

#[enum_dispatch(ChannelType)]
pub trait Channel {
  fn sample(&mut self, _state: &ApuState, _time: f64, _sample_rate: f64) -> Option<f64> {
    None
  }
}

impl Channel for NullChannel {}

pub fn null() -> ChannelType {
  let null = NullChannel {};
  null.into()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn square_alternates_each_half_period() {
    assert_eq!(square(0.0, 100.0, 0.0), 1.0);
    assert_eq!(square(0.004, 100.0, 0.0), 1.0);
    assert_eq!(square(0.006, 100.0, 0.0), -1.0);
    assert_eq!(square(0.011, 100.0, 0.0), 1.0);
  }

  #[test]
  fn triangle_spans_full_range() {
    assert_eq!(triangle(0.0, 1.0, 0.0), -1.0);
    assert_eq!(triangle(0.25, 1.0, 0.0), 0.0);
    assert_eq!(triangle(0.5, 1.0, 0.0), 1.0);
    assert_eq!(triangle(0.75, 1.0, 0.0), 0.0);
  }

  #[test]
  fn null_channel_is_silent() {
    let mut dmc = null();
    assert_eq!(dmc.sample(&ApuState::default(), 0.5, 44_100.0), None);
  }

  #[test]
  fn active_skips_silent_voices() {
    let mut samples = VoiceSamples::default();
    samples.set(Voice::Pulse2, Some(1.0));
    samples.set(Voice::Noise, Some(-0.5));
    let active: Vec<_> = samples.active().collect();
    assert_eq!(active, vec![(Voice::Pulse2, 1.0), (Voice::Noise, -0.5)]);
  }
}

use enum_dispatch::enum_dispatch;

use crate::nes::apu::channel::{Voice, VoiceSamples};

/// Weighted sum of every voice, silent voices contributing zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedGain;

/// Arithmetic mean of the voices currently sounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveMean;

#[enum_dispatch]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixStrategy {
  FixedGain,
  ActiveMean,
}

#[enum_dispatch(MixStrategy)]
pub trait Mixer {
  /// Mixed level, nominally in [-1, 1].
  fn mix(&self, voices: &VoiceSamples) -> f64;
}

impl Default for MixStrategy {
  fn default() -> Self {
    FixedGain.into()
  }
}

impl Mixer for FixedGain {
  fn mix(&self, voices: &VoiceSamples) -> f64 {
    Voice::ALL.iter()
      .map(|&voice| voices.get(voice).unwrap_or(0.0) * voice.gain())
      .sum()
  }
}

impl Mixer for ActiveMean {
  fn mix(&self, voices: &VoiceSamples) -> f64 {
    let (sum, count) = voices.active()
      .fold((0.0, 0usize), |(sum, count), (_, sample)| (sum + sample, count + 1));
    if count == 0 {
      0.0
    }
    else {
      sum / count as f64
    }
  }
}

/// Scales a mixed level to signed 16-bit, clipping at the representable bounds.
pub fn to_pcm(level: f64) -> i16 {
  (level * i16::MAX as f64).clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
  use super::*;

  fn samples(values: &[(Voice, f64)]) -> VoiceSamples {
    let mut samples = VoiceSamples::default();
    for &(voice, value) in values {
      samples.set(voice, Some(value));
    }
    samples
  }

  #[test]
  fn fixed_gain_weights_each_voice() {
    let voices = samples(&[(Voice::Pulse1, 1.0), (Voice::Pulse2, 1.0), (Voice::Triangle, -1.0), (Voice::Noise, 0.5)]);
    let expected = (1.0 + 1.0) * 0.0752 - 0.0851 + 0.5 * 0.0494;
    assert!((MixStrategy::default().mix(&voices) - expected).abs() < 1e-12);
  }

  #[test]
  fn active_mean_ignores_silent_voices() {
    let mix: MixStrategy = ActiveMean.into();
    assert_eq!(mix.mix(&samples(&[(Voice::Pulse1, 1.0), (Voice::Triangle, 0.0)])), 0.5);
    assert_eq!(mix.mix(&VoiceSamples::default()), 0.0);
  }

  #[test]
  fn strategies_differ() {
    let voices = samples(&[(Voice::Pulse1, 1.0)]);
    let fixed: MixStrategy = FixedGain.into();
    let mean: MixStrategy = ActiveMean.into();
    assert_ne!(fixed.mix(&voices), mean.mix(&voices));
  }

  #[test]
  fn pcm_conversion_clips() {
    assert_eq!(to_pcm(0.0), 0);
    assert_eq!(to_pcm(1.0), i16::MAX);
    assert_eq!(to_pcm(3.0), i16::MAX);
    assert_eq!(to_pcm(-3.0), i16::MIN);
    assert_eq!(to_pcm(0.0752), 2464);
  }
}

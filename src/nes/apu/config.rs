use std::time::Duration;

use crate::nes::apu::{
  mixer::MixStrategy,
  sink::AudioError,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoiseKind {
  /// 15-bit shift register clocked from the $400E period.
  #[default]
  Lfsr,
  /// Seeded uniform values in [-1, 1].
  Uniform,
}

/// Output format and synthesis policy of the audio sink.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioConfig {
  pub sample_rate: u32,
  pub channels: u8,
  pub bits_per_sample: u16,
  /// Size of one ring buffer in bytes (two bytes per sample).
  pub buffer_bytes: usize,
  pub buffer_count: usize,
  pub mix: MixStrategy,
  pub noise: NoiseKind,
  pub noise_seed: u64,
}

impl Default for AudioConfig {
  fn default() -> Self {
    Self {
      sample_rate: 44_100,
      channels: 1,
      bits_per_sample: 16,
      buffer_bytes: 1024,
      buffer_count: 2,
      mix: MixStrategy::default(),
      noise: NoiseKind::default(),
      noise_seed: 0x4E45_5300,
    }
  }
}

impl AudioConfig {
  pub fn samples_per_buffer(&self) -> usize {
    self.buffer_bytes / 2
  }

  /// Time one buffer takes to play, which is also the budget for refilling the next one.
  pub fn deadline(&self) -> Duration {
    Duration::from_secs_f64(self.samples_per_buffer() as f64 / self.sample_rate as f64)
  }

  pub fn validate(&self) -> Result<(), AudioError> {
    if self.sample_rate == 0 {
      return Err(AudioError::InvalidConfig("sample rate must be non-zero".to_string()));
    }
    if self.channels != 1 || self.bits_per_sample != 16 {
      return Err(AudioError::InvalidConfig(format!(
        "only mono 16-bit output is produced, got {} channel(s) at {} bits",
        self.channels, self.bits_per_sample,
      )));
    }
    if self.buffer_bytes == 0 || self.buffer_bytes % 2 != 0 {
      return Err(AudioError::InvalidConfig(format!(
        "buffer size must be a non-zero even number of bytes, got {}", self.buffer_bytes,
      )));
    }
    if self.buffer_count < 2 {
      return Err(AudioError::InvalidConfig(format!(
        "at least two buffers are needed to keep playback fed, got {}", self.buffer_count,
      )));
    }
    Ok(())
  }
}

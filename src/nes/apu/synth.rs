use crate::nes::apu::{
  ApuState,
  channel::{self, Channel, ChannelType, Voice, VoiceSamples},
  channel::pulse::Pulse,
  channel::triangle::Triangle,
  channel::noise::{Noise, NoiseSource},
  config::AudioConfig,
  mixer::{to_pcm, MixStrategy, Mixer},
};

/// Turns register snapshots into 16-bit little-endian mono PCM.
///
/// Time only moves forward: it advances by one sample period per sample and is
/// never reset between passes, so waveforms stay phase-continuous across buffers.
pub struct Synthesizer {
  channels: [ChannelType; 5],
  mix: MixStrategy,
  sample_rate: f64,
  samples_elapsed: u64,
}

impl Synthesizer {
  pub fn new(config: &AudioConfig) -> Self {
    Self {
      // same order as `Voice::ALL`
      channels: [
        Pulse::pulse1(),
        Pulse::pulse2(),
        Triangle::new(),
        Noise::new(NoiseSource::from_kind(config.noise, config.noise_seed)),
        channel::null(),
      ],
      mix: config.mix,
      sample_rate: config.sample_rate as f64,
      samples_elapsed: 0,
    }
  }

  pub fn time(&self) -> f64 {
    self.samples_elapsed as f64 / self.sample_rate
  }

  pub fn samples_elapsed(&self) -> u64 {
    self.samples_elapsed
  }

  pub fn voices(&mut self, state: &ApuState) -> VoiceSamples {
    let time = self.time();
    let mut voices = VoiceSamples::default();
    for voice in Voice::ALL {
      voices.set(voice, self.channels[voice.index()].sample(state, time, self.sample_rate));
    }
    voices
  }

  pub fn next_sample(&mut self, state: &ApuState) -> i16 {
    let voices = self.voices(state);
    self.samples_elapsed += 1;
    to_pcm(self.mix.mix(&voices))
  }

  /// Fills `out` with as many samples as it holds, two bytes each.
  pub fn fill(&mut self, state: &ApuState, out: &mut [u8]) {
    for frame in out.chunks_exact_mut(2) {
      frame.copy_from_slice(&self.next_sample(state).to_le_bytes());
    }
  }
}

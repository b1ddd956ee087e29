use std::sync::Arc;
use log::info;
use sdl2::AudioSubsystem;
use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

use crate::nes::apu::{
  SharedApuState,
  config::AudioConfig,
  sink::{AudioError, AudioSink, PlaybackQueue, SinkStats},
};

pub struct SinkCallback {
  sink: AudioSink<PlaybackQueue>,
}

impl AudioCallback for SinkCallback {
  type Channel = i16;

  fn callback(&mut self, out: &mut [i16]) {
    self.sink.render(out);
  }
}

/// An open SDL playback device driven by an `AudioSink`. The device is closed
/// when this is dropped.
pub struct SdlAudioOutput {
  device: AudioDevice<SinkCallback>,
  stats: Arc<SinkStats>,
}

impl SdlAudioOutput {
  pub fn open(audio: &AudioSubsystem, config: &AudioConfig, state: SharedApuState) -> Result<Self, AudioError> {
    let mut sink = AudioSink::new(config, state, PlaybackQueue::default())?;
    sink.start()?;
    let stats = sink.stats();

    let desired = AudioSpecDesired {
      freq: Some(config.sample_rate as i32),
      channels: Some(config.channels),
      samples: Some(config.samples_per_buffer() as u16),
    };
    let device = audio.open_playback(None, &desired, |spec| {
      info!("audio device opened: {} Hz, {} channel(s), {} samples per callback", spec.freq, spec.channels, spec.samples);
      SinkCallback { sink }
    }).map_err(AudioError::Backend)?;

    Ok(Self {
      device,
      stats,
    })
  }

  pub fn start(&self) {
    self.device.resume();
  }

  pub fn stop(&self) {
    self.device.pause();
  }

  pub fn stats(&self) -> Arc<SinkStats> {
    Arc::clone(&self.stats)
  }
}

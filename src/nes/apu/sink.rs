use std::fmt;
use std::error::Error;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use log::{error, info, warn};

use crate::nes::apu::{
  SharedApuState,
  config::AudioConfig,
  synth::Synthesizer,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
  InvalidConfig(String),
  Backend(String),
}

impl fmt::Display for AudioError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AudioError::InvalidConfig(msg) => write!(f, "invalid audio config: {}", msg),
      AudioError::Backend(msg) => write!(f, "audio backend error: {}", msg),
    }
  }
}

impl Error for AudioError {}

/// The platform side of the sink: plays buffers handed to it and later
/// reports each one as consumed through `AudioSink::on_buffer_consumed`.
pub trait AudioBackend {
  fn submit(&mut self, slot: usize, pcm: &[u8]) -> Result<(), AudioError>;

  fn start(&mut self) -> Result<(), AudioError> {
    Ok(())
  }

  fn stop(&mut self) -> Result<(), AudioError> {
    Ok(())
  }
}

/// Counters readable from any thread while the sink runs.
#[derive(Debug, Default)]
pub struct SinkStats {
  buffers_filled: AtomicU64,
  deadline_misses: AtomicU64,
  submit_failures: AtomicU64,
}

impl SinkStats {
  pub fn buffers_filled(&self) -> u64 {
    self.buffers_filled.load(Ordering::Relaxed)
  }

  /// Refills that took longer than one buffer of playback, each an audible dropout.
  pub fn deadline_misses(&self) -> u64 {
    self.deadline_misses.load(Ordering::Relaxed)
  }

  pub fn submit_failures(&self) -> u64 {
    self.submit_failures.load(Ordering::Relaxed)
  }

  fn record_fill(&self, elapsed: Duration, deadline: Duration) {
    self.buffers_filled.fetch_add(1, Ordering::Relaxed);
    if elapsed > deadline {
      let misses = self.deadline_misses.fetch_add(1, Ordering::Relaxed) + 1;
      warn!("audio refill took {:?}, budget is {:?} ({} misses so far)", elapsed, deadline, misses);
    }
  }
}

/// Ring of fixed-size PCM buffers kept in flight on a backend.
///
/// Every buffer is submitted once as silence by `start`. After that each
/// "buffer consumed" signal synthesizes one buffer from the latest APU state,
/// resubmits the slot under the cursor, and moves the cursor on.
pub struct AudioSink<B: AudioBackend> {
  backend: B,
  state: SharedApuState,
  synth: Synthesizer,
  buffers: Vec<Vec<u8>>,
  scratch: Vec<u8>,
  index: usize,
  deadline: Duration,
  stats: Arc<SinkStats>,
  running: bool,
}

impl<B: AudioBackend> AudioSink<B> {
  pub fn new(config: &AudioConfig, state: SharedApuState, backend: B) -> Result<Self, AudioError> {
    config.validate()?;
    Ok(Self {
      backend,
      state,
      synth: Synthesizer::new(config),
      buffers: vec![vec![0; config.buffer_bytes]; config.buffer_count],
      scratch: vec![0; config.buffer_bytes],
      index: 0,
      deadline: config.deadline(),
      stats: Arc::new(SinkStats::default()),
      running: false,
    })
  }

  /// Primes every buffer with silence and starts playback.
  pub fn start(&mut self) -> Result<(), AudioError> {
    if self.running {
      return Ok(());
    }
    for (slot, buffer) in self.buffers.iter_mut().enumerate() {
      buffer.fill(0);
      self.backend.submit(slot, buffer)?;
    }
    self.index = 0;
    self.backend.start()?;
    self.running = true;
    info!("audio sink started: {} buffers of {} bytes", self.buffers.len(), self.scratch.len());
    Ok(())
  }

  pub fn stop(&mut self) -> Result<(), AudioError> {
    if !self.running {
      return Ok(());
    }
    self.running = false;
    self.backend.stop()?;
    info!("audio sink stopped after {} buffers", self.stats.buffers_filled());
    Ok(())
  }

  /// Refills and resubmits the buffer under the cursor.
  ///
  /// A failed submission is counted and returned, but the cursor still moves:
  /// the next signal carries on with the next slot. Signals arriving while the
  /// sink is not running are ignored.
  pub fn on_buffer_consumed(&mut self) -> Result<(), AudioError> {
    if !self.running {
      return Ok(());
    }
    let started = Instant::now();
    let state = self.state.snapshot();
    self.synth.fill(&state, &mut self.scratch);

    let slot = self.index;
    self.buffers[slot].copy_from_slice(&self.scratch);
    self.index = (self.index + 1) % self.buffers.len();
    let submitted = self.backend.submit(slot, &self.buffers[slot]);

    self.stats.record_fill(started.elapsed(), self.deadline);
    if let Err(err) = &submitted {
      self.stats.submit_failures.fetch_add(1, Ordering::Relaxed);
      error!("failed to resubmit audio buffer {}: {}", slot, err);
    }
    submitted
  }

  pub fn is_running(&self) -> bool {
    self.running
  }

  pub fn current_index(&self) -> usize {
    self.index
  }

  pub fn buffer(&self, slot: usize) -> &[u8] {
    &self.buffers[slot]
  }

  pub fn stats(&self) -> Arc<SinkStats> {
    Arc::clone(&self.stats)
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  pub fn backend_mut(&mut self) -> &mut B {
    &mut self.backend
  }
}

impl<B: AudioBackend> Drop for AudioSink<B> {
  fn drop(&mut self) {
    if let Err(err) = self.stop() {
      error!("failed to stop audio backend: {}", err);
    }
  }
}

/// Submitted buffers waiting to be drained by a pull-style audio callback.
#[derive(Debug, Default)]
pub struct PlaybackQueue {
  pending: VecDeque<Vec<i16>>,
  spare: Vec<Vec<i16>>,
  cursor: usize,
}

impl AudioBackend for PlaybackQueue {
  fn submit(&mut self, _slot: usize, pcm: &[u8]) -> Result<(), AudioError> {
    let mut samples = self.spare.pop().unwrap_or_default();
    samples.clear();
    samples.extend(pcm.chunks_exact(2).map(|b| i16::from_le_bytes([b[0], b[1]])));
    self.pending.push_back(samples);
    Ok(())
  }
}

impl PlaybackQueue {
  pub fn queued(&self) -> usize {
    self.pending.len()
  }

  /// Copies queued samples into `out`. Returns how many were written and
  /// whether the front buffer ran out.
  fn drain_into(&mut self, out: &mut [i16]) -> (usize, bool) {
    let Some(front) = self.pending.front() else {
      return (0, false);
    };
    let n = (front.len() - self.cursor).min(out.len());
    out[..n].copy_from_slice(&front[self.cursor..self.cursor + n]);
    let finished = self.cursor + n == front.len();
    self.cursor += n;
    if finished {
      if let Some(done) = self.pending.pop_front() {
        self.spare.push(done);
      }
      self.cursor = 0;
    }
    (n, finished)
  }
}

impl AudioSink<PlaybackQueue> {
  /// Fills `out` from the queue. Every buffer that runs dry on the way is
  /// reported through `on_buffer_consumed`; once nothing is queued the rest
  /// of `out` is silence.
  pub fn render(&mut self, out: &mut [i16]) {
    let mut written = 0;
    while written < out.len() {
      let (n, finished) = self.backend.drain_into(&mut out[written..]);
      written += n;
      if finished {
        if let Err(err) = self.on_buffer_consumed() {
          error!("{}", err);
        }
      }
      else if n == 0 {
        out[written..].fill(0);
        break;
      }
    }
  }
}

/// Backend that keeps every submission in memory. Used by tests and
/// offline rendering.
#[derive(Debug, Default)]
pub struct MemoryBackend {
  pub submissions: Vec<(usize, Vec<u8>)>,
  pub started: bool,
  pub stopped: bool,
  pub fail_submissions: bool,
}

impl AudioBackend for MemoryBackend {
  fn submit(&mut self, slot: usize, pcm: &[u8]) -> Result<(), AudioError> {
    if self.fail_submissions {
      return Err(AudioError::Backend("submission rejected".to_string()));
    }
    self.submissions.push((slot, pcm.to_vec()));
    Ok(())
  }

  fn start(&mut self) -> Result<(), AudioError> {
    self.started = true;
    Ok(())
  }

  fn stop(&mut self) -> Result<(), AudioError> {
    self.stopped = true;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::nes::apu::{
    APU,
    register::*,
    synth::Synthesizer,
  };

  fn sink(apu: &APU) -> AudioSink<MemoryBackend> {
    AudioSink::new(&AudioConfig::default(), apu.shared_state(), MemoryBackend::default()).unwrap()
  }

  #[test]
  fn start_submits_silence_in_every_slot() {
    let apu = APU::new();
    let mut sink = sink(&apu);
    sink.start().unwrap();
    let backend = sink.backend();
    assert!(backend.started);
    assert_eq!(backend.submissions.len(), 2);
    assert_eq!(backend.submissions[0].0, 0);
    assert_eq!(backend.submissions[1].0, 1);
    assert!(backend.submissions.iter().all(|(_, pcm)| pcm.len() == 1024 && pcm.iter().all(|&b| b == 0)));
  }

  #[test]
  fn slots_rotate_round_robin() {
    let apu = APU::new();
    let config = AudioConfig { buffer_count: 3, ..AudioConfig::default() };
    let mut sink = AudioSink::new(&config, apu.shared_state(), MemoryBackend::default()).unwrap();
    sink.start().unwrap();
    for _ in 0..7 {
      sink.on_buffer_consumed().unwrap();
    }
    let slots: Vec<usize> = sink.backend().submissions[3..].iter().map(|(slot, _)| *slot).collect();
    assert_eq!(slots, vec![0, 1, 2, 0, 1, 2, 0]);
    assert_eq!(sink.current_index(), 1);
    assert_eq!(sink.stats().buffers_filled(), 7);
  }

  #[test]
  fn every_pass_has_the_configured_length() {
    let mut apu = APU::new();
    let mut sink = sink(&apu);
    sink.start().unwrap();
    sink.on_buffer_consumed().unwrap();
    apu.write_register(CHANNEL_ENABLE, 0x0F);
    apu.write_register(PULSE1_PERIOD_LOW, 0x40);
    apu.write_register(PULSE1_PERIOD_HIGH, 0x08);
    apu.write_register(NOISE_PERIOD_HIGH, 0x08);
    sink.on_buffer_consumed().unwrap();
    for (_, pcm) in &sink.backend().submissions {
      assert_eq!(pcm.len(), 1024);
    }
  }

  #[test]
  fn refill_uses_the_latest_register_state() {
    let mut apu = APU::new();
    let mut sink = sink(&apu);
    sink.start().unwrap();
    sink.on_buffer_consumed().unwrap();
    assert!(sink.buffer(0).iter().all(|&b| b == 0));

    apu.write_register(CHANNEL_ENABLE, ENABLE_PULSE1);
    apu.write_register(PULSE1_PERIOD_LOW, 0x20);
    apu.write_register(PULSE1_PERIOD_HIGH, 0x08);
    sink.on_buffer_consumed().unwrap();
    assert!(sink.buffer(1).iter().any(|&b| b != 0));
  }

  #[test]
  fn failed_submission_is_counted_and_cursor_moves_on() {
    let apu = APU::new();
    let mut sink = sink(&apu);
    sink.start().unwrap();
    sink.backend_mut().fail_submissions = true;
    assert!(sink.on_buffer_consumed().is_err());
    assert_eq!(sink.current_index(), 1);
    assert_eq!(sink.stats().submit_failures(), 1);

    sink.backend_mut().fail_submissions = false;
    assert!(sink.on_buffer_consumed().is_ok());
    assert_eq!(sink.current_index(), 0);
  }

  #[test]
  fn slow_refills_count_as_deadline_misses() {
    let stats = SinkStats::default();
    stats.record_fill(Duration::from_millis(20), Duration::from_millis(11));
    stats.record_fill(Duration::from_millis(2), Duration::from_millis(11));
    assert_eq!(stats.buffers_filled(), 2);
    assert_eq!(stats.deadline_misses(), 1);
  }

  #[test]
  fn invalid_config_is_rejected() {
    let apu = APU::new();
    let config = AudioConfig { buffer_count: 0, ..AudioConfig::default() };
    assert!(AudioSink::new(&config, apu.shared_state(), MemoryBackend::default()).is_err());
  }

  #[test]
  fn stop_is_idempotent() {
    let apu = APU::new();
    let mut sink = sink(&apu);
    sink.start().unwrap();
    sink.stop().unwrap();
    assert!(sink.backend().stopped);
    assert!(!sink.is_running());
    sink.stop().unwrap();
  }

  #[test]
  fn signals_outside_start_and_stop_are_ignored() {
    let apu = APU::new();
    let mut sink = sink(&apu);
    sink.on_buffer_consumed().unwrap();
    assert!(sink.backend().submissions.is_empty());

    sink.start().unwrap();
    sink.stop().unwrap();
    sink.on_buffer_consumed().unwrap();
    assert_eq!(sink.backend().submissions.len(), 2);
    assert_eq!(sink.current_index(), 0);
    assert_eq!(sink.stats().buffers_filled(), 0);
  }

  fn tiny_config() -> AudioConfig {
    // four samples per buffer
    AudioConfig { buffer_bytes: 8, ..AudioConfig::default() }
  }

  fn audible_apu() -> APU {
    let mut apu = APU::new();
    apu.write_register(CHANNEL_ENABLE, ENABLE_PULSE1);
    apu.write_register(PULSE1_PERIOD_LOW, 0x20);
    apu.write_register(PULSE1_PERIOD_HIGH, 0x08);
    apu
  }

  #[test]
  fn partial_drain_does_not_signal() {
    let apu = audible_apu();
    let mut sink = AudioSink::new(&tiny_config(), apu.shared_state(), PlaybackQueue::default()).unwrap();
    sink.start().unwrap();

    let mut out = [0x55i16; 3];
    sink.render(&mut out);
    assert_eq!(out, [0; 3]);
    assert_eq!(sink.stats().buffers_filled(), 0);

    sink.render(&mut out[..1]);
    assert_eq!(sink.stats().buffers_filled(), 1);
    assert_eq!(sink.backend().queued(), 2);
  }

  #[test]
  fn drain_across_buffers_signals_each_in_order() {
    let apu = audible_apu();
    let config = tiny_config();
    let mut sink = AudioSink::new(&config, apu.shared_state(), PlaybackQueue::default()).unwrap();
    sink.start().unwrap();

    // the two primed buffers are silence
    let mut out = [0x55i16; 8];
    sink.render(&mut out);
    assert_eq!(out, [0; 8]);
    assert_eq!(sink.stats().buffers_filled(), 2);
    assert_eq!(sink.current_index(), 0);

    let mut expected = [0u8; 16];
    Synthesizer::new(&config).fill(&apu.snapshot(), &mut expected);
    let expected: Vec<i16> = expected.chunks_exact(2).map(|b| i16::from_le_bytes([b[0], b[1]])).collect();

    sink.render(&mut out);
    assert_eq!(&out[..], &expected[..]);
    assert!(out.iter().any(|&s| s != 0));
    assert_eq!(sink.stats().buffers_filled(), 4);
  }

  #[test]
  fn empty_queue_plays_silence() {
    let apu = audible_apu();
    let mut sink = AudioSink::new(&tiny_config(), apu.shared_state(), PlaybackQueue::default()).unwrap();
    let mut out = [0x55i16; 6];
    sink.render(&mut out);
    assert_eq!(out, [0; 6]);
    assert_eq!(sink.stats().buffers_filled(), 0);

    // stopped: whatever is queued plays out, then silence
    sink.start().unwrap();
    sink.stop().unwrap();
    let mut out = [0x55i16; 12];
    sink.render(&mut out);
    assert_eq!(out, [0; 12]);
    assert_eq!(sink.backend().queued(), 0);
  }
}

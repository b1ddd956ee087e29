//! NES audio core: the memory-mapped device bus, the APU register file and
//! length timers, and a double-buffered PCM sink fed by a real-time synthesizer.
//!
//! The emulation thread owns an [`APU`](nes::apu::APU) and writes registers or
//! ticks timers through it; the audio thread owns an
//! [`AudioSink`](nes::apu::sink::AudioSink) that reads the shared state once
//! per buffer.

pub mod nes;

pub use nes::Nes;
pub use nes::apu::{APU, ApuState, SharedApuState};
pub use nes::apu::config::AudioConfig;
pub use nes::apu::sink::{AudioBackend, AudioError, AudioSink};
pub use nes::bus::{Addressable, BusError};

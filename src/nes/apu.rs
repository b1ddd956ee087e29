pub mod register;
pub mod timer;
pub mod channel;
pub mod mixer;
pub mod config;
pub mod synth;
pub mod sink;
#[cfg(feature = "sdl")]
pub mod sdl;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use log::debug;

use crate::nes::{
  bus::{Addressable, AddressSpace, BusError, ReadHandler, WriteHandler},
  clock::Clock,
};
use register::{RegisterFile, REGISTER_COUNT};
use timer::{ChannelTimers, Sequencer, TickStrategy, TimerSlot};

/// NTSC 2A03 clock.
pub const CPU_CLOCK_HZ: f64 = 1_789_773.0;

/// Everything the synthesizer needs to know about the channels at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApuState {
  pub registers: RegisterFile,
  pub timers: ChannelTimers,
}

/// Register and timer state shared between the emulation thread and the audio
/// callback.
///
/// The emulation side holds the lock for one register write or one tick; the
/// audio side holds it only long enough to copy an `ApuState` out, so neither
/// side waits on the other's real work and a multi-byte period is never read
/// half-written.
#[derive(Debug, Clone, Default)]
pub struct SharedApuState(Arc<Mutex<ApuState>>);

impl SharedApuState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn snapshot(&self) -> ApuState {
    *self.lock()
  }

  fn lock(&self) -> MutexGuard<'_, ApuState> {
    // the state is plain bytes, a panic elsewhere cannot leave it torn
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApuPort {
  Registers,
}

pub struct APU {
  state: SharedApuState,
  tick_strategy: TickStrategy,
  space: AddressSpace<ApuPort>,
}

impl Default for APU {
  fn default() -> Self {
    Self::new()
  }
}

impl APU {
  /// $4000-$401F.
  pub const ADDRESS_BITS: u32 = 5;

  pub fn new() -> Self {
    Self::with_tick_strategy(TickStrategy::default())
  }

  pub fn with_tick_strategy(tick_strategy: TickStrategy) -> Self {
    let mut apu = Self {
      state: SharedApuState::new(),
      tick_strategy,
      space: AddressSpace::new(Self::ADDRESS_BITS),
    };
    apu.initialize_memory_map();
    apu
  }

  fn initialize_memory_map(&mut self) {
    for reg in 0..REGISTER_COUNT {
      self.space.set_read_handler(reg, ReadHandler::Port(ApuPort::Registers));
      self.space.set_write_handler(reg, WriteHandler::Port(ApuPort::Registers));
    }
  }

  /// Stores `value` and reloads the matching channel timer, if any.
  ///
  /// # Panics
  /// If `reg` is not below `REGISTER_COUNT`.
  pub fn write_register(&mut self, reg: usize, value: u8) {
    let mut state = self.state.lock();
    state.registers.write(reg, value);
    if let Some(slot) = state.timers.on_register_write(reg, value) {
      debug!("APU {:#06x} = {:#04x}: {:?} timer reloaded to {}", 0x4000 + reg, value, slot, state.timers.get(slot));
    }
  }

  /// Returns the last byte written, status bits are not synthesized.
  pub fn read_register(&self, reg: usize) -> u8 {
    self.state.lock().registers.read(reg)
  }

  /// Advances every channel timer by one unit. Called by the video clock.
  pub fn tick(&mut self) {
    let mut state = self.state.lock();
    let ApuState { registers, timers } = &mut *state;
    self.tick_strategy.step(timers, registers);
  }

  pub fn timer(&self, slot: TimerSlot) -> u32 {
    self.state.lock().timers.get(slot)
  }

  pub fn snapshot(&self) -> ApuState {
    self.state.snapshot()
  }

  /// Handle for the audio callback side.
  pub fn shared_state(&self) -> SharedApuState {
    self.state.clone()
  }
}

impl Clock<()> for APU {
  fn tick(&mut self) {
    APU::tick(self)
  }
}

impl Addressable for APU {
  type Port = ApuPort;

  fn address_space(&self) -> &AddressSpace<ApuPort> {
    &self.space
  }

  fn address_space_mut(&mut self) -> &mut AddressSpace<ApuPort> {
    &mut self.space
  }

  fn read_port(&mut self, port: ApuPort, addr: usize) -> Result<u8, BusError> {
    match port {
      ApuPort::Registers => Ok(self.read_register(addr)),
    }
  }

  fn write_port(&mut self, port: ApuPort, addr: usize, value: u8) {
    match port {
      ApuPort::Registers => self.write_register(addr, value),
    }
  }
}

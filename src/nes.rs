pub mod apu;
pub mod bus;
pub mod clock;
pub mod controller;
pub mod io;

use apu::{APU, SharedApuState, timer::TickStrategy};
use bus::{Addressable, BusError};
use clock::{Clock, SlaveClock};
use controller::{ControllerType, InputContext};
use io::IoRegisters;

/// The slice of the console this crate emulates: the $4000-$401F window and
/// the video-clock driven APU timers. CPU, PPU and cartridge drive it from outside.
pub struct Nes {
  io: IoRegisters,
  apu_clock: SlaveClock,
  input: InputContext,
}

impl Nes {
  pub fn new(controllers: [ControllerType; 2]) -> Self {
    Self::with_tick_strategy(controllers, TickStrategy::default())
  }

  pub fn with_tick_strategy(controllers: [ControllerType; 2], tick_strategy: TickStrategy) -> Self {
    Self {
      io: IoRegisters::new(APU::with_tick_strategy(tick_strategy), controllers),
      apu_clock: SlaveClock::quarter_frame(),
      input: InputContext::new(),
    }
  }

  /// Replaces the PPU-dot divider that paces APU ticks.
  pub fn set_apu_clock(&mut self, apu_clock: SlaveClock) {
    self.apu_clock = apu_clock;
  }

  pub fn reset(&mut self) {
    self.apu_clock.reset();
  }

  /// One PPU dot. Returns true when it also ticked the APU timers.
  pub fn tick(&mut self) -> bool {
    let fired = self.apu_clock.tick();
    if fired {
      self.io.apu_mut().tick();
    }
    fired
  }

  pub fn tick_n(&mut self, t: u32) {
    for _t in 0..t {
      self.tick();
    }
  }

  pub fn cpu_read(&mut self, addr: u16) -> Result<u8, BusError> {
    self.io.read_byte(addr as usize)
  }

  pub fn cpu_write(&mut self, addr: u16, value: u8) {
    self.io.write_byte(addr as usize, value)
  }

  pub fn input(&self) -> &InputContext {
    &self.input
  }

  pub fn input_mut(&mut self) -> &mut InputContext {
    &mut self.input
  }

  /// Hands the host input to the controllers, once per frame.
  pub fn update_input(&mut self) {
    self.io.update_controllers(&self.input);
  }

  pub fn apu(&self) -> &APU {
    self.io.apu()
  }

  /// Shared state for the audio callback thread.
  pub fn audio_state(&self) -> SharedApuState {
    self.io.apu().shared_state()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use apu::timer::{TimerSlot, TIMER_SCALE};
  use controller::{basic::StandardController, Buttons};

  fn nes() -> Nes {
    Nes::new([StandardController::new(0), StandardController::new(1)])
  }

  #[test]
  fn apu_ticks_once_per_quarter_frame_of_dots() {
    let mut nes = nes();
    nes.cpu_write(0x400F, 0x18);
    let start = nes.apu().timer(TimerSlot::Noise);
    assert_eq!(start, 2 * TIMER_SCALE);

    nes.tick_n(22371 - 1);
    assert_eq!(nes.apu().timer(TimerSlot::Noise), start);
    assert!(nes.tick());
    assert_eq!(nes.apu().timer(TimerSlot::Noise), start - 1);
  }

  #[test]
  fn faster_divider_for_tests_and_fast_forward() {
    let mut nes = nes();
    nes.set_apu_clock(SlaveClock::new(1));
    nes.cpu_write(0x4008, 0x03);
    nes.tick_n(3 * TIMER_SCALE);
    assert_eq!(nes.apu().timer(TimerSlot::TriangleLinear), 0);
  }

  #[test]
  fn input_reaches_the_pads() {
    let mut nes = nes();
    nes.input_mut().set_buttons(1, Buttons::A);
    nes.update_input();
    nes.cpu_write(0x4016, 1);
    assert_eq!(nes.cpu_read(0x4017), Ok(1));
    assert_eq!(nes.cpu_read(0x4016), Ok(0));
  }
}

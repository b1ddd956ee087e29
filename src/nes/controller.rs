pub mod basic;
#[cfg(feature = "sdl")]
pub mod keyboard;
#[cfg(feature = "sdl")]
pub mod gamepad;

use bitflags::bitflags;
use enum_dispatch::enum_dispatch;

use basic::StandardController;

bitflags! {
  /// Button bits in the order a standard pad shifts them out.
  #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
  pub struct Buttons: u8 {
    const A      = 0b0000_0001;
    const B      = 0b0000_0010;
    const SELECT = 0b0000_0100;
    const START  = 0b0000_1000;
    const UP     = 0b0001_0000;
    const DOWN   = 0b0010_0000;
    const LEFT   = 0b0100_0000;
    const RIGHT  = 0b1000_0000;
  }
}

pub const PORT_COUNT: usize = 2;

/// Host input state for both ports.
///
/// Built once by the frontend and lent to every controller on update; there is
/// no process-wide input state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputContext {
  ports: [Buttons; PORT_COUNT],
}

impl InputContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn buttons(&self, port: usize) -> Buttons {
    self.ports[port]
  }

  pub fn set_buttons(&mut self, port: usize, buttons: Buttons) {
    self.ports[port] = buttons;
  }

  pub fn press(&mut self, port: usize, buttons: Buttons) {
    self.ports[port].insert(buttons);
  }

  pub fn release(&mut self, port: usize, buttons: Buttons) {
    self.ports[port].remove(buttons);
  }

  pub fn clear(&mut self) {
    self.ports = [Buttons::empty(); PORT_COUNT];
  }
}

/// Nothing plugged in; reads as zero.
#[derive(Debug, Clone)]
pub struct NullController {}

#[enum_dispatch]
#[derive(Debug, Clone)]
pub enum ControllerType {
  NullController,
  StandardController,
}

/// Serial device behind $4016/$4017.
#[enum_dispatch(ControllerType)]
pub trait Controller {
  fn update(&mut self, _input: &InputContext) {
  }
  fn read(&mut self) -> u8 {
    0
  }
  fn write(&mut self, _value: u8) {
  }
}

impl Controller for NullController {}

pub fn null() -> ControllerType {
  let null = NullController {};
  null.into()
}

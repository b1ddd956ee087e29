use crate::nes::controller::{Buttons, Controller, ControllerType, InputContext};

/// Standard pad: an 8-bit parallel-in serial-out shift register.
///
/// A write latches the current buttons and sets the strobe from bit 0. Each
/// read returns the low bit; while the strobe is low the register shifts right,
/// so eight reads walk A, B, Select, Start, Up, Down, Left, Right and further
/// reads return 0.
#[derive(Debug, Clone)]
pub struct StandardController {
  port: usize,
  state: Buttons,
  serial: u8,
  strobe: bool,
}

impl StandardController {
  pub fn new(port: usize) -> ControllerType {
    let new = Self {
      port,
      state: Buttons::empty(),
      serial: 0,
      strobe: false,
    };
    new.into()
  }
}

impl Controller for StandardController {
  fn update(&mut self, input: &InputContext) {
    self.state = input.buttons(self.port);
  }

  fn read(&mut self) -> u8 {
    let bit = self.serial & 1;
    if !self.strobe {
      self.serial >>= 1;
    }
    bit
  }

  fn write(&mut self, value: u8) {
    self.serial = self.state.bits();
    self.strobe = value & 1 != 0;
  }
}

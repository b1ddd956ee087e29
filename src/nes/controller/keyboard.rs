use sdl2::keyboard::{KeyboardState, Scancode};

use crate::nes::controller::{Buttons, InputContext};

/// Host keys to pad buttons for one port.
#[derive(Debug, Clone)]
pub struct KeyboardMap {
  port: usize,
  bindings: Vec<(Scancode, Buttons)>,
}

impl KeyboardMap {
  pub fn new(port: usize) -> Self {
    Self {
      port,
      bindings: vec![
        (Scancode::A, Buttons::A),
        (Scancode::S, Buttons::B),
        (Scancode::RShift, Buttons::SELECT),
        (Scancode::Return, Buttons::START),
        (Scancode::Up, Buttons::UP),
        (Scancode::Down, Buttons::DOWN),
        (Scancode::Left, Buttons::LEFT),
        (Scancode::Right, Buttons::RIGHT),
      ],
    }
  }

  /// Replaces the port's buttons with what is held on the keyboard right now.
  pub fn poll(&self, keyboard: &KeyboardState, input: &mut InputContext) {
    let buttons = self.bindings.iter()
      .filter(|(key, _)| keyboard.is_scancode_pressed(*key))
      .fold(Buttons::empty(), |held, (_, buttons)| held | *buttons);
    input.set_buttons(self.port, buttons);
  }
}

use sdl2::controller::{Axis, Button, GameController};

use crate::nes::controller::{Buttons, InputContext};

/// Stick deflection past which a direction counts as held.
pub const AXIS_THRESHOLD: i16 = 0x4000;

/// Host game controller to pad buttons for one port. Face buttons follow the
/// console layout (B left of A), the d-pad and left stick both steer.
#[derive(Debug, Clone)]
pub struct GamepadMap {
  port: usize,
  bindings: Vec<(Button, Buttons)>,
}

impl GamepadMap {
  pub fn new(port: usize) -> Self {
    Self {
      port,
      bindings: vec![
        (Button::A, Buttons::B),
        (Button::B, Buttons::A),
        (Button::Back, Buttons::SELECT),
        (Button::Start, Buttons::START),
        (Button::DPadUp, Buttons::UP),
        (Button::DPadDown, Buttons::DOWN),
        (Button::DPadLeft, Buttons::LEFT),
        (Button::DPadRight, Buttons::RIGHT),
      ],
    }
  }

  pub fn held(&self, button: impl Fn(Button) -> bool, axis: impl Fn(Axis) -> i16) -> Buttons {
    let mut held = self.bindings.iter()
      .filter(|(key, _)| button(*key))
      .fold(Buttons::empty(), |held, (_, buttons)| held | *buttons);

    let (x, y) = (axis(Axis::LeftX), axis(Axis::LeftY));
    held.set(Buttons::LEFT, held.contains(Buttons::LEFT) || x < -AXIS_THRESHOLD);
    held.set(Buttons::RIGHT, held.contains(Buttons::RIGHT) || x > AXIS_THRESHOLD);
    held.set(Buttons::UP, held.contains(Buttons::UP) || y < -AXIS_THRESHOLD);
    held.set(Buttons::DOWN, held.contains(Buttons::DOWN) || y > AXIS_THRESHOLD);
    held
  }

  /// Adds what is held on `pad` to the port, on top of any keyboard input.
  pub fn poll(&self, pad: &GameController, input: &mut InputContext) {
    input.press(self.port, self.held(|b| pad.button(b), |a| pad.axis(a)));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn face_buttons_follow_console_layout() {
    let map = GamepadMap::new(0);
    let held = map.held(|b| b == Button::A || b == Button::Start, |_| 0);
    assert_eq!(held, Buttons::B | Buttons::START);
  }

  #[test]
  fn left_stick_steers_past_the_threshold() {
    let map = GamepadMap::new(0);
    let held = map.held(|_| false, |a| match a {
      Axis::LeftX => i16::MIN,
      Axis::LeftY => AXIS_THRESHOLD + 1,
      _ => 0,
    });
    assert_eq!(held, Buttons::LEFT | Buttons::DOWN);

    let centered = map.held(|_| false, |a| if a == Axis::LeftX {AXIS_THRESHOLD} else {0});
    assert_eq!(centered, Buttons::empty());
  }

  #[test]
  fn dpad_and_stick_combine() {
    let map = GamepadMap::new(1);
    let held = map.held(|b| b == Button::DPadUp, |a| if a == Axis::LeftX {i16::MAX} else {0});
    assert_eq!(held, Buttons::UP | Buttons::RIGHT);
  }
}

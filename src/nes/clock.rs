/// CPU cycles between two quarter-frame clocks of the 2A03 frame sequencer.
pub const CPU_CYCLES_PER_QUARTER_FRAME: u32 = 7457;
pub const PPU_DOTS_PER_CPU_CYCLE: u32 = 3;

pub trait Clock<T> {
  fn tick(&mut self) -> T;

  fn tick_n(&mut self, t: u32) {
    for _ in 0..t {
      self.tick();
    }
  }
}

/// Divider: fires once every `div` ticks of its master clock.
#[derive(Debug, Clone)]
pub struct SlaveClock {
  pub div: u32,
  pub dec: u32,
}

impl SlaveClock {
  pub fn new(div: u32) -> Self{
    let div = div.max(1);
    SlaveClock {
      div,
      dec: div - 1,
    }
  }

  /// APU timer cadence derived from the PPU dot clock.
  pub fn quarter_frame() -> Self {
    Self::new(CPU_CYCLES_PER_QUARTER_FRAME * PPU_DOTS_PER_CPU_CYCLE)
  }

  pub fn reset(&mut self) {
    self.dec = self.div - 1;
  }
}

impl Clock<bool> for SlaveClock {
  fn tick(&mut self) -> bool {
    if self.dec == 0 {
      self.dec = self.div - 1;
      true
    }
    else {
      self.dec -= 1;
      false
    }
  }
}

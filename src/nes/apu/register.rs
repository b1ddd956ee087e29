use std::fmt;

pub const REGISTER_COUNT: usize = 0x18;

pub const PULSE1_CONTROL: usize = 0x00;
pub const PULSE1_PERIOD_LOW: usize = 0x02;
pub const PULSE1_PERIOD_HIGH: usize = 0x03;

pub const PULSE2_CONTROL: usize = 0x04;
pub const PULSE2_PERIOD_LOW: usize = 0x06;
pub const PULSE2_PERIOD_HIGH: usize = 0x07;

pub const TRIANGLE_CONTROL: usize = 0x08;
pub const TRIANGLE_PERIOD_LOW: usize = 0x0A;
pub const TRIANGLE_PERIOD_HIGH: usize = 0x0B;

pub const NOISE_CONTROL: usize = 0x0C;
pub const NOISE_PERIOD: usize = 0x0E;
pub const NOISE_PERIOD_HIGH: usize = 0x0F;

pub const CHANNEL_ENABLE: usize = 0x15;
pub const FRAME_COUNTER: usize = 0x17;

// $4015 bits
pub const ENABLE_PULSE1: u8 = 0b0000_0001;
pub const ENABLE_PULSE2: u8 = 0b0000_0010;
pub const ENABLE_TRIANGLE: u8 = 0b0000_0100;
pub const ENABLE_NOISE: u8 = 0b0000_1000;

/// Raw bytes of $4000-$4017, exactly as last written.
///
/// Nothing is masked and nothing is synthesized on read: $4015 returns the
/// last enable mask written rather than live channel status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterFile {
  data: [u8; REGISTER_COUNT],
}

impl fmt::Display for RegisterFile {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for (reg, value) in self.data.iter().enumerate() {
      if reg > 0 {
        write!(f, " ")?;
      }
      write!(f, "{:02X}", value)?;
    }
    Ok(())
  }
}

impl Default for RegisterFile {
  fn default() -> Self {
    Self::new()
  }
}

impl RegisterFile {
  pub fn new() -> Self {
    Self {
      data: [0; REGISTER_COUNT],
    }
  }

  /// # Panics
  /// If `reg` is not below `REGISTER_COUNT`; the bus masks addresses first.
  pub fn read(&self, reg: usize) -> u8 {
    self.data[reg]
  }

  /// # Panics
  /// If `reg` is not below `REGISTER_COUNT`.
  pub fn write(&mut self, reg: usize, value: u8) {
    self.data[reg] = value;
  }

  pub fn flag(&self, reg: usize, mask: u8) -> bool {
    self.data[reg] & mask != 0
  }

  pub fn channel_enabled(&self, mask: u8) -> bool {
    self.flag(CHANNEL_ENABLE, mask)
  }

  /// 11-bit timer period: the low register plus bits 0-2 of the register after it.
  pub fn period(&self, low: usize) -> u16 {
    let high = (self.data[low + 1] & 0b0000_0111) as u16;
    (high << 8) | self.data[low] as u16
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_register_keeps_every_byte() {
    let mut registers = RegisterFile::new();
    for reg in 0..REGISTER_COUNT {
      for value in 0..=255u8 {
        registers.write(reg, value);
        assert_eq!(registers.read(reg), value);
      }
    }
  }

  #[test]
  fn period_joins_low_and_high_bits() {
    let mut registers = RegisterFile::new();
    registers.write(PULSE1_PERIOD_LOW, 0x20);
    registers.write(PULSE1_PERIOD_HIGH, 0b1111_1101);
    assert_eq!(registers.period(PULSE1_PERIOD_LOW), 0x520);

    registers.write(TRIANGLE_PERIOD_LOW, 0xFF);
    registers.write(TRIANGLE_PERIOD_HIGH, 0x07);
    assert_eq!(registers.period(TRIANGLE_PERIOD_LOW), 0x7FF);
  }

  #[test]
  fn enable_mask_bits() {
    let mut registers = RegisterFile::new();
    registers.write(CHANNEL_ENABLE, ENABLE_PULSE2 | ENABLE_NOISE);
    assert!(!registers.channel_enabled(ENABLE_PULSE1));
    assert!(registers.channel_enabled(ENABLE_PULSE2));
    assert!(!registers.channel_enabled(ENABLE_TRIANGLE));
    assert!(registers.channel_enabled(ENABLE_NOISE));
  }

  #[test]
  fn display_dumps_every_register_in_hex() {
    let mut registers = RegisterFile::new();
    registers.write(PULSE1_PERIOD_HIGH, 0x08);
    registers.write(CHANNEL_ENABLE, 0x1F);
    assert_eq!(
      registers.to_string(),
      "00 00 00 08 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 1F 00 00"
    );
  }
}

use enum_dispatch::enum_dispatch;

use crate::nes::apu::register::{
  RegisterFile,
  PULSE1_CONTROL, PULSE1_PERIOD_HIGH,
  PULSE2_CONTROL, PULSE2_PERIOD_HIGH,
  TRIANGLE_CONTROL, TRIANGLE_PERIOD_HIGH,
  NOISE_CONTROL, NOISE_PERIOD_HIGH,
};

/// Length counter load values, indexed by the top five bits of a period-high write.
pub const TIMER_PERIOD_TABLE: [u32; 32] = [
  10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14,
  12, 16, 24, 18, 48, 20, 96, 22, 192, 24, 72, 26, 16, 28, 32, 30,
];

/// Ticks per table unit.
pub const TIMER_SCALE: u32 = 5000;

const HALT_LENGTH: u8 = 0b0010_0000;
const TRIANGLE_CONTROL_FLAG: u8 = 0b1000_0000;
const LINEAR_RELOAD: u8 = 0b0111_1111;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSlot {
  Pulse1,
  Pulse2,
  Triangle,
  Noise,
  TriangleLinear,
}

impl TimerSlot {
  pub const ALL: [TimerSlot; 5] = [
    TimerSlot::Pulse1,
    TimerSlot::Pulse2,
    TimerSlot::Triangle,
    TimerSlot::Noise,
    TimerSlot::TriangleLinear,
  ];

  pub fn index(self) -> usize {
    self as usize
  }

  /// Register and bit that stop this slot from counting down. Both triangle
  /// slots share $4008 bit 7.
  pub fn halt_flag(self) -> (usize, u8) {
    match self {
      TimerSlot::Pulse1 => (PULSE1_CONTROL, HALT_LENGTH),
      TimerSlot::Pulse2 => (PULSE2_CONTROL, HALT_LENGTH),
      TimerSlot::Triangle => (TRIANGLE_CONTROL, TRIANGLE_CONTROL_FLAG),
      TimerSlot::Noise => (NOISE_CONTROL, HALT_LENGTH),
      TimerSlot::TriangleLinear => (TRIANGLE_CONTROL, TRIANGLE_CONTROL_FLAG),
    }
  }

  pub fn halted(self, registers: &RegisterFile) -> bool {
    let (reg, mask) = self.halt_flag();
    registers.flag(reg, mask)
  }
}

pub fn period_count(value: u8) -> u32 {
  TIMER_PERIOD_TABLE[(value >> 3) as usize] * TIMER_SCALE
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelTimers {
  counts: [u32; 5],
}

impl ChannelTimers {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, slot: TimerSlot) -> u32 {
    self.counts[slot.index()]
  }

  pub fn is_running(&self, slot: TimerSlot) -> bool {
    self.get(slot) > 0
  }

  pub fn set(&mut self, slot: TimerSlot, count: u32) {
    self.counts[slot.index()] = count;
  }

  /// Applies the reload side effect of a register write, if that register has one.
  pub fn on_register_write(&mut self, reg: usize, value: u8) -> Option<TimerSlot> {
    let (slot, count) = match reg {
      PULSE1_PERIOD_HIGH => (TimerSlot::Pulse1, period_count(value)),
      PULSE2_PERIOD_HIGH => (TimerSlot::Pulse2, period_count(value)),
      TRIANGLE_PERIOD_HIGH => (TimerSlot::Triangle, period_count(value)),
      NOISE_PERIOD_HIGH => (TimerSlot::Noise, period_count(value)),
      TRIANGLE_CONTROL => (TimerSlot::TriangleLinear, (value & LINEAR_RELOAD) as u32 * TIMER_SCALE),
      _ => return None,
    };
    self.set(slot, count);
    Some(slot)
  }

  fn decrement(&mut self, slot: TimerSlot) {
    let count = &mut self.counts[slot.index()];
    *count = count.saturating_sub(1);
  }
}

/// Decrements every running slot; halt flags are respected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatedTick;

/// Decrements every running slot regardless of halt flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FreeRunningTick;

#[enum_dispatch]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStrategy {
  GatedTick,
  FreeRunningTick,
}

#[enum_dispatch(TickStrategy)]
pub trait Sequencer {
  fn step(&self, timers: &mut ChannelTimers, registers: &RegisterFile);
}

impl Default for TickStrategy {
  fn default() -> Self {
    GatedTick.into()
  }
}

impl Sequencer for GatedTick {
  fn step(&self, timers: &mut ChannelTimers, registers: &RegisterFile) {
    for slot in TimerSlot::ALL {
      if !slot.halted(registers) {
        timers.decrement(slot);
      }
    }
  }
}

impl Sequencer for FreeRunningTick {
  fn step(&self, timers: &mut ChannelTimers, _registers: &RegisterFile) {
    for slot in TimerSlot::ALL {
      timers.decrement(slot);
    }
  }
}

use crate::nes::apu::{
  ApuState,
  CPU_CLOCK_HZ,
  channel::{square, Channel, ChannelType},
  register::{ENABLE_PULSE1, ENABLE_PULSE2, PULSE1_PERIOD_LOW, PULSE2_PERIOD_LOW},
  timer::TimerSlot,
};

/// Periods below this are ultrasonic on hardware and only alias at 44.1 kHz.
pub const MIN_PERIOD: u16 = 8;

/// Square voice sampled at phase 0. Duty cycle is not modeled.
#[derive(Debug, Clone)]
pub struct Pulse {
  enable_mask: u8,
  period_low: usize,
  timer: TimerSlot,
}

impl Channel for Pulse {
  fn sample(&mut self, state: &ApuState, time: f64, _sample_rate: f64) -> Option<f64> {
    let period = self.period(state)?;
    let frequency = CPU_CLOCK_HZ / (16.0 * (period as f64 + 1.0));
    Some(square(time, frequency, 0.0))
  }
}

impl Pulse {
  pub fn pulse1() -> ChannelType {
    Self {
      enable_mask: ENABLE_PULSE1,
      period_low: PULSE1_PERIOD_LOW,
      timer: TimerSlot::Pulse1,
    }.into()
  }

  pub fn pulse2() -> ChannelType {
    Self {
      enable_mask: ENABLE_PULSE2,
      period_low: PULSE2_PERIOD_LOW,
      timer: TimerSlot::Pulse2,
    }.into()
  }

  /// The audible period, or `None` when the voice is disabled, its length
  /// timer ran out, or the period is too short.
  fn period(&self, state: &ApuState) -> Option<u16> {
    if !state.registers.channel_enabled(self.enable_mask) || !state.timers.is_running(self.timer) {
      return None;
    }
    let period = state.registers.period(self.period_low);
    if period < MIN_PERIOD {
      return None;
    }
    Some(period)
  }
}

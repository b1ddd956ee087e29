use crate::nes::apu::{
  ApuState,
  CPU_CLOCK_HZ,
  channel::{triangle, Channel, ChannelType},
  register::{ENABLE_TRIANGLE, TRIANGLE_PERIOD_LOW},
  timer::TimerSlot,
};

/// Triangle voice. Gated by both the length and the linear timer slot, which
/// share the $4008 control bit.
#[derive(Debug, Clone)]
pub struct Triangle {}

impl Channel for Triangle {
  fn sample(&mut self, state: &ApuState, time: f64, _sample_rate: f64) -> Option<f64> {
    if !state.registers.channel_enabled(ENABLE_TRIANGLE)
        || !state.timers.is_running(TimerSlot::Triangle)
        || !state.timers.is_running(TimerSlot::TriangleLinear) {
      return None;
    }
    let period = state.registers.period(TRIANGLE_PERIOD_LOW);
    let frequency = CPU_CLOCK_HZ / (32.0 * (period as f64 + 1.0));
    Some(triangle(time, frequency, 0.0))
  }
}

impl Triangle {
  pub fn new() -> ChannelType {
    let new = Self {};
    new.into()
  }
}

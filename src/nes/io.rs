use crate::nes::{
  apu::{APU, register::{CHANNEL_ENABLE, FRAME_COUNTER}},
  bus::{Addressable, AddressSpace, BusError, ReadHandler, WriteHandler},
  controller::{Controller, ControllerType, InputContext},
};

const OAM_DMA: usize = 0x14;
const JOYPAD1: usize = 0x16;
const JOYPAD2: usize = 0x17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoPort {
  Apu,
  Strobe,
  Joypad(usize),
}

/// The CPU's $4000-$401F window: APU registers plus the two controller ports.
///
/// $4014 (OAM DMA) belongs to the PPU and is discarded here.
pub struct IoRegisters {
  apu: APU,
  controllers: [ControllerType; 2],
  space: AddressSpace<IoPort>,
}

impl IoRegisters {
  pub const ADDRESS_BITS: u32 = 5;

  pub fn new(apu: APU, controllers: [ControllerType; 2]) -> Self {
    let mut io = Self {
      apu,
      controllers,
      space: AddressSpace::new(Self::ADDRESS_BITS),
    };
    io.initialize_memory_map();
    io
  }

  fn initialize_memory_map(&mut self) {
    for reg in 0..=CHANNEL_ENABLE {
      self.space.set_read_handler(reg, ReadHandler::Port(IoPort::Apu));
      self.space.set_write_handler(reg, WriteHandler::Port(IoPort::Apu));
    }
    self.space.set_write_handler(OAM_DMA, WriteHandler::Discard);
    self.space.set_read_handler(OAM_DMA, ReadHandler::Unmapped);

    self.space.set_read_handler(JOYPAD1, ReadHandler::Port(IoPort::Joypad(0)));
    self.space.set_read_handler(JOYPAD2, ReadHandler::Port(IoPort::Joypad(1)));
    self.space.set_write_handler(JOYPAD1, WriteHandler::Port(IoPort::Strobe));
    self.space.set_write_handler(FRAME_COUNTER, WriteHandler::Port(IoPort::Apu));
  }

  pub fn apu(&self) -> &APU {
    &self.apu
  }

  pub fn apu_mut(&mut self) -> &mut APU {
    &mut self.apu
  }

  pub fn update_controllers(&mut self, input: &InputContext) {
    for controller in &mut self.controllers {
      controller.update(input);
    }
  }
}

impl Addressable for IoRegisters {
  type Port = IoPort;

  fn address_space(&self) -> &AddressSpace<IoPort> {
    &self.space
  }

  fn address_space_mut(&mut self) -> &mut AddressSpace<IoPort> {
    &mut self.space
  }

  fn read_port(&mut self, port: IoPort, addr: usize) -> Result<u8, BusError> {
    match port {
      IoPort::Apu => self.apu.read_byte(addr),
      IoPort::Joypad(n) => Ok(self.controllers[n].read()),
      IoPort::Strobe => Err(BusError::UnmappedRead { addr }),
    }
  }

  fn write_port(&mut self, port: IoPort, addr: usize, value: u8) {
    match port {
      IoPort::Apu => self.apu.write_byte(addr, value),
      IoPort::Strobe => {
        for controller in &mut self.controllers {
          controller.write(value);
        }
      },
      IoPort::Joypad(n) => self.controllers[n].write(value),
    }
  }
}

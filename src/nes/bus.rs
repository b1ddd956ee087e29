use std::fmt;
use std::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusError {
  UnmappedRead {
    addr: usize,
  },
  RangeOutOfBounds {
    start: usize,
    end: usize,
    size: usize,
  },
}

impl fmt::Display for BusError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BusError::UnmappedRead { addr } => write!(f, "read from unmapped address {:#06x}", addr),
      BusError::RangeOutOfBounds { start, end, size } => {
        write!(f, "range {:#06x}..={:#06x} does not fit an address space of {} slots", start, end, size)
      },
    }
  }
}

impl Error for BusError {}

/// What a read slot does once the address has been masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadHandler<P> {
  /// Every real address should be mapped, so reaching this is a wiring bug.
  Unmapped,
  Constant(u8),
  Port(P),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteHandler<P> {
  /// Programs probe unused addresses and expect to keep running.
  Discard,
  Port(P),
}

/// Flat handler tables, one slot per raw address.
///
/// The slot count is always a power of two so that `addr & mask` aliases
/// mirrored addresses onto the same slot.
#[derive(Debug, Clone)]
pub struct AddressSpace<P> {
  read_map: Vec<ReadHandler<P>>,
  write_map: Vec<WriteHandler<P>>,
  address_mask: usize,
}

impl<P: Copy> AddressSpace<P> {
  pub fn new(address_bits: u32) -> Self {
    let size = 1usize << address_bits;
    Self {
      read_map: vec![ReadHandler::Unmapped; size],
      write_map: vec![WriteHandler::Discard; size],
      address_mask: size - 1,
    }
  }

  pub fn len(&self) -> usize {
    self.read_map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.read_map.is_empty()
  }

  pub fn mask(&self) -> usize {
    self.address_mask
  }

  pub fn read_handler(&self, addr: usize) -> (usize, ReadHandler<P>) {
    let addr = addr & self.address_mask;
    (addr, self.read_map[addr])
  }

  pub fn write_handler(&self, addr: usize) -> (usize, WriteHandler<P>) {
    let addr = addr & self.address_mask;
    (addr, self.write_map[addr])
  }

  pub fn set_read_handler(&mut self, addr: usize, handler: ReadHandler<P>) {
    self.read_map[addr & self.address_mask] = handler;
  }

  pub fn set_write_handler(&mut self, addr: usize, handler: WriteHandler<P>) {
    self.write_map[addr & self.address_mask] = handler;
  }

  /// Installs `handler` on every slot of the inclusive range. Later calls win
  /// on overlapping slots.
  pub fn map_read_handler(&mut self, start: usize, end: usize, handler: ReadHandler<P>) -> Result<(), BusError> {
    let (start, end) = self.slot_range(start, end)?;
    self.read_map[start..=end].fill(handler);
    Ok(())
  }

  pub fn map_write_handler(&mut self, start: usize, end: usize, handler: WriteHandler<P>) -> Result<(), BusError> {
    let (start, end) = self.slot_range(start, end)?;
    self.write_map[start..=end].fill(handler);
    Ok(())
  }

  fn slot_range(&self, start: usize, end: usize) -> Result<(usize, usize), BusError> {
    let size = self.len();
    let out_of_bounds = BusError::RangeOutOfBounds { start, end, size };
    if end < start || end - start >= size {
      return Err(out_of_bounds);
    }
    let (first, last) = (start & self.address_mask, end & self.address_mask);
    if last < first {
      return Err(out_of_bounds);
    }
    Ok((first, last))
  }
}

/// A memory-mapped device. Implementors expose their handler tables and the
/// ports those tables point at; dispatch itself is provided.
pub trait Addressable {
  type Port: Copy;

  fn address_space(&self) -> &AddressSpace<Self::Port>;
  fn address_space_mut(&mut self) -> &mut AddressSpace<Self::Port>;

  fn read_port(&mut self, port: Self::Port, addr: usize) -> Result<u8, BusError>;
  fn write_port(&mut self, port: Self::Port, addr: usize, value: u8);

  fn read_byte(&mut self, addr: usize) -> Result<u8, BusError> {
    let (slot, handler) = self.address_space().read_handler(addr);
    match handler {
      ReadHandler::Unmapped => Err(BusError::UnmappedRead { addr }),
      ReadHandler::Constant(value) => Ok(value),
      ReadHandler::Port(port) => self.read_port(port, slot),
    }
  }

  fn write_byte(&mut self, addr: usize, value: u8) {
    let (slot, handler) = self.address_space().write_handler(addr);
    match handler {
      WriteHandler::Discard => (),
      WriteHandler::Port(port) => self.write_port(port, slot, value),
    }
  }

  fn map_read_handler(&mut self, start: usize, end: usize, handler: ReadHandler<Self::Port>) -> Result<(), BusError> {
    self.address_space_mut().map_read_handler(start, end, handler)
  }

  fn map_write_handler(&mut self, start: usize, end: usize, handler: WriteHandler<Self::Port>) -> Result<(), BusError> {
    self.address_space_mut().map_write_handler(start, end, handler)
  }
}

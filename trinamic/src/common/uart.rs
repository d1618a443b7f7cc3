//! Single-wire UART register access for TMC22xx/TMC2300 drivers.
//!
//! Write access datagram: `sync, node, 0x80 | addr, data (msb first), crc`, 8 bytes.
//! Read request: `sync, node, addr, crc`, 4 bytes; the chip answers with an 8 byte datagram
//! addressed to the master (`0xFF`). RX and TX share one wire, so every byte sent comes back as
//! echo before the reply.

use bitfield::bitfield;
use embedded_hal_nb::serial::{Read, Write};
use generic::tmc_error::TmcError;

use crate::common::bus::RegisterBus;

const SYNC: u8 = 0x05;
const MASTER_ADDR: u8 = 0xFF;

const READ_REQUEST_LEN: usize = 4;
const DATAGRAM_LEN: usize = 8;

/// Polls of an empty receiver before a read gives up.
pub const DEFAULT_READ_POLLS: u32 = 10_000;

bitfield! {
    /// Third byte of a datagram.
    #[derive(Clone, Copy, Eq, PartialEq)]
    pub struct Header(u8);
    impl Debug;
    pub addr, set_addr: 6, 0;
    pub write, set_write: 7;
}

impl Header {
    pub fn new(addr: u8, write: bool) -> Self {
        let mut header = Header(0);
        header.set_addr(addr);
        header.set_write(write);
        header
    }
}

/// CRC8 over `bytes` (polynomial x^8 + x^2 + x + 1), bits taken LSB first.
pub fn crc8(bytes: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &b in bytes {
        let mut byte = b;
        for _ in 0..8 {
            if ((crc >> 7) ^ (byte & 0x01)) != 0 {
                crc = (crc << 1) ^ 0x07;
            } else {
                crc <<= 1;
            }
            byte >>= 1;
        }
    }
    crc
}

pub fn write_datagram(node: u8, addr: u8, data: u32) -> [u8; DATAGRAM_LEN] {
    let d = data.to_be_bytes();
    let mut frame = [SYNC, node, Header::new(addr, true).0, d[0], d[1], d[2], d[3], 0];
    frame[DATAGRAM_LEN - 1] = crc8(&frame[..DATAGRAM_LEN - 1]);
    frame
}

pub fn read_request(node: u8, addr: u8) -> [u8; READ_REQUEST_LEN] {
    let mut frame = [SYNC, node, Header::new(addr, false).0, 0];
    frame[READ_REQUEST_LEN - 1] = crc8(&frame[..READ_REQUEST_LEN - 1]);
    frame
}

/// Validates a read reply for `addr` and extracts the register word.
pub fn parse_reply(addr: u8, reply: &[u8; DATAGRAM_LEN]) -> Result<u32, TmcError> {
    let header = Header(reply[2]);
    if reply[0] != SYNC || reply[1] != MASTER_ADDR || header.write() || header.addr() != addr {
        return Err(TmcError::UartInvalidData);
    }
    if crc8(&reply[..DATAGRAM_LEN - 1]) != reply[DATAGRAM_LEN - 1] {
        return Err(TmcError::UartCrcMismatch);
    }
    Ok(u32::from_be_bytes([reply[3], reply[4], reply[5], reply[6]]))
}

/// [`RegisterBus`] over a half-duplex serial port.
pub struct TmcUart<S> {
    serial: S,
    /// Whether transmitted bytes are looped back to RX and must be skipped.
    echo: bool,
    max_polls: u32,
}

impl<S> TmcUart<S>
where
    S: Read<u8> + Write<u8>,
{
    pub fn new(serial: S) -> Self {
        TmcUart { serial, echo: true, max_polls: DEFAULT_READ_POLLS }
    }

    /// For wiring with separate RX and TX lines.
    pub fn without_echo(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn with_read_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub fn release(self) -> S {
        self.serial
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), TmcError> {
        for &b in frame {
            nb::block!(self.serial.write(b)).map_err(|_| TmcError::UartWriteError)?;
        }
        nb::block!(self.serial.flush()).map_err(|_| TmcError::UartFlushError)?;
        if self.echo {
            for _ in frame {
                self.read_byte()?;
            }
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TmcError> {
        for _ in 0..self.max_polls {
            match self.serial.read() {
                Ok(byte) => return Ok(byte),
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(_)) => return Err(TmcError::UartReadError),
            }
        }
        Err(TmcError::UartReadTimeout)
    }
}

impl<S> RegisterBus for TmcUart<S>
where
    S: Read<u8> + Write<u8>,
{
    fn read_register(&mut self, node: u8, addr: u8) -> Result<u32, TmcError> {
        self.send(&read_request(node, addr))?;
        let mut reply = [0u8; DATAGRAM_LEN];
        for b in reply.iter_mut() {
            *b = self.read_byte()?;
        }
        let word = parse_reply(addr, &reply)?;
        trace!("uart read {=u8} {=u8:#x} -> {=u32:#x}", node, addr, word);
        Ok(word)
    }

    fn write_register(&mut self, node: u8, addr: u8, data: u32) -> Result<(), TmcError> {
        trace!("uart write {=u8} {=u8:#x} <- {=u32:#x}", node, addr, data);
        self.send(&write_datagram(node, addr, data))
    }
}

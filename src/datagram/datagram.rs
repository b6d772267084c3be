/*
    This file is part of Donet.

    Copyright © 2024 Max Rodriguez

    Donet is free software; you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License,
    as published by the Free Software Foundation, either version 3
    of the License, or (at your option) any later version.

    Donet is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public
    License along with Donet. If not, see <https://www.gnu.org/licenses/>.
*/

//! The [`Datagram`] is a growable little-endian byte buffer with an
//! independent write cursor, and [`DatagramIterator`] reads one back out.
//! Together they are the wire format used by every message exchanged
//! between client, AI, state-server and database.

use crate::globals::{Channel, DgSizeTag, MsgType, DG_SIZE_MAX};

/// Errors returned by [`Datagram`] and [`DatagramIterator`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DgError {
    DatagramOverflow,
    DatagramIteratorEof,
}

impl std::fmt::Display for DgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DgError::DatagramOverflow => write!(f, "datagram write exceeded the maximum datagram size"),
            DgError::DatagramIteratorEof => write!(f, "tried to read past the end of a datagram"),
        }
    }
}

impl std::error::Error for DgError {}

pub type DgResult = Result<(), DgError>;
pub type DgBufferResult = Result<DgSizeTag, DgError>;

/// A resizable little-endian byte buffer with a write cursor that is
/// independent of the buffer's length: writing past the current length
/// extends the buffer, while writing at or before it overwrites in place.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Datagram {
    buffer: Vec<u8>,
    cursor: usize,
}

impl Datagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tell(&self) -> usize {
        self.cursor
    }

    pub fn seek(&mut self, position: usize) {
        self.cursor = position;
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    fn check_add_length(&self, extra: usize) -> DgResult {
        if self.cursor + extra > DG_SIZE_MAX as usize {
            return Err(DgError::DatagramOverflow);
        }
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> DgResult {
        self.check_add_length(bytes.len())?;

        let end = self.cursor + bytes.len();
        if end > self.buffer.len() {
            self.buffer.resize(end, 0);
        }
        self.buffer[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
        Ok(())
    }

    pub fn add_bool(&mut self, v: bool) -> DgResult {
        self.write_bytes(&[v as u8])
    }

    pub fn add_u8(&mut self, v: u8) -> DgResult {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn add_u16(&mut self, v: u16) -> DgResult {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn add_u32(&mut self, v: u32) -> DgResult {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn add_u64(&mut self, v: u64) -> DgResult {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn add_i8(&mut self, v: i8) -> DgResult {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn add_i16(&mut self, v: i16) -> DgResult {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn add_i32(&mut self, v: i32) -> DgResult {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn add_i64(&mut self, v: i64) -> DgResult {
        self.write_bytes(&v.to_le_bytes())
    }

    pub fn add_float32(&mut self, v: f32) -> DgResult {
        self.write_bytes(&v.to_bits().to_le_bytes())
    }

    pub fn add_float64(&mut self, v: f64) -> DgResult {
        self.write_bytes(&v.to_bits().to_le_bytes())
    }

    pub fn add_channel(&mut self, v: Channel) -> DgResult {
        self.add_u64(v)
    }

    /// Raw append, with no length prefix.
    pub fn add_bytes(&mut self, b: &[u8]) -> DgResult {
        self.write_bytes(b)
    }

    /// `u16`-length-prefixed byte string.
    pub fn add_string16(&mut self, b: &[u8]) -> DgResult {
        if b.len() > u16::MAX as usize {
            return Err(DgError::DatagramOverflow);
        }
        self.add_u16(b.len() as u16)?;
        self.add_bytes(b)
    }

    /// `u32`-length-prefixed byte string.
    pub fn add_string32(&mut self, b: &[u8]) -> DgResult {
        if b.len() > u32::MAX as usize {
            return Err(DgError::DatagramOverflow);
        }
        self.add_u32(b.len() as u32)?;
        self.add_bytes(b)
    }

    /// Appends a copy of `other`'s bytes, independent of any of `other`'s
    /// later mutations. No length prefix is written.
    pub fn add_datagram(&mut self, other: &Datagram) -> DgResult {
        self.add_bytes(other.get_data().as_slice())
    }

    /// Reserves `size` bytes at the current cursor, zero-filled, and
    /// returns the offset they start at so a caller can backpatch a
    /// length header once it is known (used by the array codec).
    pub fn add_buffer(&mut self, size: DgSizeTag) -> DgBufferResult {
        let start = self.cursor;
        self.write_bytes(&vec![0u8; size as usize])?;
        Ok(start as DgSizeTag)
    }

    /// Overwrites `size` bytes starting at `offset` without moving the
    /// write cursor. Used to backpatch a reserved length header.
    pub fn set_at(&mut self, offset: usize, bytes: &[u8]) {
        self.buffer[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn add_server_header(&mut self, targets: &[Channel], from: Channel, msg_type: MsgType) -> DgResult {
        self.add_u8(targets.len() as u8)?;
        for target in targets {
            self.add_channel(*target)?;
        }
        self.add_channel(from)?;
        self.add_u16(msg_type)
    }

    /// A deep, independent copy of the underlying buffer.
    pub fn get_data(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    /// A read iterator over this datagram's bytes, cursor reset to 0.
    pub fn iterator(&self) -> DatagramIterator {
        DatagramIterator::new(self.clone())
    }
}

impl From<Vec<u8>> for Datagram {
    fn from(buffer: Vec<u8>) -> Self {
        Self { buffer, cursor: 0 }
    }
}

/// Reads values back out of a [`Datagram`] through an independent cursor.
#[derive(Debug, Clone)]
pub struct DatagramIterator {
    datagram: Datagram,
    cursor: usize,
}

impl DatagramIterator {
    pub fn new(datagram: Datagram) -> Self {
        Self { datagram, cursor: 0 }
    }

    pub fn tell(&self) -> usize {
        self.cursor
    }

    /// Clamps silently; a subsequent read past the end still fails.
    pub fn seek(&mut self, position: usize) {
        self.cursor = position.min(self.datagram.size());
    }

    pub fn skip(&mut self, amount: usize) {
        self.cursor = (self.cursor + amount).min(self.datagram.size());
    }

    pub fn remaining(&self) -> usize {
        self.datagram.size().saturating_sub(self.cursor)
    }

    fn check_read_length(&self, length: usize) -> DgResult {
        if self.cursor + length > self.datagram.size() {
            return Err(DgError::DatagramIteratorEof);
        }
        Ok(())
    }

    pub fn read_data(&mut self, length: usize) -> Result<Vec<u8>, DgError> {
        self.check_read_length(length)?;
        let bytes = self.datagram.buffer[self.cursor..self.cursor + length].to_vec();
        self.cursor += length;
        Ok(bytes)
    }

    pub fn get_remaining(&mut self) -> Vec<u8> {
        let rest = self.remaining();
        self.read_data(rest).unwrap_or_default()
    }

    pub fn read_bool(&mut self) -> Result<bool, DgError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u8(&mut self) -> Result<u8, DgError> {
        let bytes = self.read_data(1)?;
        Ok(bytes[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DgError> {
        let bytes = self.read_data(2)?;
        Ok(u16::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_u32(&mut self) -> Result<u32, DgError> {
        let bytes = self.read_data(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64, DgError> {
        let bytes = self.read_data(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_i8(&mut self) -> Result<i8, DgError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i16(&mut self) -> Result<i16, DgError> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_i32(&mut self) -> Result<i32, DgError> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64, DgError> {
        Ok(self.read_u64()? as i64)
    }

    pub fn read_float32(&mut self) -> Result<f32, DgError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_float64(&mut self) -> Result<f64, DgError> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    pub fn read_channel(&mut self) -> Result<Channel, DgError> {
        self.read_u64()
    }

    /// Reads a `u16`-length-prefixed byte string.
    pub fn get_string16(&mut self) -> Result<Vec<u8>, DgError> {
        let len = self.read_u16()? as usize;
        self.read_data(len)
    }

    /// Reads a `u32`-length-prefixed byte string.
    pub fn get_string32(&mut self) -> Result<Vec<u8>, DgError> {
        let len = self.read_u32()? as usize;
        self.read_data(len)
    }

    pub fn read_msg_type(&mut self) -> Result<MsgType, DgError> {
        self.read_u16()
    }
}

#[cfg(test)]
mod unit_testing {
    use super::*;

    #[test]
    fn dg_add_boolean() {
        let mut dg = Datagram::new();
        dg.add_bool(true).unwrap();
        dg.add_bool(false).unwrap();
        assert_eq!(dg.get_data(), vec![1, 0]);
    }

    #[test]
    fn dg_add_integers_and_types() {
        let mut dg = Datagram::new();
        dg.add_i8(-2).unwrap();
        dg.add_i16(-2).unwrap();
        dg.add_i32(-2).unwrap();
        dg.add_i64(-2).unwrap();
        dg.add_u8(2).unwrap();
        dg.add_u16(2).unwrap();
        dg.add_u32(2).unwrap();
        dg.add_u64(2).unwrap();
        dg.add_float64(0.2).unwrap();

        assert_eq!(dg.size(), 1 + 2 + 4 + 8 + 1 + 2 + 4 + 8 + 8);
    }

    #[test]
    fn dg_add_datagram_is_an_eager_copy() {
        let mut source = Datagram::new();
        source.add_u8(1).unwrap();

        let mut dest = Datagram::new();
        dest.add_datagram(&source).unwrap();
        source.add_u8(2).unwrap();

        assert_eq!(dest.get_data(), vec![1]);
    }

    #[test]
    fn dg_add_server_header() {
        let mut dg = Datagram::new();
        dg.add_server_header(&[1001], 1002, 5).unwrap();

        let mut dgi = dg.iterator();
        assert_eq!(dgi.read_u8().unwrap(), 1);
        assert_eq!(dgi.read_channel().unwrap(), 1001);
        assert_eq!(dgi.read_channel().unwrap(), 1002);
        assert_eq!(dgi.read_msg_type().unwrap(), 5);
    }

    #[test]
    fn datagram_overflow() {
        let mut dg = Datagram::new();
        dg.seek(DG_SIZE_MAX as usize);
        assert_eq!(dg.add_u16(1), Err(DgError::DatagramOverflow));
    }

    #[test]
    fn dgi_read_integers_roundtrip() {
        let mut dg = Datagram::new();
        dg.add_u32(2828).unwrap();

        let mut dgi = dg.iterator();
        assert_eq!(dgi.read_u32().unwrap(), 2828);
    }

    #[test]
    fn dgi_eof_on_underrun() {
        let dg = Datagram::new();
        let mut dgi = dg.iterator();
        assert_eq!(dgi.read_u8(), Err(DgError::DatagramIteratorEof));
    }

    #[test]
    fn dgi_string16_roundtrip() {
        let mut dg = Datagram::new();
        dg.add_string16(b"hello").unwrap();

        let mut dgi = dg.iterator();
        assert_eq!(dgi.get_string16().unwrap(), b"hello".to_vec());
    }

    #[test]
    fn float64_roundtrips_exactly() {
        let mut dg = Datagram::new();
        dg.add_float64(3.14159).unwrap();

        let mut dgi = dg.iterator();
        assert_eq!(dgi.read_float64().unwrap(), 3.14159);
    }

    #[test]
    fn write_cursor_overwrites_mid_buffer() {
        let mut dg = Datagram::new();
        dg.add_u32(0xffffffff).unwrap();
        dg.seek(0);
        dg.add_u16(0).unwrap();

        let mut dgi = dg.iterator();
        assert_eq!(dgi.read_u16().unwrap(), 0);
        assert_eq!(dgi.read_u16().unwrap(), 0xffff);
    }
}

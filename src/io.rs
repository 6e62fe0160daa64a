/*
 * nef-raw - io.rs
 *
 * Copyright (C) 2022 Hubert Figuière
 *
 * This library is free software: you can redistribute it and/or
 * modify it under the terms of the GNU Lesser General Public License
 * as published by the Free Software Foundation, either version 3 of
 * the License, or (at your option) any later version.
 *
 * This library is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * Lesser General Public License for more details.
 *
 * You should have received a copy of the GNU Lesser General Public
 * License along with this library.  If not, see
 * <http://www.gnu.org/licenses/>.
 */

//! Seekable big-endian byte reader over the file backing a NEF.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{Error, Result};

/// A trait alias for what a NEF's backing store must support.
pub trait ReadAndSeek: Read + Seek {}
impl<T> ReadAndSeek for T where T: Read + Seek {}

/// Reads big-endian typed values out of a seekable byte source, tracking
/// position so callers can record `value_location` for IFD entries.
pub struct ByteReader<R> {
    inner: R,
}

impl<R: ReadAndSeek> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        ByteReader { inner }
    }

    /// Current absolute byte position.
    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Seek to an absolute offset.
    pub fn seek_abs(&mut self, offset: u64) -> Result<u64> {
        log::trace!("seek abs 0x{:x}", offset);
        Ok(self.inner.seek(SeekFrom::Start(offset))?)
    }

    /// Seek by a relative (possibly negative) delta from the current position.
    pub fn seek_rel(&mut self, delta: i64) -> Result<u64> {
        log::trace!("seek rel {:+}", delta);
        Ok(self.inner.seek(SeekFrom::Current(delta))?)
    }

    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0_u8; n];
        self.inner
            .read_exact(&mut buf)
            .map_err(|_| Error::Truncated)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.inner.read_u8().map_err(|_| Error::Truncated)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.inner.read_i8().map_err(|_| Error::Truncated)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.inner
            .read_u16::<BigEndian>()
            .map_err(|_| Error::Truncated)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.inner
            .read_i16::<BigEndian>()
            .map_err(|_| Error::Truncated)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.inner
            .read_u32::<BigEndian>()
            .map_err(|_| Error::Truncated)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.inner
            .read_i32::<BigEndian>()
            .map_err(|_| Error::Truncated)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.inner
            .read_f32::<BigEndian>()
            .map_err(|_| Error::Truncated)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.inner
            .read_f64::<BigEndian>()
            .map_err(|_| Error::Truncated)
    }
}

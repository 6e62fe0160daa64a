/*
 * nef-raw - nikon/mod.rs
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

//! Nikon NEF: Makernote parsing and the top-level decode facade.

pub mod bitstream;
pub mod huffman;
pub mod linearization;
pub mod reconstruct;

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::io::{ByteReader, ReadAndSeek};
use crate::mosaic::CfaInfo;
use crate::rawdata::Raster;
use crate::tiff::entry::Entry;
use crate::tiff::{exif, walk_ifds, Ifd, TIFF_MAGIC};
use crate::{Error, Result};

/// Makernote preamble signature, the standard Nikon Makernote's first 6 bytes.
pub const MAKERNOTE_PREAMBLE: &[u8; 6] = b"Nikon\0";
/// NEFCompression: lossless (1) vs lossy (2+) mode flag.
pub const TAG_NEF_COMPRESSION: u16 = 0x0093;
/// NEFLinearizationTable: the per-shot curve + predictor seed blob.
pub const TAG_NEF_LINEARIZATION_TABLE: u16 = 0x0096;

lazy_static! {
    pub static ref NIKON_TAG_NAMES: HashMap<u16, &'static str> = HashMap::from([
        (0x0001, "MakerNoteVersion"),
        (0x0002, "ISOSetting"),
        (0x0004, "Quality"),
        (0x0005, "WhiteBalance"),
        (0x0007, "Focus"),
        (TAG_NEF_COMPRESSION, "NEFCompression"),
        (TAG_NEF_LINEARIZATION_TABLE, "NEFLinearizationTable"),
    ]);
}

/// A decoded NEF: the outer IFD tree, the Nikon Makernote's own IFD tree,
/// and the reconstructed raw raster.
pub struct NefFile {
    pub ifds: Vec<Ifd>,
    pub makernote_ifds: Vec<Ifd>,
    pub raster: Raster,
    pub cfa: Option<CfaInfo>,
}

impl NefFile {
    pub fn open<R: ReadAndSeek>(inner: R) -> Result<Self> {
        let mut reader = ByteReader::new(inner);

        let byte_order = reader.read_u16()?;
        if byte_order != 0x4D4D {
            return Err(Error::BadMagic);
        }
        if reader.read_u16()? != TIFF_MAGIC {
            return Err(Error::BadMagic);
        }
        let first_ifd = reader.read_u32()? as u64;

        let ifds = walk_ifds(&mut reader, first_ifd, &exif::EXIF_TAG_NAMES, 0)?;
        let makernote_ifds = Self::parse_makernote(&mut reader, &ifds)?;
        let (raster, cfa) = Self::decode_raw(&mut reader, &ifds, &makernote_ifds)?;

        Ok(NefFile {
            ifds,
            makernote_ifds,
            raster,
            cfa,
        })
    }

    fn find_tag<'a>(ifds: &'a [Ifd], tag: u16) -> Option<&'a Entry> {
        ifds.iter().find_map(|ifd| ifd.entry(tag))
    }

    /// Locate tag 37500 (MakerNote) in the outer IFDs and parse its IFD
    /// tree. Its own offsets are relative to `makernote_offset + 10`: the
    /// 6-byte "Nikon\0" preamble, a 2-byte version and a 2-byte reserved
    /// field, after which a fresh "MM"/0x002A/first-IFD-offset triplet
    /// begins, matching the outer TIFF layout.
    fn parse_makernote<R: ReadAndSeek>(
        reader: &mut ByteReader<R>,
        ifds: &[Ifd],
    ) -> Result<Vec<Ifd>> {
        let mn_offset = Self::find_tag(ifds, exif::TAG_MAKER_NOTE)
            .and_then(|e| e.value.as_u32())
            .ok_or(Error::MissingTag)? as u64;

        reader.seek_abs(mn_offset)?;
        let preamble = reader.read_exact(6)?;
        if preamble != MAKERNOTE_PREAMBLE {
            return Err(Error::UnsupportedVendor);
        }
        let _version = reader.read_u16()?;
        let _reserved = reader.read_u16()?;
        if reader.read_u16()? != 0x4D4D {
            return Err(Error::BadMagic);
        }
        if reader.read_u16()? != TIFF_MAGIC {
            return Err(Error::BadMagic);
        }
        let first_ifd = reader.read_u32()? as u64;

        let base_offset = mn_offset + 10;
        let ifds = walk_ifds(reader, first_ifd, &NIKON_TAG_NAMES, base_offset)?;
        if ifds.len() != 1 {
            return Err(Error::MalformedStructure);
        }
        Ok(ifds)
    }

    /// Find the sensor IFD (the one whose `NewSubfileType` marks it as the
    /// full-resolution primary image), decode its linearization curve from
    /// the Makernote and reconstruct the raster.
    fn decode_raw<R: ReadAndSeek>(
        reader: &mut ByteReader<R>,
        ifds: &[Ifd],
        makernote_ifds: &[Ifd],
    ) -> Result<(Raster, Option<CfaInfo>)> {
        let raw_ifd = crate::metadata::find_raw_ifd(ifds).ok_or(Error::MissingTag)?;

        let width = raw_ifd
            .uint_value(exif::TAG_IMAGE_WIDTH)
            .ok_or(Error::MissingTag)?;
        let height = raw_ifd
            .uint_value(exif::TAG_IMAGE_LENGTH)
            .ok_or(Error::MissingTag)?;
        let bpc = raw_ifd
            .uint_value(exif::TAG_BITS_PER_SAMPLE)
            .ok_or(Error::MissingTag)? as u16;
        let strip_offset = raw_ifd
            .uint_value(exif::TAG_STRIP_OFFSETS)
            .ok_or(Error::MissingTag)?;
        let strip_len = raw_ifd
            .uint_value(exif::TAG_STRIP_BYTE_COUNTS)
            .ok_or(Error::MissingTag)?;

        let cfa = crate::metadata::cfa_pattern(raw_ifd).map(|p| CfaInfo::new(p, (2, 2)));

        let entry = Self::find_tag(makernote_ifds, TAG_NEF_LINEARIZATION_TABLE)
            .ok_or(Error::MissingTag)?;
        let curve = linearization::decode_curve(reader, entry.value_location, bpc)?;
        reader.seek_abs(strip_offset as u64)?;
        let raw = reader.read_exact(strip_len as usize)?;
        let raster = reconstruct::reconstruct(&raw, width, height, bpc, &curve)?;

        Ok((raster, cfa))
    }
}

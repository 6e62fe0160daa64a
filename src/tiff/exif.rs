/*
 * nef-raw - tiff/exif.rs
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

//! TIFF/Exif tag dictionary used to name entries and to locate the
//! well-known tags a NEF decode needs.

use std::collections::HashMap;

pub const TAG_NEW_SUBFILE_TYPE: u16 = 254;
pub const TAG_IMAGE_WIDTH: u16 = 256;
pub const TAG_IMAGE_LENGTH: u16 = 257;
pub const TAG_BITS_PER_SAMPLE: u16 = 258;
pub const TAG_COMPRESSION: u16 = 259;
pub const TAG_PHOTOMETRIC_INTERPRETATION: u16 = 262;
pub const TAG_MAKE: u16 = 271;
pub const TAG_MODEL: u16 = 272;
pub const TAG_STRIP_OFFSETS: u16 = 273;
pub const TAG_SAMPLES_PER_PIXEL: u16 = 277;
pub const TAG_ROWS_PER_STRIP: u16 = 278;
pub const TAG_STRIP_BYTE_COUNTS: u16 = 279;
pub const TAG_PLANAR_CONFIGURATION: u16 = 284;
/// Child IFD offsets (SubIFDs): tag 330.
pub const TAG_SUB_IFDS: u16 = 330;
pub const TAG_JPEG_INTERCHANGE_FORMAT: u16 = 513;
pub const TAG_JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 514;
pub const TAG_CFA_REPEAT_PATTERN_DIM: u16 = 33421;
pub const TAG_CFA_PATTERN: u16 = 33422;
/// EXIF sub-IFD offset: tag 34665.
pub const TAG_EXIF_IFD: u16 = 34665;
/// Nikon Makernote offset: tag 37500.
pub const TAG_MAKER_NOTE: u16 = 37500;

/// The two tags treated as "child IFD" pointers by the walker.
pub const CHILD_IFD_TAGS: [u16; 2] = [TAG_SUB_IFDS, TAG_EXIF_IFD];

lazy_static::lazy_static! {
    pub static ref EXIF_TAG_NAMES: HashMap<u16, &'static str> = HashMap::from([
        (TAG_NEW_SUBFILE_TYPE, "NewSubfileType"),
        (TAG_IMAGE_WIDTH, "ImageWidth"),
        (TAG_IMAGE_LENGTH, "ImageLength"),
        (TAG_BITS_PER_SAMPLE, "BitsPerSample"),
        (TAG_COMPRESSION, "Compression"),
        (TAG_PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation"),
        (TAG_MAKE, "Make"),
        (TAG_MODEL, "Model"),
        (TAG_STRIP_OFFSETS, "StripOffsets"),
        (TAG_SAMPLES_PER_PIXEL, "SamplesPerPixel"),
        (TAG_ROWS_PER_STRIP, "RowsPerStrip"),
        (TAG_STRIP_BYTE_COUNTS, "StripByteCounts"),
        (TAG_PLANAR_CONFIGURATION, "PlanarConfiguration"),
        (TAG_SUB_IFDS, "SubIFDs"),
        (TAG_JPEG_INTERCHANGE_FORMAT, "JPEGInterchangeFormat"),
        (TAG_JPEG_INTERCHANGE_FORMAT_LENGTH, "JPEGInterchangeFormatLength"),
        (TAG_CFA_REPEAT_PATTERN_DIM, "CFARepeatPatternDim"),
        (TAG_CFA_PATTERN, "CFAPattern"),
        (TAG_EXIF_IFD, "ExifIFD"),
        (TAG_MAKER_NOTE, "MakerNote"),
    ]);
}

/// Look up a name for `tag_id` in `dict`, falling back to "Unknown Tag" per
/// the graceful-degradation rule for unrecognized tags.
pub fn tag_name(dict: &HashMap<u16, &'static str>, tag_id: u16) -> String {
    dict.get(&tag_id)
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown Tag".to_string())
}

/// TIFF compression values relevant to NEF (subset; only what this crate
/// needs to recognize, not the full TIFF-EP registry).
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u16)]
pub enum Compression {
    Unknown = 0,
    None = 1,
    NikonPack = 32769,
    NikonQuantized = 34713,
}

impl From<u16> for Compression {
    fn from(v: u16) -> Compression {
        match v {
            1 => Compression::None,
            32769 => Compression::NikonPack,
            34713 => Compression::NikonQuantized,
            _ => Compression::Unknown,
        }
    }
}

/// Photometric interpretation values relevant to a raw CFA sensor IFD.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u16)]
pub enum PhotometricInterpretation {
    Rgb = 2,
    Cfa = 32803,
}

impl std::convert::TryFrom<u16> for PhotometricInterpretation {
    type Error = ();

    fn try_from(v: u16) -> Result<Self, ()> {
        match v {
            2 => Ok(PhotometricInterpretation::Rgb),
            32803 => Ok(PhotometricInterpretation::Cfa),
            _ => Err(()),
        }
    }
}

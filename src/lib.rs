/*
 * nef-raw - lib.rs
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

//! Nikon NEF raw file decoder: TIFF/IFD metadata, Makernote, linearization
//! curve and Huffman-compressed raw pixel data.

pub mod io;
pub mod metadata;
pub mod mosaic;
pub mod nikon;
pub mod rawdata;
pub mod tiff;
mod utils;

pub use mosaic::{CfaInfo, Pattern};
pub use nikon::NefFile;
pub use rawdata::Raster;
pub use tiff::entry::{Entry, TypedValue};
pub use tiff::Ifd;

/// Standard Result for nef-raw.
pub type Result<T> = std::result::Result<T, Error>;

/// Standard Error for nef-raw.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Underlying read/seek failure.
    Io(String),
    /// A read ran past the end of the file or the bitstream ended early.
    Truncated,
    /// Byte-order or magic/version mismatch in the outer TIFF or Makernote header.
    BadMagic,
    /// Makernote preamble isn't the expected vendor signature.
    UnsupportedVendor,
    /// Linearization curve version/point-count combination we don't decode.
    UnsupportedVariant,
    /// IFD chain is malformed: budget exceeded, wrong IFD count, bad offset.
    MalformedStructure,
    /// A tag required for decoding is missing.
    MissingTag,
    /// A tag's declared type doesn't match what the caller expected.
    TypeMismatch,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Io(ref err) => write!(f, "IO error: {}", err),
            Self::Truncated => write!(f, "Unexpected end of data"),
            Self::BadMagic => write!(f, "Bad magic or version"),
            Self::UnsupportedVendor => write!(f, "Unsupported Makernote vendor"),
            Self::UnsupportedVariant => write!(f, "Unsupported linearization curve variant"),
            Self::MalformedStructure => write!(f, "Malformed IFD structure"),
            Self::MissingTag => write!(f, "Required tag not found"),
            Self::TypeMismatch => write!(f, "Tag has an unexpected type"),
        }
    }
}

impl std::error::Error for Error {}

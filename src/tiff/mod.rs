/*
 * nef-raw - tiff/mod.rs
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

//! TIFF format: Image File Directories, typed values, and the tag
//! dictionary needed to read a NEF's outer container.

pub mod entry;
pub mod exif;
pub mod walker;

use std::collections::HashMap;

pub use entry::Entry;
pub use walker::walk_ifds;

/// One parsed Image File Directory: a tag-indexed bag of entries.
#[derive(Clone, Debug, Default)]
pub struct Ifd {
    pub(crate) entries: HashMap<u16, Entry>,
}

impl Ifd {
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, tag: u16) -> Option<&Entry> {
        self.entries.get(&tag)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn uint_value(&self, tag: u16) -> Option<u32> {
        self.entry(tag).and_then(|e| e.value.as_u32())
    }
}

/// Outer TIFF magic number (after the 2-byte "MM"/"II" byte-order mark).
pub const TIFF_MAGIC: u16 = 0x002A;

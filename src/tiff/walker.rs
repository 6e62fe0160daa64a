/*
 * nef-raw - tiff/walker.rs
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

//! Recursive IFD walker.

use std::collections::HashMap;

use byteorder::BigEndian;

use crate::io::{ByteReader, ReadAndSeek};
use crate::{Error, Result};

use super::entry::{Entry, TypedValue};
use super::exif::{self, CHILD_IFD_TAGS};
use super::Ifd;

/// Total IFDs a single walk is allowed to produce, guarding against cyclic
/// or adversarial offset chains.
const MAX_IFDS: usize = 64;

/// Walk the IFD chain starting at `initial_offset` (relative to
/// `base_offset`), following sibling and child-IFD links.
///
/// `base_offset` is `0` for the outer TIFF and `makernote_offset + 10` when
/// called to parse a Nikon Makernote. All offsets read while walking this
/// chain are interpreted relative to `base_offset`.
pub fn walk_ifds<R: ReadAndSeek>(
    reader: &mut ByteReader<R>,
    initial_offset: u64,
    tag_dict: &HashMap<u16, &'static str>,
    base_offset: u64,
) -> Result<Vec<Ifd>> {
    let mut worklist = vec![initial_offset];
    let mut ifds = Vec::new();

    while let Some(rel_offset) = worklist.pop() {
        if rel_offset == 0 {
            continue;
        }
        if ifds.len() >= MAX_IFDS {
            return Err(Error::MalformedStructure);
        }

        reader.seek_abs(base_offset + rel_offset)?;
        let count = reader.read_u16()?;

        let mut entries = HashMap::new();
        for _ in 0..count {
            let tag_id = reader.read_u16()?;
            let type_code = reader.read_u16()?;
            let value_count = reader.read_u32()?;
            let byte_size = Entry::byte_size(type_code, value_count);

            let (value_location, value) = if tag_id == exif::TAG_MAKER_NOTE {
                // The MakerNote value isn't data to dereference here: it's
                // the absolute offset of a whole embedded TIFF, which C4
                // re-enters separately with its own offset base. Per the
                // original decoder, "we do not store the value, but rather
                // just the offset as value."
                let loc = reader.tell()?;
                let rel = reader.read_u32()? as u64;
                let abs = base_offset + rel;
                (loc, TypedValue::U32(vec![abs as u32]))
            } else if byte_size <= 4 {
                let loc = reader.tell()?;
                let raw = reader.read_exact(4)?;
                (loc, TypedValue::decode::<BigEndian>(type_code, value_count, &raw))
            } else {
                let rel = reader.read_u32()? as u64;
                let abs = base_offset + rel;
                let resume_at = reader.tell()?;
                reader.seek_abs(abs)?;
                let raw = reader.read_exact(byte_size)?;
                reader.seek_abs(resume_at)?;
                (abs, TypedValue::decode::<BigEndian>(type_code, value_count, &raw))
            };

            log::debug!("tag 0x{:04x} at 0x{:x}", tag_id, value_location);

            if CHILD_IFD_TAGS.contains(&tag_id) {
                if let Some(offsets) = value.as_u32_array() {
                    worklist.extend(offsets.into_iter().map(|o| o as u64));
                }
            }

            let tag_name = exif::tag_name(tag_dict, tag_id);
            entries.insert(
                tag_id,
                Entry {
                    tag_id,
                    tag_name,
                    type_code,
                    count: value_count,
                    value_location,
                    value,
                },
            );
        }

        let next = reader.read_u32()? as u64;
        if next != 0 {
            worklist.push(next);
        }

        ifds.push(Ifd { entries });
    }

    Ok(ifds)
}

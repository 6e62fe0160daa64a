// SPDX-License-Identifier: LGPL-3.0-or-later
/*
 * nef-raw - metadata.rs
 *
 * Copyright (C) 2023 Hubert Figuière
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

//! Metadata façade: flattening iteration over parsed IFDs, plus the
//! convenience lookups a NEF decode needs (geometry, compression, CFA).

use std::collections::hash_map;

use crate::mosaic::Pattern;
use crate::tiff::entry::Entry;
use crate::tiff::exif::{self, Compression};
use crate::tiff::Ifd;

pub type Key = String;

/// One flattened entry, tagged with the index of the IFD (in walk order)
/// it came from.
pub type MetadataItem<'a> = (Key, &'a Entry, usize);

/// Walks every entry of every IFD in a decode's IFD tree, in walk order.
pub struct MetadataIter<'a> {
    ifds: &'a [Ifd],
    next_ifd: usize,
    current_ifd: usize,
    entries: Option<hash_map::Values<'a, u16, Entry>>,
}

impl<'a> MetadataIter<'a> {
    pub fn new(ifds: &'a [Ifd]) -> Self {
        MetadataIter {
            ifds,
            next_ifd: 0,
            current_ifd: 0,
            entries: None,
        }
    }
}

impl<'a> Iterator for MetadataIter<'a> {
    type Item = MetadataItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(iter) = self.entries.as_mut() {
                if let Some(entry) = iter.next() {
                    return Some((entry.tag_name.clone(), entry, self.current_ifd));
                }
            }
            if self.next_ifd >= self.ifds.len() {
                return None;
            }
            self.current_ifd = self.next_ifd;
            self.entries = Some(self.ifds[self.next_ifd].entries.values());
            self.next_ifd += 1;
        }
    }
}

/// The `ImageWidth`/`ImageLength` pair of an IFD, if both are present.
pub fn dimensions(ifd: &Ifd) -> Option<(u32, u32)> {
    let width = ifd.uint_value(exif::TAG_IMAGE_WIDTH)?;
    let length = ifd.uint_value(exif::TAG_IMAGE_LENGTH)?;
    Some((width, length))
}

pub fn bits_per_sample(ifd: &Ifd) -> Option<u16> {
    ifd.uint_value(exif::TAG_BITS_PER_SAMPLE).map(|v| v as u16)
}

pub fn compression(ifd: &Ifd) -> Option<Compression> {
    ifd.uint_value(exif::TAG_COMPRESSION)
        .map(|v| Compression::from(v as u16))
}

pub fn strip_offset(ifd: &Ifd) -> Option<u32> {
    ifd.uint_value(exif::TAG_STRIP_OFFSETS)
}

pub fn strip_byte_count(ifd: &Ifd) -> Option<u32> {
    ifd.uint_value(exif::TAG_STRIP_BYTE_COUNTS)
}

/// The sensor's Bayer/X-Trans pattern, from `CFAPattern` (falls back to
/// nothing if the tag is absent or malformed — callers decide whether
/// that's fatal).
pub fn cfa_pattern(ifd: &Ifd) -> Option<Pattern> {
    ifd.entry(exif::TAG_CFA_PATTERN)
        .and_then(|e| e.value.as_bytes())
        .and_then(|b| Pattern::try_from(b).ok())
}

/// The IFD holding the raw image data: the one whose `NewSubfileType` is
/// 0 (the "full-resolution primary image" subfile), not a thumbnail or
/// preview subfile.
pub fn find_raw_ifd(ifds: &[Ifd]) -> Option<&Ifd> {
    ifds.iter()
        .find(|ifd| ifd.uint_value(exif::TAG_NEW_SUBFILE_TYPE) == Some(0))
}

#[cfg(test)]
mod test {
    use super::{dimensions, find_raw_ifd, MetadataIter};
    use crate::tiff::entry::{Entry, TypedValue};
    use crate::tiff::exif::{TAG_IMAGE_LENGTH, TAG_IMAGE_WIDTH, TAG_NEW_SUBFILE_TYPE};
    use crate::tiff::Ifd;
    use std::collections::HashMap;

    fn entry(tag: u16, value: TypedValue) -> Entry {
        Entry {
            tag_id: tag,
            tag_name: format!("tag{tag}"),
            type_code: 4,
            count: 1,
            value_location: 0,
            value,
        }
    }

    #[test]
    fn test_dimensions() {
        let mut entries = HashMap::new();
        entries.insert(TAG_IMAGE_WIDTH, entry(TAG_IMAGE_WIDTH, TypedValue::U32(vec![4000])));
        entries.insert(TAG_IMAGE_LENGTH, entry(TAG_IMAGE_LENGTH, TypedValue::U32(vec![3000])));
        let ifd = Ifd { entries };
        assert_eq!(dimensions(&ifd), Some((4000, 3000)));
    }

    #[test]
    fn test_metadata_iter_flattens_all_ifds() {
        let mut e1 = HashMap::new();
        e1.insert(1_u16, entry(1, TypedValue::U32(vec![1])));
        let mut e2 = HashMap::new();
        e2.insert(2_u16, entry(2, TypedValue::U32(vec![2])));
        e2.insert(3_u16, entry(3, TypedValue::U32(vec![3])));

        let ifds = vec![Ifd { entries: e1 }, Ifd { entries: e2 }];
        let items: Vec<_> = MetadataIter::new(&ifds).collect();
        assert_eq!(items.len(), 3);
        assert!(items.iter().any(|(_, _, idx)| *idx == 0));
        assert!(items.iter().filter(|(_, _, idx)| *idx == 1).count() == 2);
    }

    #[test]
    fn test_find_raw_ifd_matches_new_subfile_type_zero() {
        let mut thumb = HashMap::new();
        thumb.insert(
            TAG_NEW_SUBFILE_TYPE,
            entry(TAG_NEW_SUBFILE_TYPE, TypedValue::U32(vec![1])),
        );
        let mut raw = HashMap::new();
        raw.insert(
            TAG_NEW_SUBFILE_TYPE,
            entry(TAG_NEW_SUBFILE_TYPE, TypedValue::U32(vec![0])),
        );

        let ifds = vec![Ifd { entries: thumb }, Ifd { entries: raw }];
        let found = find_raw_ifd(&ifds).unwrap();
        assert_eq!(found.uint_value(TAG_NEW_SUBFILE_TYPE), Some(0));
    }

    #[test]
    fn test_find_raw_ifd_absent_without_the_tag() {
        let ifds = vec![Ifd {
            entries: HashMap::new(),
        }];
        assert!(find_raw_ifd(&ifds).is_none());
    }
}

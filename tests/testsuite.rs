/*
 * nef-raw - tests/testsuite.rs
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

//! End-to-end decode tests built on synthetic, in-memory NEF byte buffers
//! (no external test assets: the format pieces are small enough to hand-build).

use std::io::Cursor;

use nef_raw::io::ByteReader;
use nef_raw::tiff::exif::EXIF_TAG_NAMES;
use nef_raw::tiff::walk_ifds;
use nef_raw::{Error, NefFile};

/// Build a minimal outer TIFF: header + one IFD with the given entries
/// (tag, type_code, count, inline 4-byte value) and an optional next-IFD
/// offset of 0. Entries must already fit inline (<=4 bytes).
fn build_ifd(entries: &[(u16, u16, u32, [u8; 4])]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    for (tag, type_code, count, value) in entries {
        buf.extend_from_slice(&tag.to_be_bytes());
        buf.extend_from_slice(&type_code.to_be_bytes());
        buf.extend_from_slice(&count.to_be_bytes());
        buf.extend_from_slice(value);
    }
    buf.extend_from_slice(&0_u32.to_be_bytes());
    buf
}

fn tiff_header(first_ifd_offset: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&0x4D4D_u16.to_be_bytes());
    buf.extend_from_slice(&0x002A_u16.to_be_bytes());
    buf.extend_from_slice(&first_ifd_offset.to_be_bytes());
    buf
}

#[test]
fn test_rejects_non_tiff_file() {
    let buf = vec![0xFF_u8; 16];
    let err = NefFile::open(Cursor::new(buf)).unwrap_err();
    assert_eq!(err, Error::BadMagic);
}

#[test]
fn test_minimal_file_with_no_tags_has_no_makernote() {
    // A real NEF always carries a Makernote; an IFD with no tags at all
    // can't supply one, so decoding must fail rather than silently
    // succeed with an empty raster.
    let mut buf = tiff_header(8);
    buf.extend_from_slice(&build_ifd(&[]));

    let err = NefFile::open(Cursor::new(buf)).unwrap_err();
    assert_eq!(err, Error::MissingTag);
}

#[test]
fn test_exif_ifd_is_followed() {
    // Outer IFD has one tag (Make) plus an ExifIFD pointer to a second IFD.
    // This only exercises the outer IFD walk, not a full NefFile decode,
    // since this fixture has no Makernote tag at all.
    let outer_ifd_offset = 8_u32;
    let make_value = *b"NIKO";
    let exif_ifd_offset = outer_ifd_offset + 2 + 12 * 2 + 4; // right after this IFD block

    let mut buf = tiff_header(outer_ifd_offset);
    buf.extend_from_slice(&build_ifd(&[
        (271, 2, 4, make_value),         // Make, Ascii, 4 bytes inline
        (34665, 4, 1, exif_ifd_offset.to_be_bytes()), // ExifIFD
    ]));
    buf.extend_from_slice(&build_ifd(&[(33434, 4, 1, [0, 0, 0, 42])]));

    let mut reader = ByteReader::new(Cursor::new(buf));
    let ifds = walk_ifds(&mut reader, outer_ifd_offset as u64, &EXIF_TAG_NAMES, 0).unwrap();
    assert_eq!(ifds.len(), 2);
    let make = ifds[0].entry(271).unwrap();
    assert_eq!(make.value.as_str(), Some("NIKO".to_string()));
    let exposure = ifds[1].entry(33434).unwrap();
    assert_eq!(exposure.value.as_u32(), Some(42));
}

#[test]
fn test_makernote_round_trip() {
    // A full, minimal synthetic NEF: one outer IFD doubling as the raw
    // image IFD (NewSubfileType 0, 2x2 @ 12bpc, a zero-length strip) plus
    // a MakerNote carrying NEFCompression and a verbatim linearization
    // table. The strip is empty, relying on BitReader's zero-padding past
    // EOF for deterministic, all-zero decoded pixels.
    let outer_ifd_offset = 8_u32;
    let outer_entries = [
        (254_u16, 3_u16, 1_u32, [0_u8, 0, 0, 0]), // NewSubfileType = 0
        (256, 3, 1, [0, 2, 0, 0]),                // ImageWidth = 2
        (257, 3, 1, [0, 2, 0, 0]),                // ImageLength = 2
        (258, 3, 1, [0, 12, 0, 0]),               // BitsPerSample = 12
        (273, 4, 1, [0, 0, 0, 0]),                // StripOffsets (unused, 0-length strip)
        (279, 4, 1, [0, 0, 0, 0]),                // StripByteCounts = 0
        (37500, 7, 300, [0, 0, 0, 0]),            // MakerNote: Undefined(300), offset patched below
    ];
    let outer_ifd_bytes = build_ifd(&outer_entries);
    let makernote_offset = outer_ifd_offset + outer_ifd_bytes.len() as u32;

    let mut outer_entries = outer_entries;
    outer_entries[6].3 = makernote_offset.to_be_bytes();

    let mut buf = tiff_header(outer_ifd_offset);
    buf.extend_from_slice(&build_ifd(&outer_entries));

    // Makernote: "Nikon\0" + version(2) + reserved(2) + "MM"/0x002A/offset(4),
    // all offsets from here on relative to makernote_offset + 10.
    let makernote_preamble_len: u32 = 6 + 4 + 2 + 2 + 4;
    let makernote_base = makernote_offset + 10;

    let makernote_entries_template = [
        (0x0093_u16, 3_u16, 1_u32, [0_u8, 2, 0, 0]), // NEFCompression = 2 (lossy)
        (0x0096, 7, 20, [0_u8, 0, 0, 0]),             // NEFLinearizationTable (offset patched below)
    ];
    let makernote_ifd_bytes = build_ifd(&makernote_entries_template);
    let lin_table_offset =
        makernote_offset + makernote_preamble_len + makernote_ifd_bytes.len() as u32;
    let lin_table_rel_offset = lin_table_offset - makernote_base;

    let mut makernote_entries = makernote_entries_template;
    makernote_entries[1].3 = lin_table_rel_offset.to_be_bytes();

    buf.extend_from_slice(b"Nikon\0");
    buf.extend_from_slice(&[0x02, 0x10, 0, 0]); // version + reserved
    buf.extend_from_slice(&0x4D4D_u16.to_be_bytes());
    buf.extend_from_slice(&0x002A_u16.to_be_bytes());
    buf.extend_from_slice(&8_u32.to_be_bytes()); // relative offset of makernote IFD

    buf.extend_from_slice(&build_ifd(&makernote_entries));

    // Verbatim linearization table: v0=0x30 (not the interpolated 0x44/0x20
    // marker, not the unsupported 0x46 one), v1=0x00, a zeroed predictor
    // seed, 4 elements spanning the 12-bit range.
    buf.push(0x30);
    buf.push(0x00);
    for _ in 0..4 {
        buf.extend_from_slice(&0_u16.to_be_bytes()); // vpred[2][2], all zero
    }
    buf.extend_from_slice(&4_u16.to_be_bytes()); // nelems
    for v in [0_u16, 1365, 2730, 4095] {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    let nef = NefFile::open(Cursor::new(buf)).unwrap();
    assert_eq!(nef.makernote_ifds.len(), 1);
    let compression = nef.makernote_ifds[0].entry(0x0093).unwrap();
    assert_eq!(compression.value.as_u32(), Some(2));

    assert_eq!(nef.raster.width, 2);
    assert_eq!(nef.raster.height, 2);
    // An all-zero bitstream decodes, under Lossy12Bit, to a category-5
    // diff of -31 at every pixel; clamped against a zero predictor seed
    // that floors to 0, every sample lands on curve[0] == 0.
    assert_eq!(nef.raster.data, vec![0, 0, 0, 0]);
}

#[test]
fn test_makernote_rejects_bad_preamble() {
    let outer_ifd_offset = 8_u32;
    let makernote_offset = outer_ifd_offset + 2 + 12 + 4;

    let mut buf = tiff_header(outer_ifd_offset);
    buf.extend_from_slice(&build_ifd(&[(
        37500,
        4,
        1,
        makernote_offset.to_be_bytes(),
    )]));
    buf.extend_from_slice(b"Canon\0");

    let err = NefFile::open(Cursor::new(buf)).unwrap_err();
    assert_eq!(err, Error::UnsupportedVendor);
}

#[test]
fn test_malformed_ifd_chain_is_bounded() {
    // An IFD whose "next" pointer points right back at itself must not
    // loop forever; the walker's budget should trip MalformedStructure
    // well before that, since 0 offsets are skipped and self-references
    // are pushed on the worklist over and over only up to the IFD cap.
    let mut buf = tiff_header(8);
    // next-IFD offset of 8 means this same IFD forever.
    let mut ifd = Vec::new();
    ifd.extend_from_slice(&0_u16.to_be_bytes());
    ifd.extend_from_slice(&8_u32.to_be_bytes());
    buf.extend_from_slice(&ifd);

    let err = NefFile::open(Cursor::new(buf)).unwrap_err();
    assert_eq!(err, Error::MalformedStructure);
}

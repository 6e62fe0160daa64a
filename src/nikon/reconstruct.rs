/*
 * nef-raw - nikon/reconstruct.rs
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

//! Reconstruct the raw Bayer raster from a Huffman-compressed Nikon strip.
//!
//! Each pixel is coded as a signed difference against a predictor: the two
//! leftmost columns of a row predict from the same column and row parity
//! in the row above (`vert_pred`), every other column predicts from the
//! previous pixel of the same column parity in the current row
//! (`horiz_pred`).

use super::bitstream::BitReader;
use super::huffman::{self, TreeIndex};
use super::linearization::LinearizationCurve;
use crate::rawdata::Raster;
use crate::Result;

pub fn reconstruct(
    raw: &[u8],
    width: u32,
    height: u32,
    bpc: u16,
    curve: &LinearizationCurve,
) -> Result<Raster> {
    let mut pixels = vec![0_u16; (width as usize) * (height as usize)];
    let mut reader = BitReader::new(raw);

    let mut vert_pred = curve.vpred;
    let mut horiz_pred = [0_u16; 2];
    let mut tree = curve.tree;

    for row in 0..height {
        if curve.split_row != 0 && row == curve.split_row as u32 {
            tree = tree.split_variant();
        }
        horiz_pred = [0_u16; 2];

        for col in 0..width {
            let predictor = if col < 2 {
                vert_pred[(row & 1) as usize][col as usize]
            } else {
                horiz_pred[(col & 1) as usize]
            };

            let diff = decode_diff(tree, &mut reader)?;
            let value = (predictor as i32 + diff).clamp(0, 0x7fff) as u16;

            if col < 2 {
                vert_pred[(row & 1) as usize][col as usize] = value;
            } else {
                horiz_pred[(col & 1) as usize] = value;
            }

            let sample = (value as usize).min(curve.num_points.saturating_sub(1));
            pixels[(row * width + col) as usize] = curve.curve[sample];
        }
    }

    Ok(Raster::new(width, height, bpc, pixels))
}

/// Try the active tree first; if a split row just switched the table and
/// the stream still has bits queued from the old one, `decode_one` simply
/// reads whatever bits are next. Nikon firmwares emit the split cleanly on
/// a row boundary, so no realignment is needed beyond the table swap.
fn decode_diff(tree: TreeIndex, reader: &mut BitReader) -> Result<i32> {
    huffman::decode_one(tree, reader)
}

#[cfg(test)]
mod test {
    use super::reconstruct;
    use crate::nikon::huffman::TreeIndex;
    use crate::nikon::linearization::LinearizationCurve;

    fn identity_curve(tree: TreeIndex, vpred: [[u16; 2]; 2], split_row: u16) -> LinearizationCurve {
        let curve: Vec<u16> = (0..8192_u32).map(|i| i as u16).collect();
        let num_points = curve.len();
        LinearizationCurve {
            curve,
            num_points,
            vpred,
            split_row,
            tree,
        }
    }

    fn flat_curve(tree: TreeIndex) -> LinearizationCurve {
        identity_curve(tree, [[0, 0], [0, 0]], 0)
    }

    #[test]
    fn test_reconstruct_zero_stream_is_flat() {
        // An all-zero bitstream decodes, under LOSSY_14BIT, to whatever
        // category its leading zero-bits select; this just checks the
        // function runs end-to-end and produces the right raster shape.
        let curve = flat_curve(TreeIndex::Lossy14Bit);
        let raw = vec![0_u8; 64];
        let raster = reconstruct(&raw, 4, 3, 14, &curve).unwrap();
        assert_eq!(raster.width, 4);
        assert_eq!(raster.height, 3);
        assert_eq!(raster.data.len(), 12);
    }

    /// Minimal MSB-first bit packer, used only to hand-craft a Huffman
    /// stream with known per-pixel differences.
    struct BitWriter {
        bytes: Vec<u8>,
        cur: u8,
        nbits: u8,
    }

    impl BitWriter {
        fn new() -> Self {
            BitWriter {
                bytes: Vec::new(),
                cur: 0,
                nbits: 0,
            }
        }

        fn push(&mut self, value: u32, bits: u8) {
            for i in (0..bits).rev() {
                let bit = ((value >> i) & 1) as u8;
                self.cur = (self.cur << 1) | bit;
                self.nbits += 1;
                if self.nbits == 8 {
                    self.bytes.push(self.cur);
                    self.cur = 0;
                    self.nbits = 0;
                }
            }
        }

        fn finish(mut self) -> Vec<u8> {
            if self.nbits > 0 {
                self.cur <<= 8 - self.nbits;
                self.bytes.push(self.cur);
            }
            self.bytes
        }
    }

    #[test]
    fn test_reconstruct_predictor_law_and_split_row() {
        // Every pixel is coded as Huffman category 5 followed by 5 raw bits
        // with the top bit set, so diff = raw (16..=31). Columns 0/1
        // exercise the vertical predictor (seeded per row parity); columns
        // 2/3 exercise the horizontal predictor (reset every row, and again
        // at the split row). Category 5's code differs between LOSSY_12BIT
        // ("00") and its after-split variant ("011"), since the split
        // switches to a genuinely different table, not just a different
        // label for the same one.
        let mut w = BitWriter::new();
        for row in 0..3 {
            let (prefix, prefix_bits) = if row == 2 { (0b011, 3) } else { (0b00, 2) };
            w.push(prefix, prefix_bits);
            w.push(20, 5); // col 0: +20
            w.push(prefix, prefix_bits);
            w.push(25, 5); // col 1: +25
            w.push(prefix, prefix_bits);
            w.push(16, 5); // col 2: +16
            w.push(prefix, prefix_bits);
            w.push(31, 5); // col 3: +31
        }
        let raw = w.finish();

        let vpred = [[1000, 2000], [3000, 4000]];
        let curve = identity_curve(TreeIndex::Lossy12Bit, vpred, 2);

        let raster = reconstruct(&raw, 4, 3, 12, &curve).unwrap();

        // Row 0 (parity 0): vertical predictors seeded from vpred[0],
        // horizontal predictors start at 0.
        assert_eq!(&raster.data[0..4], &[1020, 2025, 16, 31]);
        // Row 1 (parity 1): vertical predictors seeded from vpred[1] and
        // keep accumulating across rows; horizontal predictors reset to 0
        // at the start of every row, so columns 2/3 repeat.
        assert_eq!(&raster.data[4..8], &[3020, 4025, 16, 31]);
        // Row 2 is the split row: the tree switches in addition to the
        // per-row horizontal reset, while the vertical predictor (keyed by
        // row parity, not by split row) keeps accumulating from row 0.
        assert_eq!(&raster.data[8..12], &[1040, 2050, 16, 31]);
    }
}

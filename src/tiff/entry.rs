/*
 * nef-raw - tiff/entry.rs
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

//! IFD entries and their typed values.

use byteorder::ByteOrder;

/// A TIFF tag value, tagged by its on-disk type. Values are always kept
/// as a sequence internally; callers asking for a scalar (`as_u32` and
/// friends) get the first element, matching the `count == 1` case.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedValue {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    /// Raw ASCII bytes, NUL or not. Use `as_str` to interpret them.
    Ascii(Vec<u8>),
    URational(Vec<(u32, u32)>),
    SRational(Vec<(i32, i32)>),
    Undefined(Vec<u8>),
}

/// TIFF 6.0 type codes, plus the Undefined fallback used for unrecognized ones.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u16)]
pub enum TypeCode {
    U8 = 1,
    Ascii = 2,
    U16 = 3,
    U32 = 4,
    URational = 5,
    I8 = 6,
    Undefined = 7,
    I16 = 8,
    I32 = 9,
    SRational = 10,
    F32 = 11,
    F64 = 12,
}

impl TypeCode {
    pub fn from_u16(v: u16) -> TypeCode {
        match v {
            1 => TypeCode::U8,
            2 => TypeCode::Ascii,
            3 => TypeCode::U16,
            4 => TypeCode::U32,
            5 => TypeCode::URational,
            6 => TypeCode::I8,
            7 => TypeCode::Undefined,
            8 => TypeCode::I16,
            9 => TypeCode::I32,
            10 => TypeCode::SRational,
            11 => TypeCode::F32,
            12 => TypeCode::F64,
            // unknown private type: treat as raw bytes
            _ => TypeCode::U8,
        }
    }

    /// Size in bytes of one unit of this type.
    pub fn unit_size(self) -> usize {
        match self {
            TypeCode::U8 | TypeCode::Ascii | TypeCode::I8 | TypeCode::Undefined => 1,
            TypeCode::U16 | TypeCode::I16 => 2,
            TypeCode::U32 | TypeCode::I32 | TypeCode::F32 => 4,
            TypeCode::URational | TypeCode::SRational | TypeCode::F64 => 8,
        }
    }
}

impl TypedValue {
    /// Decode `count` values of `type_code` out of `raw`, using `E` as the
    /// byte order (the Makernote and outer TIFF can each declare their own).
    pub fn decode<E: ByteOrder>(type_code: u16, count: u32, raw: &[u8]) -> TypedValue {
        let tc = TypeCode::from_u16(type_code);
        let count = count as usize;
        match tc {
            TypeCode::U8 => TypedValue::U8(raw.iter().take(count).copied().collect()),
            TypeCode::I8 => TypedValue::I8(raw.iter().take(count).map(|&b| b as i8).collect()),
            TypeCode::Ascii => TypedValue::Ascii(raw.iter().take(count).copied().collect()),
            TypeCode::Undefined => TypedValue::Undefined(raw.iter().take(count).copied().collect()),
            TypeCode::U16 => {
                TypedValue::U16((0..count).map(|i| E::read_u16(&raw[i * 2..])).collect())
            }
            TypeCode::I16 => {
                TypedValue::I16((0..count).map(|i| E::read_i16(&raw[i * 2..])).collect())
            }
            TypeCode::U32 => {
                TypedValue::U32((0..count).map(|i| E::read_u32(&raw[i * 4..])).collect())
            }
            TypeCode::I32 => {
                TypedValue::I32((0..count).map(|i| E::read_i32(&raw[i * 4..])).collect())
            }
            TypeCode::F32 => {
                TypedValue::F32((0..count).map(|i| E::read_f32(&raw[i * 4..])).collect())
            }
            TypeCode::F64 => {
                TypedValue::F64((0..count).map(|i| E::read_f64(&raw[i * 8..])).collect())
            }
            TypeCode::URational => TypedValue::URational(
                (0..count)
                    .map(|i| {
                        let s = &raw[i * 8..];
                        (E::read_u32(s), E::read_u32(&s[4..]))
                    })
                    .collect(),
            ),
            TypeCode::SRational => TypedValue::SRational(
                (0..count)
                    .map(|i| {
                        let s = &raw[i * 8..];
                        (E::read_i32(s), E::read_i32(&s[4..]))
                    })
                    .collect(),
            ),
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            TypedValue::U8(v) => v.first().map(|&x| x as u32),
            TypedValue::U16(v) => v.first().map(|&x| x as u32),
            TypedValue::U32(v) => v.first().copied(),
            _ => None,
        }
    }

    pub fn as_u32_array(&self) -> Option<Vec<u32>> {
        match self {
            TypedValue::U8(v) => Some(v.iter().map(|&x| x as u32).collect()),
            TypedValue::U16(v) => Some(v.iter().map(|&x| x as u32).collect()),
            TypedValue::U32(v) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<String> {
        match self {
            TypedValue::Ascii(b) => Some(crate::utils::from_maybe_nul_terminated(b)),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TypedValue::Ascii(b) | TypedValue::Undefined(b) => Some(b),
            TypedValue::U8(b) => Some(b),
            _ => None,
        }
    }
}

/// One decoded IFD entry.
#[derive(Clone, Debug)]
pub struct Entry {
    pub tag_id: u16,
    pub tag_name: String,
    pub type_code: u16,
    pub count: u32,
    /// Absolute file offset of the inline value slot, or of the out-of-line
    /// value buffer when the value doesn't fit in 4 bytes.
    pub value_location: u64,
    pub value: TypedValue,
}

impl Entry {
    /// Number of bytes the raw value occupies, per the TIFF type table.
    pub fn byte_size(type_code: u16, count: u32) -> usize {
        TypeCode::from_u16(type_code).unit_size() * count as usize
    }
}

#[cfg(test)]
mod test {
    use super::TypedValue;
    use byteorder::BigEndian;

    #[test]
    fn test_decode_scalar_u16() {
        let raw = [0x12, 0x34, 0, 0];
        let v = TypedValue::decode::<BigEndian>(3, 1, &raw);
        assert_eq!(v, TypedValue::U16(vec![0x1234]));
        assert_eq!(v.as_u32(), Some(0x1234));
    }

    #[test]
    fn test_decode_ascii_trims_nul() {
        let raw = b"abc\0";
        let v = TypedValue::decode::<BigEndian>(2, 4, raw);
        assert_eq!(v.as_str(), Some("abc".to_string()));
    }

    #[test]
    fn test_decode_rational_pair() {
        let raw = [0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4];
        let v = TypedValue::decode::<BigEndian>(5, 2, &raw);
        assert_eq!(v, TypedValue::URational(vec![(1, 2), (3, 4)]));
    }

    #[test]
    fn test_unknown_type_falls_back_to_u8() {
        let raw = [9, 8, 7];
        let v = TypedValue::decode::<BigEndian>(200, 3, &raw);
        assert_eq!(v, TypedValue::U8(vec![9, 8, 7]));
    }
}

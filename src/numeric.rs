// src/numeric.rs
//! The canonical numeric wire format used for `GenericPort` interop and for
//! publishing/pulling numeric values across type-erased boundaries
//! (spec.md §6 "External interfaces").
//!
//! Selector-byte scheme (grounded on `tNumber::Serialize`):
//!
//! - bit 0: `has_unit` — a trailing unit tag byte follows the value
//! - bits 1..: value representation, one of
//!   - `Int64`, `Int32`, `Int16`
//!   - `Float64`, `Float32`
//!   - `LegacyConst` (reserved, decodes as `Int32` for compatibility)
//!   - `Immediate7` — the value is packed directly into the remaining 7
//!     bits of the selector byte itself, for small non-negative integers,
//!     avoiding any trailing bytes at all.
//!
//! Following bytes carry the value little-endian (spec.md §6), independent
//! of width — `put_u32`/`put_u64` on [`Buffer`] are big-endian (they serve
//! the SSH-style wire code the buffer layer also carries), so every
//! fixed-width value here goes through `put_bytes`/`get_bytes` on its own
//! explicit `to_le_bytes`/`from_le_bytes` round trip instead.

use crate::buffer::Buffer;
use crate::error::{PortError, Result};

const HAS_UNIT_BIT: u8 = 0x01;
/// Top bit of the selector byte: set means "value is a 6-bit immediate
/// packed into bits 1..6 of this same byte", never a representation code.
const IMMEDIATE_FLAG: u8 = 0x80;
const IMMEDIATE_MAX: i64 = 0x3F;

#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(u8)]
enum Representation {
    Int64 = 0,
    Int32 = 1,
    Int16 = 2,
    Float64 = 3,
    Float32 = 4,
    LegacyConst = 5,
    Immediate7 = 6,
}

impl Representation {
    fn from_selector(bits: u8) -> Result<Self> {
        Ok(match bits {
            0 => Self::Int64,
            1 => Self::Int32,
            2 => Self::Int16,
            3 => Self::Float64,
            4 => Self::Float32,
            5 => Self::LegacyConst,
            6 => Self::Immediate7,
            _ => return Err(PortError::InvalidState(format!("unknown numeric representation {bits}"))),
        })
    }
}

/// A numeric value in the canonical wire container, with an optional unit tag.
///
/// Mirrors the original's `tNumber`: one physical container for every
/// numeric port type, carrying enough type information to round-trip through
/// [`crate::port::generic::GenericPort`] without the destination knowing the
/// source's exact numeric type ahead of time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int64(i64),
    Int32(i32),
    Int16(i16),
    Float64(f64),
    Float32(f32),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int64(v) => v as f64,
            Number::Int32(v) => v as f64,
            Number::Int16(v) => v as f64,
            Number::Float64(v) => v,
            Number::Float32(v) => v as f64,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match *self {
            Number::Int64(v) => v,
            Number::Int32(v) => v as i64,
            Number::Int16(v) => v as i64,
            Number::Float64(v) => v as i64,
            Number::Float32(v) => v as i64,
        }
    }

    fn representation(&self) -> Representation {
        match self {
            Number::Int64(v) => {
                if *v >= 0 && *v <= IMMEDIATE_MAX {
                    Representation::Immediate7
                } else {
                    Representation::Int64
                }
            }
            Number::Int32(_) => Representation::Int32,
            Number::Int16(_) => Representation::Int16,
            Number::Float64(_) => Representation::Float64,
            Number::Float32(_) => Representation::Float32,
        }
    }
}

/// Encodes `value` into `buf` at its current position, with an optional unit
/// tag byte appended when `unit` is `Some`.
pub fn encode(buf: &mut Buffer, value: Number, unit: Option<u8>) -> Result<()> {
    let representation = value.representation();
    let mut selector = (representation as u8) << 1;
    if unit.is_some() {
        selector |= HAS_UNIT_BIT;
    }

    if representation == Representation::Immediate7 {
        let Number::Int64(v) = value else {
            unreachable!("Immediate7 is only ever selected for Int64");
        };
        let selector = IMMEDIATE_FLAG | ((v as u8) << 1) | (unit.is_some() as u8);
        buf.put_byte(selector)?;
    } else {
        buf.put_byte(selector)?;
        match value {
            Number::Int64(v) => buf.put_bytes(&v.to_le_bytes())?,
            Number::Int32(v) => buf.put_bytes(&v.to_le_bytes())?,
            Number::Int16(v) => buf.put_bytes(&v.to_le_bytes())?,
            Number::Float64(v) => buf.put_bytes(&v.to_bits().to_le_bytes())?,
            Number::Float32(v) => buf.put_bytes(&v.to_bits().to_le_bytes())?,
        }
    }

    if let Some(unit) = unit {
        buf.put_byte(unit)?;
    }
    Ok(())
}

/// Decodes a [`Number`] (and optional unit byte) previously written by [`encode`].
pub fn decode(buf: &mut Buffer) -> Result<(Number, Option<u8>)> {
    let selector = buf.get_byte()?;
    let has_unit = selector & HAS_UNIT_BIT != 0;

    let value = if selector & IMMEDIATE_FLAG != 0 {
        Number::Int64(((selector & !IMMEDIATE_FLAG) >> 1) as i64)
    } else {
        let representation_bits = (selector >> 1) & 0x7;
        let representation = Representation::from_selector(representation_bits)?;
        match representation {
            Representation::Int64 => Number::Int64(i64::from_le_bytes(buf.get_bytes(8)?.try_into().unwrap())),
            Representation::Int32 | Representation::LegacyConst => {
                Number::Int32(i32::from_le_bytes(buf.get_bytes(4)?.try_into().unwrap()))
            }
            Representation::Int16 => Number::Int16(i16::from_le_bytes(buf.get_bytes(2)?.try_into().unwrap())),
            Representation::Float64 => {
                Number::Float64(f64::from_bits(u64::from_le_bytes(buf.get_bytes(8)?.try_into().unwrap())))
            }
            Representation::Float32 => {
                Number::Float32(f32::from_bits(u32::from_le_bytes(buf.get_bytes(4)?.try_into().unwrap())))
            }
            Representation::Immediate7 => unreachable!("handled by the IMMEDIATE_FLAG branch above"),
        }
    };

    let unit = if has_unit { Some(buf.get_byte()?) } else { None };
    Ok((value, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Number, unit: Option<u8>) -> (Number, Option<u8>) {
        let mut buf = Buffer::new(32);
        encode(&mut buf, value, unit).unwrap();
        buf.set_pos(0).unwrap();
        decode(&mut buf).unwrap()
    }

    #[test]
    fn immediate_small_int_roundtrips() {
        assert_eq!(roundtrip(Number::Int64(5), None), (Number::Int64(5), None));
    }

    #[test]
    fn large_int64_roundtrips() {
        assert_eq!(
            roundtrip(Number::Int64(1_000_000_000_000), None),
            (Number::Int64(1_000_000_000_000), None)
        );
    }

    #[test]
    fn float64_with_unit_roundtrips() {
        assert_eq!(
            roundtrip(Number::Float64(3.5), Some(7)),
            (Number::Float64(3.5), Some(7))
        );
    }

    #[test]
    fn int16_roundtrips() {
        assert_eq!(roundtrip(Number::Int16(-200), None), (Number::Int16(-200), None));
    }

    #[test]
    fn float32_roundtrips() {
        assert_eq!(roundtrip(Number::Float32(1.25), None), (Number::Float32(1.25), None));
    }
}

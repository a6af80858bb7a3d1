//! Fixed-width integers read from byte input.
//!
//! Values are decoded into `i128`, which holds every signed and unsigned
//! integer of up to eight bytes without loss.

use enumset::EnumSet;

use crate::error::{Error, ParseError};
use crate::input::{InputSource, Modality};

use super::boxed::BoxedParser;
use super::state::{ParseState, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Signed,
    Unsigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

pub const MAX_WIDTH: usize = 8;

/// Decode `bytes` as one integer. Signed values use two's complement.
pub fn decode(bytes: &[u8], sign: Sign, endian: Endian) -> i128 {
    let accumulate = |value: u128, byte: &u8| (value << 8) | u128::from(*byte);
    let unsigned = match endian {
        Endian::Big => bytes.iter().fold(0, accumulate),
        Endian::Little => bytes.iter().rev().fold(0, accumulate),
    };
    // at most 64 bits are set, so the conversion is exact
    let unsigned = unsigned as i128;

    match sign {
        Sign::Unsigned => unsigned,
        Sign::Signed => {
            let modulus = 1i128 << (8 * bytes.len());
            let half = modulus / 2;
            (unsigned + half) % modulus - half
        }
    }
}

struct Binary {
    width: usize,
    sign: Sign,
    endian: Endian,
    exact: Option<i128>,
}

impl Parser<i128> for Binary {
    fn parse(&self, state: &ParseState<()>) -> ParseState<i128> {
        let Some(source) = state.source().as_bytes() else {
            return state.bad_input(self.name(), self.accepts());
        };

        let upcoming = source.suffix(state.cursor());
        let Some(bytes) = upcoming.get(..self.width) else {
            return state.end_of_input(self.name(), format!("{} binary bytes", self.width));
        };

        let value = decode(bytes, self.sign, self.endian);
        match self.exact {
            Some(wanted) if wanted != value => state.fail(ParseError::NoMatch {
                parser: self.name().to_string(),
                position: state.cursor(),
                expected: self.expected(),
                actual: format!("number {value} in binary"),
            }),
            _ => state.succeed(state.cursor() + self.width, value),
        }
    }

    fn name(&self) -> &str {
        match self.exact {
            Some(_) => "exact_binary",
            None => "binary",
        }
    }

    fn expected(&self) -> String {
        match self.exact {
            Some(wanted) => format!("number {wanted} in binary"),
            None => format!("{} binary bytes", self.width),
        }
    }

    fn accepts(&self) -> EnumSet<Modality> {
        Modality::Bytes.into()
    }
}

fn fixed(width: usize, sign: Sign, endian: Endian, exact: Option<i128>) -> BoxedParser<i128> {
    BoxedParser::new(Binary {
        width,
        sign,
        endian,
        exact,
    })
}

fn checked_width(width: usize) -> Result<usize, Error> {
    if (1..=MAX_WIDTH).contains(&width) {
        Ok(width)
    } else {
        Err(Error::UnsupportedWidth(width))
    }
}

/// An integer of `width` bytes, `1..=8`.
pub fn binary(width: usize, sign: Sign, endian: Endian) -> Result<BoxedParser<i128>, Error> {
    Ok(fixed(checked_width(width)?, sign, endian, None))
}

/// Like [`binary`], but only matches when the decoded number equals `value`.
pub fn exact_binary(
    width: usize,
    sign: Sign,
    endian: Endian,
    value: i128,
) -> Result<BoxedParser<i128>, Error> {
    Ok(fixed(checked_width(width)?, sign, endian, Some(value)))
}

pub fn u8() -> BoxedParser<i128> {
    fixed(1, Sign::Unsigned, Endian::Big, None)
}

pub fn s8() -> BoxedParser<i128> {
    fixed(1, Sign::Signed, Endian::Big, None)
}

pub fn u16_be() -> BoxedParser<i128> {
    fixed(2, Sign::Unsigned, Endian::Big, None)
}

pub fn u16_le() -> BoxedParser<i128> {
    fixed(2, Sign::Unsigned, Endian::Little, None)
}

pub fn s16_be() -> BoxedParser<i128> {
    fixed(2, Sign::Signed, Endian::Big, None)
}

pub fn s16_le() -> BoxedParser<i128> {
    fixed(2, Sign::Signed, Endian::Little, None)
}

pub fn u32_be() -> BoxedParser<i128> {
    fixed(4, Sign::Unsigned, Endian::Big, None)
}

pub fn u32_le() -> BoxedParser<i128> {
    fixed(4, Sign::Unsigned, Endian::Little, None)
}

pub fn s32_be() -> BoxedParser<i128> {
    fixed(4, Sign::Signed, Endian::Big, None)
}

pub fn s32_le() -> BoxedParser<i128> {
    fixed(4, Sign::Signed, Endian::Little, None)
}

pub fn exact_u8(value: i128) -> BoxedParser<i128> {
    fixed(1, Sign::Unsigned, Endian::Big, Some(value))
}

pub fn exact_s8(value: i128) -> BoxedParser<i128> {
    fixed(1, Sign::Signed, Endian::Big, Some(value))
}

pub fn exact_u16_be(value: i128) -> BoxedParser<i128> {
    fixed(2, Sign::Unsigned, Endian::Big, Some(value))
}

pub fn exact_u16_le(value: i128) -> BoxedParser<i128> {
    fixed(2, Sign::Unsigned, Endian::Little, Some(value))
}

pub fn exact_s16_be(value: i128) -> BoxedParser<i128> {
    fixed(2, Sign::Signed, Endian::Big, Some(value))
}

pub fn exact_s16_le(value: i128) -> BoxedParser<i128> {
    fixed(2, Sign::Signed, Endian::Little, Some(value))
}

pub fn exact_u32_be(value: i128) -> BoxedParser<i128> {
    fixed(4, Sign::Unsigned, Endian::Big, Some(value))
}

pub fn exact_u32_le(value: i128) -> BoxedParser<i128> {
    fixed(4, Sign::Unsigned, Endian::Little, Some(value))
}

pub fn exact_s32_be(value: i128) -> BoxedParser<i128> {
    fixed(4, Sign::Signed, Endian::Big, Some(value))
}

pub fn exact_s32_le(value: i128) -> BoxedParser<i128> {
    fixed(4, Sign::Signed, Endian::Little, Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_orders() {
        assert_eq!(decode(&[0x01, 0x02], Sign::Unsigned, Endian::Big), 0x0102);
        assert_eq!(decode(&[0x01, 0x02], Sign::Unsigned, Endian::Little), 0x0201);
        assert_eq!(decode(&[0xff; 4], Sign::Unsigned, Endian::Big), 0xffff_ffff);
    }

    #[test]
    fn signed_wraps_at_half() {
        assert_eq!(decode(&[0xff], Sign::Signed, Endian::Big), -1);
        assert_eq!(decode(&[0x80], Sign::Signed, Endian::Big), -128);
        assert_eq!(decode(&[0x7f], Sign::Signed, Endian::Big), 127);
        assert_eq!(decode(&[0x00, 0x80], Sign::Signed, Endian::Little), -32768);
        assert_eq!(decode(&[0xfe, 0xff, 0xff, 0xff], Sign::Signed, Endian::Little), -2);
    }

    #[test]
    fn eight_bytes_fit() {
        let max = [0xff; 8];
        assert_eq!(decode(&max, Sign::Unsigned, Endian::Big), i128::from(u64::MAX));
        assert_eq!(decode(&max, Sign::Signed, Endian::Big), -1);
    }

    #[test]
    fn widths_are_checked() {
        assert!(binary(0, Sign::Unsigned, Endian::Big).is_err());
        assert!(binary(9, Sign::Unsigned, Endian::Big).is_err());
        assert!(binary(8, Sign::Signed, Endian::Little).is_ok());
    }
}

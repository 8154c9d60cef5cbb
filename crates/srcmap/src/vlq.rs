//! Base64 variable-length quantities
//!
//! Each value is sign-folded (magnitude shifted left, sign in bit 0) and then
//! written least significant group first as base64 digits carrying 5 data
//! bits and a continuation bit (0x20).

use crate::error::{DecodeError, DecodeResult};
use base64::alphabet::{self, Alphabet};
use once_cell::sync::Lazy;

const DATA_BITS: u32 = 5;
const DATA_MASK: u64 = 0x1f;
const CONTINUATION: u64 = 0x20;

static ALPHABET: Alphabet = alphabet::STANDARD;

static DIGIT_VALUES: Lazy<[Option<u8>; 128]> = Lazy::new(|| {
    let mut values = [None; 128];
    for (value, &digit) in digits().iter().enumerate() {
        values[digit as usize] = Some(value as u8);
    }
    values
});

/// Append the digits of `value` to `out`
pub fn encode(value: i64, out: &mut String) {
    let magnitude = value.unsigned_abs();
    let mut folded = if value < 0 {
        (magnitude << 1) | 1
    } else {
        magnitude << 1
    };

    loop {
        let mut digit = folded & DATA_MASK;
        folded >>= DATA_BITS;
        if folded != 0 {
            digit |= CONTINUATION;
        }
        out.push(digits()[digit as usize] as char);
        if folded == 0 {
            break;
        }
    }
}

/// Encode a whole segment
pub fn encode_segment(values: &[i64], out: &mut String) {
    for &value in values {
        encode(value, out);
    }
}

/// Decode all values of one segment
///
/// `offset` is the byte offset of `segment` in the enclosing string and is
/// only used for error reporting.
pub fn decode_segment(segment: &str, offset: usize) -> DecodeResult<Vec<i64>> {
    let mut values = Vec::new();
    let mut accumulated: u64 = 0;
    let mut shift: u32 = 0;
    let mut start = offset;

    for (index, ch) in segment.char_indices() {
        let position = offset + index;
        let digit = u64::from(digit_value(ch).ok_or(DecodeError::InvalidBase64Digit {
            digit: ch,
            offset: position,
        })?);

        if shift >= u64::BITS - DATA_BITS {
            return Err(DecodeError::VlqOverflow { offset: start });
        }
        accumulated |= (digit & DATA_MASK) << shift;

        if digit & CONTINUATION != 0 {
            shift += DATA_BITS;
            continue;
        }

        let magnitude = i64::try_from(accumulated >> 1)
            .map_err(|_| DecodeError::VlqOverflow { offset: start })?;
        values.push(if accumulated & 1 == 1 {
            -magnitude
        } else {
            magnitude
        });
        accumulated = 0;
        shift = 0;
        start = position + ch.len_utf8();
    }

    if shift != 0 {
        return Err(DecodeError::UnterminatedVlq { offset: start });
    }
    Ok(values)
}

fn digits() -> &'static [u8] {
    ALPHABET.as_str().as_bytes()
}

fn digit_value(ch: char) -> Option<u8> {
    DIGIT_VALUES.get(ch as usize).copied().flatten()
}

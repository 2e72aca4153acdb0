//! Throttle dialect tokenizer
//!
//! Lines starting with `{` carry a signed throttle such as `{"t": -0.4}`.
//! This is a deliberately lenient substring scan, not a JSON parser: the
//! first `"t"` (or `'t'`) key is located, the value after the next `:` is
//! read as a decimal numeral and everything else on the line is ignored.

/// Accepted spellings of the throttle key, in search order
pub const THROTTLE_KEYS: [&str; 2] = ["\"t\"", "'t'"];

/// Throttle lower bound (full reverse)
pub const THROTTLE_MIN: f32 = -1.0;

/// Throttle upper bound (full forward)
pub const THROTTLE_MAX: f32 = 1.0;

/// Extract the throttle value from a throttle-dialect line
///
/// Returns `None` when the key or the `:` after it is missing. A value that
/// is not a numeral reads as `0.0`. The result is clamped to
/// [`THROTTLE_MIN`]..=[`THROTTLE_MAX`].
pub fn parse_throttle(line: &str) -> Option<f32> {
    let key_end = find_key(line)?;
    let rest = &line[key_end..];
    let colon = rest.find(':')?;
    Some(clamp_throttle(parse_numeral(&rest[colon + 1..])))
}

/// Clamp a throttle value into range, mapping NaN to zero
pub fn clamp_throttle(t: f32) -> f32 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(THROTTLE_MIN, THROTTLE_MAX)
    }
}

/// Byte offset just past the first throttle key
fn find_key(line: &str) -> Option<usize> {
    THROTTLE_KEYS
        .iter()
        .find_map(|key| line.find(key).map(|idx| idx + key.len()))
}

/// Read the leading decimal numeral of `text`
///
/// Grammar: `ws* [+-]? digits* (. digits*)? ([eE] [+-]? digits+)?` with at
/// least one mantissa digit, or `ws* [+-]? (inf | nan)` in any case
/// (`infinity` matches as `inf`). Trailing characters are ignored and a
/// missing numeral reads as `0.0`.
fn parse_numeral(text: &str) -> f32 {
    let text = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let bytes = text.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    if let Some(special) = parse_special(&bytes[end..]) {
        return if bytes.first() == Some(&b'-') {
            -special
        } else {
            special
        };
    }

    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(&bytes[exp..]);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    text[..end].parse::<f32>().unwrap_or(0.0)
}

/// `inf` or `nan` at the start of `bytes`, ignoring case
fn parse_special(bytes: &[u8]) -> Option<f32> {
    let word = bytes.get(..3)?;
    if word.eq_ignore_ascii_case(b"inf") {
        Some(f32::INFINITY)
    } else if word.eq_ignore_ascii_case(b"nan") {
        Some(f32::NAN)
    } else {
        None
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

use crate::Tag;

/// Which plain-scalar resolution rules to apply.
///
/// [`Schema::Core`] is the YAML 1.2 core schema. [`Schema::Yaml11`] keeps the
/// core rules and additionally recognizes the YAML 1.1 boolean lexemes
/// (`yes`/`no`/`on`/`off`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Schema {
    #[default]
    Core,
    Yaml11,
}

/// Resolve the implicit tag of a plain scalar from its content, using the
/// YAML 1.2 core schema.
#[inline]
pub fn resolve(value: &str) -> Tag {
    resolve_in(value, Schema::Core)
}

/// Resolve the implicit tag of a plain scalar under the given schema.
///
/// Checks are ordered and the first match wins: null, bool, int, float,
/// timestamp, then str as the fallback.
pub fn resolve_in(value: &str, schema: Schema) -> Tag {
    if is_null(value) {
        Tag::Null
    } else if is_bool(value, schema) {
        Tag::Bool
    } else if is_int(value) {
        Tag::Int
    } else if is_float(value) {
        Tag::Float
    } else if is_timestamp(value) {
        Tag::Timestamp
    } else {
        Tag::Str
    }
}

fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

fn is_bool(value: &str, schema: Schema) -> bool {
    match value {
        "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => true,
        "yes" | "Yes" | "YES" | "no" | "No" | "NO" | "on" | "On" | "ON" | "off" | "Off"
        | "OFF" => schema == Schema::Yaml11,
        _ => false,
    }
}

fn is_int(value: &str) -> bool {
    let unsigned = value
        .strip_prefix(['-', '+'])
        .unwrap_or(value)
        .as_bytes();
    let (digits, pred): (&[u8], fn(&u8) -> bool) = match unsigned {
        [b'0', b'x', rest @ ..] => (rest, |b| b.is_ascii_hexdigit()),
        [b'0', b'o', rest @ ..] => (rest, |b| (b'0'..=b'7').contains(b)),
        [b'0', b'b', rest @ ..] => (rest, |b| *b == b'0' || *b == b'1'),
        rest => (rest, |b| b.is_ascii_digit()),
    };
    !digits.is_empty() && digits.iter().all(pred)
}

fn is_float(value: &str) -> bool {
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    if matches!(unsigned, ".inf" | ".Inf" | ".INF") {
        return true;
    }
    if matches!(value, ".nan" | ".NaN" | ".NAN") {
        return true;
    }

    // Core-schema float: digits with an optional fractional part, or a bare
    // fractional part, followed by an optional exponent. At least one digit
    // must be present, and something must distinguish it from an int.
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (unsigned, None),
    };
    if let Some(exponent) = exponent {
        let digits = exponent.strip_prefix(['-', '+']).unwrap_or(exponent);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    if frac_part.is_none() && exponent.is_none() {
        return false;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if !frac_part.unwrap_or("").bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match frac_part {
        // "1." and "1.5" are fine, "." alone is not.
        Some(frac) => !int_part.is_empty() || !frac.is_empty(),
        None => !int_part.is_empty(),
    }
}

/// ISO-8601 calendar date, optionally followed by a time and timezone, per
/// the YAML 1.1 `timestamp` type.
fn is_timestamp(value: &str) -> bool {
    let mut cur = Cursor(value.as_bytes());
    if !(cur.digits(4, 4) && cur.byte(b'-') && cur.digits(1, 2) && cur.byte(b'-') && cur.digits(1, 2))
    {
        return false;
    }
    if cur.done() {
        return true;
    }
    if !cur.byte(b'T') && !cur.byte(b't') && !cur.spaces() {
        return false;
    }
    if !(cur.digits(1, 2) && cur.byte(b':') && cur.digits(2, 2) && cur.byte(b':') && cur.digits(2, 2))
    {
        return false;
    }
    if cur.byte(b'.') {
        cur.digits(0, usize::MAX);
    }
    if cur.done() {
        return true;
    }
    cur.spaces();
    if cur.byte(b'Z') {
        return cur.done();
    }
    if !cur.byte(b'+') && !cur.byte(b'-') {
        return false;
    }
    if !cur.digits(1, 2) {
        return false;
    }
    if cur.byte(b':') && !cur.digits(2, 2) {
        return false;
    }
    cur.done()
}

struct Cursor<'a>(&'a [u8]);

impl Cursor<'_> {
    fn byte(&mut self, b: u8) -> bool {
        if self.0.first() == Some(&b) {
            self.0 = &self.0[1..];
            true
        } else {
            false
        }
    }

    fn digits(&mut self, min: usize, max: usize) -> bool {
        let n = self
            .0
            .iter()
            .take(max)
            .take_while(|b| b.is_ascii_digit())
            .count();
        if n < min {
            return false;
        }
        self.0 = &self.0[n..];
        true
    }

    fn spaces(&mut self) -> bool {
        let n = self.0.iter().take_while(|&&b| b == b' ').count();
        self.0 = &self.0[n..];
        n > 0
    }

    fn done(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls() {
        for value in ["", "~", "null", "Null", "NULL"] {
            assert_eq!(resolve(value), Tag::Null, "{value:?}");
        }
        assert_eq!(resolve("NULL!"), Tag::Str);
    }

    #[test]
    fn bools() {
        for value in ["true", "True", "TRUE", "false", "False", "FALSE"] {
            assert_eq!(resolve(value), Tag::Bool, "{value:?}");
        }
        // 1.1 lexemes only resolve under the compat schema.
        for value in ["yes", "No", "on", "OFF"] {
            assert_eq!(resolve(value), Tag::Str, "{value:?}");
            assert_eq!(resolve_in(value, Schema::Yaml11), Tag::Bool, "{value:?}");
        }
    }

    #[test]
    fn ints() {
        for value in ["0", "42", "-17", "+3", "0x2A", "0xdead", "0o17", "0b1011", "-0x1f"] {
            assert_eq!(resolve(value), Tag::Int, "{value:?}");
        }
        for value in ["0x", "0o8", "0b2", "-", "+", "1_000", "12a"] {
            assert_ne!(resolve(value), Tag::Int, "{value:?}");
        }
    }

    #[test]
    fn floats() {
        for value in [
            "1.5", "-0.25", "+1.", ".5", "1e3", "1E-3", "2.5e+10", ".inf", "-.inf", "+.Inf",
            ".nan", ".NaN",
        ] {
            assert_eq!(resolve(value), Tag::Float, "{value:?}");
        }
        for value in [".", "1e", "e3", "1.5e", "-.nan", "nan", "inf", "1.2.3"] {
            assert_eq!(resolve(value), Tag::Str, "{value:?}");
        }
    }

    #[test]
    fn timestamps() {
        for value in [
            "2001-12-14",
            "2001-12-14T21:59:43Z",
            "2001-12-14t21:59:43.10-05:00",
            "2001-12-14 21:59:43.10 -5",
            "2002-12-14T21:59:43.234Z",
        ] {
            assert_eq!(resolve(value), Tag::Timestamp, "{value:?}");
        }
        for value in ["2001-12-14T21:59", "2001-13", "01-01-01", "2001-12-14T21:59:43X"] {
            assert_eq!(resolve(value), Tag::Str, "{value:?}");
        }
    }

    #[test]
    fn everything_else_is_str() {
        for value in ["hello", "0x2g", "y", "n", "t", "f", "2001-12-14Tfoo"] {
            assert_eq!(resolve(value), Tag::Str, "{value:?}");
        }
    }
}

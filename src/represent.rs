use std::collections::{BTreeMap, HashMap};

use base64::prelude::*;
use chrono::{DateTime, NaiveDate, Utc};

use crate::{resolver, FloatFormat, Node, Options, Scalar, ScalarStyle, Tag, TimestampPrecision};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RepresentError {
    #[error("failed to represent {0}")]
    Unrepresentable(String),
    #[error("duplicate mapping key `{0}`")]
    DuplicateKey(String),
}

/// A value that can be converted into a [`Node`].
pub trait Represent {
    fn represent(&self, options: &Options) -> Result<Node, RepresentError>;
}

/// A value that converts into a single [`Scalar`]. The [`Options`] argument
/// carries the numeric and timestamp formatting knobs.
pub trait RepresentScalar: Represent {
    fn represent_scalar(&self, options: &Options) -> Scalar;
}

macro_rules! represent_as_scalar {
    ($($ty:ty),* $(,)?) => {$(
        impl Represent for $ty {
            #[inline]
            fn represent(&self, options: &Options) -> Result<Node, RepresentError> {
                Ok(Node::Scalar(self.represent_scalar(options)))
            }
        }
    )*};
}

represent_as_scalar!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    str,
    String,
    Binary,
    DateTime<Utc>,
    NaiveDate,
);

impl RepresentScalar for () {
    fn represent_scalar(&self, _options: &Options) -> Scalar {
        Scalar::with_tag("null", Tag::Null)
    }
}

impl RepresentScalar for bool {
    fn represent_scalar(&self, _options: &Options) -> Scalar {
        Scalar::with_tag(if *self { "true" } else { "false" }, Tag::Bool)
    }
}

macro_rules! represent_int {
    ($($ty:ty),* $(,)?) => {$(
        impl RepresentScalar for $ty {
            fn represent_scalar(&self, _options: &Options) -> Scalar {
                Scalar::with_tag(itoa::Buffer::new().format(*self), Tag::Int)
            }
        }
    )*};
}

represent_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl RepresentScalar for f64 {
    fn represent_scalar(&self, options: &Options) -> Scalar {
        let value = match (self.is_nan(), self.is_infinite()) {
            (true, _) => ".nan".to_owned(),
            (_, true) if *self > 0.0 => ".inf".to_owned(),
            (_, true) => "-.inf".to_owned(),
            _ => match options.float_format {
                FloatFormat::Decimal => ryu::Buffer::new().format_finite(*self).to_owned(),
                FloatFormat::Scientific => scientific(format!("{:e}", self)),
            },
        };
        Scalar::with_tag(value, Tag::Float)
    }
}

impl RepresentScalar for f32 {
    fn represent_scalar(&self, options: &Options) -> Scalar {
        let value = match (self.is_nan(), self.is_infinite()) {
            (true, _) => ".nan".to_owned(),
            (_, true) if *self > 0.0 => ".inf".to_owned(),
            (_, true) => "-.inf".to_owned(),
            _ => match options.float_format {
                FloatFormat::Decimal => ryu::Buffer::new().format_finite(*self).to_owned(),
                FloatFormat::Scientific => scientific(format!("{:e}", self)),
            },
        };
        Scalar::with_tag(value, Tag::Float)
    }
}

/// Normalize `{:e}` output so the exponent always carries a sign, keeping the
/// shortest-round-trip digits. Nothing here can produce a `+-` digraph.
fn scientific(mut repr: String) -> String {
    if let Some(pos) = repr.find('e') {
        if !repr[pos + 1..].starts_with('-') {
            repr.insert(pos + 1, '+');
        }
    }
    repr
}

impl RepresentScalar for str {
    fn represent_scalar(&self, _options: &Options) -> Scalar {
        // A string whose content resolves to another tag must be quoted, or
        // it would come back as that type on decode.
        match resolver::resolve(self) {
            Tag::Str => Scalar::with_tag(self, Tag::Str),
            _ => Scalar::with_tag(self, Tag::Str).with_style(ScalarStyle::SingleQuoted),
        }
    }
}

impl RepresentScalar for String {
    #[inline]
    fn represent_scalar(&self, options: &Options) -> Scalar {
        self.as_str().represent_scalar(options)
    }
}

/// A byte blob, represented as an RFC 4648 base64 `!!binary` scalar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binary(pub Vec<u8>);

impl RepresentScalar for Binary {
    fn represent_scalar(&self, _options: &Options) -> Scalar {
        Scalar::with_tag(BASE64_STANDARD.encode(&self.0), Tag::Binary)
    }
}

impl RepresentScalar for DateTime<Utc> {
    fn represent_scalar(&self, options: &Options) -> Scalar {
        Scalar::with_tag(
            format_timestamp(self, options.timestamp_precision),
            Tag::Timestamp,
        )
    }
}

impl RepresentScalar for NaiveDate {
    fn represent_scalar(&self, _options: &Options) -> Scalar {
        Scalar::with_tag(self.format("%Y-%m-%d").to_string(), Tag::Timestamp)
    }
}

/// `YYYY-MM-DDTHH:MM:SS[.F…]Z` with the fraction rounded to the configured
/// digit count. A fraction that rounds to zero is omitted; otherwise its
/// trailing zeros are trimmed, keeping at least one digit.
fn format_timestamp(timestamp: &DateTime<Utc>, precision: TimestampPrecision) -> String {
    let digits = precision.digits();
    let scale = 10u64.pow(9 - digits);
    let mut secs = timestamp.timestamp();
    let mut frac = (u64::from(timestamp.timestamp_subsec_nanos()) + scale / 2) / scale;
    if frac >= 10u64.pow(digits) {
        secs += 1;
        frac = 0;
    }
    let whole = DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(*timestamp);
    let mut out = whole.format("%Y-%m-%dT%H:%M:%S").to_string();
    if frac != 0 {
        let mut fraction = format!("{frac:0width$}", width = digits as usize);
        while fraction.ends_with('0') {
            fraction.pop();
        }
        out.push('.');
        out.push_str(&fraction);
    }
    out.push('Z');
    out
}

impl<'a, T: Represent + ?Sized> Represent for &'a T {
    #[inline]
    fn represent(&self, options: &Options) -> Result<Node, RepresentError> {
        (**self).represent(options)
    }
}

impl<T: Represent> Represent for Option<T> {
    fn represent(&self, options: &Options) -> Result<Node, RepresentError> {
        match self {
            Some(value) => value.represent(options),
            None => Ok(Node::Scalar(Scalar::with_tag("null", Tag::Null))),
        }
    }
}

impl<T: Represent> Represent for [T] {
    fn represent(&self, options: &Options) -> Result<Node, RepresentError> {
        let items = self
            .iter()
            .map(|item| item.represent(options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Node::sequence(items))
    }
}

impl<T: Represent> Represent for Vec<T> {
    #[inline]
    fn represent(&self, options: &Options) -> Result<Node, RepresentError> {
        self.as_slice().represent(options)
    }
}

impl<K: Represent, V: Represent> Represent for BTreeMap<K, V> {
    fn represent(&self, options: &Options) -> Result<Node, RepresentError> {
        represent_pairs(self.iter(), options)
    }
}

impl<K: Represent + Eq + std::hash::Hash, V: Represent> Represent for HashMap<K, V> {
    fn represent(&self, options: &Options) -> Result<Node, RepresentError> {
        represent_pairs(self.iter(), options)
    }
}

/// Keys are sorted by node order, which makes the output deterministic even
/// for unordered host maps.
fn represent_pairs<'a, K: Represent + 'a, V: Represent + 'a>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
    options: &Options,
) -> Result<Node, RepresentError> {
    let mut pairs = entries
        .map(|(k, v)| Ok((k.represent(options)?, v.represent(options)?)))
        .collect::<Result<Vec<_>, RepresentError>>()?;
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Node::mapping(pairs)
}

impl Represent for Node {
    #[inline]
    fn represent(&self, _options: &Options) -> Result<Node, RepresentError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scalar_of<T: Represent>(value: T, options: &Options) -> Scalar {
        match value.represent(options).unwrap() {
            Node::Scalar(scalar) => scalar,
            node => panic!("expected scalar, got {node:?}"),
        }
    }

    #[test]
    fn null_and_bool() {
        let options = Options::default();
        assert_eq!(scalar_of((), &options).value, "null");
        assert_eq!(scalar_of(None::<i32>, &options).value, "null");
        assert_eq!(scalar_of(true, &options).value, "true");
        assert_eq!(scalar_of(false, &options).tag, Tag::Bool);
    }

    #[test]
    fn integers() {
        let options = Options::default();
        assert_eq!(scalar_of(42u8, &options).value, "42");
        assert_eq!(scalar_of(-17i64, &options).value, "-17");
        assert_eq!(scalar_of(0usize, &options).tag, Tag::Int);
    }

    #[test]
    fn float_decimal_strategy() {
        let options = Options {
            float_format: FloatFormat::Decimal,
            ..Options::default()
        };
        assert_eq!(scalar_of(1.5f64, &options).value, "1.5");
        assert_eq!(scalar_of(f64::INFINITY, &options).value, ".inf");
        assert_eq!(scalar_of(f64::NEG_INFINITY, &options).value, "-.inf");
        assert_eq!(scalar_of(f64::NAN, &options).value, ".nan");
    }

    #[test]
    fn float_scientific_strategy() {
        let options = Options::default();
        for value in [0.0001f64, 1.0, -2.5, 6.02e23, 1e-300] {
            let repr = scalar_of(value, &options).value;
            assert!(repr.contains('e'), "{repr}");
            assert!(!repr.contains("+-"), "{repr}");
            assert_eq!(repr.parse::<f64>().unwrap(), value, "{repr}");
        }
        assert_eq!(scalar_of(1.0f64, &options).value, "1e+0");
        assert_eq!(scalar_of(0.0001f64, &options).value, "1e-4");
    }

    #[test]
    fn float_round_trip() {
        for value in [0.1f64, 1.0 / 3.0, f64::MIN_POSITIVE, f64::MAX, -0.0] {
            for format in [FloatFormat::Decimal, FloatFormat::Scientific] {
                let options = Options {
                    float_format: format,
                    ..Options::default()
                };
                let repr = scalar_of(value, &options).value;
                assert_eq!(
                    repr.parse::<f64>().unwrap().to_bits(),
                    value.to_bits(),
                    "{repr}"
                );
            }
        }
    }

    #[test]
    fn string_masquerade_is_quoted() {
        let options = Options::default();
        for value in ["true", "null", "42", "1.5", "2001-12-14", ""] {
            let scalar = scalar_of(value, &options);
            assert_eq!(scalar.tag, Tag::Str, "{value:?}");
            assert_eq!(scalar.style, ScalarStyle::SingleQuoted, "{value:?}");
        }
        let plain = scalar_of("hello", &options);
        assert_eq!(plain.style, ScalarStyle::Any);
    }

    #[test]
    fn binary_is_base64() {
        let options = Options::default();
        let scalar = scalar_of(Binary(b"Hello".to_vec()), &options);
        assert_eq!(scalar.value, "SGVsbG8=");
        assert_eq!(scalar.tag, Tag::Binary);
    }

    #[test]
    fn timestamp_formatting() {
        let options = Options::default();
        let t = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(scalar_of(t, &options).value, "2001-01-01T00:00:00Z");

        let t = Utc.timestamp_opt(t.timestamp(), 120_000_000).unwrap();
        assert_eq!(scalar_of(t, &options).value, "2001-01-01T00:00:00.12Z");

        // Rounding to milliseconds can carry into the seconds.
        let t = Utc.timestamp_opt(t.timestamp(), 999_600_000).unwrap();
        assert_eq!(scalar_of(t, &options).value, "2001-01-01T00:00:01Z");

        let nanos = Options {
            timestamp_precision: TimestampPrecision::Nanoseconds,
            ..Options::default()
        };
        let t = Utc.timestamp_opt(t.timestamp(), 123_456_789).unwrap();
        assert_eq!(scalar_of(t, &nanos).value, "2001-01-01T00:00:00.123456789Z");
        assert_eq!(scalar_of(t, &options).value, "2001-01-01T00:00:00.123Z");
    }

    #[test]
    fn collections_recurse() {
        let options = Options::default();
        let node = vec![1i32, 2, 3].represent(&options).unwrap();
        match node {
            Node::Sequence(seq) => assert_eq!(seq.items.len(), 3),
            node => panic!("expected sequence, got {node:?}"),
        }
    }

    #[test]
    fn maps_sort_keys_by_node_order() {
        let options = Options::default();
        let mut map = HashMap::new();
        map.insert("b", 2i32);
        map.insert("a", 1);
        let node = map.represent(&options).unwrap();
        match node {
            Node::Mapping(mapping) => {
                let keys: Vec<_> = mapping
                    .iter()
                    .map(|(k, _)| k.describe())
                    .collect();
                assert_eq!(keys, ["a", "b"]);
            }
            node => panic!("expected mapping, got {node:?}"),
        }
    }
}

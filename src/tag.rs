use std::fmt;

/// Prefix shared by all tags of the YAML core and 1.1 type repositories.
pub const YAML_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// A YAML tag.
///
/// The named variants cover the core-schema primitives plus the `timestamp`
/// and `binary` types from the YAML 1.1 type repository. Anything else is
/// carried verbatim as [`Tag::Custom`]: either a full tag URI, or a local
/// tag starting with `!`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Seq,
    Map,
    Timestamp,
    Binary,
    Custom(String),
}

impl Tag {
    /// The short name of the tag within the `tag:yaml.org,2002:` namespace,
    /// if it has one.
    pub fn primitive_name(&self) -> Option<&'static str> {
        match self {
            Tag::Null => Some("null"),
            Tag::Bool => Some("bool"),
            Tag::Int => Some("int"),
            Tag::Float => Some("float"),
            Tag::Str => Some("str"),
            Tag::Seq => Some("seq"),
            Tag::Map => Some("map"),
            Tag::Timestamp => Some("timestamp"),
            Tag::Binary => Some("binary"),
            Tag::Custom(_) => None,
        }
    }

    /// The full tag URI.
    pub fn uri(&self) -> std::borrow::Cow<'_, str> {
        match self.primitive_name() {
            Some(name) => format!("{YAML_TAG_PREFIX}{name}").into(),
            None => match self {
                Tag::Custom(uri) => uri.as_str().into(),
                _ => unreachable!(),
            },
        }
    }

    /// Parse a tag from its URI form, recognizing the named primitives.
    pub fn from_uri(uri: &str) -> Tag {
        match uri.strip_prefix(YAML_TAG_PREFIX) {
            Some("null") => Tag::Null,
            Some("bool") => Tag::Bool,
            Some("int") => Tag::Int,
            Some("float") => Tag::Float,
            Some("str") => Tag::Str,
            Some("seq") => Tag::Seq,
            Some("map") => Tag::Map,
            Some("timestamp") => Tag::Timestamp,
            Some("binary") => Tag::Binary,
            _ => Tag::Custom(uri.to_owned()),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

impl From<&str> for Tag {
    #[inline]
    fn from(uri: &str) -> Self {
        Tag::from_uri(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_round_trip() {
        for tag in [
            Tag::Null,
            Tag::Bool,
            Tag::Int,
            Tag::Float,
            Tag::Str,
            Tag::Seq,
            Tag::Map,
            Tag::Timestamp,
            Tag::Binary,
            Tag::Custom("!local".into()),
            Tag::Custom("tag:example.com,2024:thing".into()),
        ] {
            assert_eq!(Tag::from_uri(&tag.uri()), tag);
        }
    }

    #[test]
    fn binary_and_timestamp_uris() {
        assert_eq!(Tag::Binary.uri(), "tag:yaml.org,2002:binary");
        assert_eq!(Tag::Timestamp.uri(), "tag:yaml.org,2002:timestamp");
    }
}

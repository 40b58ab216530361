use crate::{MappingStyle, ScalarStyle, SequenceStyle, Tag};

/// One step of an emission run.
///
/// A well-formed stream is `StreamStart`, then zero or more documents
/// (`DocumentStart`, one node, `DocumentEnd`), then `StreamEnd`. A node is a
/// single `Scalar` or `Alias` event, or a balanced
/// `SequenceStart`/`SequenceEnd` or `MappingStart`/`MappingEnd` pair with the
/// children in between, keys alternating with values for mappings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event<'a> {
    StreamStart,
    StreamEnd,
    DocumentStart {
        version: Option<(u32, u32)>,
        /// False when the caller asked for an explicit `---` marker.
        implicit: bool,
    },
    DocumentEnd {
        /// False when the caller asked for an explicit `...` marker.
        implicit: bool,
    },
    Alias {
        anchor: &'a str,
    },
    Scalar {
        anchor: Option<&'a str>,
        tag: &'a Tag,
        value: &'a str,
        /// The tag may be left implicit when the scalar is written plain.
        plain_implicit: bool,
        /// The tag may be left implicit when the scalar is written quoted.
        quoted_implicit: bool,
        style: ScalarStyle,
    },
    SequenceStart {
        anchor: Option<&'a str>,
        tag: &'a Tag,
        /// True iff the declared tag is the default `!!seq`.
        implicit: bool,
        style: SequenceStyle,
    },
    SequenceEnd,
    MappingStart {
        anchor: Option<&'a str>,
        tag: &'a Tag,
        /// True iff the declared tag is the default `!!map`.
        implicit: bool,
        style: MappingStyle,
    },
    MappingEnd,
}

impl Event<'_> {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Event::StreamStart => "stream start",
            Event::StreamEnd => "stream end",
            Event::DocumentStart { .. } => "document start",
            Event::DocumentEnd { .. } => "document end",
            Event::Alias { .. } => "alias",
            Event::Scalar { .. } => "scalar",
            Event::SequenceStart { .. } => "sequence start",
            Event::SequenceEnd => "sequence end",
            Event::MappingStart { .. } => "mapping start",
            Event::MappingEnd => "mapping end",
        }
    }
}

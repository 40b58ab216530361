use crate::{MappingStyle, ScalarStyle, SequenceStyle};

/// Configuration shared by the representer and the emitter.
#[derive(Clone, Debug)]
pub struct Options {
    /// Force fully-tagged, double-quoted, flow-style output.
    pub canonical: bool,
    /// Indent increment in spaces. `0` means the default of 2; values outside
    /// `1..10` fall back to the default.
    pub indent: usize,
    /// Preferred line width. `0` means the default of 80; `-1` disables
    /// wrapping entirely.
    pub width: isize,
    /// Emit non-ASCII characters verbatim instead of escaping them.
    pub allow_unicode: bool,
    pub line_break: LineBreak,
    /// Print `---` before each document.
    pub explicit_start: bool,
    /// Print `...` after each document.
    pub explicit_end: bool,
    /// Emit a `%YAML major.minor` directive.
    pub version: Option<(u32, u32)>,
    /// Sort mapping keys on output; see [`Node`](crate::Node)'s ordering.
    pub sort_keys: bool,
    /// Style for sequences whose own style is `Any`.
    pub sequence_style: SequenceStyle,
    /// Style for mappings whose own style is `Any`.
    pub mapping_style: MappingStyle,
    /// Style for scalars containing newlines whose own style is `Any`.
    pub newline_scalar_style: ScalarStyle,
    /// Rewrite repeated subtrees into anchor/alias pairs before emission.
    ///
    /// Aliased output may decode into shared (even cyclic) structures; how a
    /// decoder represents that sharing is its own concern.
    pub redundancy_aliasing: AliasStrategy,
    pub float_format: FloatFormat,
    pub timestamp_precision: TimestampPrecision,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            canonical: false,
            indent: 0,
            width: 0,
            allow_unicode: false,
            line_break: LineBreak::Ln,
            explicit_start: false,
            explicit_end: false,
            version: None,
            sort_keys: false,
            sequence_style: SequenceStyle::Any,
            mapping_style: MappingStyle::Any,
            newline_scalar_style: ScalarStyle::Any,
            redundancy_aliasing: AliasStrategy::None,
            float_format: FloatFormat::Scientific,
            timestamp_precision: TimestampPrecision::Milliseconds,
        }
    }
}

impl Options {
    pub(crate) fn indent_step(&self) -> usize {
        if (1..10).contains(&self.indent) {
            self.indent
        } else {
            2
        }
    }

    pub(crate) fn best_width(&self) -> usize {
        match self.width {
            w if w < 0 => usize::MAX,
            0 => 80,
            w => (w as usize).max(self.indent_step() * 2),
        }
    }
}

/// Line terminator written between emitted lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineBreak {
    Cr,
    #[default]
    Ln,
    CrLn,
}

impl LineBreak {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            LineBreak::Cr => "\r",
            LineBreak::Ln => "\n",
            LineBreak::CrLn => "\r\n",
        }
    }
}

/// How the pre-emission pass rewrites repeated subtrees into aliases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AliasStrategy {
    /// Emit every occurrence in full.
    #[default]
    None,
    /// Alias repeated occurrences of subtrees that carry the same
    /// user-assigned anchor. A value tree has no object identity; a shared
    /// anchor is how a caller marks two occurrences as the same node.
    Identity,
    /// Alias any subtree that is structurally equal to one already emitted,
    /// generating anchors as needed. Scalars are only aliased when they
    /// already carry a user anchor.
    Value,
}

/// Textual form of represented floating-point numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FloatFormat {
    /// Shortest decimal form that round-trips, e.g. `1.5`.
    Decimal,
    /// Scientific notation with an explicit exponent sign, e.g. `1.5e+0`.
    #[default]
    Scientific,
}

/// Sub-second digits kept when representing timestamps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimestampPrecision {
    #[default]
    Milliseconds,
    Nanoseconds,
}

impl TimestampPrecision {
    pub(crate) fn digits(self) -> u32 {
        match self {
            TimestampPrecision::Milliseconds => 3,
            TimestampPrecision::Nanoseconds => 9,
        }
    }
}

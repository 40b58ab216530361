use crate::CharExt;

/// Preferred textual form of a scalar.
///
/// The style is advisory: depending on the value, the emitter may pick a more
/// appropriate style. `Any` leaves the choice entirely to the emitter; the
/// choice is deterministic for identical inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarStyle {
    #[default]
    Any,
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// Preferred textual form of a sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SequenceStyle {
    #[default]
    Any,
    Block,
    Flow,
}

/// Preferred textual form of a mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MappingStyle {
    #[default]
    Any,
    Block,
    Flow,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub(crate) struct ScalarFlags: u8 {
        /// Contains a character that would be an indicator in block context:
        /// a leading `-`/`?`/`:` before a space, a leading `#`/`&`/`*`/… ,
        /// a `: ` or ` #` sequence, or a `---`/`...` document marker prefix.
        const BLOCK_INDICATORS = 0b0000_0001;
        /// Contains a character that would be an indicator in flow context.
        const FLOW_INDICATORS = 0b0000_0010;
        /// Contains `\n`.
        const LINE_BREAKS = 0b0000_0100;
        /// Contains a character that can only appear escaped in a
        /// double-quoted scalar.
        const SPECIAL_CHARACTERS = 0b0000_1000;
        const LEADING_SPACE = 0b0001_0000;
        const TRAILING_SPACE = 0b0010_0000;
    }
}

/// Character classes of a scalar value, gathered in one pass. The emitter
/// uses this to decide which styles can represent the value verbatim.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScalarAnalysis {
    pub flags: ScalarFlags,
    pub empty: bool,
}

impl ScalarAnalysis {
    pub fn of(value: &str, allow_unicode: bool) -> ScalarAnalysis {
        let mut flags = ScalarFlags::empty();

        if value.is_empty() {
            return ScalarAnalysis { flags, empty: true };
        }
        if value.starts_with(' ') {
            flags |= ScalarFlags::LEADING_SPACE;
        }
        if value.ends_with(' ') {
            flags |= ScalarFlags::TRAILING_SPACE;
        }
        if value.starts_with("---") || value.starts_with("...") {
            flags |= ScalarFlags::BLOCK_INDICATORS | ScalarFlags::FLOW_INDICATORS;
        }

        let mut chars = value.chars().peekable();
        let mut leading = true;
        while let Some(ch) = chars.next() {
            let followed_by_space = matches!(chars.peek(), None | Some(&' ') | Some(&'\t'));
            match ch {
                ',' | '[' | ']' | '{' | '}' => flags |= ScalarFlags::FLOW_INDICATORS,
                '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`' if leading => {
                    flags |= ScalarFlags::BLOCK_INDICATORS | ScalarFlags::FLOW_INDICATORS;
                }
                '-' | '?' if leading && followed_by_space => {
                    flags |= ScalarFlags::BLOCK_INDICATORS | ScalarFlags::FLOW_INDICATORS;
                }
                ':' if followed_by_space => {
                    flags |= ScalarFlags::BLOCK_INDICATORS | ScalarFlags::FLOW_INDICATORS;
                }
                '\n' => flags |= ScalarFlags::LINE_BREAKS,
                ch if !ch.is_yaml_printable() || ch == '\t' => {
                    flags |= ScalarFlags::SPECIAL_CHARACTERS;
                }
                ch if !allow_unicode && !ch.is_ascii() => {
                    flags |= ScalarFlags::SPECIAL_CHARACTERS;
                }
                _ => {}
            }
            leading = false;
        }
        if value.contains(" #") {
            flags |= ScalarFlags::BLOCK_INDICATORS | ScalarFlags::FLOW_INDICATORS;
        }

        ScalarAnalysis { flags, empty: false }
    }

    /// Whether the value can be written as a plain scalar.
    pub fn allows_plain(&self, in_flow: bool) -> bool {
        let forbidden = ScalarFlags::BLOCK_INDICATORS
            | ScalarFlags::LINE_BREAKS
            | ScalarFlags::SPECIAL_CHARACTERS
            | ScalarFlags::LEADING_SPACE
            | ScalarFlags::TRAILING_SPACE;
        !self.empty
            && !self.flags.intersects(forbidden)
            && !(in_flow && self.flags.contains(ScalarFlags::FLOW_INDICATORS))
    }

    /// Whether the value can be written single-quoted (on one line).
    pub fn allows_single_quoted(&self) -> bool {
        !self
            .flags
            .intersects(ScalarFlags::LINE_BREAKS | ScalarFlags::SPECIAL_CHARACTERS)
    }

    /// Whether the value can be written in a block scalar style.
    pub fn allows_block(&self, value: &str) -> bool {
        !self.empty
            && !self.flags.contains(ScalarFlags::SPECIAL_CHARACTERS)
            && !value.chars().all(|ch| ch == '\n')
            && !value.ends_with(' ')
            && !value.contains(" \n")
            && !value.contains("\r")
    }

    /// Whether the value survives folded-style line joining: every line
    /// non-empty and free of leading whitespace.
    pub fn allows_folded(&self, value: &str) -> bool {
        self.allows_block(value)
            && value
                .split('\n')
                .all(|line| !line.is_empty() && !line.starts_with(' ') && !line.starts_with('\t'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(value: &str) -> ScalarAnalysis {
        ScalarAnalysis::of(value, false)
    }

    #[test]
    fn plain_safe_values() {
        for value in ["hello", "42", "-1", "a-b_c", "x.y", "-foo", "?x", "a:b"] {
            assert!(analyze(value).allows_plain(false), "{value:?}");
            assert!(analyze(value).allows_plain(true), "{value:?}");
        }
    }

    #[test]
    fn indicators_forbid_plain() {
        for value in ["- item", "? key", ": value", "#comment", "&a", "*a", "!t", "%d", "a: b",
            "a #c", "--- x", "@x", "`x"]
        {
            assert!(!analyze(value).allows_plain(false), "{value:?}");
        }
        // Flow indicators only matter inside flow collections.
        for value in ["a,b", "a[0]", "{x}"] {
            assert!(analyze(value).allows_plain(false), "{value:?}");
            assert!(!analyze(value).allows_plain(true), "{value:?}");
        }
    }

    #[test]
    fn spaces_and_breaks() {
        assert!(!analyze(" x").allows_plain(false));
        assert!(!analyze("x ").allows_plain(false));
        assert!(!analyze("a\nb").allows_plain(false));
        assert!(analyze(" x").allows_single_quoted());
        assert!(!analyze("a\nb").allows_single_quoted());
        assert!(analyze("a\nb").allows_block("a\nb"));
        assert!(!analyze("a \nb").allows_block("a \nb"));
    }

    #[test]
    fn control_chars_force_double_quotes() {
        let a = analyze("a\tb");
        assert!(!a.allows_plain(false));
        assert!(!a.allows_single_quoted());
        assert!(!a.allows_block("a\tb"));
    }

    #[test]
    fn folded_needs_clean_lines() {
        assert!(analyze("one\ntwo").allows_folded("one\ntwo"));
        assert!(!analyze("one\n\ntwo").allows_folded("one\n\ntwo"));
        assert!(!analyze("one\n  two").allows_folded("one\n  two"));
    }
}

pub(crate) trait CharExt {
    fn is_yaml_printable(self) -> bool;
    fn is_anchor_char(self) -> bool;
    fn is_break(self) -> bool;
}

impl CharExt for char {
    /// Characters the YAML spec allows verbatim in a character stream.
    /// Everything else must be escaped in a double-quoted scalar.
    fn is_yaml_printable(self) -> bool {
        match self {
            '\t' => true,
            '\x20'..='\x7e' => true,
            '\u{a1}'..='\u{d7ff}' => true,
            '\u{e000}'..='\u{fffd}' => self != '\u{feff}',
            '\u{10000}'..='\u{10ffff}' => true,
            _ => false,
        }
    }

    fn is_anchor_char(self) -> bool {
        match self {
            '-' | '_' => true,
            ch => ch.is_ascii_alphanumeric(),
        }
    }

    fn is_break(self) -> bool {
        self == '\n' || self == '\r'
    }
}

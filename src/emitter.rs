use std::collections::HashSet;

use crate::{
    alias, resolver, AliasStrategy, CharExt, Error, Event, MappingStyle, Node, Options, Represent,
    ScalarAnalysis, ScalarStyle, SequenceStyle, Tag,
};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EmitterError {
    #[error("emitter has not been opened")]
    NotOpened,
    #[error("emitter is already opened")]
    AlreadyOpened,
    #[error("emitter is already closed")]
    AlreadyClosed,
    #[error("unexpected {0} event")]
    Unexpected(&'static str),
    #[error("invalid anchor name `{0}`")]
    InvalidAnchor(String),
    #[error("anchor `{0}` declared twice in one document")]
    DuplicateAnchor(String),
    #[error("alias `*{0}` has no matching anchor")]
    UndefinedAlias(String),
    #[error("invalid tag `{0}`")]
    InvalidTag(String),
}

/// Streaming YAML emitter.
///
/// An emitter moves through `initialized → opened → closed`: [`open`] emits
/// the stream start, each [`serialize`] call emits one document, and
/// [`close`] ends the stream. The accumulated UTF-8 output is available from
/// [`data`] at any point.
///
/// An emitter instance is stateful and must not be shared across threads;
/// independent instances are fine.
///
/// [`open`]: Emitter::open
/// [`serialize`]: Emitter::serialize
/// [`close`]: Emitter::close
/// [`data`]: Emitter::data
pub struct Emitter {
    options: Options,
    state: State,
    backend: Backend,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    Initialized,
    Opened,
    Closed,
}

impl Emitter {
    pub fn new(options: Options) -> Emitter {
        let backend = Backend::new(options.clone());
        Emitter {
            options,
            state: State::Initialized,
            backend,
        }
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Replace the options. The new settings are pushed to the backend and
    /// take effect from the next event on.
    pub fn set_options(&mut self, options: Options) {
        self.backend.opts = options.clone();
        self.options = options;
    }

    /// Emit the stream start. Valid exactly once, before any document.
    pub fn open(&mut self) -> Result<(), EmitterError> {
        match self.state {
            State::Initialized => {
                self.backend.emit(Event::StreamStart)?;
                self.state = State::Opened;
                Ok(())
            }
            State::Opened => Err(EmitterError::AlreadyOpened),
            State::Closed => Err(EmitterError::AlreadyClosed),
        }
    }

    /// Emit one document holding `node`.
    pub fn serialize(&mut self, node: &Node) -> Result<(), EmitterError> {
        match self.state {
            State::Initialized => return Err(EmitterError::NotOpened),
            State::Closed => return Err(EmitterError::AlreadyClosed),
            State::Opened => {}
        }
        self.backend.emit(Event::DocumentStart {
            version: self.options.version,
            implicit: !self.options.explicit_start,
        })?;
        self.emit_node(node)?;
        self.backend.emit(Event::DocumentEnd {
            implicit: !self.options.explicit_end,
        })
    }

    /// Emit the stream end. A no-op on an already-closed emitter.
    pub fn close(&mut self) -> Result<(), EmitterError> {
        match self.state {
            State::Initialized => Err(EmitterError::NotOpened),
            State::Opened => {
                self.backend.emit(Event::StreamEnd)?;
                self.state = State::Closed;
                Ok(())
            }
            State::Closed => Ok(()),
        }
    }

    /// The output accumulated so far. After an error the buffer contents are
    /// unspecified and should be discarded.
    #[inline]
    pub fn data(&self) -> &str {
        &self.backend.out
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.backend.out
    }

    /// Depth-first event conversion of a node tree.
    fn emit_node(&mut self, node: &Node) -> Result<(), EmitterError> {
        match node {
            Node::Alias(anchor) => self.backend.emit(Event::Alias { anchor }),
            Node::Scalar(scalar) => {
                let resolved = resolver::resolve(&scalar.value);
                self.backend.emit(Event::Scalar {
                    anchor: scalar.anchor.as_deref(),
                    tag: &scalar.tag,
                    value: &scalar.value,
                    plain_implicit: scalar.tag == resolved,
                    quoted_implicit: scalar.tag == Tag::Str,
                    style: scalar.style,
                })
            }
            Node::Sequence(seq) => {
                let mut style = seq.style;
                if style == SequenceStyle::Any {
                    style = self.options.sequence_style;
                }
                if seq.items.is_empty() {
                    style = SequenceStyle::Flow;
                }
                self.backend.emit(Event::SequenceStart {
                    anchor: seq.anchor.as_deref(),
                    tag: &seq.tag,
                    implicit: seq.tag == Tag::Seq,
                    style,
                })?;
                for item in &seq.items {
                    self.emit_node(item)?;
                }
                self.backend.emit(Event::SequenceEnd)
            }
            Node::Mapping(mapping) => {
                let mut style = mapping.style;
                if style == MappingStyle::Any {
                    style = self.options.mapping_style;
                }
                if mapping.is_empty() {
                    style = MappingStyle::Flow;
                }
                self.backend.emit(Event::MappingStart {
                    anchor: mapping.anchor.as_deref(),
                    tag: &mapping.tag,
                    implicit: mapping.tag == Tag::Map,
                    style,
                })?;
                let pairs = mapping.pairs();
                if self.options.sort_keys {
                    let mut order: Vec<usize> = (0..pairs.len()).collect();
                    order.sort_by(|&a, &b| pairs[a].0.cmp(&pairs[b].0));
                    for index in order {
                        self.emit_node(&pairs[index].0)?;
                        self.emit_node(&pairs[index].1)?;
                    }
                } else {
                    for (key, value) in pairs {
                        self.emit_node(key)?;
                        self.emit_node(value)?;
                    }
                }
                self.backend.emit(Event::MappingEnd)
            }
        }
    }
}

/// The event → text state machine. Modelled on the libYAML emitter: the same
/// indicator/indent write discipline, so the byte output matches it for the
/// common shapes.
struct Backend {
    opts: Options,
    out: String,
    state: BState,
    states: Vec<BState>,
    indents: Vec<isize>,
    indent: isize,
    flow_level: usize,
    column: usize,
    whitespace: bool,
    indention: bool,
    documents: usize,
    anchors: HashSet<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum BState {
    StreamStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    FlowSeqFirstItem,
    FlowSeqItem,
    FlowMapFirstKey,
    FlowMapKey,
    FlowMapSimpleValue,
    FlowMapValue,
    BlockSeqFirstItem { indentless: bool },
    BlockSeqItem,
    BlockMapFirstKey,
    BlockMapKey,
    BlockMapSimpleValue,
    BlockMapValue,
    End,
}

/// Where the node currently being emitted sits.
#[derive(Clone, Copy, Debug, Default)]
struct Ctx {
    mapping: bool,
    simple_key: bool,
}

impl Backend {
    fn new(opts: Options) -> Backend {
        Backend {
            opts,
            out: String::new(),
            state: BState::StreamStart,
            states: Vec::new(),
            indents: Vec::new(),
            indent: -1,
            flow_level: 0,
            column: 0,
            whitespace: true,
            indention: true,
            documents: 0,
            anchors: HashSet::new(),
        }
    }

    fn emit(&mut self, event: Event) -> Result<(), EmitterError> {
        match self.state {
            BState::StreamStart => self.emit_stream_start(event),
            BState::DocumentStart => self.emit_document_start(event),
            BState::DocumentContent => self.emit_document_content(event),
            BState::DocumentEnd => self.emit_document_end(event),
            BState::FlowSeqFirstItem => self.emit_flow_seq_item(event, true),
            BState::FlowSeqItem => self.emit_flow_seq_item(event, false),
            BState::FlowMapFirstKey => self.emit_flow_map_key(event, true),
            BState::FlowMapKey => self.emit_flow_map_key(event, false),
            BState::FlowMapSimpleValue => self.emit_flow_map_value(event, true),
            BState::FlowMapValue => self.emit_flow_map_value(event, false),
            BState::BlockSeqFirstItem { indentless } => {
                self.emit_block_seq_item(event, Some(indentless))
            }
            BState::BlockSeqItem => self.emit_block_seq_item(event, None),
            BState::BlockMapFirstKey => self.emit_block_map_key(event, true),
            BState::BlockMapKey => self.emit_block_map_key(event, false),
            BState::BlockMapSimpleValue => self.emit_block_map_value(event, true),
            BState::BlockMapValue => self.emit_block_map_value(event, false),
            BState::End => Err(EmitterError::Unexpected(event.kind())),
        }
    }

    fn emit_stream_start(&mut self, event: Event) -> Result<(), EmitterError> {
        match event {
            Event::StreamStart => {
                self.state = BState::DocumentStart;
                Ok(())
            }
            other => Err(EmitterError::Unexpected(other.kind())),
        }
    }

    fn emit_document_start(&mut self, event: Event) -> Result<(), EmitterError> {
        match event {
            Event::DocumentStart { version, implicit } => {
                let mut implicit =
                    implicit && version.is_none() && !self.opts.canonical && self.documents == 0;
                if let Some((major, minor)) = version {
                    self.write_indent();
                    self.write_indicator(&format!("%YAML {major}.{minor}"), true, false, false);
                    implicit = false;
                }
                if !implicit {
                    self.write_indent();
                    self.write_indicator("---", true, false, false);
                    if self.opts.canonical {
                        self.write_indent();
                    }
                }
                self.anchors.clear();
                self.state = BState::DocumentContent;
                Ok(())
            }
            Event::StreamEnd => {
                self.state = BState::End;
                Ok(())
            }
            other => Err(EmitterError::Unexpected(other.kind())),
        }
    }

    fn emit_document_content(&mut self, event: Event) -> Result<(), EmitterError> {
        self.states.push(BState::DocumentEnd);
        self.emit_node(event, Ctx::default())
    }

    fn emit_document_end(&mut self, event: Event) -> Result<(), EmitterError> {
        match event {
            Event::DocumentEnd { implicit } => {
                self.write_indent();
                if !implicit {
                    self.write_indicator("...", true, false, false);
                    self.write_indent();
                }
                self.documents += 1;
                self.state = BState::DocumentStart;
                Ok(())
            }
            other => Err(EmitterError::Unexpected(other.kind())),
        }
    }

    fn emit_node(&mut self, event: Event, ctx: Ctx) -> Result<(), EmitterError> {
        match event {
            Event::Alias { anchor } => self.emit_alias(anchor),
            Event::Scalar {
                anchor,
                tag,
                value,
                plain_implicit,
                quoted_implicit,
                style,
            } => self.emit_scalar(anchor, tag, value, plain_implicit, quoted_implicit, style, ctx),
            Event::SequenceStart {
                anchor,
                tag,
                implicit,
                style,
            } => self.emit_sequence_start(anchor, tag, implicit, style, ctx),
            Event::MappingStart {
                anchor,
                tag,
                implicit,
                style,
            } => self.emit_mapping_start(anchor, tag, implicit, style),
            other => Err(EmitterError::Unexpected(other.kind())),
        }
    }

    fn emit_alias(&mut self, anchor: &str) -> Result<(), EmitterError> {
        if !self.anchors.contains(anchor) {
            return Err(EmitterError::UndefinedAlias(anchor.to_owned()));
        }
        self.write_anchor('*', anchor)?;
        self.state = self.pop_state();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_scalar(
        &mut self,
        anchor: Option<&str>,
        tag: &Tag,
        value: &str,
        plain_implicit: bool,
        quoted_implicit: bool,
        style: ScalarStyle,
        ctx: Ctx,
    ) -> Result<(), EmitterError> {
        if let Some(anchor) = anchor {
            self.declare_anchor(anchor)?;
            self.write_anchor('&', anchor)?;
        }
        let analysis = ScalarAnalysis::of(value, self.opts.allow_unicode);
        let style = self.choose_scalar_style(style, &analysis, value, plain_implicit, quoted_implicit, ctx);
        let explicit_tag = self.opts.canonical
            || match style {
                ScalarStyle::Plain => !plain_implicit,
                _ => !quoted_implicit,
            };
        if explicit_tag {
            self.write_tag(tag)?;
        }
        match style {
            ScalarStyle::Any | ScalarStyle::Plain => self.write_plain_scalar(value),
            ScalarStyle::SingleQuoted => self.write_single_quoted_scalar(value),
            ScalarStyle::DoubleQuoted => self.write_double_quoted_scalar(value),
            ScalarStyle::Literal => self.write_block_scalar(value, '|'),
            ScalarStyle::Folded => self.write_block_scalar(value, '>'),
        }
        self.state = self.pop_state();
        Ok(())
    }

    fn emit_sequence_start(
        &mut self,
        anchor: Option<&str>,
        tag: &Tag,
        implicit: bool,
        style: SequenceStyle,
        ctx: Ctx,
    ) -> Result<(), EmitterError> {
        if let Some(anchor) = anchor {
            self.declare_anchor(anchor)?;
            self.write_anchor('&', anchor)?;
        }
        if self.opts.canonical || !implicit {
            self.write_tag(tag)?;
        }
        if self.opts.canonical || self.flow_level > 0 || style == SequenceStyle::Flow {
            self.state = BState::FlowSeqFirstItem;
        } else {
            let indentless = ctx.mapping && !self.indention;
            self.state = BState::BlockSeqFirstItem { indentless };
        }
        Ok(())
    }

    fn emit_mapping_start(
        &mut self,
        anchor: Option<&str>,
        tag: &Tag,
        implicit: bool,
        style: MappingStyle,
    ) -> Result<(), EmitterError> {
        if let Some(anchor) = anchor {
            self.declare_anchor(anchor)?;
            self.write_anchor('&', anchor)?;
        }
        if self.opts.canonical || !implicit {
            self.write_tag(tag)?;
        }
        if self.opts.canonical || self.flow_level > 0 || style == MappingStyle::Flow {
            self.state = BState::FlowMapFirstKey;
        } else {
            self.state = BState::BlockMapFirstKey;
        }
        Ok(())
    }

    fn emit_flow_seq_item(&mut self, event: Event, first: bool) -> Result<(), EmitterError> {
        if first {
            self.write_indicator("[", true, true, false);
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if matches!(event, Event::SequenceEnd) {
            self.flow_level -= 1;
            self.indent = self.pop_indent();
            if self.opts.canonical && !first {
                self.write_indicator(",", false, false, false);
                self.write_indent();
            }
            self.write_indicator("]", false, false, false);
            self.state = self.pop_state();
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false);
        }
        if self.opts.canonical || self.column > self.opts.best_width() {
            self.write_indent();
        }
        self.states.push(BState::FlowSeqItem);
        self.emit_node(event, Ctx::default())
    }

    fn emit_flow_map_key(&mut self, event: Event, first: bool) -> Result<(), EmitterError> {
        if first {
            self.write_indicator("{", true, true, false);
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if matches!(event, Event::MappingEnd) {
            self.flow_level -= 1;
            self.indent = self.pop_indent();
            if self.opts.canonical && !first {
                self.write_indicator(",", false, false, false);
                self.write_indent();
            }
            self.write_indicator("}", false, false, false);
            self.state = self.pop_state();
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false);
        }
        if self.opts.canonical || self.column > self.opts.best_width() {
            self.write_indent();
        }
        if !self.opts.canonical && is_simple_key(&event) {
            self.states.push(BState::FlowMapSimpleValue);
            self.emit_node(
                event,
                Ctx {
                    mapping: true,
                    simple_key: true,
                },
            )
        } else {
            self.write_indicator("?", true, false, false);
            self.states.push(BState::FlowMapValue);
            self.emit_node(
                event,
                Ctx {
                    mapping: true,
                    simple_key: false,
                },
            )
        }
    }

    fn emit_flow_map_value(&mut self, event: Event, simple: bool) -> Result<(), EmitterError> {
        if simple {
            self.write_indicator(":", false, false, false);
        } else {
            if self.opts.canonical || self.column > self.opts.best_width() {
                self.write_indent();
            }
            self.write_indicator(":", true, false, false);
        }
        self.states.push(BState::FlowMapKey);
        self.emit_node(
            event,
            Ctx {
                mapping: true,
                simple_key: false,
            },
        )
    }

    fn emit_block_seq_item(
        &mut self,
        event: Event,
        first: Option<bool>,
    ) -> Result<(), EmitterError> {
        if let Some(indentless) = first {
            self.increase_indent(false, indentless);
        }
        if matches!(event, Event::SequenceEnd) {
            self.indent = self.pop_indent();
            self.state = self.pop_state();
            return Ok(());
        }
        self.write_indent();
        self.write_indicator("-", true, false, true);
        self.states.push(BState::BlockSeqItem);
        self.emit_node(event, Ctx::default())
    }

    fn emit_block_map_key(&mut self, event: Event, first: bool) -> Result<(), EmitterError> {
        if first {
            self.increase_indent(false, false);
        }
        if matches!(event, Event::MappingEnd) {
            self.indent = self.pop_indent();
            self.state = self.pop_state();
            return Ok(());
        }
        self.write_indent();
        if is_simple_key(&event) {
            self.states.push(BState::BlockMapSimpleValue);
            self.emit_node(
                event,
                Ctx {
                    mapping: true,
                    simple_key: true,
                },
            )
        } else {
            self.write_indicator("?", true, false, true);
            self.states.push(BState::BlockMapValue);
            self.emit_node(
                event,
                Ctx {
                    mapping: true,
                    simple_key: false,
                },
            )
        }
    }

    fn emit_block_map_value(&mut self, event: Event, simple: bool) -> Result<(), EmitterError> {
        if simple {
            self.write_indicator(":", false, false, false);
        } else {
            self.write_indent();
            self.write_indicator(":", true, false, true);
        }
        self.states.push(BState::BlockMapKey);
        self.emit_node(
            event,
            Ctx {
                mapping: true,
                simple_key: false,
            },
        )
    }

    fn choose_scalar_style(
        &self,
        requested: ScalarStyle,
        analysis: &ScalarAnalysis,
        value: &str,
        plain_implicit: bool,
        quoted_implicit: bool,
        ctx: Ctx,
    ) -> ScalarStyle {
        if self.opts.canonical {
            return ScalarStyle::DoubleQuoted;
        }
        let in_flow = self.flow_level > 0;
        let multiline = value.contains('\n');

        let mut style = requested;
        if style == ScalarStyle::Any && multiline {
            style = self.opts.newline_scalar_style;
        }
        if style == ScalarStyle::Any {
            style = ScalarStyle::Plain;
        }

        if style == ScalarStyle::Folded
            && (in_flow || ctx.simple_key || !analysis.allows_folded(value))
        {
            style = ScalarStyle::Literal;
        }
        if style == ScalarStyle::Literal
            && (in_flow || ctx.simple_key || !analysis.allows_block(value))
        {
            style = ScalarStyle::DoubleQuoted;
        }

        if style == ScalarStyle::Plain {
            if !analysis.allows_plain(in_flow) {
                style = if multiline
                    && !in_flow
                    && !ctx.simple_key
                    && analysis.allows_block(value)
                {
                    ScalarStyle::Literal
                } else if analysis.allows_single_quoted() {
                    ScalarStyle::SingleQuoted
                } else {
                    ScalarStyle::DoubleQuoted
                };
            } else if !plain_implicit && quoted_implicit {
                // Quoting keeps the tag implicit; prefer it over a printed
                // `!!str`.
                style = ScalarStyle::SingleQuoted;
            }
        }
        if style == ScalarStyle::SingleQuoted && !analysis.allows_single_quoted() {
            style = ScalarStyle::DoubleQuoted;
        }
        style
    }

    fn declare_anchor(&mut self, anchor: &str) -> Result<(), EmitterError> {
        if !self.anchors.insert(anchor.to_owned()) {
            return Err(EmitterError::DuplicateAnchor(anchor.to_owned()));
        }
        Ok(())
    }

    fn write_anchor(&mut self, indicator: char, name: &str) -> Result<(), EmitterError> {
        if name.is_empty() || !name.chars().all(CharExt::is_anchor_char) {
            return Err(EmitterError::InvalidAnchor(name.to_owned()));
        }
        self.write_indicator(&format!("{indicator}{name}"), true, false, false);
        Ok(())
    }

    fn write_tag(&mut self, tag: &Tag) -> Result<(), EmitterError> {
        let text = match tag {
            Tag::Custom(uri) if uri.is_empty() || uri == "!" => {
                return Err(EmitterError::InvalidTag(uri.clone()));
            }
            Tag::Custom(uri) if uri.starts_with('!') => uri.clone(),
            Tag::Custom(uri) => format!("!<{uri}>"),
            primitive => format!("!!{}", primitive.primitive_name().unwrap_or("str")),
        };
        self.write_indicator(&text, true, false, false);
        Ok(())
    }

    fn write_plain_scalar(&mut self, value: &str) {
        if !self.whitespace {
            self.out.push(' ');
            self.column += 1;
        }
        self.out.push_str(value);
        self.column += value.chars().count();
        self.whitespace = false;
        self.indention = false;
    }

    fn write_single_quoted_scalar(&mut self, value: &str) {
        self.write_indicator("'", true, false, false);
        for ch in value.chars() {
            if ch == '\'' {
                self.out.push_str("''");
                self.column += 2;
            } else {
                self.out.push(ch);
                self.column += 1;
            }
        }
        self.out.push('\'');
        self.column += 1;
        self.whitespace = false;
        self.indention = false;
    }

    fn write_double_quoted_scalar(&mut self, value: &str) {
        self.write_indicator("\"", true, false, false);
        for ch in value.chars() {
            if must_escape(ch, self.opts.allow_unicode) {
                self.write_escaped(ch);
            } else {
                self.out.push(ch);
                self.column += 1;
            }
        }
        self.out.push('"');
        self.column += 1;
        self.whitespace = false;
        self.indention = false;
    }

    fn write_escaped(&mut self, ch: char) {
        let short = match ch {
            '\0' => Some("\\0"),
            '\x07' => Some("\\a"),
            '\x08' => Some("\\b"),
            '\t' => Some("\\t"),
            '\n' => Some("\\n"),
            '\x0b' => Some("\\v"),
            '\x0c' => Some("\\f"),
            '\r' => Some("\\r"),
            '\x1b' => Some("\\e"),
            '"' => Some("\\\""),
            '\\' => Some("\\\\"),
            '\u{85}' => Some("\\N"),
            '\u{a0}' => Some("\\_"),
            '\u{2028}' => Some("\\L"),
            '\u{2029}' => Some("\\P"),
            _ => None,
        };
        let text = match short {
            Some(text) => text.to_owned(),
            None => {
                let code = ch as u32;
                if code <= 0xff {
                    format!("\\x{code:02x}")
                } else if code <= 0xffff {
                    format!("\\u{code:04x}")
                } else {
                    format!("\\U{code:08x}")
                }
            }
        };
        self.out.push_str(&text);
        self.column += text.len();
    }

    /// Literal (`|`) and folded (`>`) block scalars, with chomping chosen
    /// from the trailing breaks and an indentation indicator when the first
    /// line would be ambiguous.
    fn write_block_scalar(&mut self, value: &str, indicator: char) {
        let step = self.opts.indent_step();
        let indent = self.indent.max(0) as usize + step;
        let chomp = if !value.ends_with('\n') {
            "-"
        } else if value.ends_with("\n\n") {
            "+"
        } else {
            ""
        };
        let mut header = String::new();
        header.push(indicator);
        if value.starts_with(' ') || value.starts_with('\n') {
            header.push((b'0' + step as u8) as char);
        }
        header.push_str(chomp);
        self.write_indicator(&header, true, false, false);

        let mut chunks: Vec<&str> = value.split('\n').collect();
        if chomp != "-" {
            chunks.pop();
        }
        let folded = indicator == '>';
        for (i, chunk) in chunks.iter().enumerate() {
            if folded && i > 0 {
                self.write_break();
            }
            self.write_break();
            if !chunk.is_empty() {
                for _ in 0..indent {
                    self.out.push(' ');
                }
                self.column = indent;
                self.out.push_str(chunk);
                self.column += chunk.chars().count();
            }
        }
        self.whitespace = false;
        self.indention = false;
    }

    fn write_break(&mut self) {
        self.out.push_str(self.opts.line_break.as_str());
        self.column = 0;
        self.whitespace = true;
        self.indention = true;
    }

    /// Move the cursor to the current indentation column, breaking the line
    /// first unless it holds nothing but indentation.
    fn write_indent(&mut self) {
        let indent = self.indent.max(0) as usize;
        if !self.indention
            || self.column > indent
            || (self.column == indent && !self.whitespace)
        {
            self.write_break();
        }
        while self.column < indent {
            self.out.push(' ');
            self.column += 1;
        }
        self.whitespace = true;
        self.indention = true;
    }

    fn write_indicator(
        &mut self,
        indicator: &str,
        need_whitespace: bool,
        is_whitespace: bool,
        is_indention: bool,
    ) {
        if need_whitespace && !self.whitespace {
            self.out.push(' ');
            self.column += 1;
        }
        self.out.push_str(indicator);
        self.column += indicator.chars().count();
        self.whitespace = is_whitespace;
        self.indention = self.indention && is_indention;
    }

    fn increase_indent(&mut self, flow: bool, indentless: bool) {
        self.indents.push(self.indent);
        if self.indent < 0 {
            self.indent = if flow { self.opts.indent_step() as isize } else { 0 };
        } else if !indentless {
            self.indent += self.opts.indent_step() as isize;
        }
    }

    fn pop_indent(&mut self) -> isize {
        self.indents.pop().unwrap_or(-1)
    }

    fn pop_state(&mut self) -> BState {
        self.states.pop().unwrap_or(BState::End)
    }
}

/// A key is written in the compact `key: value` form when it fits on the
/// line as a single short token; anything else gets the explicit `?` form.
fn is_simple_key(event: &Event) -> bool {
    match event {
        Event::Alias { .. } => true,
        Event::Scalar { value, .. } => value.len() <= 128 && !value.contains('\n'),
        _ => false,
    }
}

fn must_escape(ch: char, allow_unicode: bool) -> bool {
    match ch {
        '"' | '\\' => true,
        '\u{85}' | '\u{2028}' | '\u{2029}' | '\u{feff}' => true,
        ch if (ch as u32) < 0x20 || ch == '\x7f' => true,
        ch if !ch.is_yaml_printable() => true,
        ch => !allow_unicode && !ch.is_ascii(),
    }
}

/// Serialize a single node as one YAML document.
pub fn serialize(node: &Node, options: &Options) -> Result<String, Error> {
    serialize_all(std::slice::from_ref(node), options)
}

/// Serialize each node as its own document in one YAML stream.
pub fn serialize_all(nodes: &[Node], options: &Options) -> Result<String, Error> {
    let mut emitter = Emitter::new(options.clone());
    emitter.open()?;
    for node in nodes {
        match options.redundancy_aliasing {
            AliasStrategy::None => emitter.serialize(node)?,
            strategy => emitter.serialize(&alias::apply(node, strategy))?,
        }
    }
    emitter.close()?;
    Ok(emitter.into_string())
}

/// Represent `value` and serialize it as one YAML document.
pub fn dump<T: Represent + ?Sized>(value: &T, options: &Options) -> Result<String, Error> {
    let node = value.represent(options)?;
    serialize(&node, options)
}

/// Represent each value and serialize them as a stream of documents.
pub fn dump_all<'a, T, I>(values: I, options: &Options) -> Result<String, Error>
where
    T: Represent + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let nodes = values
        .into_iter()
        .map(|value| value.represent(options))
        .collect::<Result<Vec<_>, _>>()?;
    serialize_all(&nodes, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mapping, Scalar};

    fn emit(node: &Node) -> String {
        serialize(node, &Options::default()).unwrap()
    }

    #[test]
    fn state_machine_guards() {
        let mut emitter = Emitter::new(Options::default());
        assert!(matches!(
            emitter.serialize(&Node::scalar("x")),
            Err(EmitterError::NotOpened)
        ));
        assert!(matches!(emitter.close(), Err(EmitterError::NotOpened)));
        emitter.open().unwrap();
        assert!(matches!(emitter.open(), Err(EmitterError::AlreadyOpened)));
        emitter.serialize(&Node::scalar("x")).unwrap();
        emitter.close().unwrap();
        // Closing again is a no-op.
        emitter.close().unwrap();
        assert!(matches!(
            emitter.serialize(&Node::scalar("y")),
            Err(EmitterError::AlreadyClosed)
        ));
        assert!(matches!(emitter.open(), Err(EmitterError::AlreadyClosed)));
        assert_eq!(emitter.data(), "x\n");
    }

    #[test]
    fn scalar_documents() {
        assert_eq!(emit(&Node::scalar("hello")), "hello\n");
        assert_eq!(emit(&Node::scalar("42")), "42\n");
        assert_eq!(
            emit(&Node::Scalar(Scalar::with_tag("true", Tag::Str))),
            "'true'\n"
        );
    }

    #[test]
    fn block_mapping() {
        let node = Node::mapping([
            (Node::scalar("a"), Node::scalar("1")),
            (Node::scalar("b"), Node::scalar("2")),
        ])
        .unwrap();
        assert_eq!(emit(&node), "a: 1\nb: 2\n");
    }

    #[test]
    fn sorted_keys() {
        let node = Node::mapping([
            (Node::scalar("b"), Node::scalar("2")),
            (Node::scalar("a"), Node::scalar("1")),
        ])
        .unwrap();
        let options = Options {
            sort_keys: true,
            ..Options::default()
        };
        assert_eq!(serialize(&node, &options).unwrap(), "a: 1\nb: 2\n");

        // Byte-identical regardless of insertion order.
        let swapped = Node::mapping([
            (Node::scalar("a"), Node::scalar("1")),
            (Node::scalar("b"), Node::scalar("2")),
        ])
        .unwrap();
        assert_eq!(
            serialize(&node, &options).unwrap(),
            serialize(&swapped, &options).unwrap()
        );
    }

    #[test]
    fn block_sequence() {
        let node = Node::sequence([Node::scalar("1"), Node::scalar("2")]);
        assert_eq!(emit(&node), "- 1\n- 2\n");
    }

    #[test]
    fn nested_block_collections() {
        let node = Node::mapping([(
            Node::scalar("key"),
            Node::sequence([Node::scalar("1"), Node::scalar("2")]),
        )])
        .unwrap();
        assert_eq!(emit(&node), "key:\n- 1\n- 2\n");

        let node = Node::sequence([
            Node::sequence([Node::scalar("1"), Node::scalar("2")]),
            Node::mapping([(Node::scalar("a"), Node::scalar("1"))]).unwrap(),
        ]);
        assert_eq!(emit(&node), "- - 1\n  - 2\n- a: 1\n");
    }

    #[test]
    fn empty_collections_are_flow() {
        assert_eq!(emit(&Node::sequence([])), "[]\n");
        assert_eq!(emit(&Node::Mapping(Mapping::new())), "{}\n");
    }

    #[test]
    fn flow_styles() {
        let mut seq = crate::Sequence::new([Node::scalar("1"), Node::scalar("2")]);
        seq.style = SequenceStyle::Flow;
        assert_eq!(emit(&Node::Sequence(seq)), "[1, 2]\n");

        let node = Node::mapping([(Node::scalar("a"), Node::scalar("1"))]).unwrap();
        let options = Options {
            mapping_style: MappingStyle::Flow,
            ..Options::default()
        };
        assert_eq!(serialize(&node, &options).unwrap(), "{a: 1}\n");
    }

    #[test]
    fn document_markers() {
        let node = Node::scalar("x");
        let options = Options {
            explicit_start: true,
            explicit_end: true,
            ..Options::default()
        };
        assert_eq!(serialize(&node, &options).unwrap(), "--- x\n...\n");

        let options = Options {
            version: Some((1, 2)),
            ..Options::default()
        };
        assert_eq!(serialize(&node, &options).unwrap(), "%YAML 1.2\n--- x\n");
    }

    #[test]
    fn multiple_documents() {
        let nodes = [Node::scalar("1"), Node::scalar("2")];
        assert_eq!(
            serialize_all(&nodes, &Options::default()).unwrap(),
            "1\n--- 2\n"
        );
    }

    #[test]
    fn multiline_scalars_use_literal_style() {
        assert_eq!(emit(&Node::scalar("a\nb")), "|-\n  a\n  b\n");
        assert_eq!(emit(&Node::scalar("a\nb\n")), "|\n  a\n  b\n");
        assert_eq!(emit(&Node::scalar("a\n\nb\n")), "|\n  a\n\n  b\n");

        let node = Node::mapping([(Node::scalar("k"), Node::scalar("a\nb"))]).unwrap();
        assert_eq!(emit(&node), "k: |-\n  a\n  b\n");
    }

    #[test]
    fn folded_style_round_trips_paragraphs() {
        let node = Node::Scalar(Scalar::new("one\ntwo").with_style(ScalarStyle::Folded));
        assert_eq!(emit(&node), ">-\n  one\n\n  two\n");
    }

    #[test]
    fn multiline_in_flow_is_double_quoted() {
        let mut seq = crate::Sequence::new([Node::scalar("a\nb")]);
        seq.style = SequenceStyle::Flow;
        assert_eq!(emit(&Node::Sequence(seq)), "[\"a\\nb\"]\n");
    }

    #[test]
    fn special_characters_are_escaped() {
        assert_eq!(emit(&Node::scalar("caf\u{e9}")), "\"caf\\xe9\"\n");
        let options = Options {
            allow_unicode: true,
            ..Options::default()
        };
        assert_eq!(
            serialize(&Node::scalar("caf\u{e9}"), &options).unwrap(),
            "caf\u{e9}\n"
        );
        assert_eq!(emit(&Node::scalar("tab\there")), "\"tab\\there\"\n");
    }

    #[test]
    fn canonical_output() {
        let node = Node::mapping([(Node::scalar("a"), Node::scalar("1"))]).unwrap();
        let options = Options {
            canonical: true,
            ..Options::default()
        };
        assert_eq!(
            serialize(&node, &options).unwrap(),
            "---\n!!map {\n  ? !!str \"a\"\n  : !!int \"1\",\n}\n"
        );
    }

    #[test]
    fn anchors_and_aliases() {
        let node = Node::sequence([
            Node::mapping([(Node::scalar("a"), Node::scalar("1"))])
                .unwrap()
                .with_anchor("x"),
            Node::alias("x"),
        ]);
        assert_eq!(emit(&node), "- &x\n  a: 1\n- *x\n");
    }

    #[test]
    fn undefined_alias_is_an_error() {
        let node = Node::sequence([Node::alias("nowhere")]);
        assert!(matches!(
            serialize(&node, &Options::default()),
            Err(Error::Emit(EmitterError::UndefinedAlias(_)))
        ));
    }

    #[test]
    fn duplicate_anchor_is_an_error() {
        let node = Node::sequence([
            Node::scalar("1").with_anchor("a"),
            Node::scalar("2").with_anchor("a"),
        ]);
        assert!(matches!(
            serialize(&node, &Options::default()),
            Err(Error::Emit(EmitterError::DuplicateAnchor(_)))
        ));
    }

    #[test]
    fn value_aliasing_end_to_end() {
        let subtree = Node::mapping([(Node::scalar("a"), Node::scalar("1"))]).unwrap();
        let node = Node::sequence([subtree.clone(), subtree]);
        let options = Options {
            redundancy_aliasing: AliasStrategy::Value,
            ..Options::default()
        };
        assert_eq!(
            serialize(&node, &options).unwrap(),
            "- &a1\n  a: 1\n- *a1\n"
        );
    }

    #[test]
    fn explicit_tags() {
        let node = Node::Scalar(Scalar::with_tag("SGVsbG8=", Tag::Binary));
        assert_eq!(emit(&node), "!!binary SGVsbG8=\n");

        let node = Node::Scalar(Scalar::with_tag("x", Tag::Custom("!mine".into())));
        assert_eq!(emit(&node), "!mine x\n");

        let node = Node::Scalar(Scalar::with_tag(
            "x",
            Tag::Custom("tag:example.com,2024:t".into()),
        ));
        assert_eq!(emit(&node), "!<tag:example.com,2024:t> x\n");
    }

    #[test]
    fn long_flow_sequences_wrap_at_width() {
        let mut seq = crate::Sequence::new((0..30).map(|i| Node::scalar(format!("item{i}"))));
        seq.style = SequenceStyle::Flow;
        let wrapped = emit(&Node::Sequence(seq.clone()));
        assert!(wrapped.lines().count() > 1, "{wrapped}");

        let options = Options {
            width: -1,
            ..Options::default()
        };
        let unwrapped = serialize(&Node::Sequence(seq), &options).unwrap();
        assert_eq!(unwrapped.lines().count(), 1, "{unwrapped}");
    }

    #[test]
    fn explicit_key_form() {
        let node = Node::mapping([(Node::scalar("a\nb"), Node::scalar("v"))]).unwrap();
        assert_eq!(emit(&node), "? |-\n  a\n  b\n: v\n");
    }

    #[test]
    fn line_break_policy() {
        let node = Node::mapping([
            (Node::scalar("a"), Node::scalar("1")),
            (Node::scalar("b"), Node::scalar("2")),
        ])
        .unwrap();
        let options = Options {
            line_break: crate::LineBreak::CrLn,
            ..Options::default()
        };
        assert_eq!(serialize(&node, &options).unwrap(), "a: 1\r\nb: 2\r\n");
    }

    #[test]
    fn indent_option() {
        let node = Node::mapping([(
            Node::scalar("k"),
            Node::mapping([(Node::scalar("a"), Node::scalar("1"))]).unwrap(),
        )])
        .unwrap();
        let options = Options {
            indent: 4,
            ..Options::default()
        };
        assert_eq!(serialize(&node, &options).unwrap(), "k:\n    a: 1\n");
    }
}

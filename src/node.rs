use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::{resolver, MappingStyle, RepresentError, ScalarStyle, SequenceStyle, Tag};

/// A YAML document tree.
///
/// Nodes are built by the representer or directly by callers, and are treated
/// as immutable values during an emission run.
///
/// Note that when comparing, hashing and ordering nodes, styles and anchors
/// are ignored; scalars additionally compare by tag, collections do not.
#[derive(Clone, Debug)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Sequence),
    Mapping(Mapping),
    /// A reference to the anchor of a previously-emitted node. The alias does
    /// not own its referent.
    Alias(String),
}

#[derive(Clone, Debug)]
pub struct Scalar {
    pub value: String,
    pub tag: Tag,
    pub style: ScalarStyle,
    pub anchor: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Sequence {
    pub items: Vec<Node>,
    pub tag: Tag,
    pub style: SequenceStyle,
    pub anchor: Option<String>,
}

/// An ordered mapping with unique keys.
///
/// Insertion order is preserved. Keys are deduplicated by structural
/// equality, not identity; inserting an equal key twice is an error.
#[derive(Clone, Debug)]
pub struct Mapping {
    pairs: Vec<(Node, Node)>,
    pub tag: Tag,
    pub style: MappingStyle,
    pub anchor: Option<String>,
}

impl Default for Sequence {
    #[inline]
    fn default() -> Self {
        Sequence::new([])
    }
}

impl Default for Mapping {
    #[inline]
    fn default() -> Self {
        Mapping::new()
    }
}

impl Scalar {
    /// Construct a scalar, resolving its tag from the content.
    pub fn new(value: impl Into<String>) -> Scalar {
        let value = value.into();
        let tag = resolver::resolve(&value);
        Scalar {
            value,
            tag,
            style: ScalarStyle::Any,
            anchor: None,
        }
    }

    /// Construct a scalar with an explicitly declared tag.
    pub fn with_tag(value: impl Into<String>, tag: Tag) -> Scalar {
        Scalar {
            value: value.into(),
            tag,
            style: ScalarStyle::Any,
            anchor: None,
        }
    }

    #[inline]
    pub fn with_style(mut self, style: ScalarStyle) -> Scalar {
        self.style = style;
        self
    }

    #[inline]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Scalar {
        self.anchor = Some(anchor.into());
        self
    }
}

impl Sequence {
    pub fn new(items: impl IntoIterator<Item = Node>) -> Sequence {
        Sequence {
            items: items.into_iter().collect(),
            tag: Tag::Seq,
            style: SequenceStyle::Any,
            anchor: None,
        }
    }
}

impl Mapping {
    pub fn new() -> Mapping {
        Mapping {
            pairs: Vec::new(),
            tag: Tag::Map,
            style: MappingStyle::Any,
            anchor: None,
        }
    }

    /// Append a key-value pair, rejecting keys already present.
    pub fn insert(&mut self, key: Node, value: Node) -> Result<(), RepresentError> {
        if self.get(&key).is_some() {
            return Err(RepresentError::DuplicateKey(key.describe()));
        }
        self.pairs.push((key, value));
        Ok(())
    }

    /// Look up a value by structural equality of the key.
    pub fn get(&self, key: &Node) -> Option<&Node> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    #[inline]
    pub fn pairs(&self) -> &[(Node, Node)] {
        &self.pairs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Node, Node)> {
        self.pairs.iter()
    }
}

impl Node {
    /// Construct a scalar node, resolving its tag from the content.
    #[inline]
    pub fn scalar(value: impl Into<String>) -> Node {
        Node::Scalar(Scalar::new(value))
    }

    #[inline]
    pub fn sequence(items: impl IntoIterator<Item = Node>) -> Node {
        Node::Sequence(Sequence::new(items))
    }

    /// Construct a mapping node, rejecting duplicate keys.
    pub fn mapping(
        pairs: impl IntoIterator<Item = (Node, Node)>,
    ) -> Result<Node, RepresentError> {
        let mut mapping = Mapping::new();
        for (key, value) in pairs {
            mapping.insert(key, value)?;
        }
        Ok(Node::Mapping(mapping))
    }

    #[inline]
    pub fn alias(anchor: impl Into<String>) -> Node {
        Node::Alias(anchor.into())
    }

    pub fn anchor(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => s.anchor.as_deref(),
            Node::Sequence(s) => s.anchor.as_deref(),
            Node::Mapping(m) => m.anchor.as_deref(),
            Node::Alias(_) => None,
        }
    }

    pub fn with_anchor(self, anchor: impl Into<String>) -> Node {
        let anchor = Some(anchor.into());
        match self {
            Node::Scalar(s) => Node::Scalar(Scalar { anchor, ..s }),
            Node::Sequence(s) => Node::Sequence(Sequence { anchor, ..s }),
            Node::Mapping(m) => Node::Mapping(Mapping { anchor, ..m }),
            alias => alias,
        }
    }

    /// The tag a decoder would see: the declared tag, which for scalars
    /// constructed without one is the content-resolved tag. Aliases take the
    /// tag of their referent; without the referent at hand this is `!!str`.
    pub fn resolved_tag(&self) -> Tag {
        match self {
            Node::Scalar(s) => s.tag.clone(),
            Node::Sequence(s) => s.tag.clone(),
            Node::Mapping(m) => m.tag.clone(),
            Node::Alias(_) => Tag::Str,
        }
    }

    /// Short description for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Node::Scalar(s) => s.value.clone(),
            Node::Sequence(_) => "<sequence>".to_owned(),
            Node::Mapping(_) => "<mapping>".to_owned(),
            Node::Alias(anchor) => format!("*{anchor}"),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Node::Scalar(_) => 0,
            Node::Sequence(_) => 1,
            Node::Mapping(_) => 2,
            Node::Alias(_) => 3,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Scalar(a), Node::Scalar(b)) => a.value == b.value && a.tag == b.tag,
            (Node::Sequence(a), Node::Sequence(b)) => a.items == b.items,
            (Node::Mapping(a), Node::Mapping(b)) => a.pairs == b.pairs,
            (Node::Alias(a), Node::Alias(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Node::Scalar(s) => {
                s.value.hash(state);
                s.tag.hash(state);
            }
            Node::Sequence(s) => s.items.hash(state),
            Node::Mapping(m) => m.pairs.hash(state),
            Node::Alias(anchor) => anchor.hash(state),
        }
    }
}

/// Total order used when `sort_keys` is requested: scalars sort below
/// sequences, sequences below mappings; scalars compare lexicographically by
/// value, collections element-wise.
impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Node::Scalar(a), Node::Scalar(b)) => a
                .value
                .cmp(&b.value)
                .then_with(|| a.tag.cmp(&b.tag)),
            (Node::Sequence(a), Node::Sequence(b)) => a.items.cmp(&b.items),
            (Node::Mapping(a), Node::Mapping(b)) => a.pairs.cmp(&b.pairs),
            (Node::Alias(a), Node::Alias(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl PartialOrd for Node {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Node {
    #[inline]
    fn from(value: &str) -> Node {
        Node::scalar(value)
    }
}

impl From<String> for Node {
    #[inline]
    fn from(value: String) -> Node {
        Node::scalar(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Node {
        Node::Scalar(Scalar::with_tag(if value { "true" } else { "false" }, Tag::Bool))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Node {
        Node::Scalar(Scalar::with_tag(
            itoa::Buffer::new().format(value),
            Tag::Int,
        ))
    }
}

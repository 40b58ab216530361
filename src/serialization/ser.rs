use crate::{
    Binary, EmitterError, Error, Node, Options, Represent, RepresentError, Scalar, Tag,
};

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error(transparent)]
    Represent(#[from] RepresentError),
    #[error(transparent)]
    Emit(#[from] EmitterError),
    #[error("{0}")]
    Custom(String),
}

impl serde::ser::Error for SerializationError {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::Custom(msg.to_string())
    }
}

impl From<Error> for SerializationError {
    fn from(err: Error) -> Self {
        match err {
            Error::Emit(err) => err.into(),
            Error::Represent(err) => err.into(),
        }
    }
}

/// A [`serde::Serializer`] producing a [`Node`] tree, built on the same
/// representer impls as [`dump`](crate::dump).
pub struct NodeSerializer<'o> {
    options: &'o Options,
}

impl<'o> NodeSerializer<'o> {
    #[inline]
    pub fn new(options: &'o Options) -> Self {
        NodeSerializer { options }
    }

    fn represent<T: Represent + ?Sized>(&self, value: &T) -> Result<Node, SerializationError> {
        value.represent(self.options).map_err(Into::into)
    }
}

pub struct SerializeVec<'o> {
    options: &'o Options,
    items: Vec<Node>,
}

pub struct SerializeTupleVariant<'o> {
    options: &'o Options,
    variant: &'static str,
    items: Vec<Node>,
}

pub struct SerializeMap<'o> {
    options: &'o Options,
    pairs: Vec<(Node, Node)>,
    pending_key: Option<Node>,
}

pub struct SerializeStructVariant<'o> {
    options: &'o Options,
    variant: &'static str,
    pairs: Vec<(Node, Node)>,
}

/// A singleton mapping `{variant: value}`, the conventional YAML rendering
/// of tagged enum variants.
fn variant_mapping(variant: &'static str, value: Node) -> Result<Node, SerializationError> {
    Node::mapping([(Node::Scalar(Scalar::with_tag(variant, Tag::Str)), value)])
        .map_err(Into::into)
}

impl<'o> serde::Serializer for NodeSerializer<'o> {
    type Ok = Node;
    type Error = SerializationError;
    type SerializeSeq = SerializeVec<'o>;
    type SerializeTuple = SerializeVec<'o>;
    type SerializeTupleStruct = SerializeVec<'o>;
    type SerializeTupleVariant = SerializeTupleVariant<'o>;
    type SerializeMap = SerializeMap<'o>;
    type SerializeStruct = SerializeMap<'o>;
    type SerializeStructVariant = SerializeStructVariant<'o>;

    fn serialize_bool(self, v: bool) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_i8(self, v: i8) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_i16(self, v: i16) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_i32(self, v: i32) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_i64(self, v: i64) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_i128(self, v: i128) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_u8(self, v: u8) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_u16(self, v: u16) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_u32(self, v: u32) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_u64(self, v: u64) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_u128(self, v: u128) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_f32(self, v: f32) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_f64(self, v: f64) -> Result<Node, SerializationError> {
        self.represent(&v)
    }

    fn serialize_char(self, v: char) -> Result<Node, SerializationError> {
        let mut buf = [0; 4];
        self.represent(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<Node, SerializationError> {
        self.represent(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node, SerializationError> {
        self.represent(&Binary(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Node, SerializationError> {
        self.serialize_unit()
    }

    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Node, SerializationError>
    where
        T: serde::Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node, SerializationError> {
        self.represent(&())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node, SerializationError> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node, SerializationError> {
        self.represent(variant)
    }

    fn serialize_newtype_struct<T: ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node, SerializationError>
    where
        T: serde::Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node, SerializationError>
    where
        T: serde::Serialize,
    {
        let value = value.serialize(NodeSerializer::new(self.options))?;
        variant_mapping(variant, value)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, SerializationError> {
        Ok(SerializeVec {
            options: self.options,
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, SerializationError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, SerializationError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, SerializationError> {
        Ok(SerializeTupleVariant {
            options: self.options,
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, SerializationError> {
        Ok(SerializeMap {
            options: self.options,
            pairs: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, SerializationError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, SerializationError> {
        Ok(SerializeStructVariant {
            options: self.options,
            variant,
            pairs: Vec::with_capacity(len),
        })
    }
}

impl serde::ser::SerializeSeq for SerializeVec<'_> {
    type Ok = Node;
    type Error = SerializationError;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), SerializationError>
    where
        T: serde::Serialize,
    {
        self.items
            .push(value.serialize(NodeSerializer::new(self.options))?);
        Ok(())
    }

    fn end(self) -> Result<Node, SerializationError> {
        Ok(Node::sequence(self.items))
    }
}

impl serde::ser::SerializeTuple for SerializeVec<'_> {
    type Ok = Node;
    type Error = SerializationError;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), SerializationError>
    where
        T: serde::Serialize,
    {
        serde::ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node, SerializationError> {
        serde::ser::SerializeSeq::end(self)
    }
}

impl serde::ser::SerializeTupleStruct for SerializeVec<'_> {
    type Ok = Node;
    type Error = SerializationError;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), SerializationError>
    where
        T: serde::Serialize,
    {
        serde::ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Node, SerializationError> {
        serde::ser::SerializeSeq::end(self)
    }
}

impl serde::ser::SerializeTupleVariant for SerializeTupleVariant<'_> {
    type Ok = Node;
    type Error = SerializationError;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), SerializationError>
    where
        T: serde::Serialize,
    {
        self.items
            .push(value.serialize(NodeSerializer::new(self.options))?);
        Ok(())
    }

    fn end(self) -> Result<Node, SerializationError> {
        variant_mapping(self.variant, Node::sequence(self.items))
    }
}

impl serde::ser::SerializeMap for SerializeMap<'_> {
    type Ok = Node;
    type Error = SerializationError;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<(), SerializationError>
    where
        T: serde::Serialize,
    {
        self.pending_key = Some(key.serialize(NodeSerializer::new(self.options))?);
        Ok(())
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<(), SerializationError>
    where
        T: serde::Serialize,
    {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| SerializationError::Custom("value without a key".to_owned()))?;
        self.pairs
            .push((key, value.serialize(NodeSerializer::new(self.options))?));
        Ok(())
    }

    fn end(self) -> Result<Node, SerializationError> {
        Node::mapping(self.pairs).map_err(Into::into)
    }
}

impl serde::ser::SerializeStruct for SerializeMap<'_> {
    type Ok = Node;
    type Error = SerializationError;

    fn serialize_field<T: ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerializationError>
    where
        T: serde::Serialize,
    {
        let value = value.serialize(NodeSerializer::new(self.options))?;
        self.pairs
            .push((Node::Scalar(Scalar::with_tag(key, Tag::Str)), value));
        Ok(())
    }

    fn end(self) -> Result<Node, SerializationError> {
        Node::mapping(self.pairs).map_err(Into::into)
    }
}

impl serde::ser::SerializeStructVariant for SerializeStructVariant<'_> {
    type Ok = Node;
    type Error = SerializationError;

    fn serialize_field<T: ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), SerializationError>
    where
        T: serde::Serialize,
    {
        let value = value.serialize(NodeSerializer::new(self.options))?;
        self.pairs
            .push((Node::Scalar(Scalar::with_tag(key, Tag::Str)), value));
        Ok(())
    }

    fn end(self) -> Result<Node, SerializationError> {
        let inner = Node::mapping(self.pairs)?;
        variant_mapping(self.variant, inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{to_node, Options};

    #[test]
    fn scalars_match_the_representer() {
        let options = Options::default();
        assert_eq!(to_node(&true, &options).unwrap(), Node::from(true));
        assert_eq!(to_node(&42i32, &options).unwrap(), Node::from(42i64));
        assert_eq!(to_node("hi", &options).unwrap(), Node::scalar("hi"));
        assert_eq!(
            to_node(&(), &options).unwrap(),
            Node::Scalar(Scalar::with_tag("null", Tag::Null))
        );
    }

    #[test]
    fn struct_keys_stay_ordered() {
        #[derive(serde::Serialize)]
        struct Point {
            y: i32,
            x: i32,
        }
        let node = to_node(&Point { y: 2, x: 1 }, &Options::default()).unwrap();
        let Node::Mapping(mapping) = node else {
            panic!("expected mapping");
        };
        let keys: Vec<_> = mapping.iter().map(|(k, _)| k.describe()).collect();
        assert_eq!(keys, ["y", "x"]);
    }

    #[test]
    fn map_with_duplicate_keys_fails() {
        use serde::ser::SerializeMap as _;
        use serde::Serializer as _;
        let options = Options::default();
        let mut map = NodeSerializer::new(&options).serialize_map(None).unwrap();
        map.serialize_key("k").unwrap();
        map.serialize_value("a").unwrap();
        map.serialize_key("k").unwrap();
        map.serialize_value("b").unwrap();
        assert!(matches!(
            map.end(),
            Err(SerializationError::Represent(RepresentError::DuplicateKey(_)))
        ));
    }
}

#![cfg(feature = "serde")]

mod ser;

pub use ser::*;

use serde::Serialize;

use crate::{Node, Options};

/// Convert any serializable value into a [`Node`] tree.
pub fn to_node<T: Serialize + ?Sized>(
    value: &T,
    options: &Options,
) -> Result<Node, SerializationError> {
    value.serialize(NodeSerializer::new(options))
}

/// Serialize into a YAML string with default [`Options`].
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, SerializationError> {
    to_string_with(value, &Options::default())
}

/// Serialize into a YAML string.
pub fn to_string_with<T: Serialize + ?Sized>(
    value: &T,
    options: &Options,
) -> Result<String, SerializationError> {
    let node = to_node(value, options)?;
    crate::serialize(&node, options).map_err(Into::into)
}

/// Serialize into an [`std::io::Write`] writer.
///
/// This function only ever writes valid UTF-8.
pub fn to_writer<T: Serialize + ?Sized, W: std::io::Write>(
    mut writer: W,
    value: &T,
) -> Result<(), SerializationError> {
    let out = to_string(value)?;
    writer
        .write_all(out.as_bytes())
        .map_err(|err| SerializationError::Custom(err.to_string()))
}

/// Serialize into a byte vector.
///
/// This function is guaranteed to only produce valid UTF-8.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SerializationError> {
    to_string(value).map(String::into_bytes)
}

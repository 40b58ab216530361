//! YAML document emission.

mod alias;
mod char;
mod emitter;
mod error;
mod event;
mod node;
mod options;
mod represent;
pub mod resolver;
mod scalar;
mod tag;

#[cfg(feature = "serde")]
mod serialization;

use char::*;
pub use emitter::*;
pub use error::*;
pub use event::*;
pub use node::*;
pub use options::*;
pub use represent::*;
pub use resolver::Schema;
use scalar::ScalarAnalysis;
pub use scalar::{MappingStyle, ScalarStyle, SequenceStyle};
pub use tag::*;

#[cfg(feature = "serde")]
pub use serialization::*;

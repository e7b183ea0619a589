mod deserializer;
mod serializer;
mod types;

pub use deserializer::{Deserializer, SliceDeserializer};
pub use serializer::{DynamicSerializer, Serializer};
pub use types::SizedString;

mod builtin;
/// Bounds-checked byte cursor and growable writer.
pub mod bytes;
/// Data-section access used by the dynamic and typed engines.
pub mod data;
mod decode;
mod encode;
mod error;
mod file;
/// Fixed header and table layout.
pub mod header;
/// Heap allocation and alias tracking.
pub mod heap;
/// Structure and field tables.
pub mod schema;
mod typed;
mod value;

/// Builtin wire types and their native representations.
pub use builtin::{Builtin, BuiltinType, Color, Matrix4x4, Quaternion, TalkString, Vector3, Vector4};
/// Data-section reader and writer shared by both engines.
pub use data::{DataReader, DataWriter};
/// Dynamic decoding entry points and options.
pub use decode::{DecodeOptions, decode_direct, decode_field, decode_root, decode_structure};
/// Dynamic encoding entry points.
pub use encode::{encode_direct, encode_field, encode_root, encode_structure};
/// Error and result aliases.
pub use error::{ErrorCategory, GffError, Result};
/// Container abstraction and whole-document helpers.
pub use file::{Document, GffFile, decode, decode_native, encode, encode_native};
/// Fixed header representation.
pub use header::{Endianness, FileVersion, GffHeader, TableLayout};
/// Schema representation.
pub use schema::{FieldDefinition, FieldKind, Schema, StructureDefinition, fourcc, tag_code};
/// Typed marshalling traits, bindings, and schema derivation.
pub use typed::{BindingCache, FieldBinding, FieldData, FieldShape, GffStruct, StructType, decode_struct, derive_schema, encode_struct};
/// Dynamic value tree types.
pub use value::{FromValue, StructValue, TaggedValue, Value, ValueType};

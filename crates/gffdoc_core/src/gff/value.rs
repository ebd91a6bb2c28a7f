use std::collections::BTreeMap;
use std::rc::Rc;

use crate::gff::{Color, FieldDefinition, FieldKind, Matrix4x4, Quaternion, TalkString, Vector3, Vector4};

/// Runtime value produced and consumed by the dynamic engine.
///
/// Structures are sparse: a field id missing from [`StructValue::fields`] encodes as absent.
/// Shared sub-objects decoded through the alias cache appear as [`Value::Ref`] (reference
/// fields) or share the `Rc` inside [`TaggedValue`] (generic lists); two nodes backed by the
/// same heap offset hold the same allocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
	/// Absent list, reference, or string; also the default for missing fields.
	#[default]
	Null,
	/// `UInt8` scalar.
	UInt8(u8),
	/// `Int8` scalar.
	Int8(i8),
	/// `UInt16` scalar.
	UInt16(u16),
	/// `Int16` scalar.
	Int16(i16),
	/// `UInt32` scalar.
	UInt32(u32),
	/// `Int32` scalar.
	Int32(i32),
	/// `UInt64` scalar.
	UInt64(u64),
	/// `Int64` scalar.
	Int64(i64),
	/// `Float32` scalar.
	Float32(f32),
	/// `Float64` scalar.
	Float64(f64),
	/// Three-component vector.
	Vector3(Vector3),
	/// Four-component vector.
	Vector4(Vector4),
	/// Rotation quaternion.
	Quaternion(Quaternion),
	/// RGBA color.
	Color(Color),
	/// 4x4 matrix.
	Matrix4x4(Matrix4x4),
	/// Talk-table reference.
	TalkString(TalkString),
	/// Heap or string-table string.
	String(String),
	/// List of `UInt8`, kept contiguous.
	Bytes(Vec<u8>),
	/// Homogeneous list.
	List(Vec<Value>),
	/// Heterogeneous list whose elements carry their own type.
	Generic(Vec<TaggedValue>),
	/// Structure instance.
	Struct(StructValue),
	/// Shared target of a reference field.
	Ref(Rc<Value>),
}

/// Structure instance keyed by field id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructValue {
	/// Type tag of the structure definition this value was decoded from.
	pub type_tag: u32,
	/// Field values by id.
	pub fields: BTreeMap<i32, Value>,
}

impl StructValue {
	/// Empty structure value.
	pub fn new(type_tag: u32) -> Self {
		Self {
			type_tag,
			fields: BTreeMap::new(),
		}
	}

	/// Builder-style field insert.
	pub fn with(mut self, id: i32, value: impl Into<Value>) -> Self {
		self.fields.insert(id, value.into());
		self
	}

	/// Insert or replace a field.
	pub fn set(&mut self, id: i32, value: impl Into<Value>) -> Option<Value> {
		self.fields.insert(id, value.into())
	}

	/// Field value by id.
	pub fn get(&self, id: i32) -> Option<&Value> {
		self.fields.get(&id)
	}
}

/// Runtime type carried by a generic list element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueType {
	/// Element kind.
	pub kind: FieldKind,
	/// Element is itself a list.
	pub is_list: bool,
	/// Element is itself a reference.
	pub is_reference: bool,
}

impl ValueType {
	/// Direct value of `kind`.
	pub fn new(kind: FieldKind) -> Self {
		Self {
			kind,
			is_list: false,
			is_reference: false,
		}
	}

	/// List of `kind`.
	pub fn list_of(kind: FieldKind) -> Self {
		Self {
			kind,
			is_list: true,
			is_reference: false,
		}
	}

	/// Synthetic field definition at offset 0 used to read or write the element.
	pub fn field(self) -> FieldDefinition {
		FieldDefinition {
			id: 0,
			kind: self.kind,
			is_list: self.is_list,
			is_reference: self.is_reference,
			inline_offset: 0,
		}
	}
}

/// Generic list element.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
	/// Element runtime type.
	pub ty: ValueType,
	/// Element payload, shared when several entries point at the same heap offset.
	pub value: Rc<Value>,
}

impl TaggedValue {
	/// Wrap a value with its runtime type.
	pub fn new(ty: ValueType, value: impl Into<Value>) -> Self {
		Self {
			ty,
			value: Rc::new(value.into()),
		}
	}
}

impl Value {
	/// Shared reference to `value`.
	pub fn shared(value: impl Into<Value>) -> Self {
		Self::Ref(Rc::new(value.into()))
	}

	/// Homogeneous list from convertible items.
	pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
		Self::List(items.into_iter().map(Into::into).collect())
	}

	/// Follow shared references to the underlying value.
	pub fn resolve(&self) -> &Value {
		let mut value = self;
		while let Self::Ref(inner) = value {
			value = inner.as_ref();
		}
		value
	}

	/// Whether this is `Null` (after resolving references).
	pub fn is_null(&self) -> bool {
		matches!(self.resolve(), Self::Null)
	}

	/// Short label of the variant, used in error messages.
	pub fn kind_name(&self) -> &'static str {
		match self {
			Self::Null => "Null",
			Self::UInt8(_) => "UInt8",
			Self::Int8(_) => "Int8",
			Self::UInt16(_) => "UInt16",
			Self::Int16(_) => "Int16",
			Self::UInt32(_) => "UInt32",
			Self::Int32(_) => "Int32",
			Self::UInt64(_) => "UInt64",
			Self::Int64(_) => "Int64",
			Self::Float32(_) => "Float32",
			Self::Float64(_) => "Float64",
			Self::Vector3(_) => "Vector3",
			Self::Vector4(_) => "Vector4",
			Self::Quaternion(_) => "Quaternion",
			Self::Color(_) => "Color",
			Self::Matrix4x4(_) => "Matrix4x4",
			Self::TalkString(_) => "TalkString",
			Self::String(_) => "String",
			Self::Bytes(_) => "Bytes",
			Self::List(_) => "List",
			Self::Generic(_) => "Generic",
			Self::Struct(_) => "Struct",
			Self::Ref(_) => "Ref",
		}
	}

	/// Field of a structure value.
	pub fn get(&self, id: i32) -> Option<&Value> {
		self.as_struct()?.get(id)
	}

	/// Field converted to `T`, or `default` when missing or of another type.
	pub fn get_or<T: FromValue>(&self, id: i32, default: T) -> T {
		self.get(id).and_then(T::from_value).unwrap_or(default)
	}

	/// Convert to `T` when the variant matches.
	pub fn as_native<T: FromValue>(&self) -> Option<T> {
		T::from_value(self)
	}

	/// Structure payload.
	pub fn as_struct(&self) -> Option<&StructValue> {
		match self.resolve() {
			Self::Struct(value) => Some(value),
			_ => None,
		}
	}

	/// Homogeneous list payload.
	pub fn as_list(&self) -> Option<&[Value]> {
		match self.resolve() {
			Self::List(items) => Some(items),
			_ => None,
		}
	}

	/// Generic list payload.
	pub fn as_generic(&self) -> Option<&[TaggedValue]> {
		match self.resolve() {
			Self::Generic(items) => Some(items),
			_ => None,
		}
	}

	/// Byte list payload.
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self.resolve() {
			Self::Bytes(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// String payload.
	pub fn as_str(&self) -> Option<&str> {
		match self.resolve() {
			Self::String(text) => Some(text),
			_ => None,
		}
	}

	/// Talk string payload.
	pub fn as_talk_string(&self) -> Option<&TalkString> {
		match self.resolve() {
			Self::TalkString(talk) => Some(talk),
			_ => None,
		}
	}

	/// `UInt8` payload.
	pub fn as_u8(&self) -> Option<u8> {
		self.as_native()
	}

	/// `Int8` payload.
	pub fn as_i8(&self) -> Option<i8> {
		self.as_native()
	}

	/// `UInt16` payload.
	pub fn as_u16(&self) -> Option<u16> {
		self.as_native()
	}

	/// `Int16` payload.
	pub fn as_i16(&self) -> Option<i16> {
		self.as_native()
	}

	/// `UInt32` payload.
	pub fn as_u32(&self) -> Option<u32> {
		self.as_native()
	}

	/// `Int32` payload.
	pub fn as_i32(&self) -> Option<i32> {
		self.as_native()
	}

	/// `UInt64` payload.
	pub fn as_u64(&self) -> Option<u64> {
		self.as_native()
	}

	/// `Int64` payload.
	pub fn as_i64(&self) -> Option<i64> {
		self.as_native()
	}

	/// `Float32` payload.
	pub fn as_f32(&self) -> Option<f32> {
		self.as_native()
	}

	/// `Float64` payload.
	pub fn as_f64(&self) -> Option<f64> {
		self.as_native()
	}
}

/// Native type extractable from a [`Value`].
pub trait FromValue: Sized {
	/// Convert when the (resolved) variant matches exactly.
	fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! value_conversions {
	($($ty:ty => $variant:ident),* $(,)?) => {
		$(
			impl FromValue for $ty {
				fn from_value(value: &Value) -> Option<Self> {
					match value.resolve() {
						Value::$variant(inner) => Some(inner.clone()),
						_ => None,
					}
				}
			}

			impl From<$ty> for Value {
				fn from(value: $ty) -> Self {
					Self::$variant(value)
				}
			}
		)*
	};
}

value_conversions! {
	u8 => UInt8,
	i8 => Int8,
	u16 => UInt16,
	i16 => Int16,
	u32 => UInt32,
	i32 => Int32,
	u64 => UInt64,
	i64 => Int64,
	f32 => Float32,
	f64 => Float64,
	Vector3 => Vector3,
	Vector4 => Vector4,
	Quaternion => Quaternion,
	Color => Color,
	Matrix4x4 => Matrix4x4,
	TalkString => TalkString,
	String => String,
	Vec<u8> => Bytes,
	StructValue => Struct,
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<Vec<TaggedValue>> for Value {
	fn from(value: Vec<TaggedValue>) -> Self {
		Self::Generic(value)
	}
}

impl From<Rc<Value>> for Value {
	fn from(value: Rc<Value>) -> Self {
		Self::Ref(value)
	}
}

use crate::gff::bytes::{Cursor, Writer};
use crate::gff::{Endianness, GffError, Result, Value};

/// Closed table of wire types a field may declare without naming a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuiltinType {
	/// Unsigned 8-bit integer.
	UInt8,
	/// Signed 8-bit integer.
	Int8,
	/// Unsigned 16-bit integer.
	UInt16,
	/// Signed 16-bit integer.
	Int16,
	/// Unsigned 32-bit integer.
	UInt32,
	/// Signed 32-bit integer.
	Int32,
	/// Unsigned 64-bit integer.
	UInt64,
	/// Signed 64-bit integer.
	Int64,
	/// IEEE-754 single precision float.
	Float32,
	/// IEEE-754 double precision float.
	Float64,
	/// Three `f32` components.
	Vector3,
	/// Four `f32` components.
	Vector4,
	/// Rotation quaternion, four `f32` components.
	Quaternion,
	/// Heap-resident string.
	String,
	/// RGBA color, four `f32` components.
	Color,
	/// Row-major 4x4 `f32` matrix.
	Matrix4x4,
	/// Talk-table string id with an optional override string.
	TalkString,
}

impl BuiltinType {
	/// Every builtin type in tag order.
	pub const ALL: [Self; 17] = [
		Self::UInt8,
		Self::Int8,
		Self::UInt16,
		Self::Int16,
		Self::UInt32,
		Self::Int32,
		Self::UInt64,
		Self::Int64,
		Self::Float32,
		Self::Float64,
		Self::Vector3,
		Self::Vector4,
		Self::Quaternion,
		Self::String,
		Self::Color,
		Self::Matrix4x4,
		Self::TalkString,
	];

	/// Resolve a numeric wire tag.
	pub fn from_tag(tag: u16) -> Result<Self> {
		Ok(match tag {
			0 => Self::UInt8,
			1 => Self::Int8,
			2 => Self::UInt16,
			3 => Self::Int16,
			4 => Self::UInt32,
			5 => Self::Int32,
			6 => Self::UInt64,
			7 => Self::Int64,
			8 => Self::Float32,
			9 => Self::Float64,
			10 => Self::Vector3,
			12 => Self::Vector4,
			13 => Self::Quaternion,
			14 => Self::String,
			15 => Self::Color,
			16 => Self::Matrix4x4,
			17 => Self::TalkString,
			_ => return Err(GffError::UnknownType { tag }),
		})
	}

	/// Numeric wire tag.
	pub fn tag(self) -> u16 {
		match self {
			Self::UInt8 => 0,
			Self::Int8 => 1,
			Self::UInt16 => 2,
			Self::Int16 => 3,
			Self::UInt32 => 4,
			Self::Int32 => 5,
			Self::UInt64 => 6,
			Self::Int64 => 7,
			Self::Float32 => 8,
			Self::Float64 => 9,
			Self::Vector3 => 10,
			Self::Vector4 => 12,
			Self::Quaternion => 13,
			Self::String => 14,
			Self::Color => 15,
			Self::Matrix4x4 => 16,
			Self::TalkString => 17,
		}
	}

	/// Inline byte footprint. `String` occupies its 4-byte heap slot.
	pub fn inline_size(self) -> u32 {
		match self {
			Self::UInt8 | Self::Int8 => 1,
			Self::UInt16 | Self::Int16 => 2,
			Self::UInt32 | Self::Int32 | Self::Float32 | Self::String => 4,
			Self::UInt64 | Self::Int64 | Self::Float64 | Self::TalkString => 8,
			Self::Vector3 => 12,
			Self::Vector4 | Self::Quaternion | Self::Color => 16,
			Self::Matrix4x4 => 64,
		}
	}

	/// Stable type name used in rendered schemas and JSON output.
	pub fn name(self) -> &'static str {
		match self {
			Self::UInt8 => "UInt8",
			Self::Int8 => "Int8",
			Self::UInt16 => "UInt16",
			Self::Int16 => "Int16",
			Self::UInt32 => "UInt32",
			Self::Int32 => "Int32",
			Self::UInt64 => "UInt64",
			Self::Int64 => "Int64",
			Self::Float32 => "Float32",
			Self::Float64 => "Float64",
			Self::Vector3 => "Vector3",
			Self::Vector4 => "Vector4",
			Self::Quaternion => "Quaternion",
			Self::String => "String",
			Self::Color => "Color",
			Self::Matrix4x4 => "Matrix4x4",
			Self::TalkString => "TalkString",
		}
	}

	/// Whether the flat builtin path can read and write this type.
	pub fn is_flat(self) -> bool {
		!matches!(self, Self::String | Self::TalkString)
	}

	/// Read one value of this type at the cursor.
	pub fn read(self, cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Value> {
		Ok(match self {
			Self::UInt8 => Value::UInt8(u8::read(cursor, endianness)?),
			Self::Int8 => Value::Int8(i8::read(cursor, endianness)?),
			Self::UInt16 => Value::UInt16(u16::read(cursor, endianness)?),
			Self::Int16 => Value::Int16(i16::read(cursor, endianness)?),
			Self::UInt32 => Value::UInt32(u32::read(cursor, endianness)?),
			Self::Int32 => Value::Int32(i32::read(cursor, endianness)?),
			Self::UInt64 => Value::UInt64(u64::read(cursor, endianness)?),
			Self::Int64 => Value::Int64(i64::read(cursor, endianness)?),
			Self::Float32 => Value::Float32(f32::read(cursor, endianness)?),
			Self::Float64 => Value::Float64(f64::read(cursor, endianness)?),
			Self::Vector3 => Value::Vector3(Vector3::read(cursor, endianness)?),
			Self::Vector4 => Value::Vector4(Vector4::read(cursor, endianness)?),
			Self::Quaternion => Value::Quaternion(Quaternion::read(cursor, endianness)?),
			Self::Color => Value::Color(Color::read(cursor, endianness)?),
			Self::Matrix4x4 => Value::Matrix4x4(Matrix4x4::read(cursor, endianness)?),
			Self::String | Self::TalkString => return Err(GffError::UnsupportedOperation { op: "read", ty: self }),
		})
	}

	/// Write one value of this type at the writer position.
	///
	/// `Value::Null` writes the type's zero value, matching what a missing field in a sparse
	/// value tree encodes to. Any other mismatched variant is rejected.
	pub fn write(self, value: &Value, writer: &mut Writer, endianness: Endianness, field_id: i32) -> Result<()> {
		let value = value.resolve();
		if value.is_null() {
			return self.write_zero(writer);
		}

		match (self, value) {
			(Self::UInt8, Value::UInt8(v)) => v.write(writer, endianness),
			(Self::Int8, Value::Int8(v)) => v.write(writer, endianness),
			(Self::UInt16, Value::UInt16(v)) => v.write(writer, endianness),
			(Self::Int16, Value::Int16(v)) => v.write(writer, endianness),
			(Self::UInt32, Value::UInt32(v)) => v.write(writer, endianness),
			(Self::Int32, Value::Int32(v)) => v.write(writer, endianness),
			(Self::UInt64, Value::UInt64(v)) => v.write(writer, endianness),
			(Self::Int64, Value::Int64(v)) => v.write(writer, endianness),
			(Self::Float32, Value::Float32(v)) => v.write(writer, endianness),
			(Self::Float64, Value::Float64(v)) => v.write(writer, endianness),
			(Self::Vector3, Value::Vector3(v)) => v.write(writer, endianness),
			(Self::Vector4, Value::Vector4(v)) => v.write(writer, endianness),
			(Self::Quaternion, Value::Quaternion(v)) => v.write(writer, endianness),
			(Self::Color, Value::Color(v)) => v.write(writer, endianness),
			(Self::Matrix4x4, Value::Matrix4x4(v)) => v.write(writer, endianness),
			(Self::String | Self::TalkString, _) => return Err(GffError::UnsupportedOperation { op: "write", ty: self }),
			(_, other) => {
				return Err(GffError::ValueMismatch {
					field_id,
					expected: self.name(),
					got: other.kind_name(),
				});
			}
		}
		Ok(())
	}

	fn write_zero(self, writer: &mut Writer) -> Result<()> {
		if !self.is_flat() {
			return Err(GffError::UnsupportedOperation { op: "write", ty: self });
		}
		writer.write_bytes(&[0_u8; 64][..self.inline_size() as usize]);
		Ok(())
	}
}

/// Native Rust type with a fixed builtin wire layout.
pub trait Builtin: Sized {
	/// Wire type this native type maps to.
	const TYPE: BuiltinType;

	/// Read one value at the cursor.
	fn read(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Self>;

	/// Write one value at the writer position.
	fn write(&self, writer: &mut Writer, endianness: Endianness);
}

macro_rules! builtin_scalar {
	($ty:ty, $kind:ident, $read:ident, $write:ident) => {
		impl Builtin for $ty {
			const TYPE: BuiltinType = BuiltinType::$kind;

			fn read(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Self> {
				cursor.$read(endianness)
			}

			fn write(&self, writer: &mut Writer, endianness: Endianness) {
				writer.$write(*self, endianness);
			}
		}
	};
}

impl Builtin for u8 {
	const TYPE: BuiltinType = BuiltinType::UInt8;

	fn read(cursor: &mut Cursor<'_>, _endianness: Endianness) -> Result<Self> {
		cursor.read_u8()
	}

	fn write(&self, writer: &mut Writer, _endianness: Endianness) {
		writer.write_u8(*self);
	}
}

impl Builtin for i8 {
	const TYPE: BuiltinType = BuiltinType::Int8;

	fn read(cursor: &mut Cursor<'_>, _endianness: Endianness) -> Result<Self> {
		cursor.read_i8()
	}

	fn write(&self, writer: &mut Writer, _endianness: Endianness) {
		writer.write_i8(*self);
	}
}

builtin_scalar!(u16, UInt16, read_u16, write_u16);
builtin_scalar!(i16, Int16, read_i16, write_i16);
builtin_scalar!(u32, UInt32, read_u32, write_u32);
builtin_scalar!(i32, Int32, read_i32, write_i32);
builtin_scalar!(u64, UInt64, read_u64, write_u64);
builtin_scalar!(i64, Int64, read_i64, write_i64);
builtin_scalar!(f32, Float32, read_f32, write_f32);
builtin_scalar!(f64, Float64, read_f64, write_f64);

/// Three-component vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
	/// X component.
	pub x: f32,
	/// Y component.
	pub y: f32,
	/// Z component.
	pub z: f32,
}

/// Four-component vector.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector4 {
	/// X component.
	pub x: f32,
	/// Y component.
	pub y: f32,
	/// Z component.
	pub z: f32,
	/// W component.
	pub w: f32,
}

/// Rotation quaternion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quaternion {
	/// X component.
	pub x: f32,
	/// Y component.
	pub y: f32,
	/// Z component.
	pub z: f32,
	/// W component.
	pub w: f32,
}

/// Floating point RGBA color.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: f32,
	/// Green channel.
	pub g: f32,
	/// Blue channel.
	pub b: f32,
	/// Alpha channel.
	pub a: f32,
}

/// Row-major 4x4 matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Matrix4x4 {
	/// Matrix rows.
	pub rows: [[f32; 4]; 4],
}

/// Talk-table reference with an optional inline override.
///
/// `string` is tri-state on the wire: `None` is stored as the absent sentinel, `Some("")` as
/// slot value 0, and any other string as heap or string-table content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TalkString {
	/// Talk-table string id.
	pub id: u32,
	/// Optional override text.
	pub string: Option<String>,
}

impl TalkString {
	/// Create a talk string without override text.
	pub fn new(id: u32) -> Self {
		Self { id, string: None }
	}

	/// Create a talk string with override text.
	pub fn with_string(id: u32, string: impl Into<String>) -> Self {
		Self {
			id,
			string: Some(string.into()),
		}
	}
}

fn read_f32s<const N: usize>(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<[f32; N]> {
	let mut out = [0.0_f32; N];
	for slot in &mut out {
		*slot = cursor.read_f32(endianness)?;
	}
	Ok(out)
}

fn write_f32s(writer: &mut Writer, values: &[f32], endianness: Endianness) {
	for value in values {
		writer.write_f32(*value, endianness);
	}
}

impl Builtin for Vector3 {
	const TYPE: BuiltinType = BuiltinType::Vector3;

	fn read(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Self> {
		let [x, y, z] = read_f32s(cursor, endianness)?;
		Ok(Self { x, y, z })
	}

	fn write(&self, writer: &mut Writer, endianness: Endianness) {
		write_f32s(writer, &[self.x, self.y, self.z], endianness);
	}
}

impl Builtin for Vector4 {
	const TYPE: BuiltinType = BuiltinType::Vector4;

	fn read(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Self> {
		let [x, y, z, w] = read_f32s(cursor, endianness)?;
		Ok(Self { x, y, z, w })
	}

	fn write(&self, writer: &mut Writer, endianness: Endianness) {
		write_f32s(writer, &[self.x, self.y, self.z, self.w], endianness);
	}
}

impl Builtin for Quaternion {
	const TYPE: BuiltinType = BuiltinType::Quaternion;

	fn read(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Self> {
		let [x, y, z, w] = read_f32s(cursor, endianness)?;
		Ok(Self { x, y, z, w })
	}

	fn write(&self, writer: &mut Writer, endianness: Endianness) {
		write_f32s(writer, &[self.x, self.y, self.z, self.w], endianness);
	}
}

impl Builtin for Color {
	const TYPE: BuiltinType = BuiltinType::Color;

	fn read(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Self> {
		let [r, g, b, a] = read_f32s(cursor, endianness)?;
		Ok(Self { r, g, b, a })
	}

	fn write(&self, writer: &mut Writer, endianness: Endianness) {
		write_f32s(writer, &[self.r, self.g, self.b, self.a], endianness);
	}
}

impl Builtin for Matrix4x4 {
	const TYPE: BuiltinType = BuiltinType::Matrix4x4;

	fn read(cursor: &mut Cursor<'_>, endianness: Endianness) -> Result<Self> {
		let mut rows = [[0.0_f32; 4]; 4];
		for row in &mut rows {
			*row = read_f32s(cursor, endianness)?;
		}
		Ok(Self { rows })
	}

	fn write(&self, writer: &mut Writer, endianness: Endianness) {
		for row in &self.rows {
			write_f32s(writer, row, endianness);
		}
	}
}

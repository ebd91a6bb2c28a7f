//! Typed marshalling between documents and native Rust structures.
//!
//! A native structure describes itself through [`GffStruct::fields`], an ordered table of
//! `(field id, accessor)` bindings. Decoding matches schema fields to bindings by id, so the
//! wire may order fields differently from the native type and carry fields the native type
//! does not know about. Encoding walks the schema's field order, which fixes heap layout.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use crate::gff::data::{DataReader, DataWriter};
use crate::gff::decode::decode_field;
use crate::gff::encode::encode_field;
use crate::gff::{Builtin, BuiltinType, Color, FieldDefinition, FieldKind, GffError, Matrix4x4, Quaternion, Result, Schema, TalkString, Value, Vector3, Vector4};

mod derive;

pub use derive::derive_schema;

/// Native structure with an id-keyed field table.
pub trait GffStruct: Default + 'static {
	/// Four-character type tag used when deriving a schema.
	const TYPE_TAG: u32;

	/// Field bindings in declaration order.
	fn fields() -> Vec<FieldBinding<Self>>;
}

/// Native value that can occupy a field slot.
pub trait FieldData: Sized + 'static {
	/// Wire shape this native type expects.
	fn shape() -> FieldShape;

	/// Read the field described by `def` from the structure at `base`.
	fn decode(reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<Self>;

	/// Write the field described by `def` into the structure at `base`.
	fn encode(&self, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()>;
}

/// Native-side description of a field, used for schema derivation and compatibility checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldShape {
	/// Direct builtin value.
	Builtin(BuiltinType),
	/// Direct inline structure.
	Structure(StructType),
	/// Homogeneous list.
	List(Box<FieldShape>),
	/// Optional shared structure.
	Reference(StructType),
	/// Any schema field, handled by the dynamic engine.
	Dynamic,
}

impl FieldShape {
	/// Short native label for error messages.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Builtin(ty) => ty.name(),
			Self::Structure(ty) => ty.name,
			Self::List(_) => "Vec",
			Self::Reference(_) => "Option<Rc<_>>",
			Self::Dynamic => "Value",
		}
	}

	/// Whether a schema field can be marshalled through this shape.
	pub fn accepts(&self, def: &FieldDefinition) -> bool {
		let direct = !def.is_list && !def.is_reference;
		match self {
			Self::Dynamic => true,
			Self::Builtin(ty) => direct && def.kind == FieldKind::Builtin(*ty),
			Self::Structure(_) => direct && matches!(def.kind, FieldKind::Structure(_)),
			Self::Reference(_) => def.is_reference && !def.is_list && matches!(def.kind, FieldKind::Structure(_)),
			Self::List(inner) => def.is_list && !def.is_reference && inner.accepts(&def.element()),
		}
	}
}

/// Identity and layout of a native structure type.
#[derive(Debug, Clone, Copy)]
pub struct StructType {
	/// Rust type identity.
	pub type_id: TypeId,
	/// Rust type name.
	pub name: &'static str,
	/// Structure type tag.
	pub type_tag: u32,
	/// Field ids and shapes in declaration order.
	pub layout: fn() -> Vec<(i32, FieldShape)>,
}

impl StructType {
	/// Describe `S`.
	pub fn of<S: GffStruct>() -> Self {
		Self {
			type_id: TypeId::of::<S>(),
			name: std::any::type_name::<S>(),
			type_tag: S::TYPE_TAG,
			layout: layout_of::<S>,
		}
	}
}

impl PartialEq for StructType {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for StructType {}

fn layout_of<S: GffStruct>() -> Vec<(i32, FieldShape)> {
	S::fields().into_iter().map(|binding| (binding.id, binding.shape)).collect()
}

trait Accessor<S> {
	fn decode(&self, target: &mut S, reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<()>;
	fn encode(&self, source: &S, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()>;
}

struct Member<S, T> {
	get: fn(&S) -> &T,
	get_mut: fn(&mut S) -> &mut T,
}

impl<S, T: FieldData> Accessor<S> for Member<S, T> {
	fn decode(&self, target: &mut S, reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<()> {
		*(self.get_mut)(target) = T::decode(reader, def, base)?;
		Ok(())
	}

	fn encode(&self, source: &S, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()> {
		(self.get)(source).encode(writer, def, base)
	}
}

/// One `(field id, accessor)` entry of a native structure's field table.
pub struct FieldBinding<S> {
	/// Field id matched against the schema.
	pub id: i32,
	/// Native shape of the bound member.
	pub shape: FieldShape,
	access: Box<dyn Accessor<S>>,
}

impl<S: 'static> FieldBinding<S> {
	/// Bind field `id` to a member of `S` through a pair of accessors.
	pub fn new<T: FieldData>(id: i32, get: fn(&S) -> &T, get_mut: fn(&mut S) -> &mut T) -> Self {
		Self {
			id,
			shape: T::shape(),
			access: Box::new(Member { get, get_mut }),
		}
	}

	fn check(&self, def: &FieldDefinition, schema: &Schema) -> Result<()> {
		if self.shape.accepts(def) {
			return Ok(());
		}
		Err(GffError::FieldTypeMismatch {
			field_id: def.id,
			schema: def.type_label(schema),
			native: self.shape.label(),
		})
	}
}

/// Per-call memo of native field tables, keyed by native type.
#[derive(Default)]
pub struct BindingCache {
	entries: HashMap<TypeId, Rc<dyn Any>>,
}

impl BindingCache {
	/// Field table for `S`, built on first use.
	pub fn get<S: GffStruct>(&mut self) -> Rc<Vec<FieldBinding<S>>> {
		let key = TypeId::of::<S>();
		if let Some(hit) = self.entries.get(&key).and_then(|entry| Rc::clone(entry).downcast::<Vec<FieldBinding<S>>>().ok()) {
			return hit;
		}
		let bindings = Rc::new(S::fields());
		self.entries.insert(key, Rc::clone(&bindings) as Rc<dyn Any>);
		bindings
	}
}

/// Decode the structure at schema `index` and inline offset `base` into `S`.
///
/// Every binding of `S` must find a schema field with the same id; schema fields without a
/// binding are skipped.
pub fn decode_struct<S: GffStruct>(reader: &mut DataReader<'_>, index: u16, base: usize) -> Result<S> {
	reader.nested(|reader| {
		let schema = reader.schema();
		let def = schema.structure(index)?;
		let bindings = reader.bindings::<S>();

		let mut matched = Vec::with_capacity(bindings.len());
		for binding in bindings.iter() {
			let field = def.field(binding.id).ok_or(GffError::SchemaMismatch {
				type_tag: def.type_tag,
				field_id: binding.id,
			})?;
			binding.check(field, schema)?;
			matched.push((binding, field));
		}

		let mut out = S::default();
		for (binding, field) in matched {
			binding.access.decode(&mut out, reader, field, base)?;
		}
		Ok(out)
	})
}

/// Encode `value` as the structure at schema `index` into the inline region at `base`.
///
/// Fields are written in schema order. A schema field without a binding encodes as absent.
pub fn encode_struct<S: GffStruct>(writer: &mut DataWriter<'_>, index: u16, value: &S, base: usize) -> Result<()> {
	let schema = writer.schema();
	let def = schema.structure(index)?;
	let bindings = writer.bindings::<S>();

	for field in &def.fields {
		match bindings.iter().find(|binding| binding.id == field.id) {
			Some(binding) => {
				binding.check(field, schema)?;
				binding.access.encode(value, writer, field, base)?;
			}
			None => encode_field(writer, field, &Value::Null, base)?,
		}
	}
	Ok(())
}

fn field_pos(def: &FieldDefinition, base: usize) -> usize {
	base + def.inline_offset as usize
}

fn structure_index(def: &FieldDefinition) -> Result<u16> {
	match def.kind {
		FieldKind::Structure(index) => Ok(index),
		_ => Err(GffError::UnsupportedLayout {
			field_id: def.id,
			reason: "native structure bound to a non-structure field",
		}),
	}
}

macro_rules! builtin_field_data {
	($($ty:ty),* $(,)?) => {
		$(
			impl FieldData for $ty {
				fn shape() -> FieldShape {
					FieldShape::Builtin(<$ty as Builtin>::TYPE)
				}

				fn decode(reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<Self> {
					reader.read_native(field_pos(def, base))
				}

				fn encode(&self, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()> {
					writer.write_native(self, field_pos(def, base))
				}
			}
		)*
	};
}

builtin_field_data!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, Vector3, Vector4, Quaternion, Color, Matrix4x4);

impl FieldData for String {
	fn shape() -> FieldShape {
		FieldShape::Builtin(BuiltinType::String)
	}

	fn decode(reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<Self> {
		reader.read_string(field_pos(def, base))
	}

	fn encode(&self, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()> {
		writer.write_string(field_pos(def, base), self)
	}
}

impl FieldData for TalkString {
	fn shape() -> FieldShape {
		FieldShape::Builtin(BuiltinType::TalkString)
	}

	fn decode(reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<Self> {
		reader.read_talk_string(field_pos(def, base))
	}

	fn encode(&self, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()> {
		writer.write_talk_string(field_pos(def, base), self)
	}
}

/// Lists decode an absent slot as empty and always encode a (possibly empty) list.
impl<T: FieldData> FieldData for Vec<T> {
	fn shape() -> FieldShape {
		FieldShape::List(Box::new(T::shape()))
	}

	fn decode(reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<Self> {
		let element = def.element();
		let stride = element.inline_footprint(reader.schema())?;
		let Some((start, count)) = reader.read_list(field_pos(def, base), stride)? else {
			return Ok(Vec::new());
		};

		if TypeId::of::<T>() == TypeId::of::<u8>() {
			let bytes: Box<dyn Any> = Box::new(reader.cursor(start)?.read_exact(count)?.to_vec());
			if let Ok(bytes) = bytes.downcast::<Self>() {
				return Ok(*bytes);
			}
		}

		let mut items = Vec::with_capacity(count);
		for slot in 0..count {
			items.push(T::decode(reader, &element, start + slot * stride as usize)?);
		}
		Ok(items)
	}

	fn encode(&self, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()> {
		let element = def.element();
		let stride = element.inline_footprint(writer.schema())?;
		let start = writer.begin_list(field_pos(def, base), self.len(), stride)?;

		if let Some(bytes) = (self as &dyn Any).downcast_ref::<Vec<u8>>() {
			return writer.write_bytes(start, bytes);
		}

		for (slot, item) in self.iter().enumerate() {
			item.encode(writer, &element, start + slot * stride as usize)?;
		}
		Ok(())
	}
}

/// Reference fields share decoded targets through the alias cache and write each `Rc` once.
impl<S: GffStruct> FieldData for Option<Rc<S>> {
	fn shape() -> FieldShape {
		FieldShape::Reference(StructType::of::<S>())
	}

	fn decode(reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<Self> {
		let index = structure_index(def)?;
		let Some(offset) = reader.read_reference(field_pos(def, base))? else {
			return Ok(None);
		};
		let target = reader.shared::<S>(offset, |reader| decode_struct::<S>(reader, index, offset as usize))?;
		Ok(Some(target))
	}

	fn encode(&self, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()> {
		let index = structure_index(def)?;
		let pos = field_pos(def, base);
		let Some(target) = self else {
			return writer.write_sentinel(pos);
		};
		if let Some(offset) = writer.shared_offset(target) {
			return writer.write_slot(pos, offset);
		}

		let size = writer.schema().structure(index)?.inline_size;
		let region = writer.reserve(u64::from(size))?;
		writer.remember_shared(target, region);
		writer.write_slot(pos, region)?;
		encode_struct::<S>(writer, index, target, region as usize)
	}
}

/// Inline structure fields.
impl<S: GffStruct> FieldData for S {
	fn shape() -> FieldShape {
		FieldShape::Structure(StructType::of::<S>())
	}

	fn decode(reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<Self> {
		decode_struct::<S>(reader, structure_index(def)?, field_pos(def, base))
	}

	fn encode(&self, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()> {
		encode_struct::<S>(writer, structure_index(def)?, self, field_pos(def, base))
	}
}

/// Dynamic escape hatch: any schema field, including generic lists.
impl FieldData for Value {
	fn shape() -> FieldShape {
		FieldShape::Dynamic
	}

	fn decode(reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<Self> {
		decode_field(reader, def, base)
	}

	fn encode(&self, writer: &mut DataWriter<'_>, def: &FieldDefinition, base: usize) -> Result<()> {
		encode_field(writer, def, self, base)
	}
}

#[cfg(test)]
mod tests;

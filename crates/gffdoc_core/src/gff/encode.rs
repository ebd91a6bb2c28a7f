use crate::gff::data::DataWriter;
use crate::gff::schema::SENTINEL;
use crate::gff::{BuiltinType, FieldDefinition, FieldKind, GffError, Result, StructValue, TalkString, TaggedValue, Value};

/// Encode the root structure value into the data section.
///
/// `Value::Null` encodes every root field as absent.
pub fn encode_root(writer: &mut DataWriter<'_>, root: &Value) -> Result<()> {
	let fields = struct_fields(root, 0)?;
	encode_structure(writer, 0, fields, 0)
}

/// Encode the structure at schema `index` into the inline region at `base`.
///
/// Fields are written in declaration order; a field id missing from `value` encodes as
/// `Value::Null`.
pub fn encode_structure(writer: &mut DataWriter<'_>, index: u16, value: Option<&StructValue>, base: usize) -> Result<()> {
	let def = writer.schema().structure(index)?;
	for field in &def.fields {
		let field_value = value.and_then(|value| value.get(field.id)).unwrap_or(&Value::Null);
		encode_field(writer, field, field_value, base)?;
	}
	Ok(())
}

/// Encode one field of the structure whose inline region starts at `base`.
pub fn encode_field(writer: &mut DataWriter<'_>, def: &FieldDefinition, value: &Value, base: usize) -> Result<()> {
	let pos = base + def.inline_offset as usize;

	if def.is_generic_list() {
		if def.kind != FieldKind::Generic {
			return Err(GffError::UnsupportedLayout {
				field_id: def.id,
				reason: "list reference of a non-generic type",
			});
		}
		return encode_generic_list(writer, def, value, pos);
	}
	if def.is_list {
		return encode_list(writer, def, value, pos);
	}
	if def.is_reference {
		return encode_reference(writer, def, value, pos);
	}
	encode_direct(writer, def, value, pos)
}

/// Encode a value inline at `pos` (no list or reference indirection).
pub fn encode_direct(writer: &mut DataWriter<'_>, def: &FieldDefinition, value: &Value, pos: usize) -> Result<()> {
	match def.kind {
		FieldKind::Builtin(BuiltinType::String) => match value.resolve() {
			Value::Null => writer.write_sentinel(pos),
			Value::String(text) => writer.write_string(pos, text),
			other => Err(mismatch(def, "String", other)),
		},
		FieldKind::Builtin(BuiltinType::TalkString) => match value.resolve() {
			Value::Null => writer.write_talk_string(pos, &TalkString::default()),
			Value::TalkString(talk) => writer.write_talk_string(pos, talk),
			other => Err(mismatch(def, "TalkString", other)),
		},
		FieldKind::Builtin(ty) => writer.write_builtin(ty, value, pos, def.id),
		FieldKind::Structure(index) => {
			let fields = struct_fields(value, def.id)?;
			encode_structure(writer, index, fields, pos)
		}
		FieldKind::Generic => Err(GffError::UnsupportedLayout {
			field_id: def.id,
			reason: "generic value outside a list",
		}),
	}
}

fn encode_reference(writer: &mut DataWriter<'_>, def: &FieldDefinition, value: &Value, pos: usize) -> Result<()> {
	let FieldKind::Structure(index) = def.kind else {
		return Err(GffError::UnsupportedLayout {
			field_id: def.id,
			reason: "reference to a non-structure type",
		});
	};
	if value.is_null() {
		return writer.write_sentinel(pos);
	}

	let shared = match value {
		Value::Ref(target) => Some(target),
		_ => None,
	};
	if let Some(offset) = shared.and_then(|target| writer.shared_offset(target)) {
		return writer.write_slot(pos, offset);
	}

	let fields = struct_fields(value, def.id)?;
	let size = writer.schema().structure(index)?.inline_size;
	let region = writer.reserve(u64::from(size))?;
	if let Some(target) = shared {
		writer.remember_shared(target, region);
	}
	writer.write_slot(pos, region)?;
	encode_structure(writer, index, fields, region as usize)
}

fn encode_list(writer: &mut DataWriter<'_>, def: &FieldDefinition, value: &Value, pos: usize) -> Result<()> {
	let element = def.element();
	match value.resolve() {
		Value::Null => writer.write_sentinel(pos),
		Value::Bytes(bytes) if element.kind == FieldKind::Builtin(BuiltinType::UInt8) => {
			let start = writer.begin_list(pos, bytes.len(), 1)?;
			writer.write_bytes(start, bytes)
		}
		Value::List(items) => {
			let stride = element.inline_footprint(writer.schema())?;
			let start = writer.begin_list(pos, items.len(), stride)?;
			for (slot, item) in items.iter().enumerate() {
				encode_direct(writer, &element, item, start + slot * stride as usize)?;
			}
			Ok(())
		}
		other => Err(mismatch(def, "List", other)),
	}
}

fn encode_generic_list(writer: &mut DataWriter<'_>, def: &FieldDefinition, value: &Value, pos: usize) -> Result<()> {
	let items = match value.resolve() {
		Value::Null => return writer.write_sentinel(pos),
		Value::Generic(items) => items,
		other => return Err(mismatch(def, "Generic", other)),
	};

	let start = writer.begin_list(pos, items.len(), 8)?;
	for (slot, item) in items.iter().enumerate() {
		let field = FieldDefinition { id: def.id, ..item.ty.field() };
		let offset = encode_generic_element(writer, &field, item)?;
		writer.write_generic_entry(start + slot * 8, field.kind.raw_tag().0, field.raw_flags(), offset)?;
	}
	Ok(())
}

fn encode_generic_element(writer: &mut DataWriter<'_>, field: &FieldDefinition, item: &TaggedValue) -> Result<u32> {
	if field.kind == FieldKind::Generic && !field.is_generic_list() {
		return Err(GffError::UnsupportedLayout {
			field_id: field.id,
			reason: "generic value outside a list",
		});
	}
	if item.value.is_null() {
		return Ok(SENTINEL);
	}
	if let Some(offset) = writer.shared_offset(&item.value) {
		return Ok(offset);
	}

	let size = field.inline_footprint(writer.schema())?;
	let region = writer.reserve(u64::from(size))?;
	writer.remember_shared(&item.value, region);
	encode_field(writer, field, &item.value, region as usize)?;
	Ok(region)
}

fn struct_fields(value: &Value, field_id: i32) -> Result<Option<&StructValue>> {
	match value.resolve() {
		Value::Null => Ok(None),
		Value::Struct(fields) => Ok(Some(fields)),
		other => Err(GffError::ValueMismatch {
			field_id,
			expected: "Struct",
			got: other.kind_name(),
		}),
	}
}

fn mismatch(def: &FieldDefinition, expected: &'static str, got: &Value) -> GffError {
	GffError::ValueMismatch {
		field_id: def.id,
		expected,
		got: got.kind_name(),
	}
}

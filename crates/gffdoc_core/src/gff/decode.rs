use std::rc::Rc;

use crate::gff::data::DataReader;
use crate::gff::schema::SENTINEL;
use crate::gff::{BuiltinType, FieldDefinition, FieldKind, GffError, GffHeader, Result, StructValue, TaggedValue, Value, ValueType};

/// Limits and header expectations applied while decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum nesting of structures (inline, list element, or referenced).
	pub max_depth: u32,
	/// Maximum element count accepted for any single list.
	pub max_list_items: usize,
	/// Reject documents whose format type differs.
	pub expected_format_type: Option<u8>,
	/// Reject documents whose format version differs.
	pub expected_format_version: Option<u32>,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 64,
			max_list_items: 1 << 20,
			expected_format_type: None,
			expected_format_version: None,
		}
	}
}

impl DecodeOptions {
	/// Default limits plus an exact format type and version check.
	pub fn strict(format_type: u8, format_version: u32) -> Self {
		Self {
			expected_format_type: Some(format_type),
			expected_format_version: Some(format_version),
			..Self::default()
		}
	}

	/// Check the header against the expected format type and version.
	pub fn check_header(&self, header: &GffHeader) -> Result<()> {
		if let Some(expected) = self.expected_format_type.filter(|expected| *expected != header.format_type) {
			return Err(GffError::FormatTypeMismatch {
				expected,
				found: header.format_type,
			});
		}
		if let Some(expected) = self.expected_format_version.filter(|expected| *expected != header.format_version) {
			return Err(GffError::FormatVersionMismatch {
				expected,
				found: header.format_version,
			});
		}
		Ok(())
	}
}

/// Decode the root structure, whose inline region starts the data section.
pub fn decode_root(reader: &mut DataReader<'_>) -> Result<Value> {
	reader.schema().root()?;
	Ok(Value::Struct(decode_structure(reader, 0, 0)?))
}

/// Decode the structure at schema `index` whose inline region starts at `base`.
pub fn decode_structure(reader: &mut DataReader<'_>, index: u16, base: usize) -> Result<StructValue> {
	reader.nested(|reader| {
		let def = reader.schema().structure(index)?;
		let mut value = StructValue::new(def.type_tag);
		for field in &def.fields {
			let decoded = decode_field(reader, field, base)?;
			value.fields.insert(field.id, decoded);
		}
		Ok(value)
	})
}

/// Decode one field of the structure whose inline region starts at `base`.
pub fn decode_field(reader: &mut DataReader<'_>, def: &FieldDefinition, base: usize) -> Result<Value> {
	let pos = base + def.inline_offset as usize;

	if def.is_generic_list() {
		return decode_generic_list(reader, pos);
	}
	if def.is_list {
		return decode_list(reader, def, pos);
	}
	if def.is_reference {
		let Some(offset) = reader.read_reference(pos)? else {
			return Ok(Value::Null);
		};
		let element = def.element();
		let target = reader.shared::<Value>(offset, |reader| decode_direct(reader, &element, offset as usize))?;
		return Ok(Value::Ref(target));
	}
	decode_direct(reader, def, pos)
}

/// Decode a value stored inline at `pos` (no list or reference indirection).
pub fn decode_direct(reader: &mut DataReader<'_>, def: &FieldDefinition, pos: usize) -> Result<Value> {
	match def.kind {
		FieldKind::Builtin(BuiltinType::String) => Ok(Value::String(reader.read_string(pos)?)),
		FieldKind::Builtin(BuiltinType::TalkString) => Ok(Value::TalkString(reader.read_talk_string(pos)?)),
		FieldKind::Builtin(ty) => reader.read_builtin(ty, pos),
		FieldKind::Structure(index) => Ok(Value::Struct(decode_structure(reader, index, pos)?)),
		FieldKind::Generic => Err(GffError::InconsistentFieldFlags {
			field_id: def.id,
			raw: def.raw_type_and_flags(),
		}),
	}
}

fn decode_list(reader: &mut DataReader<'_>, def: &FieldDefinition, pos: usize) -> Result<Value> {
	let element = def.element();
	let stride = element.inline_footprint(reader.schema())?;
	let Some((start, count)) = reader.read_list(pos, stride)? else {
		return Ok(Value::Null);
	};

	if element.kind == FieldKind::Builtin(BuiltinType::UInt8) {
		let bytes = reader.cursor(start)?.read_exact(count)?;
		return Ok(Value::Bytes(bytes.to_vec()));
	}

	let mut items = Vec::with_capacity(count);
	for slot in 0..count {
		items.push(decode_direct(reader, &element, start + slot * stride as usize)?);
	}
	Ok(Value::List(items))
}

fn decode_generic_list(reader: &mut DataReader<'_>, pos: usize) -> Result<Value> {
	let Some((start, count)) = reader.read_list(pos, 8)? else {
		return Ok(Value::Null);
	};

	// Elements may point back into the list that holds them.
	reader.nested(|reader| {
		let endianness = reader.endianness();
		let mut items = Vec::with_capacity(count);
		for slot in 0..count {
			let mut cursor = reader.cursor(start + slot * 8)?;
			let tag = cursor.read_u16(endianness)?;
			let flags = cursor.read_u16(endianness)?;
			let offset = cursor.read_u32(endianness)?;

			let field = FieldDefinition::from_raw(0, u32::from(tag) | (u32::from(flags) << 16), 0)?;
			let ty = ValueType {
				kind: field.kind,
				is_list: field.is_list,
				is_reference: field.is_reference,
			};
			let value = if offset == SENTINEL {
				Rc::new(Value::Null)
			} else {
				reader.cursor(offset as usize)?;
				reader.shared::<Value>(offset, |reader| decode_field(reader, &field, offset as usize))?
			};
			items.push(TaggedValue { ty, value });
		}
		Ok(Value::Generic(items))
	})
}

#[cfg(test)]
mod tests;

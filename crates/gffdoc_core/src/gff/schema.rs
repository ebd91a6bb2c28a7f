use std::fmt::Write as _;

use crate::gff::bytes::{Cursor, Writer};
use crate::gff::header::TableLayout;
use crate::gff::{BuiltinType, Endianness, GffError, GffHeader, Result};

/// Field flag marking a homogeneous list.
pub const FLAG_LIST: u16 = 0x8000;
/// Field flag marking the low 16 bits as a structure index.
pub const FLAG_STRUCTURE: u16 = 0x4000;
/// Field flag marking a nullable heap-indirected value.
pub const FLAG_REFERENCE: u16 = 0x2000;
/// Reserved type tag for elements that carry their own runtime type.
pub const GENERIC_TAG: u16 = 0xFFFF;
/// Inline slot value meaning "absent".
pub const SENTINEL: u32 = 0xFFFF_FFFF;

const STRUCTURE_ENTRY_SIZE: usize = 16;
const FIELD_ENTRY_SIZE: usize = 12;
const KNOWN_FLAGS: u16 = FLAG_LIST | FLAG_STRUCTURE | FLAG_REFERENCE;

/// Static value kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
	/// Builtin wire type.
	Builtin(BuiltinType),
	/// Structure by schema index.
	Structure(u16),
	/// Elements carry their own kind; only valid on list references.
	Generic,
}

impl FieldKind {
	/// Raw 16-bit tag and the structure flag bit for this kind.
	pub fn raw_tag(self) -> (u16, u16) {
		match self {
			Self::Builtin(ty) => (ty.tag(), 0),
			Self::Structure(index) => (index, FLAG_STRUCTURE),
			Self::Generic => (GENERIC_TAG, 0),
		}
	}

	/// Resolve a raw tag and flag word into a kind.
	pub fn from_raw_tag(tag: u16, flags: u16) -> Result<Self> {
		if flags & FLAG_STRUCTURE != 0 {
			return Ok(Self::Structure(tag));
		}
		if tag == GENERIC_TAG {
			return Ok(Self::Generic);
		}
		Ok(Self::Builtin(BuiltinType::from_tag(tag)?))
	}
}

/// One field slot within a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDefinition {
	/// Field id, unique within the owning structure.
	pub id: i32,
	/// Static value kind.
	pub kind: FieldKind,
	/// Homogeneous list modifier.
	pub is_list: bool,
	/// Nullable heap-indirection modifier.
	pub is_reference: bool,
	/// Byte offset within the owning structure's inline region.
	pub inline_offset: u32,
}

impl FieldDefinition {
	/// Direct (non-list, non-reference) field at offset 0; see [`Schema::with_layout`].
	pub fn new(id: i32, kind: FieldKind) -> Self {
		Self {
			id,
			kind,
			is_list: false,
			is_reference: false,
			inline_offset: 0,
		}
	}

	/// Direct builtin field.
	pub fn builtin(id: i32, ty: BuiltinType) -> Self {
		Self::new(id, FieldKind::Builtin(ty))
	}

	/// Direct inline structure field.
	pub fn structure(id: i32, index: u16) -> Self {
		Self::new(id, FieldKind::Structure(index))
	}

	/// Heterogeneous list field.
	pub fn generic_list(id: i32) -> Self {
		Self::new(id, FieldKind::Generic).list().reference()
	}

	/// Set the list modifier.
	pub fn list(mut self) -> Self {
		self.is_list = true;
		self
	}

	/// Set the reference modifier.
	pub fn reference(mut self) -> Self {
		self.is_reference = true;
		self
	}

	/// Whether this is a heterogeneous list (list and reference together).
	pub fn is_generic_list(&self) -> bool {
		self.is_list && self.is_reference
	}

	/// Whether the inline region holds a heap slot rather than the value itself.
	pub fn is_indirect(&self) -> bool {
		self.is_list || self.is_reference || self.kind == FieldKind::Builtin(BuiltinType::String)
	}

	/// Same kind as a direct value at offset 0, used for list elements and reference targets.
	pub fn element(&self) -> Self {
		Self {
			is_list: false,
			is_reference: false,
			inline_offset: 0,
			..*self
		}
	}

	/// Decode a field table entry.
	pub fn from_raw(id: i32, type_and_flags: u32, inline_offset: u32) -> Result<Self> {
		let tag = (type_and_flags & 0xFFFF) as u16;
		let flags = (type_and_flags >> 16) as u16;
		let inconsistent = GffError::InconsistentFieldFlags {
			field_id: id,
			raw: type_and_flags,
		};

		if flags & !KNOWN_FLAGS != 0 || (flags & FLAG_STRUCTURE != 0 && tag == GENERIC_TAG) {
			return Err(inconsistent);
		}
		let kind = FieldKind::from_raw_tag(tag, flags)?;
		let is_list = flags & FLAG_LIST != 0;
		let is_reference = flags & FLAG_REFERENCE != 0;
		if kind == FieldKind::Generic && !(is_list && is_reference) {
			return Err(inconsistent);
		}

		Ok(Self {
			id,
			kind,
			is_list,
			is_reference,
			inline_offset,
		})
	}

	/// Flag word (upper half of `type_and_flags`).
	pub fn raw_flags(&self) -> u16 {
		let (_, structure) = self.kind.raw_tag();
		let mut flags = structure;
		if self.is_list {
			flags |= FLAG_LIST;
		}
		if self.is_reference {
			flags |= FLAG_REFERENCE;
		}
		flags
	}

	/// Encode the `type_and_flags` word.
	pub fn raw_type_and_flags(&self) -> u32 {
		let (tag, _) = self.kind.raw_tag();
		u32::from(tag) | (u32::from(self.raw_flags()) << 16)
	}

	/// Bytes this field occupies in its owning structure's inline region.
	pub fn inline_footprint(&self, schema: &Schema) -> Result<u32> {
		if self.is_list || self.is_reference {
			return Ok(4);
		}
		match self.kind {
			FieldKind::Builtin(ty) => Ok(ty.inline_size()),
			FieldKind::Structure(index) => Ok(schema.structure(index)?.inline_size),
			FieldKind::Generic => Ok(4),
		}
	}

	/// Render the field type as used in schema listings (`[T]` list, `*T` reference).
	pub fn type_label(&self, schema: &Schema) -> String {
		let base = match self.kind {
			FieldKind::Builtin(ty) => ty.name().to_owned(),
			FieldKind::Structure(index) => match schema.structures.get(usize::from(index)) {
				Some(def) => format!("{}#{index}", def.tag_code()),
				None => format!("#{index}"),
			},
			FieldKind::Generic => "Generic".to_owned(),
		};
		let base = if self.is_list { format!("[{base}]") } else { base };
		if self.is_reference { format!("*{base}") } else { base }
	}
}

/// Fixed-layout record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureDefinition {
	/// Four-character type tag.
	pub type_tag: u32,
	/// Fields in wire order.
	pub fields: Vec<FieldDefinition>,
	/// Total inline region size.
	pub inline_size: u32,
}

impl StructureDefinition {
	/// Structure with unresolved layout; see [`Schema::with_layout`].
	pub fn new(type_tag: u32, fields: Vec<FieldDefinition>) -> Self {
		Self {
			type_tag,
			fields,
			inline_size: 0,
		}
	}

	/// Look up a field by id.
	pub fn field(&self, id: i32) -> Option<&FieldDefinition> {
		self.fields.iter().find(|field| field.id == id)
	}

	/// Type tag rendered as its four-character code, or hex when not printable.
	pub fn tag_code(&self) -> String {
		tag_code(self.type_tag)
	}
}

/// Render a structure type tag as a four-character code.
pub fn tag_code(type_tag: u32) -> String {
	let bytes = type_tag.to_be_bytes();
	if bytes.iter().all(|byte| byte.is_ascii_graphic() || *byte == b' ') && bytes[0] != b' ' {
		String::from_utf8_lossy(&bytes).trim_end().to_owned()
	} else {
		format!("0x{type_tag:08X}")
	}
}

/// Pack a four-character code into a structure type tag.
pub const fn fourcc(code: &[u8; 4]) -> u32 {
	u32::from_be_bytes(*code)
}

/// Ordered structure table; index 0 is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
	/// Structure definitions in index order.
	pub structures: Vec<StructureDefinition>,
}

impl Schema {
	/// Wrap structures whose offsets and sizes are already final.
	pub fn new(structures: Vec<StructureDefinition>) -> Self {
		Self { structures }
	}

	/// Build a schema, computing every inline offset and size from declaration order.
	///
	/// Inline (direct) structure fields contribute their target's full inline size, so the
	/// targets are sized first. A structure that inlines itself, directly or through other
	/// structures, cannot be laid out and is rejected.
	pub fn with_layout(structures: Vec<StructureDefinition>) -> Result<Self> {
		let mut schema = Self { structures };
		schema.validate()?;

		let mut state = vec![LayoutState::Pending; schema.structures.len()];
		for index in 0..schema.structures.len() {
			schema.layout_structure(index, &mut state)?;
		}
		Ok(schema)
	}

	/// Number of structures.
	pub fn len(&self) -> usize {
		self.structures.len()
	}

	/// Whether the schema declares no structures.
	pub fn is_empty(&self) -> bool {
		self.structures.is_empty()
	}

	/// Root structure (index 0).
	pub fn root(&self) -> Result<&StructureDefinition> {
		self.structures.first().ok_or(GffError::EmptySchema)
	}

	/// Structure by index.
	pub fn structure(&self, index: u16) -> Result<&StructureDefinition> {
		self.structures.get(usize::from(index)).ok_or(GffError::StructureIndexOutOfRange {
			index: u32::from(index),
			count: self.structures.len(),
		})
	}

	/// Total number of fields across all structures.
	pub fn field_count(&self) -> usize {
		self.structures.iter().map(|def| def.fields.len()).sum()
	}

	/// Check that every structure reference resolves.
	pub fn validate(&self) -> Result<()> {
		for def in &self.structures {
			for field in &def.fields {
				if let FieldKind::Structure(index) = field.kind {
					self.structure(index)?;
				}
			}
		}
		Ok(())
	}

	/// Render the structure table as readable declarations.
	pub fn render(&self) -> String {
		let mut out = String::new();
		for (index, def) in self.structures.iter().enumerate() {
			let root = if index == 0 { " (root)" } else { "" };
			let _ = writeln!(out, "struct #{index} {}{root} size={}", def.tag_code(), def.inline_size);
			for field in &def.fields {
				let _ = writeln!(out, "\t{}: {} @{}", field.id, field.type_label(self), field.inline_offset);
			}
		}
		out
	}

	/// Read the structure and field tables that follow the header.
	pub(crate) fn parse(bytes: &[u8], header: &GffHeader, layout: &TableLayout) -> Result<Self> {
		let endianness = header.endianness;
		let count = layout.structure_count as usize;
		let mut cursor = Cursor::at(bytes, header.size())?;
		let mut structures = Vec::with_capacity(count.min(cursor.remaining() / STRUCTURE_ENTRY_SIZE));

		for _ in 0..count {
			let type_tag = cursor.read_u32(Endianness::Big)?;
			let field_count = cursor.read_u32(endianness)? as usize;
			let field_table_offset = cursor.read_u32(endianness)? as usize;
			let inline_size = cursor.read_u32(endianness)?;

			let mut field_cursor = Cursor::at(bytes, field_table_offset)?;
			let mut fields = Vec::with_capacity(field_count.min(field_cursor.remaining() / FIELD_ENTRY_SIZE));
			for _ in 0..field_count {
				let id = field_cursor.read_i32(endianness)?;
				let type_and_flags = field_cursor.read_u32(endianness)?;
				let inline_offset = field_cursor.read_u32(endianness)?;
				fields.push(FieldDefinition::from_raw(id, type_and_flags, inline_offset)?);
			}

			structures.push(StructureDefinition {
				type_tag,
				fields,
				inline_size,
			});
		}

		let schema = Self { structures };
		schema.validate()?;
		log::debug!("parsed schema: {} structures, {} fields", schema.len(), schema.field_count());
		Ok(schema)
	}

	/// Byte size of the structure and field tables.
	pub(crate) fn tables_size(&self) -> usize {
		self.len() * STRUCTURE_ENTRY_SIZE + self.field_count() * FIELD_ENTRY_SIZE
	}

	/// Write the structure table then the concatenated field tables at `start`.
	pub(crate) fn write_tables(&self, writer: &mut Writer, start: usize, endianness: Endianness) -> Result<()> {
		let fields_offset = start + self.len() * STRUCTURE_ENTRY_SIZE;
		writer.grow_to(start);
		writer.seek(start)?;

		let mut running = 0_usize;
		for def in &self.structures {
			writer.write_u32(def.type_tag, Endianness::Big);
			writer.write_u32(def.fields.len() as u32, endianness);
			writer.write_u32((fields_offset + running * FIELD_ENTRY_SIZE) as u32, endianness);
			writer.write_u32(def.inline_size, endianness);
			running += def.fields.len();
		}

		for def in &self.structures {
			for field in &def.fields {
				writer.write_i32(field.id, endianness);
				writer.write_u32(field.raw_type_and_flags(), endianness);
				writer.write_u32(field.inline_offset, endianness);
			}
		}
		Ok(())
	}

	fn layout_structure(&mut self, index: usize, state: &mut [LayoutState]) -> Result<u32> {
		if state[index] == LayoutState::Done {
			return Ok(self.structures[index].inline_size);
		}
		state[index] = LayoutState::Active;

		let mut offset = 0_u32;
		for slot in 0..self.structures[index].fields.len() {
			let field = self.structures[index].fields[slot];
			let footprint = match field.kind {
				FieldKind::Structure(target) if !field.is_list && !field.is_reference => {
					let target = usize::from(target);
					if state[target] == LayoutState::Active {
						return Err(GffError::UnsupportedLayout {
							field_id: field.id,
							reason: "structure inlines itself",
						});
					}
					self.layout_structure(target, state)?
				}
				_ => field.inline_footprint(self)?,
			};
			self.structures[index].fields[slot].inline_offset = offset;
			offset = offset.checked_add(footprint).ok_or(GffError::UnsupportedLayout {
				field_id: field.id,
				reason: "inline region exceeds 32 bits",
			})?;
		}

		self.structures[index].inline_size = offset;
		state[index] = LayoutState::Done;
		Ok(offset)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutState {
	Pending,
	Active,
	Done,
}

#[cfg(test)]
mod tests;

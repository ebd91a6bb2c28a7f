use std::collections::HashMap;
use std::rc::Rc;

use crate::gff::bytes::{Cursor, Writer};
use crate::gff::heap::{AliasCache, HeapAllocator, SharedOffsets};
use crate::gff::schema::SENTINEL;
use crate::gff::typed::{BindingCache, FieldBinding, GffStruct};
use crate::gff::{Builtin, BuiltinType, DecodeOptions, Endianness, FileVersion, GffError, GffHeader, Result, Schema, TalkString, Value};

/// Read access to one document's data section.
///
/// Owns the alias cache and recursion depth for a single top-level decode; both the dynamic
/// and the typed engine read through it.
pub struct DataReader<'a> {
	data: &'a [u8],
	endianness: Endianness,
	version: FileVersion,
	strings: &'a [String],
	schema: &'a Schema,
	options: &'a DecodeOptions,
	aliases: AliasCache,
	bindings: BindingCache,
	depth: u32,
}

impl<'a> DataReader<'a> {
	/// Reader over `data` described by `schema`.
	pub fn new(data: &'a [u8], header: &GffHeader, strings: &'a [String], schema: &'a Schema, options: &'a DecodeOptions) -> Self {
		Self {
			data,
			endianness: header.endianness,
			version: header.version,
			strings,
			schema,
			options,
			aliases: AliasCache::new(),
			bindings: BindingCache::default(),
			depth: 0,
		}
	}

	/// Schema driving this decode.
	pub fn schema(&self) -> &'a Schema {
		self.schema
	}

	/// Document byte order.
	pub fn endianness(&self) -> Endianness {
		self.endianness
	}

	/// Cursor at an absolute data-section position.
	pub fn cursor(&self, pos: usize) -> Result<Cursor<'a>> {
		if pos > self.data.len() {
			return Err(GffError::HeapOffsetOutOfRange {
				offset: u32::try_from(pos).unwrap_or(u32::MAX),
				len: self.data.len(),
			});
		}
		Cursor::at(self.data, pos)
	}

	/// Read the 4-byte slot stored at `pos`.
	pub fn read_slot(&self, pos: usize) -> Result<u32> {
		self.cursor(pos)?.read_u32(self.endianness)
	}

	/// Read a flat builtin value at `pos`.
	pub fn read_builtin(&self, ty: BuiltinType, pos: usize) -> Result<Value> {
		ty.read(&mut self.cursor(pos)?, self.endianness)
	}

	/// Read a native builtin at `pos`.
	pub fn read_native<T: Builtin>(&self, pos: usize) -> Result<T> {
		T::read(&mut self.cursor(pos)?, self.endianness)
	}

	/// Read the string whose slot is stored at `pos`; an absent slot reads as empty.
	pub fn read_string(&self, pos: usize) -> Result<String> {
		let slot = self.read_slot(pos)?;
		self.resolve_string(slot)
	}

	/// Read a talk string (`id` then string slot) at `pos`.
	pub fn read_talk_string(&self, pos: usize) -> Result<TalkString> {
		let mut cursor = self.cursor(pos)?;
		let id = cursor.read_u32(self.endianness)?;
		let slot = cursor.read_u32(self.endianness)?;
		let string = match slot {
			SENTINEL => None,
			0 => Some(String::new()),
			slot => Some(self.resolve_string(slot)?),
		};
		Ok(TalkString { id, string })
	}

	/// Resolve a string slot: a heap offset for `V4.0`, a string table index for `V4.1`.
	pub fn resolve_string(&self, slot: u32) -> Result<String> {
		if slot == SENTINEL {
			return Ok(String::new());
		}

		match self.version {
			FileVersion::V4_0 => {
				let mut cursor = self.heap_cursor(slot)?;
				let units = cursor.read_u32(self.endianness)? as usize;
				if units > cursor.remaining() / 2 {
					return Err(GffError::HeapOffsetOutOfRange {
						offset: slot,
						len: self.data.len(),
					});
				}
				cursor.read_utf16(units, self.endianness)
			}
			FileVersion::V4_1 => self.strings.get(slot as usize).cloned().ok_or(GffError::StringIndexOutOfRange {
				index: slot,
				count: self.strings.len(),
			}),
		}
	}

	/// Read the list slot at `pos`; returns the first element position and element count.
	///
	/// `None` means the slot holds the absent sentinel. The count is checked against the
	/// configured limit and, for elements with a non-zero stride, against the bytes left in the
	/// data section.
	pub fn read_list(&self, pos: usize, stride: u32) -> Result<Option<(usize, usize)>> {
		let slot = self.read_slot(pos)?;
		if slot == SENTINEL {
			return Ok(None);
		}

		let mut cursor = self.heap_cursor(slot)?;
		let count = cursor.read_u32(self.endianness)? as usize;
		if count > self.options.max_list_items {
			return Err(GffError::ListTooLarge {
				count,
				max: self.options.max_list_items,
			});
		}
		// Zero-size elements occupy no heap bytes, so only the item limit applies.
		if stride > 0 {
			let fits = cursor.remaining() / stride as usize;
			if count > fits {
				return Err(GffError::ListTooLarge { count, max: fits });
			}
		}
		Ok(Some((cursor.pos(), count)))
	}

	/// Read the reference slot at `pos`; `None` means absent.
	///
	/// A target at the very end of the data section is accepted, since a structure with no
	/// fields occupies zero bytes.
	pub fn read_reference(&self, pos: usize) -> Result<Option<u32>> {
		let slot = self.read_slot(pos)?;
		if slot == SENTINEL {
			return Ok(None);
		}
		self.cursor(slot as usize)?;
		Ok(Some(slot))
	}

	/// Return the value already decoded as `T` at `offset`, or decode and remember it.
	pub fn shared<T: 'static>(&mut self, offset: u32, decode: impl FnOnce(&mut Self) -> Result<T>) -> Result<Rc<T>> {
		if let Some(hit) = self.aliases.get::<T>(offset) {
			log::trace!("alias cache hit at heap offset {offset}");
			return Ok(hit);
		}
		let value = Rc::new(decode(self)?);
		self.aliases.insert(offset, Rc::clone(&value));
		Ok(value)
	}

	/// Field table of the native type `S`, built once per decode.
	pub fn bindings<S: GffStruct>(&mut self) -> Rc<Vec<FieldBinding<S>>> {
		self.bindings.get::<S>()
	}

	/// Run `f` one structure level deeper, enforcing the configured depth limit.
	pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
		if self.depth >= self.options.max_depth {
			return Err(GffError::DecodeDepthExceeded {
				max_depth: self.options.max_depth,
			});
		}
		self.depth += 1;
		let out = f(self);
		self.depth -= 1;
		out
	}

	fn heap_cursor(&self, offset: u32) -> Result<Cursor<'a>> {
		let pos = offset as usize;
		if pos >= self.data.len() {
			return Err(GffError::HeapOffsetOutOfRange { offset, len: self.data.len() });
		}
		Cursor::at(self.data, pos)
	}
}

/// Deduplicating string table built during a `V4.1` encode.
#[derive(Debug, Default)]
struct StringTable {
	entries: Vec<String>,
	index: HashMap<String, u32>,
}

impl StringTable {
	fn intern(&mut self, text: &str) -> u32 {
		if let Some(index) = self.index.get(text) {
			return *index;
		}
		let index = self.entries.len() as u32;
		self.entries.push(text.to_owned());
		self.index.insert(text.to_owned(), index);
		index
	}
}

/// Write access to a data section under construction.
///
/// Heap regions come from a [`HeapAllocator`] that starts after the root structure's inline
/// bytes. Every region is zero-filled as soon as it is reserved, so nested writes may seek
/// anywhere inside already reserved space.
pub struct DataWriter<'s> {
	out: Writer,
	heap: HeapAllocator,
	endianness: Endianness,
	version: FileVersion,
	schema: &'s Schema,
	strings: StringTable,
	shared: SharedOffsets,
	bindings: BindingCache,
}

impl<'s> DataWriter<'s> {
	/// Writer for a document described by `schema`, with the root inline region reserved.
	pub fn new(schema: &'s Schema, header: &GffHeader) -> Result<Self> {
		let root_size = schema.root()?.inline_size;
		let mut out = Writer::new();
		out.grow_to(root_size as usize);

		let mut strings = StringTable::default();
		if header.version.has_string_table() {
			strings.intern("");
		}

		Ok(Self {
			out,
			heap: HeapAllocator::new(root_size),
			endianness: header.endianness,
			version: header.version,
			schema,
			strings,
			shared: SharedOffsets::new(),
			bindings: BindingCache::default(),
		})
	}

	/// Schema driving this encode.
	pub fn schema(&self) -> &'s Schema {
		self.schema
	}

	/// Document byte order.
	pub fn endianness(&self) -> Endianness {
		self.endianness
	}

	/// Reserve a zero-filled heap region of `len` bytes.
	pub fn reserve(&mut self, len: u64) -> Result<u32> {
		let at = self.heap.reserve(len)?;
		self.out.grow_to(self.heap.next_offset() as usize);
		Ok(at)
	}

	/// Write a 4-byte slot at `pos`.
	pub fn write_slot(&mut self, pos: usize, value: u32) -> Result<()> {
		self.out.seek(pos)?;
		self.out.write_u32(value, self.endianness);
		Ok(())
	}

	/// Write the absent sentinel at `pos`.
	pub fn write_sentinel(&mut self, pos: usize) -> Result<()> {
		self.write_slot(pos, SENTINEL)
	}

	/// Write a flat builtin value at `pos`.
	pub fn write_builtin(&mut self, ty: BuiltinType, value: &Value, pos: usize, field_id: i32) -> Result<()> {
		self.out.seek(pos)?;
		ty.write(value, &mut self.out, self.endianness, field_id)
	}

	/// Write a native builtin at `pos`.
	pub fn write_native<T: Builtin>(&mut self, value: &T, pos: usize) -> Result<()> {
		self.out.seek(pos)?;
		value.write(&mut self.out, self.endianness);
		Ok(())
	}

	/// Write raw bytes at `pos` (already reserved).
	pub fn write_bytes(&mut self, pos: usize, bytes: &[u8]) -> Result<()> {
		self.out.seek(pos)?;
		self.out.write_bytes(bytes);
		Ok(())
	}

	/// Write one generic list entry (type tag, flags, heap offset) at `pos`.
	pub fn write_generic_entry(&mut self, pos: usize, tag: u16, flags: u16, offset: u32) -> Result<()> {
		self.out.seek(pos)?;
		self.out.write_u16(tag, self.endianness);
		self.out.write_u16(flags, self.endianness);
		self.out.write_u32(offset, self.endianness);
		Ok(())
	}

	/// Store `text` and write its slot at `pos`; an empty string writes the absent sentinel.
	pub fn write_string(&mut self, pos: usize, text: &str) -> Result<()> {
		if text.is_empty() {
			return self.write_sentinel(pos);
		}
		let slot = self.store_string(text)?;
		self.write_slot(pos, slot)
	}

	/// Write a talk string (`id` then string slot) at `pos`.
	pub fn write_talk_string(&mut self, pos: usize, talk: &TalkString) -> Result<()> {
		let slot = match talk.string.as_deref() {
			None => SENTINEL,
			Some("") => 0,
			Some(text) => self.store_string(text)?,
		};
		self.out.seek(pos)?;
		self.out.write_u32(talk.id, self.endianness);
		self.out.write_u32(slot, self.endianness);
		Ok(())
	}

	/// Reserve a list of `count` elements of `stride` bytes, point the slot at `pos` to it,
	/// and return the position of the first element.
	pub fn begin_list(&mut self, pos: usize, count: usize, stride: u32) -> Result<usize> {
		let region = self.reserve(4 + count as u64 * u64::from(stride))?;
		self.write_slot(pos, region)?;
		self.write_slot(region as usize, count as u32)?;
		Ok(region as usize + 4)
	}

	/// Heap offset already assigned to a shared allocation.
	pub fn shared_offset<T: 'static>(&self, value: &Rc<T>) -> Option<u32> {
		self.shared.get(value)
	}

	/// Remember the heap offset a shared allocation was written at.
	pub fn remember_shared<T: 'static>(&mut self, value: &Rc<T>, offset: u32) {
		self.shared.insert(value, offset);
	}

	/// Field table of the native type `S`, built once per encode.
	pub fn bindings<S: GffStruct>(&mut self) -> Rc<Vec<FieldBinding<S>>> {
		self.bindings.get::<S>()
	}

	/// Finish the encode and return the data section and string table.
	pub fn finish(self) -> (Vec<u8>, Vec<String>) {
		log::debug!("encoded data section: {} bytes, {} strings", self.out.len(), self.strings.entries.len());
		(self.out.into_bytes(), self.strings.entries)
	}

	fn store_string(&mut self, text: &str) -> Result<u32> {
		match self.version {
			FileVersion::V4_0 => {
				let mut units: Vec<u16> = text.encode_utf16().collect();
				units.push(0);
				let region = self.reserve(4 + 2 * units.len() as u64)?;
				self.out.seek(region as usize)?;
				self.out.write_u32(units.len() as u32, self.endianness);
				self.out.write_utf16(&units, self.endianness);
				Ok(region)
			}
			FileVersion::V4_1 => Ok(self.strings.intern(text)),
		}
	}
}

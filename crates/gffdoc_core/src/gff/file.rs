use std::fs;
use std::path::Path;

use crate::gff::bytes::{Cursor, Writer};
use crate::gff::data::{DataReader, DataWriter};
use crate::gff::decode::decode_root;
use crate::gff::encode::encode_root;
use crate::gff::header::TableLayout;
use crate::gff::typed::{GffStruct, decode_struct, derive_schema, encode_struct};
use crate::gff::{DecodeOptions, GffError, GffHeader, Result, Schema, Value};

const DATA_ALIGNMENT: usize = 16;

/// Parsed GFF container: header, schema, string table, and raw data section.
///
/// The data section stays undecoded until a caller asks for the dynamic tree or a native
/// structure, so one parse can serve both engines.
#[derive(Debug, Clone, PartialEq)]
pub struct GffFile {
	/// Document header.
	pub header: GffHeader,
	/// Structure table.
	pub schema: Schema,
	/// `V4.1` string table; always empty for `V4.0`.
	pub strings: Vec<String>,
	data: Vec<u8>,
}

impl GffFile {
	/// Parse a complete document held in memory.
	pub fn parse(bytes: &[u8], options: &DecodeOptions) -> Result<Self> {
		let (header, layout) = GffHeader::parse(bytes)?;
		options.check_header(&header)?;
		let schema = Schema::parse(bytes, &header, &layout)?;

		let strings = if header.version.has_string_table() {
			read_string_table(bytes, &layout)?
		} else {
			Vec::new()
		};

		let data = bytes[layout.data_offset as usize..].to_vec();
		log::debug!(
			"parsed {} {} document: {} structures, {} strings, {} data bytes",
			header.version.as_str(),
			header.endianness.as_str(),
			schema.len(),
			strings.len(),
			data.len()
		);

		Ok(Self {
			header,
			schema,
			strings,
			data,
		})
	}

	/// Read and parse a document from disk.
	pub fn open(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<Self> {
		let bytes = fs::read(path)?;
		Self::parse(&bytes, options)
	}

	/// Raw data section.
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Reader over the data section for custom decode passes.
	pub fn reader<'a>(&'a self, options: &'a DecodeOptions) -> DataReader<'a> {
		DataReader::new(&self.data, &self.header, &self.strings, &self.schema, options)
	}

	/// Decode the root structure into a dynamic value tree.
	pub fn root_value(&self, options: &DecodeOptions) -> Result<Value> {
		decode_root(&mut self.reader(options))
	}

	/// Decode the root structure into the native type `S`.
	pub fn to_native<S: GffStruct>(&self, options: &DecodeOptions) -> Result<S> {
		self.schema.root()?;
		decode_struct::<S>(&mut self.reader(options), 0, 0)
	}

	/// Build a document by encoding a dynamic root value against `schema`.
	pub fn from_value(header: GffHeader, schema: Schema, root: &Value) -> Result<Self> {
		let mut writer = DataWriter::new(&schema, &header)?;
		encode_root(&mut writer, root)?;
		let (data, strings) = writer.finish();
		Ok(Self {
			header,
			schema,
			strings,
			data,
		})
	}

	/// Build a document from a native root, deriving the schema from its type.
	pub fn from_native<S: GffStruct>(header: GffHeader, root: &S) -> Result<Self> {
		let schema = derive_schema::<S>()?;
		Self::from_native_with_schema(header, schema, root)
	}

	/// Build a document from a native root using an explicit schema.
	pub fn from_native_with_schema<S: GffStruct>(header: GffHeader, schema: Schema, root: &S) -> Result<Self> {
		let mut writer = DataWriter::new(&schema, &header)?;
		encode_struct::<S>(&mut writer, 0, root, 0)?;
		let (data, strings) = writer.finish();
		Ok(Self {
			header,
			schema,
			strings,
			data,
		})
	}

	/// Serialize the container.
	///
	/// Layout: header, structure table, field tables, string table (`V4.1`), then the data
	/// section at the next 16-byte boundary.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let header_size = self.header.size();
		let tables_end = header_size + self.schema.tables_size();
		let has_strings = self.header.version.has_string_table();

		let strings_size: usize = if has_strings { self.strings.iter().map(|text| text.len() + 1).sum() } else { 0 };
		let data_offset = (tables_end + strings_size).next_multiple_of(DATA_ALIGNMENT);

		let layout = TableLayout {
			structure_count: to_u32(self.schema.len())?,
			string_count: if has_strings { to_u32(self.strings.len())? } else { 0 },
			string_table_offset: if has_strings { to_u32(tables_end)? } else { 0 },
			data_offset: to_u32(data_offset)?,
		};
		to_u32(data_offset + self.data.len())?;

		let mut writer = Writer::new();
		self.header.write(&mut writer, &layout);
		self.schema.write_tables(&mut writer, header_size, self.header.endianness)?;
		if has_strings {
			writer.seek(tables_end)?;
			for text in &self.strings {
				writer.write_cstring(text);
			}
		}
		writer.grow_to(data_offset);
		writer.seek(data_offset)?;
		writer.write_bytes(&self.data);
		Ok(writer.into_bytes())
	}

	/// Serialize the container to disk.
	pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
		fs::write(path, self.to_bytes()?)?;
		Ok(())
	}
}

/// Fully decoded dynamic document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
	/// Document header.
	pub header: GffHeader,
	/// Structure table.
	pub schema: Schema,
	/// Root structure value.
	pub root: Value,
}

/// Decode a document into a dynamic value tree.
pub fn decode(bytes: &[u8], options: &DecodeOptions) -> Result<Document> {
	let file = GffFile::parse(bytes, options)?;
	let root = file.root_value(options)?;
	Ok(Document {
		header: file.header,
		schema: file.schema,
		root,
	})
}

/// Encode a dynamic document.
pub fn encode(document: &Document) -> Result<Vec<u8>> {
	GffFile::from_value(document.header, document.schema.clone(), &document.root)?.to_bytes()
}

/// Decode a document's root into the native type `S`.
pub fn decode_native<S: GffStruct>(bytes: &[u8], options: &DecodeOptions) -> Result<S> {
	GffFile::parse(bytes, options)?.to_native(options)
}

/// Encode a native root with a schema derived from its type.
pub fn encode_native<S: GffStruct>(header: GffHeader, root: &S) -> Result<Vec<u8>> {
	GffFile::from_native(header, root)?.to_bytes()
}

fn read_string_table(bytes: &[u8], layout: &TableLayout) -> Result<Vec<String>> {
	let mut cursor = Cursor::at(bytes, layout.string_table_offset as usize)?;
	let count = layout.string_count as usize;
	let mut strings = Vec::with_capacity(count.min(cursor.remaining()));
	for index in 0..count {
		let raw = cursor.read_cstring_bytes()?;
		let text = std::str::from_utf8(raw).map_err(|_| GffError::InvalidString { index })?;
		strings.push(text.to_owned());
	}
	Ok(strings)
}

fn to_u32(value: usize) -> Result<u32> {
	u32::try_from(value).map_err(|_| GffError::InvalidHeader {
		reason: "document exceeds 4 GiB",
	})
}

#[cfg(test)]
mod tests;

use crate::gff::bytes::{Cursor, Writer};
use crate::gff::{GffError, Result};

/// Byte order of a document's counts, tables, and data section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Endianness {
	/// Little-endian layout (platform byte `0`).
	#[default]
	Little,
	/// Big-endian layout (platform byte `1`).
	Big,
}

impl Endianness {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Little => "little",
			Self::Big => "big",
		}
	}

	/// Resolve the header platform byte.
	pub fn from_platform(platform: u8) -> Result<Self> {
		match platform {
			0 => Ok(Self::Little),
			1 => Ok(Self::Big),
			_ => Err(GffError::UnsupportedPlatform { platform }),
		}
	}

	/// Header platform byte for this byte order.
	pub fn platform(self) -> u8 {
		match self {
			Self::Little => 0,
			Self::Big => 1,
		}
	}
}

/// Supported minor revisions of the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FileVersion {
	/// `V4.0`: strings are stored inline on the heap as UTF-16.
	#[default]
	V4_0,
	/// `V4.1`: strings live in a shared UTF-8 string table.
	V4_1,
}

impl FileVersion {
	/// Resolve the four-byte version tag.
	pub fn from_code4(code: [u8; 4]) -> Result<Self> {
		match &code {
			b"V4.0" => Ok(Self::V4_0),
			b"V4.1" => Ok(Self::V4_1),
			_ => Err(GffError::UnsupportedVersion { version: code }),
		}
	}

	/// Four-byte version tag.
	pub fn code4(self) -> [u8; 4] {
		match self {
			Self::V4_0 => *b"V4.0",
			Self::V4_1 => *b"V4.1",
		}
	}

	/// Stable label such as `V4.1`.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::V4_0 => "V4.0",
			Self::V4_1 => "V4.1",
		}
	}

	/// Whether this revision carries a string table.
	pub fn has_string_table(self) -> bool {
		matches!(self, Self::V4_1)
	}
}

/// Document-level settings carried in the fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GffHeader {
	/// Minor container revision.
	pub version: FileVersion,
	/// Byte order of everything after the fixed prefix.
	pub endianness: Endianness,
	/// Caller-defined format type tag.
	pub format_type: u8,
	/// Caller-defined format version.
	pub format_version: u32,
}

/// Table counts and offsets read from or written to the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLayout {
	/// Number of structure definitions.
	pub structure_count: u32,
	/// Number of string table entries (`V4.1` only).
	pub string_count: u32,
	/// Absolute offset of the string table (`V4.1` only).
	pub string_table_offset: u32,
	/// Absolute offset of the data section.
	pub data_offset: u32,
}

impl GffHeader {
	/// Leading magic.
	pub const MAGIC: [u8; 4] = *b"GFF ";
	/// Header size for `V4.0`.
	pub const V4_0_SIZE: usize = 22;
	/// Header size for `V4.1`.
	pub const V4_1_SIZE: usize = 30;

	/// Header for a `V4.0` little-endian document.
	pub fn new(format_type: u8, format_version: u32) -> Self {
		Self {
			version: FileVersion::V4_0,
			endianness: Endianness::Little,
			format_type,
			format_version,
		}
	}

	/// Replace the container revision.
	pub fn with_version(mut self, version: FileVersion) -> Self {
		self.version = version;
		self
	}

	/// Replace the byte order.
	pub fn with_endianness(mut self, endianness: Endianness) -> Self {
		self.endianness = endianness;
		self
	}

	/// Encoded header size in bytes.
	pub fn size(self) -> usize {
		match self.version {
			FileVersion::V4_0 => Self::V4_0_SIZE,
			FileVersion::V4_1 => Self::V4_1_SIZE,
		}
	}

	/// Parse the fixed header and table layout from the beginning of `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<(Self, TableLayout)> {
		let mut cursor = Cursor::new(bytes);
		let magic = cursor.read_code4()?;
		if magic != Self::MAGIC {
			return Err(GffError::BadMagic { magic });
		}

		let version = FileVersion::from_code4(cursor.read_code4()?)?;
		let endianness = Endianness::from_platform(cursor.read_u8()?)?;
		let format_type = cursor.read_u8()?;
		let format_version = cursor.read_u32(Endianness::Big)?;

		let structure_count = cursor.read_u32(endianness)?;
		let (string_count, string_table_offset) = if version.has_string_table() {
			(cursor.read_u32(endianness)?, cursor.read_u32(endianness)?)
		} else {
			(0, 0)
		};
		let data_offset = cursor.read_u32(endianness)?;

		let header = Self {
			version,
			endianness,
			format_type,
			format_version,
		};
		let layout = TableLayout {
			structure_count,
			string_count,
			string_table_offset,
			data_offset,
		};
		layout.validate(header, bytes.len())?;
		Ok((header, layout))
	}

	/// Write the fixed header and table layout at the writer position.
	pub fn write(self, writer: &mut Writer, layout: &TableLayout) {
		writer.write_bytes(&Self::MAGIC);
		writer.write_bytes(&self.version.code4());
		writer.write_u8(self.endianness.platform());
		writer.write_u8(self.format_type);
		writer.write_u32(self.format_version, Endianness::Big);
		writer.write_u32(layout.structure_count, self.endianness);
		if self.version.has_string_table() {
			writer.write_u32(layout.string_count, self.endianness);
			writer.write_u32(layout.string_table_offset, self.endianness);
		}
		writer.write_u32(layout.data_offset, self.endianness);
	}
}

impl TableLayout {
	fn validate(&self, header: GffHeader, len: usize) -> Result<()> {
		let data_offset = self.data_offset as usize;
		if data_offset < header.size() {
			return Err(GffError::InvalidHeader {
				reason: "data section overlaps header",
			});
		}
		if data_offset > len {
			return Err(GffError::InvalidHeader {
				reason: "data section starts past end of input",
			});
		}
		if header.version.has_string_table() && self.string_table_offset > self.data_offset {
			return Err(GffError::InvalidHeader {
				reason: "string table starts after data section",
			});
		}
		Ok(())
	}
}

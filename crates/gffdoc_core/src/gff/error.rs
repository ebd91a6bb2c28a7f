use thiserror::Error;

use crate::gff::BuiltinType;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, GffError>;

/// Coarse failure class for a [`GffError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
	/// Short read, seek out of bounds, or filesystem failure.
	Io,
	/// The document header or schema tables are malformed.
	Format,
	/// An offset, index, or count inside the document points outside its region.
	CorruptData,
	/// The native type or value tree does not agree with the schema.
	SchemaMismatch,
	/// Schema derivation produced more than 65535 structures.
	SchemaTooLarge,
	/// A field combination the engines do not implement.
	UnsupportedLayout,
	/// An operation a builtin type does not support.
	UnsupportedOperation,
}

/// Errors produced while reading, writing, and marshalling GFF documents.
#[derive(Debug, Error)]
pub enum GffError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Seek target lies past the end of the buffer.
	#[error("seek out of range: pos={pos}, len={len}")]
	SeekOutOfRange {
		/// Requested absolute position.
		pos: usize,
		/// Buffer length.
		len: usize,
	},
	/// Leading magic is not `GFF `.
	#[error("bad magic {magic:?} (expected \"GFF \")")]
	BadMagic {
		/// First four bytes of the stream.
		magic: [u8; 4],
	},
	/// Version tag is neither `V4.0` nor `V4.1`.
	#[error("unsupported version {version:?}")]
	UnsupportedVersion {
		/// Raw version tag bytes.
		version: [u8; 4],
	},
	/// Platform byte is not a known byte order.
	#[error("unsupported platform {platform}")]
	UnsupportedPlatform {
		/// Raw platform byte.
		platform: u8,
	},
	/// Header format type did not match the caller's expectation.
	#[error("format type mismatch: expected {expected}, found {found}")]
	FormatTypeMismatch {
		/// Caller-supplied format type.
		expected: u8,
		/// Format type stored in the header.
		found: u8,
	},
	/// Header format version did not match the caller's expectation.
	#[error("format version mismatch: expected 0x{expected:08x}, found 0x{found:08x}")]
	FormatVersionMismatch {
		/// Caller-supplied format version.
		expected: u32,
		/// Format version stored in the header.
		found: u32,
	},
	/// Header table offsets are inconsistent.
	#[error("invalid header: {reason}")]
	InvalidHeader {
		/// What was wrong with the header.
		reason: &'static str,
	},
	/// Document declares no structures, so there is no root.
	#[error("schema declares no structures")]
	EmptySchema,
	/// Builtin type tag outside the closed type table.
	#[error("unknown builtin type tag {tag}")]
	UnknownType {
		/// Raw 16-bit type tag.
		tag: u16,
	},
	/// Field flags contradict the field's type tag.
	#[error("inconsistent field flags on field {field_id}: type_and_flags=0x{raw:08x}")]
	InconsistentFieldFlags {
		/// Field id as stored.
		field_id: i32,
		/// Raw `type_and_flags` word.
		raw: u32,
	},
	/// Heap offset lies outside the data section.
	#[error("heap offset out of range: offset={offset}, heap_len={len}")]
	HeapOffsetOutOfRange {
		/// Offending heap offset.
		offset: u32,
		/// Data section length.
		len: usize,
	},
	/// String table index lies outside the string table.
	#[error("string index out of range: index={index}, count={count}")]
	StringIndexOutOfRange {
		/// Offending string index.
		index: u32,
		/// String table length.
		count: usize,
	},
	/// String table entry is not valid UTF-8.
	#[error("string table entry {index} is not valid utf-8")]
	InvalidString {
		/// Position within the string table.
		index: usize,
	},
	/// Structure index lies outside the schema.
	#[error("structure index out of range: index={index}, count={count}")]
	StructureIndexOutOfRange {
		/// Offending structure index.
		index: u32,
		/// Number of structures in the schema.
		count: usize,
	},
	/// A list count read from the heap is implausible.
	#[error("list too large: count={count}, max={max}")]
	ListTooLarge {
		/// Declared element count.
		count: usize,
		/// Largest count that fits the options or the heap.
		max: usize,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Native type needs a field the schema does not declare.
	#[error("schema mismatch: structure 0x{type_tag:08x} has no field {field_id}")]
	SchemaMismatch {
		/// Type tag of the structure being decoded.
		type_tag: u32,
		/// Field id required by the native type.
		field_id: i32,
	},
	/// Native field type cannot hold the schema field's kind.
	#[error("field {field_id} type mismatch: schema has {schema}, native expects {native}")]
	FieldTypeMismatch {
		/// Field id being marshalled.
		field_id: i32,
		/// Rendered schema field type.
		schema: String,
		/// Native shape label.
		native: &'static str,
	},
	/// Value tree node has the wrong shape for its schema field.
	#[error("field {field_id} value mismatch: expected {expected}, got {got}")]
	ValueMismatch {
		/// Field id being encoded.
		field_id: i32,
		/// Expected value kind.
		expected: &'static str,
		/// Actual value kind.
		got: &'static str,
	},
	/// Schema derivation reached more structures than a 16-bit index can address.
	#[error("schema too large: {count} structures (max 65535)")]
	SchemaTooLarge {
		/// Number of distinct structures discovered.
		count: usize,
	},
	/// Field combination not implemented by the engines.
	#[error("unsupported layout for field {field_id}: {reason}")]
	UnsupportedLayout {
		/// Field id involved.
		field_id: i32,
		/// Which combination was rejected.
		reason: &'static str,
	},
	/// Encoded heap no longer fits 32-bit offsets.
	#[error("heap too large: need {need} bytes past offset {at}")]
	HeapTooLarge {
		/// Current heap cursor.
		at: u32,
		/// Requested reservation.
		need: u64,
	},
	/// Builtin table cannot perform the requested operation for this type.
	#[error("unsupported {op} for builtin {ty:?}")]
	UnsupportedOperation {
		/// Operation name.
		op: &'static str,
		/// Builtin type involved.
		ty: BuiltinType,
	},
}

impl GffError {
	/// Return the error's category in the codec's failure taxonomy.
	pub fn category(&self) -> ErrorCategory {
		match self {
			Self::Io(_) | Self::UnexpectedEof { .. } | Self::SeekOutOfRange { .. } => ErrorCategory::Io,
			Self::BadMagic { .. }
			| Self::UnsupportedVersion { .. }
			| Self::UnsupportedPlatform { .. }
			| Self::FormatTypeMismatch { .. }
			| Self::FormatVersionMismatch { .. }
			| Self::InvalidHeader { .. }
			| Self::EmptySchema
			| Self::UnknownType { .. }
			| Self::InconsistentFieldFlags { .. } => ErrorCategory::Format,
			Self::HeapOffsetOutOfRange { .. }
			| Self::StringIndexOutOfRange { .. }
			| Self::InvalidString { .. }
			| Self::StructureIndexOutOfRange { .. }
			| Self::ListTooLarge { .. }
			| Self::DecodeDepthExceeded { .. } => ErrorCategory::CorruptData,
			Self::SchemaMismatch { .. } | Self::FieldTypeMismatch { .. } | Self::ValueMismatch { .. } => ErrorCategory::SchemaMismatch,
			Self::SchemaTooLarge { .. } => ErrorCategory::SchemaTooLarge,
			Self::UnsupportedLayout { .. } | Self::HeapTooLarge { .. } => ErrorCategory::UnsupportedLayout,
			Self::UnsupportedOperation { .. } => ErrorCategory::UnsupportedOperation,
		}
	}
}

//! Shared test helpers for workspace crates.

use std::path::Path;
use std::process::Command;
use std::rc::Rc;

use gffdoc::gff::{
	BuiltinType, Color, Document, FieldBinding, FieldDefinition, FieldKind, GffHeader, GffStruct, Matrix4x4, Quaternion, Schema, StructValue, StructureDefinition, TaggedValue,
	TalkString, Value, ValueType, Vector3, Vector4, encode, fourcc,
};

/// Type tag of the sample root structure.
pub const ROOT_TAG: u32 = fourcc(b"ROOT");
/// Type tag of the sample list and reference element structure.
pub const ITEM_TAG: u32 = fourcc(b"ITEM");
/// Type tag of the sample inline structure.
pub const VERT_TAG: u32 = fourcc(b"VERT");

/// Run a binary and parse its stdout as JSON, failing the test on a non-zero exit.
pub fn run_json(bin: impl AsRef<Path>, args: &[&str]) -> serde_json::Value {
	let output = Command::new(bin.as_ref()).args(args).output().expect("command executes");
	assert!(
		output.status.success(),
		"command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

/// Schema exercising every field shape: all builtins, lists of builtins, bytes and strings,
/// an inline structure, structure lists, two references, and a generic list.
pub fn sample_schema() -> Schema {
	Schema::with_layout(vec![
		StructureDefinition::new(
			ROOT_TAG,
			vec![
				FieldDefinition::builtin(1, BuiltinType::UInt8),
				FieldDefinition::builtin(2, BuiltinType::Int8),
				FieldDefinition::builtin(3, BuiltinType::UInt16),
				FieldDefinition::builtin(4, BuiltinType::Int16),
				FieldDefinition::builtin(5, BuiltinType::UInt32),
				FieldDefinition::builtin(6, BuiltinType::Int32),
				FieldDefinition::builtin(7, BuiltinType::UInt64),
				FieldDefinition::builtin(8, BuiltinType::Int64),
				FieldDefinition::builtin(9, BuiltinType::Float32),
				FieldDefinition::builtin(10, BuiltinType::Float64),
				FieldDefinition::builtin(11, BuiltinType::Vector3),
				FieldDefinition::builtin(12, BuiltinType::Vector4),
				FieldDefinition::builtin(13, BuiltinType::Quaternion),
				FieldDefinition::builtin(14, BuiltinType::Color),
				FieldDefinition::builtin(15, BuiltinType::Matrix4x4),
				FieldDefinition::builtin(16, BuiltinType::String),
				FieldDefinition::builtin(17, BuiltinType::TalkString),
				FieldDefinition::builtin(20, BuiltinType::Int32).list(),
				FieldDefinition::builtin(21, BuiltinType::UInt8).list(),
				FieldDefinition::builtin(22, BuiltinType::String).list(),
				FieldDefinition::structure(23, 1).list(),
				FieldDefinition::structure(24, 2),
				FieldDefinition::structure(25, 1).reference(),
				FieldDefinition::structure(26, 1).reference(),
				FieldDefinition::generic_list(27),
			],
		),
		StructureDefinition::new(
			ITEM_TAG,
			vec![FieldDefinition::builtin(100, BuiltinType::UInt32), FieldDefinition::builtin(101, BuiltinType::String)],
		),
		StructureDefinition::new(
			VERT_TAG,
			vec![FieldDefinition::builtin(200, BuiltinType::Vector3), FieldDefinition::builtin(201, BuiltinType::Float32)],
		),
	])
	.expect("sample schema lays out")
}

/// `ITEM` structure value.
pub fn item(id: u32, label: &str) -> StructValue {
	StructValue::new(ITEM_TAG).with(100, id).with(101, label)
}

/// Fully populated root value matching [`sample_schema`]; fields 25 and 26 share one target.
pub fn sample_root() -> Value {
	let shared = Rc::new(Value::Struct(item(7, "shared")));
	let generic = vec![
		TaggedValue::new(ValueType::new(FieldKind::Builtin(BuiltinType::Int32)), -40_i32),
		TaggedValue::new(ValueType::new(FieldKind::Builtin(BuiltinType::String)), "generic text"),
		TaggedValue::new(ValueType::new(FieldKind::Structure(1)), item(8, "generic item")),
		TaggedValue::new(ValueType::list_of(FieldKind::Builtin(BuiltinType::UInt16)), Value::list([1_u16, 2, 3])),
	];

	let mut matrix = Matrix4x4::default();
	for (row, values) in matrix.rows.iter_mut().enumerate() {
		values[row] = 1.0;
	}
	matrix.rows[3][0] = 10.0;

	Value::Struct(
		StructValue::new(ROOT_TAG)
			.with(1, 0xAB_u8)
			.with(2, -7_i8)
			.with(3, 0xBEEF_u16)
			.with(4, -1234_i16)
			.with(5, 0xDEAD_BEEF_u32)
			.with(6, -123_456_i32)
			.with(7, 0x0123_4567_89AB_CDEF_u64)
			.with(8, -9_876_543_210_i64)
			.with(9, 1.25_f32)
			.with(10, -0.5_f64)
			.with(11, Vector3 { x: 1.0, y: 2.0, z: 3.0 })
			.with(12, Vector4 { x: 4.0, y: 5.0, z: 6.0, w: 7.0 })
			.with(13, Quaternion { x: 0.0, y: 0.0, z: 0.0, w: 1.0 })
			.with(14, Color { r: 0.25, g: 0.5, b: 0.75, a: 1.0 })
			.with(15, matrix)
			.with(16, "root name")
			.with(17, TalkString::with_string(1001, "talk override"))
			.with(20, Value::list([3_i32, -1, 4]))
			.with(21, vec![0_u8, 1, 254, 255])
			.with(22, Value::list(["alpha", "", "gamma"]))
			.with(23, Value::list([item(1, "first"), item(2, "second")]))
			.with(24, StructValue::new(VERT_TAG).with(200, Vector3 { x: -1.0, y: 0.5, z: 2.0 }).with(201, 9.5_f32))
			.with(25, Rc::clone(&shared))
			.with(26, shared)
			.with(27, generic),
	)
}

/// Sample document with the given header.
pub fn sample_document(header: GffHeader) -> Document {
	Document {
		header,
		schema: sample_schema(),
		root: sample_root(),
	}
}

/// Encoded sample document.
pub fn sample_bytes(header: GffHeader) -> Vec<u8> {
	encode(&sample_document(header)).expect("sample document encodes")
}

/// Raw header fields, written without validation for malformed-input tests.
#[derive(Debug, Clone)]
pub struct RawHeader {
	/// Leading magic.
	pub magic: [u8; 4],
	/// Version tag; `V4.1` adds the string table fields.
	pub version: [u8; 4],
	/// Platform byte; 1 selects big-endian counts.
	pub platform: u8,
	/// Format type.
	pub format_type: u8,
	/// Format version (big-endian).
	pub format_version: u32,
	/// Structure count.
	pub structure_count: u32,
	/// String count (`V4.1`).
	pub string_count: u32,
	/// String table offset (`V4.1`).
	pub string_table_offset: u32,
	/// Data section offset.
	pub data_offset: u32,
}

impl RawHeader {
	/// Empty little-endian `V4.0` header whose data section starts right after it.
	pub fn v4_0() -> Self {
		Self {
			magic: *b"GFF ",
			version: *b"V4.0",
			platform: 0,
			format_type: 0,
			format_version: 0,
			structure_count: 0,
			string_count: 0,
			string_table_offset: 0,
			data_offset: GffHeader::V4_0_SIZE as u32,
		}
	}

	/// Empty little-endian `V4.1` header whose data section starts right after it.
	pub fn v4_1() -> Self {
		Self {
			version: *b"V4.1",
			string_table_offset: GffHeader::V4_1_SIZE as u32,
			data_offset: GffHeader::V4_1_SIZE as u32,
			..Self::v4_0()
		}
	}

	/// Serialize the header bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		let word = |value: u32| if self.platform == 1 { value.to_be_bytes() } else { value.to_le_bytes() };

		let mut out = Vec::with_capacity(GffHeader::V4_1_SIZE);
		out.extend_from_slice(&self.magic);
		out.extend_from_slice(&self.version);
		out.push(self.platform);
		out.push(self.format_type);
		out.extend_from_slice(&self.format_version.to_be_bytes());
		out.extend_from_slice(&word(self.structure_count));
		if &self.version == b"V4.1" {
			out.extend_from_slice(&word(self.string_count));
			out.extend_from_slice(&word(self.string_table_offset));
		}
		out.extend_from_slice(&word(self.data_offset));
		out
	}
}

/// Typed counterpart of the `ITEM` structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleItem {
	/// Field 100.
	pub id: u32,
	/// Field 101.
	pub label: String,
}

impl GffStruct for SampleItem {
	const TYPE_TAG: u32 = ITEM_TAG;

	fn fields() -> Vec<FieldBinding<Self>> {
		vec![
			FieldBinding::new(100, |s: &Self| &s.id, |s: &mut Self| &mut s.id),
			FieldBinding::new(101, |s: &Self| &s.label, |s: &mut Self| &mut s.label),
		]
	}
}

/// Typed root structure covering every derivable field shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleDoc {
	/// Field 1.
	pub flags: u8,
	/// Field 2.
	pub count: u32,
	/// Field 3.
	pub scale: f32,
	/// Field 4.
	pub position: Vector3,
	/// Field 5.
	pub name: String,
	/// Field 6.
	pub title: TalkString,
	/// Field 7.
	pub values: Vec<i32>,
	/// Field 8.
	pub blob: Vec<u8>,
	/// Field 9.
	pub tags: Vec<String>,
	/// Field 10.
	pub items: Vec<SampleItem>,
	/// Field 11.
	pub primary: Option<Rc<SampleItem>>,
	/// Field 12.
	pub secondary: Option<Rc<SampleItem>>,
}

impl GffStruct for SampleDoc {
	const TYPE_TAG: u32 = fourcc(b"SDOC");

	fn fields() -> Vec<FieldBinding<Self>> {
		vec![
			FieldBinding::new(1, |s: &Self| &s.flags, |s: &mut Self| &mut s.flags),
			FieldBinding::new(2, |s: &Self| &s.count, |s: &mut Self| &mut s.count),
			FieldBinding::new(3, |s: &Self| &s.scale, |s: &mut Self| &mut s.scale),
			FieldBinding::new(4, |s: &Self| &s.position, |s: &mut Self| &mut s.position),
			FieldBinding::new(5, |s: &Self| &s.name, |s: &mut Self| &mut s.name),
			FieldBinding::new(6, |s: &Self| &s.title, |s: &mut Self| &mut s.title),
			FieldBinding::new(7, |s: &Self| &s.values, |s: &mut Self| &mut s.values),
			FieldBinding::new(8, |s: &Self| &s.blob, |s: &mut Self| &mut s.blob),
			FieldBinding::new(9, |s: &Self| &s.tags, |s: &mut Self| &mut s.tags),
			FieldBinding::new(10, |s: &Self| &s.items, |s: &mut Self| &mut s.items),
			FieldBinding::new(11, |s: &Self| &s.primary, |s: &mut Self| &mut s.primary),
			FieldBinding::new(12, |s: &Self| &s.secondary, |s: &mut Self| &mut s.secondary),
		]
	}
}

/// Populated typed sample whose two references share one target.
pub fn sample_doc() -> SampleDoc {
	let shared = Rc::new(SampleItem {
		id: 42,
		label: String::from("shared"),
	});
	SampleDoc {
		flags: 0x81,
		count: 3,
		scale: 0.75,
		position: Vector3 { x: 1.0, y: -2.0, z: 0.5 },
		name: String::from("typed"),
		title: TalkString::new(55),
		values: vec![10, -20, 30],
		blob: vec![9, 8, 7],
		tags: vec![String::from("one"), String::from("two")],
		items: vec![
			SampleItem {
				id: 1,
				label: String::from("a"),
			},
			SampleItem {
				id: 2,
				label: String::from("b"),
			},
		],
		primary: Some(Rc::clone(&shared)),
		secondary: Some(shared),
	}
}

/// Dynamic tree the dynamic engine produces for an encoded [`sample_doc`].
pub fn sample_doc_value() -> Value {
	let shared = Rc::new(Value::Struct(item(42, "shared")));
	Value::Struct(
		StructValue::new(SampleDoc::TYPE_TAG)
			.with(1, 0x81_u8)
			.with(2, 3_u32)
			.with(3, 0.75_f32)
			.with(4, Vector3 { x: 1.0, y: -2.0, z: 0.5 })
			.with(5, "typed")
			.with(6, TalkString::new(55))
			.with(7, Value::list([10_i32, -20, 30]))
			.with(8, vec![9_u8, 8, 7])
			.with(9, Value::list(["one", "two"]))
			.with(10, Value::list([item(1, "a"), item(2, "b")]))
			.with(11, Rc::clone(&shared))
			.with(12, shared),
	)
}

#![allow(missing_docs)]

use gffdoc::gff::{
	BuiltinType, DecodeOptions, Document, ErrorCategory, FieldDefinition, GffError, GffFile, GffHeader, Schema, StructValue, StructureDefinition, Value, decode, encode,
};
use gffdoc_testkit::{RawHeader, sample_bytes};

fn single_field(field: FieldDefinition) -> Schema {
	Schema::with_layout(vec![StructureDefinition::new(0, vec![field])]).expect("layout")
}

#[test]
fn int32_root_field_reads_and_rewrites_four_bytes() {
	let mut bytes = RawHeader {
		structure_count: 1,
		data_offset: 64,
		..RawHeader::v4_0()
	}
	.to_bytes();
	for word in [0_u32, 1, 38, 4] {
		let word = if bytes.len() == GffHeader::V4_0_SIZE { word.to_be_bytes() } else { word.to_le_bytes() };
		bytes.extend_from_slice(&word);
	}
	bytes.extend_from_slice(&100_i32.to_le_bytes());
	bytes.extend_from_slice(&5_u32.to_le_bytes());
	bytes.extend_from_slice(&0_u32.to_le_bytes());
	bytes.resize(64, 0);
	bytes.extend_from_slice(&[42, 0, 0, 0]);

	let file = GffFile::parse(&bytes, &DecodeOptions::default()).expect("parses");
	let root = file.root_value(&DecodeOptions::default()).expect("decodes");
	assert_eq!(root, Value::Struct(StructValue::new(0).with(100, 42_i32)));

	let rebuilt = GffFile::from_value(file.header, file.schema.clone(), &root).expect("encodes");
	assert_eq!(rebuilt.data(), &[42, 0, 0, 0]);
	assert_eq!(rebuilt.to_bytes().expect("serializes"), bytes);
}

#[test]
fn int32_list_is_count_prefixed_on_the_heap() {
	let schema = single_field(FieldDefinition::builtin(200, BuiltinType::Int32).list());
	let root = Value::Struct(StructValue::new(0).with(200, Value::list([7_i32, 9])));
	let file = GffFile::from_value(GffHeader::new(0, 0), schema, &root).expect("encodes");

	let expected: Vec<u8> = [4_u32, 2, 7, 9].iter().flat_map(|word| word.to_le_bytes()).collect();
	assert_eq!(file.data(), expected.as_slice());
	assert_eq!(file.root_value(&DecodeOptions::default()).expect("decodes"), root);
}

#[test]
fn absent_reference_is_the_sentinel_slot() {
	let schema = Schema::with_layout(vec![
		StructureDefinition::new(0, vec![FieldDefinition::structure(300, 1).reference()]),
		StructureDefinition::new(1, vec![FieldDefinition::builtin(301, BuiltinType::Int32)]),
	])
	.expect("layout");
	let file = GffFile::from_value(GffHeader::new(0, 0), schema, &Value::Struct(StructValue::new(0))).expect("encodes");

	assert_eq!(file.data(), &[0xFF, 0xFF, 0xFF, 0xFF]);
	let root = file.root_value(&DecodeOptions::default()).expect("decodes");
	assert_eq!(root.get(300), Some(&Value::Null));
}

#[test]
fn bad_magic_is_a_format_error() {
	let mut bytes = sample_bytes(GffHeader::new(0, 0));
	bytes[..4].copy_from_slice(b"XXXX");

	let err = decode(&bytes, &DecodeOptions::default()).expect_err("bad magic");
	assert!(matches!(err, GffError::BadMagic { magic } if &magic == b"XXXX"));
	assert_eq!(err.category(), ErrorCategory::Format);
}

#[test]
fn document_interface_round_trips() {
	let schema = single_field(FieldDefinition::builtin(1, BuiltinType::String));
	let document = Document {
		header: GffHeader::new(9, 1),
		schema,
		root: Value::Struct(StructValue::new(0).with(1, "payload")),
	};
	let bytes = encode(&document).expect("encodes");
	let decoded = decode(&bytes, &DecodeOptions::strict(9, 1)).expect("decodes");
	assert_eq!(decoded, document);
}

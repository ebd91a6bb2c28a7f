use std::rc::Rc;

use crate::gff::data::DataReader;
use crate::gff::schema::{FLAG_STRUCTURE, SENTINEL};
use crate::gff::{BuiltinType, DecodeOptions, FieldDefinition, FieldKind, GffError, GffHeader, Schema, StructureDefinition, Value, decode_root};

fn words(values: &[u32]) -> Vec<u8> {
	values.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn entry(tag: u16, flags: u16, offset: u32) -> Vec<u8> {
	let mut out = tag.to_le_bytes().to_vec();
	out.extend_from_slice(&flags.to_le_bytes());
	out.extend_from_slice(&offset.to_le_bytes());
	out
}

fn decode(schema: &Schema, data: &[u8], options: &DecodeOptions) -> crate::gff::Result<Value> {
	let header = GffHeader::new(0, 0);
	let mut reader = DataReader::new(data, &header, &[], schema, options);
	decode_root(&mut reader)
}

fn indirect_schema() -> Schema {
	Schema::with_layout(vec![
		StructureDefinition::new(
			0,
			vec![
				FieldDefinition::builtin(1, BuiltinType::UInt8).list(),
				FieldDefinition::structure(2, 1).reference(),
				FieldDefinition::structure(3, 1).reference(),
				FieldDefinition::builtin(4, BuiltinType::Int32).list(),
			],
		),
		StructureDefinition::new(1, vec![FieldDefinition::builtin(10, BuiltinType::UInt16)]),
	])
	.expect("layout")
}

#[test]
fn lists_and_references_resolve_through_the_heap() {
	let mut data = words(&[16, 24, 24, SENTINEL, 3]);
	data.extend_from_slice(&[7, 8, 9, 0]);
	data.extend_from_slice(&0x1234_u16.to_le_bytes());

	let root = decode(&indirect_schema(), &data, &DecodeOptions::default()).expect("decodes");
	assert_eq!(root.get(1).and_then(Value::as_bytes), Some(&[7_u8, 8, 9][..]));
	assert_eq!(root.get(2).and_then(|target| target.get(10)).and_then(Value::as_u16), Some(0x1234));
	assert!(root.get(4).expect("present").is_null());

	let (Some(Value::Ref(first)), Some(Value::Ref(second))) = (root.get(2), root.get(3)) else {
		panic!("reference fields decode as shared values");
	};
	assert!(Rc::ptr_eq(first, second), "one heap offset decodes to one allocation");
}

#[test]
fn generic_entries_carry_their_own_type() {
	let schema = Schema::with_layout(vec![
		StructureDefinition::new(0, vec![FieldDefinition::generic_list(1)]),
		StructureDefinition::new(1, vec![FieldDefinition::builtin(10, BuiltinType::UInt8)]),
	])
	.expect("layout");

	let int32 = BuiltinType::Int32.tag();
	let mut data = words(&[4, 4]);
	data.extend(entry(int32, 0, 40));
	data.extend(entry(int32, 0, 40));
	data.extend(entry(int32, 0, SENTINEL));
	data.extend(entry(1, FLAG_STRUCTURE, 44));
	data.extend_from_slice(&(-5_i32).to_le_bytes());
	data.push(200);

	let root = decode(&schema, &data, &DecodeOptions::default()).expect("decodes");
	let items = root.get(1).and_then(Value::as_generic).expect("generic list");
	assert_eq!(items.len(), 4);
	assert_eq!(items[0].ty.kind, FieldKind::Builtin(BuiltinType::Int32));
	assert_eq!(items[0].value.as_i32(), Some(-5));
	assert!(Rc::ptr_eq(&items[0].value, &items[1].value));
	assert!(items[2].value.is_null());
	assert_eq!(items[3].ty.kind, FieldKind::Structure(1));
	assert_eq!(items[3].value.get(10).and_then(Value::as_u8), Some(200));
}

#[test]
fn self_reference_cycle_hits_depth_limit() {
	let schema = Schema::with_layout(vec![StructureDefinition::new(0, vec![FieldDefinition::structure(1, 0).reference()])]).expect("layout");
	let data = words(&[0]);
	let options = DecodeOptions {
		max_depth: 8,
		..DecodeOptions::default()
	};

	let err = decode(&schema, &data, &options).expect_err("cycle");
	assert!(matches!(err, GffError::DecodeDepthExceeded { max_depth: 8 }));
}

#[test]
fn generic_list_pointing_at_itself_hits_depth_limit() {
	let schema = Schema::with_layout(vec![StructureDefinition::new(0, vec![FieldDefinition::generic_list(1)])]).expect("layout");
	let mut data = words(&[4, 1]);
	data.extend(entry(0xFFFF, 0xA000, 16));
	data.extend(words(&[4]));
	let options = DecodeOptions {
		max_depth: 8,
		..DecodeOptions::default()
	};

	let err = decode(&schema, &data, &options).expect_err("cycle");
	assert!(matches!(err, GffError::DecodeDepthExceeded { max_depth: 8 }));
}

#[test]
fn short_data_section_is_an_error_not_a_panic() {
	let err = decode(&indirect_schema(), &words(&[16]), &DecodeOptions::default()).expect_err("truncated");
	assert!(matches!(err, GffError::UnexpectedEof { .. } | GffError::HeapOffsetOutOfRange { .. }));
}

#[test]
fn empty_schema_has_no_root() {
	let err = decode(&Schema::default(), &[], &DecodeOptions::default()).expect_err("no root");
	assert!(matches!(err, GffError::EmptySchema));
}

#[test]
fn strict_options_check_format_type_and_version() {
	let options = DecodeOptions::strict(3, 7);
	options.check_header(&GffHeader::new(3, 7)).expect("matches");

	let err = options.check_header(&GffHeader::new(4, 7)).expect_err("format type");
	assert!(matches!(err, GffError::FormatTypeMismatch { expected: 3, found: 4 }));

	let err = options.check_header(&GffHeader::new(3, 8)).expect_err("format version");
	assert!(matches!(err, GffError::FormatVersionMismatch { expected: 7, found: 8 }));
}

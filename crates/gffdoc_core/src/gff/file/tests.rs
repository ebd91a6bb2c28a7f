use crate::gff::{
	BuiltinType, DecodeOptions, Document, Endianness, ErrorCategory, FieldDefinition, FileVersion, GffError, GffFile, GffHeader, Schema, StructValue, StructureDefinition, TalkString, Value,
	decode, encode, fourcc,
};

fn schema() -> Schema {
	Schema::with_layout(vec![
		StructureDefinition::new(
			fourcc(b"DOC "),
			vec![
				FieldDefinition::builtin(1, BuiltinType::UInt32),
				FieldDefinition::builtin(2, BuiltinType::String),
				FieldDefinition::builtin(3, BuiltinType::TalkString),
				FieldDefinition::structure(4, 1).list(),
			],
		),
		StructureDefinition::new(fourcc(b"ITEM"), vec![FieldDefinition::builtin(10, BuiltinType::String)]),
	])
	.expect("layout")
}

fn root() -> Value {
	let items = Value::list([StructValue::new(fourcc(b"ITEM")).with(10, "alpha"), StructValue::new(fourcc(b"ITEM")).with(10, "beta")]);
	Value::Struct(
		StructValue::new(fourcc(b"DOC "))
			.with(1, 0xDEAD_BEEF_u32)
			.with(2, "alpha")
			.with(3, TalkString::with_string(12, "talk"))
			.with(4, items),
	)
}

fn document(header: GffHeader) -> Document {
	Document {
		header,
		schema: schema(),
		root: root(),
	}
}

#[test]
fn v0_document_round_trips_byte_for_byte() {
	let bytes = encode(&document(GffHeader::new(7, 3))).expect("encodes");
	assert_eq!(&bytes[..8], b"GFF V4.0");

	let decoded = decode(&bytes, &DecodeOptions::default()).expect("decodes");
	assert_eq!(decoded, document(GffHeader::new(7, 3)));
	assert_eq!(encode(&decoded).expect("re-encodes"), bytes);
}

#[test]
fn data_section_is_sixteen_byte_aligned() {
	let bytes = encode(&document(GffHeader::new(0, 0))).expect("encodes");
	let (_, layout) = GffHeader::parse(&bytes).expect("header");
	assert_eq!(layout.data_offset % 16, 0);
	assert_eq!(layout.structure_count, 2);
	assert!(bytes[GffHeader::V4_0_SIZE + 2 * 16 + 5 * 12..layout.data_offset as usize].iter().all(|byte| *byte == 0));
}

#[test]
fn v1_strings_live_in_the_string_table() {
	let header = GffHeader::new(0, 0).with_version(FileVersion::V4_1);
	let file = GffFile::from_value(header, schema(), &root()).expect("encodes");
	assert_eq!(file.strings, vec!["", "alpha", "talk", "beta"]);

	let bytes = file.to_bytes().expect("serializes");
	let (_, layout) = GffHeader::parse(&bytes).expect("header");
	assert_eq!(layout.string_count, 4);
	let table = layout.string_table_offset as usize;
	assert_eq!(&bytes[table..table + 12], b"\0alpha\0talk\0");

	let parsed = GffFile::parse(&bytes, &DecodeOptions::default()).expect("parses");
	assert_eq!(parsed, file);
	assert_eq!(parsed.root_value(&DecodeOptions::default()).expect("decodes"), root());
}

#[test]
fn invalid_utf8_in_the_string_table_is_corrupt_data() {
	let header = GffHeader::new(0, 0).with_version(FileVersion::V4_1);
	let mut bytes = GffFile::from_value(header, schema(), &root()).expect("encodes").to_bytes().expect("serializes");
	let (_, layout) = GffHeader::parse(&bytes).expect("header");
	bytes[layout.string_table_offset as usize + 1] = 0xFF;

	let err = GffFile::parse(&bytes, &DecodeOptions::default()).expect_err("invalid utf-8");
	assert!(matches!(err, GffError::InvalidString { index: 1 }));
	assert_eq!(err.category(), ErrorCategory::CorruptData);
}

#[test]
fn big_endian_documents_round_trip() {
	let header = GffHeader::new(1, 2).with_endianness(Endianness::Big);
	let bytes = encode(&document(header)).expect("encodes");
	assert_eq!(bytes[8], 1, "platform byte");

	let decoded = decode(&bytes, &DecodeOptions::default()).expect("decodes");
	assert_eq!(decoded.header.endianness, Endianness::Big);
	assert_eq!(decoded.root, root());
}

#[test]
fn strict_options_reject_other_formats() {
	let bytes = encode(&document(GffHeader::new(5, 1))).expect("encodes");
	let err = GffFile::parse(&bytes, &DecodeOptions::strict(6, 1)).expect_err("format type");
	assert!(matches!(err, GffError::FormatTypeMismatch { expected: 6, found: 5 }));
}

#[test]
fn schema_without_structures_parses_but_has_no_root() {
	let file = GffFile {
		header: GffHeader::new(0, 0),
		schema: Schema::default(),
		strings: Vec::new(),
		data: Vec::new(),
	};
	let bytes = file.to_bytes().expect("serializes");
	let parsed = GffFile::parse(&bytes, &DecodeOptions::default()).expect("parses");
	assert!(parsed.schema.is_empty());

	let err = parsed.root_value(&DecodeOptions::default()).expect_err("no root");
	assert!(matches!(err, GffError::EmptySchema));
}

#[test]
fn truncated_input_is_reported() {
	let bytes = encode(&document(GffHeader::new(0, 0))).expect("encodes");
	let err = GffFile::parse(&bytes[..12], &DecodeOptions::default()).expect_err("truncated header");
	assert!(matches!(err, GffError::UnexpectedEof { .. }));

	let mut bad = bytes.clone();
	bad[0] = b'X';
	let err = GffFile::parse(&bad, &DecodeOptions::default()).expect_err("bad magic");
	assert!(matches!(err, GffError::BadMagic { .. }));
}

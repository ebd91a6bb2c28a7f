use crate::gff::schema::{FLAG_LIST, FLAG_REFERENCE, FLAG_STRUCTURE, fourcc, tag_code};
use crate::gff::{BuiltinType, FieldDefinition, FieldKind, GffError, Schema, StructureDefinition};

fn sample() -> Schema {
	Schema::with_layout(vec![
		StructureDefinition::new(
			fourcc(b"ROOT"),
			vec![
				FieldDefinition::builtin(1, BuiltinType::UInt8),
				FieldDefinition::structure(2, 1),
				FieldDefinition::builtin(3, BuiltinType::Int32).list(),
				FieldDefinition::structure(4, 1).reference(),
				FieldDefinition::builtin(5, BuiltinType::String),
				FieldDefinition::generic_list(6),
			],
		),
		StructureDefinition::new(
			fourcc(b"VEC "),
			vec![
				FieldDefinition::builtin(10, BuiltinType::Vector3),
				FieldDefinition::builtin(11, BuiltinType::TalkString),
			],
		),
	])
	.expect("layout resolves")
}

#[test]
fn layout_follows_declaration_order() {
	let schema = sample();
	let child = schema.structure(1).expect("child");
	assert_eq!(child.inline_size, 20);
	assert_eq!(child.fields[1].inline_offset, 12);

	let root = schema.root().expect("root");
	let offsets: Vec<u32> = root.fields.iter().map(|field| field.inline_offset).collect();
	assert_eq!(offsets, vec![0, 1, 21, 25, 29, 33]);
	assert_eq!(root.inline_size, 37);
}

#[test]
fn self_inlining_structure_is_rejected() {
	let err = Schema::with_layout(vec![StructureDefinition::new(0, vec![FieldDefinition::structure(9, 0)])]).expect_err("cycle");
	assert!(matches!(err, GffError::UnsupportedLayout { field_id: 9, .. }));
}

#[test]
fn dangling_structure_index_is_rejected() {
	let err = Schema::with_layout(vec![StructureDefinition::new(0, vec![FieldDefinition::structure(1, 4).list()])]).expect_err("dangling");
	assert!(matches!(err, GffError::StructureIndexOutOfRange { index: 4, count: 1 }));
}

#[test]
fn raw_flags_round_trip() {
	let schema = sample();
	for field in &schema.root().expect("root").fields {
		let parsed = FieldDefinition::from_raw(field.id, field.raw_type_and_flags(), field.inline_offset).expect("raw parses");
		assert_eq!(&parsed, field);
	}

	let reference = FieldDefinition::structure(4, 1).reference();
	assert_eq!(reference.raw_type_and_flags(), 1 | (u32::from(FLAG_STRUCTURE | FLAG_REFERENCE) << 16));
}

#[test]
fn inconsistent_flags_are_rejected() {
	let generic_structure = 0xFFFF | (u32::from(FLAG_STRUCTURE | FLAG_LIST) << 16);
	let err = FieldDefinition::from_raw(3, generic_structure, 0).expect_err("generic structure");
	assert!(matches!(err, GffError::InconsistentFieldFlags { field_id: 3, .. }));

	let generic_direct = 0xFFFF;
	let err = FieldDefinition::from_raw(4, generic_direct, 0).expect_err("generic without list reference");
	assert!(matches!(err, GffError::InconsistentFieldFlags { field_id: 4, .. }));

	let unknown_flag = 5 | (0x0100 << 16);
	let err = FieldDefinition::from_raw(5, unknown_flag, 0).expect_err("unknown flag bit");
	assert!(matches!(err, GffError::InconsistentFieldFlags { field_id: 5, .. }));

	let err = FieldDefinition::from_raw(6, 11, 0).expect_err("gap tag");
	assert!(matches!(err, GffError::UnknownType { tag: 11 }));
}

#[test]
fn element_strips_modifiers() {
	let field = FieldDefinition::builtin(3, BuiltinType::Int32).list();
	let element = field.element();
	assert_eq!(element.kind, FieldKind::Builtin(BuiltinType::Int32));
	assert!(!element.is_list && !element.is_reference);
	assert_eq!(element.inline_offset, 0);
}

#[test]
fn render_lists_fields_with_modifiers() {
	let text = sample().render();
	assert!(text.starts_with("struct #0 ROOT (root) size=37\n"), "{text}");
	assert!(text.contains("\t2: VEC#1 @1\n"), "{text}");
	assert!(text.contains("\t3: [Int32] @21\n"), "{text}");
	assert!(text.contains("\t4: *VEC#1 @25\n"), "{text}");
	assert!(text.contains("\t6: *[Generic] @33\n"), "{text}");
}

#[test]
fn tag_code_falls_back_to_hex() {
	assert_eq!(tag_code(fourcc(b"GFF ")), "GFF");
	assert_eq!(tag_code(0), "0x00000000");
}

use std::rc::Rc;

use crate::gff::{
	BuiltinType, DecodeOptions, ErrorCategory, FieldBinding, FieldDefinition, FieldKind, FieldShape, GffError, GffFile, GffHeader, GffStruct, Schema, StructValue, StructureDefinition,
	TaggedValue, TalkString, Value, ValueType, derive_schema, fourcc,
};

#[derive(Debug, Default, PartialEq)]
struct Leaf {
	value: u8,
}

impl GffStruct for Leaf {
	const TYPE_TAG: u32 = fourcc(b"LEAF");

	fn fields() -> Vec<FieldBinding<Self>> {
		vec![FieldBinding::new(10, |s: &Self| &s.value, |s: &mut Self| &mut s.value)]
	}
}

#[derive(Debug, Default, PartialEq)]
struct Root {
	id: i32,
	name: String,
	scores: Vec<f32>,
	leaves: Vec<Leaf>,
	first: Option<Rc<Leaf>>,
	second: Option<Rc<Leaf>>,
	blob: Vec<u8>,
	talk: TalkString,
}

impl GffStruct for Root {
	const TYPE_TAG: u32 = fourcc(b"ROOT");

	fn fields() -> Vec<FieldBinding<Self>> {
		vec![
			FieldBinding::new(1, |s: &Self| &s.id, |s: &mut Self| &mut s.id),
			FieldBinding::new(2, |s: &Self| &s.name, |s: &mut Self| &mut s.name),
			FieldBinding::new(3, |s: &Self| &s.scores, |s: &mut Self| &mut s.scores),
			FieldBinding::new(4, |s: &Self| &s.leaves, |s: &mut Self| &mut s.leaves),
			FieldBinding::new(5, |s: &Self| &s.first, |s: &mut Self| &mut s.first),
			FieldBinding::new(6, |s: &Self| &s.second, |s: &mut Self| &mut s.second),
			FieldBinding::new(7, |s: &Self| &s.blob, |s: &mut Self| &mut s.blob),
			FieldBinding::new(8, |s: &Self| &s.talk, |s: &mut Self| &mut s.talk),
		]
	}
}

#[derive(Debug, Default)]
struct Partial {
	id: i32,
}

impl GffStruct for Partial {
	const TYPE_TAG: u32 = fourcc(b"ROOT");

	fn fields() -> Vec<FieldBinding<Self>> {
		vec![FieldBinding::new(1, |s: &Self| &s.id, |s: &mut Self| &mut s.id)]
	}
}

#[derive(Debug, Default)]
struct Outer {
	inner: Leaf,
}

impl GffStruct for Outer {
	const TYPE_TAG: u32 = fourcc(b"OUTR");

	fn fields() -> Vec<FieldBinding<Self>> {
		vec![FieldBinding::new(1, |s: &Self| &s.inner, |s: &mut Self| &mut s.inner)]
	}
}

#[derive(Debug, Default)]
struct Bag {
	items: Value,
}

impl GffStruct for Bag {
	const TYPE_TAG: u32 = fourcc(b"BAG ");

	fn fields() -> Vec<FieldBinding<Self>> {
		vec![FieldBinding::new(1, |s: &Self| &s.items, |s: &mut Self| &mut s.items)]
	}
}

fn sample() -> Root {
	let shared = Rc::new(Leaf { value: 5 });
	Root {
		id: -12,
		name: String::from("sample"),
		scores: vec![0.5, 1.5],
		leaves: vec![Leaf { value: 1 }, Leaf { value: 2 }],
		first: Some(Rc::clone(&shared)),
		second: Some(shared),
		blob: vec![1, 2, 3, 4],
		talk: TalkString::with_string(40, "override"),
	}
}

#[test]
fn derived_schema_follows_binding_order() {
	let schema = derive_schema::<Root>().expect("derives");
	assert_eq!(schema.len(), 2);
	assert_eq!(schema.structure(1).expect("leaf").type_tag, fourcc(b"LEAF"));

	let root = schema.root().expect("root");
	assert_eq!(root.type_tag, fourcc(b"ROOT"));
	let ids: Vec<i32> = root.fields.iter().map(|field| field.id).collect();
	assert_eq!(ids, vec![1, 2, 3, 4, 5, 6, 7, 8]);
	assert_eq!(root.fields[3], FieldDefinition { inline_offset: 12, ..FieldDefinition::structure(4, 1).list() });
	assert_eq!(root.fields[4], FieldDefinition { inline_offset: 16, ..FieldDefinition::structure(5, 1).reference() });
	assert_eq!(root.inline_size, 36);

	assert_eq!(derive_schema::<Root>().expect("again"), schema);
}

#[test]
fn native_round_trip_preserves_values_and_sharing() {
	let file = GffFile::from_native(GffHeader::new(0, 0), &sample()).expect("encodes");
	let decoded: Root = file.to_native(&DecodeOptions::default()).expect("decodes");

	assert_eq!(decoded, sample());
	let (Some(first), Some(second)) = (&decoded.first, &decoded.second) else {
		panic!("both references present");
	};
	assert!(Rc::ptr_eq(first, second));
}

#[test]
fn unbound_schema_fields_are_skipped_and_encoded_absent() {
	let file = GffFile::from_native(GffHeader::new(0, 0), &sample()).expect("encodes");
	let partial: Partial = file.to_native(&DecodeOptions::default()).expect("subset decodes");
	assert_eq!(partial.id, -12);

	let sparse = GffFile::from_native_with_schema(GffHeader::new(0, 0), file.schema.clone(), &Partial { id: 3 }).expect("encodes");
	let decoded: Root = sparse.to_native(&DecodeOptions::default()).expect("decodes");
	assert_eq!(decoded, Root { id: 3, ..Root::default() });
}

#[test]
fn binding_without_schema_field_is_a_schema_mismatch() {
	let schema = Schema::with_layout(vec![StructureDefinition::new(fourcc(b"ROOT"), vec![FieldDefinition::builtin(1, BuiltinType::Int32)])]).expect("layout");
	let file = GffFile::from_value(GffHeader::new(0, 0), schema, &Value::Struct(StructValue::new(0).with(1, 5_i32))).expect("encodes");

	let err = file.to_native::<Root>(&DecodeOptions::default()).expect_err("field 2 missing");
	assert!(matches!(err, GffError::SchemaMismatch { field_id: 2, .. }));
}

#[test]
fn incompatible_field_type_is_reported() {
	let schema = Schema::with_layout(vec![StructureDefinition::new(0, vec![FieldDefinition::builtin(1, BuiltinType::Int16)])]).expect("layout");
	let file = GffFile::from_value(GffHeader::new(0, 0), schema, &Value::Null).expect("encodes");

	let err = file.to_native::<Partial>(&DecodeOptions::default()).expect_err("Int16 is not i32");
	let GffError::FieldTypeMismatch { field_id, schema, native } = err else {
		panic!("expected a field type mismatch");
	};
	assert_eq!(field_id, 1);
	assert_eq!(schema, "Int16");
	assert_eq!(native, "Int32");
}

#[test]
fn inline_structures_marshal_with_an_explicit_schema() {
	let err = derive_schema::<Outer>().expect_err("direct nesting is not derivable");
	assert!(matches!(err, GffError::UnsupportedLayout { field_id: 1, .. }));

	let schema = Schema::with_layout(vec![
		StructureDefinition::new(fourcc(b"OUTR"), vec![FieldDefinition::structure(1, 1)]),
		StructureDefinition::new(fourcc(b"LEAF"), vec![FieldDefinition::builtin(10, BuiltinType::UInt8)]),
	])
	.expect("layout");
	let file = GffFile::from_native_with_schema(GffHeader::new(0, 0), schema, &Outer { inner: Leaf { value: 77 } }).expect("encodes");
	let decoded: Outer = file.to_native(&DecodeOptions::default()).expect("decodes");
	assert_eq!(decoded.inner.value, 77);
}

#[test]
fn dynamic_fields_carry_generic_lists() {
	assert_eq!(<Value as crate::gff::FieldData>::shape(), FieldShape::Dynamic);
	let err = derive_schema::<Bag>().expect_err("dynamic fields have no static type");
	assert!(matches!(err, GffError::UnsupportedLayout { field_id: 1, .. }));

	let schema = Schema::with_layout(vec![StructureDefinition::new(fourcc(b"BAG "), vec![FieldDefinition::generic_list(1)])]).expect("layout");
	let items = Value::Generic(vec![
		TaggedValue::new(ValueType::new(FieldKind::Builtin(BuiltinType::UInt16)), 9_u16),
		TaggedValue::new(ValueType::new(FieldKind::Builtin(BuiltinType::String)), "tagged"),
	]);
	let file = GffFile::from_native_with_schema(GffHeader::new(0, 0), schema, &Bag { items }).expect("encodes");
	let decoded: Bag = file.to_native(&DecodeOptions::default()).expect("decodes");

	let items = decoded.items.as_generic().expect("generic list");
	assert_eq!(items[0].value.as_u16(), Some(9));
	assert_eq!(items[1].value.as_str(), Some("tagged"));
}

#[test]
fn empty_vectors_encode_as_empty_lists() {
	let file = GffFile::from_native(GffHeader::new(0, 0), &Root::default()).expect("encodes");
	let root = file.root_value(&DecodeOptions::default()).expect("dynamic view");
	assert_eq!(root.get(3), Some(&Value::List(Vec::new())));
	assert_eq!(root.get(7), Some(&Value::Bytes(Vec::new())));
	assert!(root.get(5).expect("present").is_null());
}

#[test]
fn derived_structure_count_is_capped_at_u16_max() {
	super::derive::check_structure_count(65535).expect("largest allowed schema");

	let err = super::derive::check_structure_count(65536).expect_err("one past the cap");
	assert!(matches!(err, GffError::SchemaTooLarge { count: 65536 }));
	assert_eq!(err.category(), ErrorCategory::SchemaTooLarge);
}

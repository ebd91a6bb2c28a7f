use std::any::TypeId;
use std::collections::{HashMap, VecDeque};

use crate::gff::typed::{FieldShape, GffStruct, StructType};
use crate::gff::{FieldDefinition, FieldKind, GffError, Result, Schema, StructureDefinition};

/// Derive a schema from the field tables of `S` and every native structure it reaches.
///
/// Types are numbered breadth first from `S`, which becomes structure 0. Field order follows
/// each type's field table and inline offsets are packed in that order, so the result is a
/// pure function of the native type graph.
pub fn derive_schema<S: GffStruct>() -> Result<Schema> {
	let root = StructType::of::<S>();
	let mut order = vec![root];
	let mut index = HashMap::from([(root.type_id, 0_usize)]);
	let mut queue = VecDeque::from([root]);
	let mut layouts = Vec::new();

	while let Some(ty) = queue.pop_front() {
		let layout = (ty.layout)();
		for (_, shape) in &layout {
			let Some(target) = reached_type(shape) else {
				continue;
			};
			if index.contains_key(&target.type_id) {
				continue;
			}
			index.insert(target.type_id, order.len());
			order.push(target);
			queue.push_back(target);
		}
		layouts.push(layout);
	}

	check_structure_count(order.len())?;

	let mut structures = Vec::with_capacity(order.len());
	for (ty, layout) in order.iter().zip(layouts) {
		let mut fields: Vec<FieldDefinition> = Vec::with_capacity(layout.len());
		for (id, shape) in layout {
			if fields.iter().any(|field| field.id == id) {
				return Err(GffError::UnsupportedLayout {
					field_id: id,
					reason: "duplicate field id",
				});
			}
			fields.push(field_for(id, &shape, &index)?);
		}
		structures.push(StructureDefinition::new(ty.type_tag, fields));
	}

	let schema = Schema::with_layout(structures)?;
	log::debug!("derived schema for {}: {} structures", root.name, schema.len());
	Ok(schema)
}

/// Reject a derived schema with more structures than the format allows.
pub(super) fn check_structure_count(count: usize) -> Result<()> {
	if count > usize::from(u16::MAX) {
		return Err(GffError::SchemaTooLarge { count });
	}
	Ok(())
}

fn reached_type(shape: &FieldShape) -> Option<StructType> {
	match shape {
		FieldShape::Structure(ty) | FieldShape::Reference(ty) => Some(*ty),
		FieldShape::List(inner) => reached_type(inner),
		FieldShape::Builtin(_) | FieldShape::Dynamic => None,
	}
}

fn field_for(id: i32, shape: &FieldShape, index: &HashMap<TypeId, usize>) -> Result<FieldDefinition> {
	let unsupported = |reason| GffError::UnsupportedLayout { field_id: id, reason };
	let structure = |ty: &StructType| -> Result<FieldKind> {
		let at = index.get(&ty.type_id).copied().unwrap_or_default();
		Ok(FieldKind::Structure(u16::try_from(at).map_err(|_| GffError::SchemaTooLarge { count: at + 1 })?))
	};

	match shape {
		FieldShape::Builtin(ty) => Ok(FieldDefinition::builtin(id, *ty)),
		FieldShape::Structure(_) => Err(unsupported("nested structure field")),
		FieldShape::Reference(ty) => Ok(FieldDefinition::new(id, structure(ty)?).reference()),
		FieldShape::List(inner) => match inner.as_ref() {
			FieldShape::Builtin(ty) => Ok(FieldDefinition::builtin(id, *ty).list()),
			FieldShape::Structure(ty) => Ok(FieldDefinition::new(id, structure(ty)?).list()),
			FieldShape::Reference(_) => Err(unsupported("list of references")),
			FieldShape::List(_) => Err(unsupported("nested list")),
			FieldShape::Dynamic => Err(unsupported("list of dynamic values")),
		},
		FieldShape::Dynamic => Err(unsupported("dynamic field")),
	}
}

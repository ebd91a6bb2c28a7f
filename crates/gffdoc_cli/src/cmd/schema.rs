use std::path::PathBuf;

use gffdoc::gff::{FieldKind, Result, Schema};

use crate::cmd::util::{emit_json, open, tag_label};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print the structure table of a document.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let file = open(&path)?;
	if json {
		emit_json(&schema_json(&path, &file.schema));
		return Ok(());
	}

	print!("{}", file.schema.render());
	Ok(())
}

fn schema_json(path: &std::path::Path, schema: &Schema) -> SchemaJson {
	SchemaJson {
		path: path.display().to_string(),
		structures: schema
			.structures
			.iter()
			.enumerate()
			.map(|(index, def)| StructureJson {
				index,
				type_tag: tag_label(def.type_tag),
				code: def.tag_code(),
				inline_size: def.inline_size,
				fields: def
					.fields
					.iter()
					.map(|field| FieldJson {
						id: field.id,
						kind: kind_label(field.kind),
						structure: match field.kind {
							FieldKind::Structure(index) => Some(index),
							_ => None,
						},
						list: field.is_list,
						reference: field.is_reference,
						label: field.type_label(schema),
						offset: field.inline_offset,
					})
					.collect(),
			})
			.collect(),
	}
}

fn kind_label(kind: FieldKind) -> String {
	match kind {
		FieldKind::Builtin(ty) => ty.name().to_owned(),
		FieldKind::Structure(_) => "Structure".to_owned(),
		FieldKind::Generic => "Generic".to_owned(),
	}
}

#[derive(serde::Serialize)]
struct SchemaJson {
	path: String,
	structures: Vec<StructureJson>,
}

#[derive(serde::Serialize)]
struct StructureJson {
	index: usize,
	type_tag: String,
	code: String,
	inline_size: u32,
	fields: Vec<FieldJson>,
}

#[derive(serde::Serialize)]
struct FieldJson {
	id: i32,
	kind: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	structure: Option<u16>,
	list: bool,
	reference: bool,
	label: String,
	offset: u32,
}

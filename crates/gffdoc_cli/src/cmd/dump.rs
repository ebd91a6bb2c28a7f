use std::path::PathBuf;

use gffdoc::gff::{DecodeOptions, FieldKind, Result, StructValue, TaggedValue, Value, ValueType, tag_code};
use serde_json::{Map, Value as JsonValue, json};

use crate::cmd::util::{emit_json, open};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
	/// Nesting ceiling passed to the decoder.
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
}

/// Decode the root structure and print the dynamic value tree.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json, max_depth } = args;

	let mut options = DecodeOptions::default();
	if let Some(max_depth) = max_depth {
		options.max_depth = max_depth;
	}

	let file = open(&path)?;
	let root = file.root_value(&options)?;

	if json {
		emit_json(&json!({
			"path": path.display().to_string(),
			"root": value_to_json(&root),
		}));
		return Ok(());
	}

	let mut out = String::new();
	render_value(&root, 0, &mut out);
	print!("{out}");
	Ok(())
}

fn value_to_json(value: &Value) -> JsonValue {
	match value {
		Value::Null => JsonValue::Null,
		Value::UInt8(v) => json!(v),
		Value::Int8(v) => json!(v),
		Value::UInt16(v) => json!(v),
		Value::Int16(v) => json!(v),
		Value::UInt32(v) => json!(v),
		Value::Int32(v) => json!(v),
		Value::UInt64(v) => json!(v),
		Value::Int64(v) => json!(v),
		Value::Float32(v) => json!(v),
		Value::Float64(v) => json!(v),
		Value::Vector3(v) => json!({ "x": v.x, "y": v.y, "z": v.z }),
		Value::Vector4(v) => json!({ "x": v.x, "y": v.y, "z": v.z, "w": v.w }),
		Value::Quaternion(v) => json!({ "x": v.x, "y": v.y, "z": v.z, "w": v.w }),
		Value::Color(v) => json!({ "r": v.r, "g": v.g, "b": v.b, "a": v.a }),
		Value::Matrix4x4(v) => json!(v.rows),
		Value::TalkString(v) => json!({ "id": v.id, "string": v.string }),
		Value::String(v) => json!(v),
		Value::Bytes(v) => json!(v),
		Value::List(items) => JsonValue::Array(items.iter().map(value_to_json).collect()),
		Value::Generic(items) => JsonValue::Array(items.iter().map(tagged_to_json).collect()),
		Value::Struct(value) => struct_to_json(value),
		Value::Ref(target) => value_to_json(target),
	}
}

fn tagged_to_json(item: &TaggedValue) -> JsonValue {
	json!({
		"type": type_label(item.ty),
		"value": value_to_json(&item.value),
	})
}

fn struct_to_json(value: &StructValue) -> JsonValue {
	let mut fields = Map::new();
	for (id, field) in &value.fields {
		fields.insert(id.to_string(), value_to_json(field));
	}
	json!({
		"type": tag_code(value.type_tag),
		"fields": fields,
	})
}

fn type_label(ty: ValueType) -> String {
	let base = match ty.kind {
		FieldKind::Builtin(builtin) => builtin.name().to_owned(),
		FieldKind::Structure(index) => format!("#{index}"),
		FieldKind::Generic => "Generic".to_owned(),
	};
	let base = if ty.is_list { format!("[{base}]") } else { base };
	if ty.is_reference { format!("*{base}") } else { base }
}

fn render_value(value: &Value, indent: usize, out: &mut String) {
	let pad = "  ".repeat(indent);
	match value {
		Value::Struct(value) => {
			out.push_str(&format!("{} {{\n", tag_code(value.type_tag)));
			for (id, field) in &value.fields {
				out.push_str(&format!("{pad}  {id}: "));
				render_value(field, indent + 1, out);
			}
			out.push_str(&format!("{pad}}}\n"));
		}
		Value::List(items) => {
			out.push_str(&format!("[{}]\n", items.len()));
			for (index, item) in items.iter().enumerate() {
				out.push_str(&format!("{pad}  [{index}] "));
				render_value(item, indent + 1, out);
			}
		}
		Value::Generic(items) => {
			out.push_str(&format!("generic[{}]\n", items.len()));
			for (index, item) in items.iter().enumerate() {
				out.push_str(&format!("{pad}  [{index}] {} ", type_label(item.ty)));
				render_value(&item.value, indent + 1, out);
			}
		}
		Value::Ref(target) => {
			out.push('*');
			render_value(target, indent, out);
		}
		other => {
			out.push_str(&scalar_text(other));
			out.push('\n');
		}
	}
}

fn scalar_text(value: &Value) -> String {
	match value {
		Value::Null => "null".to_owned(),
		Value::UInt8(v) => v.to_string(),
		Value::Int8(v) => v.to_string(),
		Value::UInt16(v) => v.to_string(),
		Value::Int16(v) => v.to_string(),
		Value::UInt32(v) => v.to_string(),
		Value::Int32(v) => v.to_string(),
		Value::UInt64(v) => v.to_string(),
		Value::Int64(v) => v.to_string(),
		Value::Float32(v) => v.to_string(),
		Value::Float64(v) => v.to_string(),
		Value::Vector3(v) => format!("({}, {}, {})", v.x, v.y, v.z),
		Value::Vector4(v) => format!("({}, {}, {}, {})", v.x, v.y, v.z, v.w),
		Value::Quaternion(v) => format!("quat({}, {}, {}, {})", v.x, v.y, v.z, v.w),
		Value::Color(v) => format!("rgba({}, {}, {}, {})", v.r, v.g, v.b, v.a),
		Value::Matrix4x4(v) => format!("{:?}", v.rows),
		Value::TalkString(v) => match &v.string {
			Some(text) => format!("talk#{} {text:?}", v.id),
			None => format!("talk#{}", v.id),
		},
		Value::String(v) => format!("{v:?}"),
		Value::Bytes(v) => format!("bytes[{}] {}", v.len(), hex_preview(v)),
		Value::List(_) | Value::Generic(_) | Value::Struct(_) | Value::Ref(_) => value.kind_name().to_owned(),
	}
}

fn hex_preview(bytes: &[u8]) -> String {
	const PREVIEW: usize = 32;
	let mut out: String = bytes.iter().take(PREVIEW).map(|byte| format!("{byte:02x}")).collect();
	if bytes.len() > PREVIEW {
		out.push_str("..");
	}
	out
}

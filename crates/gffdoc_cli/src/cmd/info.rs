use std::path::PathBuf;

use gffdoc::gff::Result;

use crate::cmd::util::{emit_json, format_label, open, tag_label};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

/// Print header fields and table statistics.
pub fn run(args: Args) -> Result<()> {
	let Args { path, json } = args;

	let file = open(&path)?;
	let header = file.header;
	let root_tag = file.schema.root().ok().map(|def| def.type_tag);

	if json {
		let payload = InfoJson {
			path: path.display().to_string(),
			version: header.version.as_str(),
			endianness: header.endianness.as_str(),
			format_type: header.format_type,
			format_version: header.format_version,
			header_size: header.size(),
			structure_count: file.schema.len(),
			field_count: file.schema.field_count(),
			string_count: file.strings.len(),
			data_size: file.data().len(),
			root_tag: root_tag.map(tag_label),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("version: {}", header.version.as_str());
	println!("endianness: {}", header.endianness.as_str());
	println!("format: {}", format_label(header.format_type, header.format_version));
	println!("header_size: {}", header.size());
	println!("structure_count: {}", file.schema.len());
	println!("field_count: {}", file.schema.field_count());
	println!("string_count: {}", file.strings.len());
	println!("data_size: {}", file.data().len());
	println!("root: {}", root_tag.map(tag_label).unwrap_or_else(|| "-".to_owned()));

	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	version: &'static str,
	endianness: &'static str,
	format_type: u8,
	format_version: u32,
	header_size: usize,
	structure_count: usize,
	field_count: usize,
	string_count: usize,
	data_size: usize,
	root_tag: Option<String>,
}

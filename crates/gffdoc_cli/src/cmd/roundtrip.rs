use std::path::PathBuf;

use gffdoc::gff::{DecodeOptions, Result, decode, encode};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Write the re-encoded document here.
	#[arg(long)]
	pub out: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Decode a document through the dynamic engine, encode it again, and compare bytes.
pub fn run(args: Args) -> Result<()> {
	let Args { path, out, json } = args;

	let original = std::fs::read(&path)?;
	let document = decode(&original, &DecodeOptions::default())?;
	let rebuilt = encode(&document)?;
	let identical = original == rebuilt;
	let first_difference = (!identical).then(|| {
		original
			.iter()
			.zip(&rebuilt)
			.position(|(left, right)| left != right)
			.unwrap_or(original.len().min(rebuilt.len()))
	});

	if let Some(out) = &out {
		std::fs::write(out, &rebuilt)?;
		log::debug!("wrote {} bytes to {}", rebuilt.len(), out.display());
	}

	if json {
		emit_json(&RoundtripJson {
			path: path.display().to_string(),
			original_size: original.len(),
			encoded_size: rebuilt.len(),
			identical,
			first_difference,
			out: out.map(|item| item.display().to_string()),
		});
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("original_size: {}", original.len());
	println!("encoded_size: {}", rebuilt.len());
	println!("identical: {identical}");
	if let Some(offset) = first_difference {
		println!("first_difference: {offset}");
	}
	if let Some(out) = &out {
		println!("out: {}", out.display());
	}

	Ok(())
}

#[derive(serde::Serialize)]
struct RoundtripJson {
	path: String,
	original_size: usize,
	encoded_size: usize,
	identical: bool,
	first_difference: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	out: Option<String>,
}

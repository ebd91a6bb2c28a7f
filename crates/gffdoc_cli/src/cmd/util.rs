use std::path::Path;

use gffdoc::gff::{DecodeOptions, GffFile, Result, tag_code};

/// Print a serializable payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => log::error!("failed to serialize json output: {err}"),
	}
}

/// Parse a document from disk with default limits.
pub(crate) fn open(path: &Path) -> Result<GffFile> {
	log::debug!("opening {}", path.display());
	GffFile::open(path, &DecodeOptions::default())
}

/// Render a type tag as its four-character code plus the raw hex value.
pub(crate) fn tag_label(type_tag: u32) -> String {
	format!("{} (0x{type_tag:08x})", tag_code(type_tag))
}

/// Render the format type and version pair stored in the header.
pub(crate) fn format_label(format_type: u8, format_version: u32) -> String {
	format!("{format_type}/0x{format_version:08x}")
}

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::process::Command;

use gffdoc::gff::{FileVersion, GffHeader};
use gffdoc_testkit::{run_json, sample_bytes};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_gffdoc");

fn write_sample(dir: &TempDir, name: &str, header: GffHeader) -> PathBuf {
	let path = dir.path().join(name);
	std::fs::write(&path, sample_bytes(header)).expect("sample written");
	path
}

fn arg(path: &Path) -> String {
	path.to_string_lossy().into_owned()
}

#[test]
fn info_json_reports_header_and_counts() {
	let dir = TempDir::new().expect("tempdir");
	let path = write_sample(&dir, "sample.gff", GffHeader::new(3, 0x0102_0304).with_version(FileVersion::V4_1));
	let json = run_json(BIN, &["info", &arg(&path), "--json"]);

	assert_eq!(json["version"], "V4.1");
	assert_eq!(json["endianness"], "little");
	assert_eq!(json["format_type"], 3);
	assert_eq!(json["format_version"], 0x0102_0304);
	assert_eq!(json["header_size"], 30);
	assert_eq!(json["structure_count"], 3);
	assert_eq!(json["field_count"], 29);
	assert!(json["string_count"].as_u64().is_some_and(|count| count > 1));
	assert!(json["data_size"].as_u64().is_some_and(|size| size > 0));
	assert!(json["root_tag"].as_str().is_some_and(|tag| tag.starts_with("ROOT")));
}

#[test]
fn schema_json_lists_structures_in_index_order() {
	let dir = TempDir::new().expect("tempdir");
	let path = write_sample(&dir, "sample.gff", GffHeader::new(0, 0));
	let json = run_json(BIN, &["schema", &arg(&path), "--json"]);

	let structures = json["structures"].as_array().expect("structures array");
	assert_eq!(structures.len(), 3);
	assert_eq!(structures[0]["code"], "ROOT");
	assert_eq!(structures[1]["code"], "ITEM");
	assert_eq!(structures[2]["code"], "VERT");

	let fields = structures[0]["fields"].as_array().expect("fields array");
	let list = fields.iter().find(|field| field["id"] == 23).expect("field 23");
	assert_eq!(list["kind"], "Structure");
	assert_eq!(list["structure"], 1);
	assert_eq!(list["list"], true);
	assert_eq!(list["reference"], false);

	let generic = fields.iter().find(|field| field["id"] == 27).expect("field 27");
	assert_eq!(generic["kind"], "Generic");
	assert_eq!(generic["list"], true);
	assert_eq!(generic["reference"], true);
}

#[test]
fn dump_json_renders_the_value_tree() {
	let dir = TempDir::new().expect("tempdir");
	let path = write_sample(&dir, "sample.gff", GffHeader::new(0, 0));
	let json = run_json(BIN, &["dump", &arg(&path), "--json"]);

	let root = &json["root"];
	assert_eq!(root["type"], "ROOT");
	let fields = &root["fields"];
	assert_eq!(fields["1"], 0xAB);
	assert_eq!(fields["6"], -123_456);
	assert_eq!(fields["16"], "root name");
	assert_eq!(fields["17"]["id"], 1001);
	assert_eq!(fields["17"]["string"], "talk override");
	assert_eq!(fields["20"], serde_json::json!([3, -1, 4]));
	assert_eq!(fields["21"], serde_json::json!([0, 1, 254, 255]));
	assert_eq!(fields["23"][1]["fields"]["101"], "second");
	assert_eq!(fields["25"], fields["26"]);
	assert_eq!(fields["27"][0]["type"], "Int32");
	assert_eq!(fields["27"][3]["type"], "[UInt16]");
}

#[test]
fn roundtrip_reports_identical_bytes_and_writes_output() {
	let dir = TempDir::new().expect("tempdir");
	let path = write_sample(&dir, "sample.gff", GffHeader::new(0, 0));
	let out = dir.path().join("rebuilt.gff");
	let json = run_json(BIN, &["roundtrip", &arg(&path), "--out", &arg(&out), "--json"]);

	assert_eq!(json["identical"], true);
	assert!(json["first_difference"].is_null());
	assert_eq!(json["original_size"], json["encoded_size"]);
	assert_eq!(std::fs::read(&out).expect("output written"), std::fs::read(&path).expect("input readable"));
}

#[test]
fn malformed_input_exits_with_error_message() {
	let dir = TempDir::new().expect("tempdir");
	let path = dir.path().join("bad.gff");
	std::fs::write(&path, b"NOPEV4.0").expect("written");

	let output = Command::new(BIN).args(["info", &arg(&path)]).output().expect("command executes");
	assert_eq!(output.status.code(), Some(1));
	let stderr = String::from_utf8_lossy(&output.stderr);
	assert!(stderr.starts_with("error: bad magic"), "{stderr}");
}

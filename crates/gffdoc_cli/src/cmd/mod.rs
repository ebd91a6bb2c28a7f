/// Value tree dump command.
pub mod dump;
/// File-level information command.
pub mod info;
/// Decode then re-encode command.
pub mod roundtrip;
/// Structure table inspection command.
pub mod schema;

mod util;

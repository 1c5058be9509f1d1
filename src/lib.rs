// Library root
// -----------
// This crate exposes a small library surface for the CLI. The binary
// (`main.rs`) uses these modules to implement the emote dumper.
//
// Module responsibilities:
// - `api`: Blocking HTTP client for the Discord API (guild list,
//   single guild) plus the serde models and error taxonomy.
// - `archive`: Concurrent emote download fan-out, filename
//   sanitization, and zip archive assembly.
// - `config`: Token loading from `settings.json`.
// - `ui`: Terminal menu for picking which guild to dump.
//
// Keeping this separation makes the archive and sanitizer logic
// testable without any network or terminal in the way.
pub mod api;
pub mod archive;
pub mod config;
pub mod ui;

// Library root
// -----------
// This crate exposes a small library surface for the `fedora-upload`
// binary. `main.rs` only sets up logging and hands the arguments to `ui`.
//
// Module responsibilities:
// - `config`: Collects the Fedora base URL, credentials and timeout from
//   the environment and `.env` files.
// - `api`: Uploads one file to the repository with a single LDP PUT and
//   classifies what went wrong when it fails.
// - `ui`: Parses arguments, shows a spinner while uploading and prints the
//   result as text or JSON.
pub mod api;
pub mod config;
pub mod ui;

// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, then hand the arguments to the UI.
// - Log output goes to stderr so stdout only carries the upload result.

use fedora_upload::ui;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // `RUST_LOG` overrides the default, e.g. `RUST_LOG=fedora_upload=debug`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(ui::run(std::env::args_os()))
}

// UI layer: parses the command line, runs one upload behind a spinner and
// prints the outcome. Everything the user sees goes through here so the
// `api` module stays free of printing.

use crate::api::{FedoraClient, UploadError, Uploaded};
use crate::config::FedoraConfig;
use clap::error::ErrorKind;
use clap::Parser;
use crossterm::style::Stylize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

pub const USAGE: &str = "Usage: fedora-upload [--json] <FILE>";

/// Upload a file to a Fedora Commons repository.
#[derive(Parser, Debug)]
#[command(name = "fedora-upload", version)]
pub struct Cli {
    /// Print the result as a JSON object
    #[arg(long)]
    pub json: bool,
    /// File to upload
    #[arg(allow_hyphen_values = true)]
    pub file: PathBuf,
}

/// What to do after looking at the arguments.
#[derive(Debug)]
pub enum Args {
    Upload(Cli),
    /// `--help` or `--version`: print and exit successfully.
    Info(String),
    /// Wrong argument count or unknown flag.
    Usage(String),
}

pub fn parse_args<I, T>(args: I) -> Args
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Args::Upload(cli),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Args::Info(e.to_string()),
            _ => Args::Usage(e.to_string()),
        },
    }
}

/// Entry point used by `main`. Returns the process exit code: 0 on
/// success, 1 on a usage error or any failed upload.
pub fn run<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match parse_args(args) {
        Args::Upload(cli) => cli,
        Args::Info(text) => {
            print!("{}", text);
            return 0;
        }
        Args::Usage(text) => {
            eprint!("{}", text);
            println!("{}", mark_failure(USAGE));
            return 1;
        }
    };

    let client = match FedoraConfig::from_env().and_then(FedoraClient::new) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %format!("{:#}", e), "configuration failed");
            print_failure(cli.json, &format!("{:#}", e));
            return 1;
        }
    };

    // Spinner draws on stderr and stays hidden when that is not a terminal.
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Uploading {}...", cli.file.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = client.upload(&cli.file);
    spinner.finish_and_clear();

    match result {
        Ok(done) => {
            let uri = done.public_uri(client.config());
            if cli.json {
                println!("{}", render_json(&Ok(done), &uri));
            } else {
                let text = render_success(&uri);
                let mut lines = text.lines();
                if let Some(first) = lines.next() {
                    println!("{}", style_line(first, true));
                }
                for line in lines {
                    println!("{}", line);
                }
            }
            0
        }
        Err(e) => {
            print_failure(cli.json, &e.to_string());
            1
        }
    }
}

pub fn render_success(uri: &str) -> String {
    format!("✅ File uploaded successfully!\n🔗 Fedora URI: {}", uri)
}

pub fn render_failure(message: &str) -> String {
    message
        .lines()
        .map(|l| format!("❌ {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Serialize)]
struct SuccessReport<'a> {
    success: bool,
    message: &'static str,
    fedora_uri: &'a str,
    file_name: &'a str,
}

#[derive(Serialize)]
struct FailureReport<'a> {
    success: bool,
    error: &'a str,
}

/// JSON shape of an outcome. `uri` is what gets reported on success.
pub fn render_json(result: &Result<Uploaded, UploadError>, uri: &str) -> String {
    let value = match result {
        Ok(done) => serde_json::to_value(SuccessReport {
            success: true,
            message: "File uploaded to Fedora successfully!",
            fedora_uri: uri,
            file_name: &done.file_name,
        }),
        Err(e) => {
            let message = e.to_string();
            serde_json::to_value(FailureReport {
                success: false,
                error: &message,
            })
        }
    };
    value.map(|v| v.to_string()).unwrap_or_else(|_| "{}".into())
}

fn print_failure(json: bool, message: &str) {
    if json {
        let report = FailureReport {
            success: false,
            error: message,
        };
        match serde_json::to_string(&report) {
            Ok(s) => println!("{}", s),
            Err(_) => println!("{}", render_failure(message)),
        }
    } else {
        for line in render_failure(message).lines() {
            println!("{}", style_line(line, false));
        }
    }
}

fn mark_failure(text: &str) -> String {
    style_line(&render_failure(text), false)
}

fn style_line(line: &str, ok: bool) -> String {
    if !std::io::stdout().is_terminal() {
        return line.to_string();
    }
    if ok {
        line.green().to_string()
    } else {
        line.red().to_string()
    }
}

//! CFGL command-line tool for checking and transcoding CFGL documents.
//!
//! Usage: cfgl [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -i, --input <FILE>     Input file (alternative to the positional argument)
//!   -t, --to <FORMAT>      Output format (yaml, json, toml, cbor, diag, cfgl) [default: yaml]
//!   -w, --write            Write output next to the input with the format's extension
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if input is valid (exit 0 if valid, 1 if invalid)
//!   -v, --verbose          Increase log verbosity (repeatable)
//!   -h, --help             Print help
//!   -V, --version          Print version

use clap::{ArgAction, Parser, ValueEnum};
use libcfgl::{parse_with_filename, ParseError, Value};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};

mod transcode;

#[derive(Parser, Debug)]
#[command(name = "cfgl", version)]
#[command(about = "Check CFGL documents and transcode them to other formats")]
struct Args {
    /// Input file or directory; a directory processes every .cfgl file in it.
    /// Reads stdin when neither this nor --input is given.
    #[arg(conflicts_with = "input")]
    path: Option<PathBuf>,

    /// Input file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
    to: Format,

    /// Write output to specified file (not valid with directory input)
    #[arg(short, long, conflicts_with = "write")]
    output: Option<PathBuf>,

    /// Write output next to each input file, with the format's extension
    #[arg(short, long)]
    write: bool,

    /// Check if input is valid without producing output
    #[arg(long)]
    check: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    #[value(alias = "yml")]
    Yaml,
    Json,
    Toml,
    Cbor,
    /// CBOR diagnostic notation (RFC 8949 §8)
    Diag,
    /// Canonical CFGL
    Cfgl,
}

fn format_extension(format: Format) -> &'static str {
    match format {
        Format::Yaml => "yaml",
        Format::Json => "json",
        Format::Toml => "toml",
        Format::Cbor => "cbor",
        Format::Diag => "diag",
        Format::Cfgl => "cfgl",
    }
}

/// Encoded document, ready to be written.
enum Output {
    Text(String),
    Binary(Vec<u8>),
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let input_path = args.path.as_deref().or(args.input.as_deref());

    if let Some(path) = input_path {
        if path.is_dir() {
            if args.output.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            let code = process_directory(path, &args);
            process::exit(code);
        }
    }

    let input = match input_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    let code = process_input(&input, input_path, args.output.as_deref(), &args);
    process::exit(code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn process_directory(dir_path: &Path, args: &Args) -> i32 {
    let entries = match fs::read_dir(dir_path) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir_path.display(), e);
            return 1;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "cfgl").unwrap_or(false))
        .collect();
    paths.sort();
    info!(dir = %dir_path.display(), files = paths.len(), "processing directory");

    let mut had_errors = false;
    for path in &paths {
        let input = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                had_errors = true;
                continue;
            }
        };
        if process_input(&input, Some(path), None, args) != 0 {
            had_errors = true;
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

fn process_input(
    input: &str,
    input_file: Option<&Path>,
    output_file: Option<&Path>,
    args: &Args,
) -> i32 {
    let filename = input_file.map(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| p.display().to_string())
    });

    let value = match parse_with_filename(input, filename.as_deref()) {
        Ok(v) => v,
        Err(e) => {
            report_parse_error(&e, input_file);
            return 1;
        }
    };

    if args.check {
        match input_file {
            Some(path) => println!("{}: ok", path.display()),
            None => println!("ok"),
        }
        return 0;
    }

    debug!(format = ?args.to, "encoding");
    let output = match encode(&value, args.to) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let result = if let Some(path) = output_file {
        write_output(&output, path)
    } else if args.write {
        match input_file {
            Some(input_path) => {
                let path = input_path.with_extension(format_extension(args.to));
                info!(path = %path.display(), "writing");
                write_output(&output, &path)
            }
            None => Err("--write requires an input file".to_string()),
        }
    } else {
        write_stdout(&output)
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn report_parse_error(error: &ParseError, input_file: Option<&Path>) {
    match input_file {
        Some(path) => eprintln!("{}: Syntax error: {}", path.display(), error),
        None => eprintln!("Syntax error: {}", error),
    }
}

fn encode(value: &Value, format: Format) -> Result<Output, String> {
    match format {
        Format::Yaml => transcode::yaml::encode(value)
            .map(Output::Text)
            .map_err(|e| format!("Cannot convert to YAML: {}", e)),
        Format::Json => transcode::json::encode(value)
            .map(Output::Text)
            .map_err(|e| format!("Cannot convert to JSON: {}", e)),
        Format::Toml => transcode::toml::encode(value)
            .map(Output::Text)
            .map_err(|e| format!("Cannot convert to TOML: {}", e)),
        Format::Cbor => Ok(Output::Binary(transcode::cbor::encode(value))),
        // Rendered from the encoded bytes so it reflects the actual wire encoding.
        Format::Diag => transcode::cbor::diagnostic(&transcode::cbor::encode(value))
            .map(Output::Text)
            .map_err(|e| format!("Cannot render CBOR diagnostic notation: {}", e)),
        Format::Cfgl => libcfgl::encode(value)
            .map(Output::Text)
            .map_err(|e| e.to_string()),
    }
}

fn write_output(output: &Output, path: &Path) -> Result<(), String> {
    let bytes = match output {
        Output::Text(s) => s.as_bytes(),
        Output::Binary(b) => b.as_slice(),
    };
    fs::write(path, bytes).map_err(|e| format!("writing {}: {}", path.display(), e))
}

fn write_stdout(output: &Output) -> Result<(), String> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let result = match output {
        Output::Text(s) => {
            // Ensure output ends with newline
            if s.ends_with('\n') {
                handle.write_all(s.as_bytes())
            } else {
                handle
                    .write_all(s.as_bytes())
                    .and_then(|_| handle.write_all(b"\n"))
            }
        }
        Output::Binary(b) => handle.write_all(b),
    };
    result.map_err(|e| format!("writing to stdout: {}", e))
}

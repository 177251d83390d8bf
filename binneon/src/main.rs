//! NEON command-line tool for checking and transcoding NEON documents.
//!
//! Usage: neon [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -t, --to <FORMAT>      Output format (json, yaml, toml, cbor, diag, debug) [default: json]
//!   -w, --write            Write output to file with inferred name
//!   -o, --output <FILE>    Write output to specified file
//!       --check            Check if input is valid (exit 0 if valid, 1 if invalid)
//!   -h, --help             Print help
//!   -V, --version          Print version
//!
//! With no FILE, or when FILE is `-`, reads standard input. A DIR argument
//! processes every `.neon` file in it.

use clap::{Parser, ValueEnum};
use libneon::{decode_with_filename, Value};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

mod transcode;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
    Toml,
    Cbor,
    /// CBOR diagnostic notation
    Diag,
    /// The decoded tree as Rust debug output
    Debug,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Cbor => "cbor",
            Format::Diag => "diag",
            Format::Debug => "txt",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
            Format::Cbor => "CBOR",
            Format::Diag => "CBOR diagnostic notation",
            Format::Debug => "debug output",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "neon", version)]
#[command(about = "Check and transcode NEON documents")]
struct Cli {
    /// Input file or directory; reads stdin when omitted or `-`
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    to: Format,

    /// Write output to file with inferred name
    #[arg(short, long)]
    write: bool,

    /// Write output to specified file
    #[arg(short, long, value_name = "FILE", conflicts_with = "write")]
    output: Option<PathBuf>,

    /// Check if input is valid (exit 0 if valid, 1 if invalid)
    #[arg(long)]
    check: bool,
}

/// Encoded document, ready to write.
enum Rendered {
    Text(String),
    Binary(Vec<u8>),
}

fn main() {
    let cli = Cli::parse();
    let input = cli.input.as_deref().filter(|path| *path != Path::new("-"));

    if let Some(path) = input {
        if path.is_dir() {
            if cli.output.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process::exit(process_directory(path, &cli));
        }
    }

    if cli.write && input.is_none() {
        eprintln!("Error: --write requires an input file");
        process::exit(1);
    }

    let source = match read_source(input) {
        Ok(source) => source,
        Err(e) => {
            match input {
                Some(path) => eprintln!("Error reading {}: {}", path.display(), e),
                None => eprintln!("Error reading stdin: {}", e),
            }
            process::exit(1);
        }
    };

    process::exit(process_input(&source, input, &cli));
}

fn read_source(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Process every `.neon` file in `dir`, in name order. Returns the exit code.
fn process_directory(dir: &Path, cli: &Cli) -> i32 {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir.display(), e);
            return 1;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map_or(false, |ext| ext == "neon"))
        .collect();
    paths.sort();

    let mut had_errors = false;
    for path in &paths {
        let exit_code = match fs::read_to_string(path) {
            Ok(source) => process_input(&source, Some(path.as_path()), cli),
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                1
            }
        };
        had_errors |= exit_code != 0;
    }

    if had_errors {
        1
    } else {
        0
    }
}

/// Decode one document and check or render it. Returns the exit code.
fn process_input(source: &str, input: Option<&Path>, cli: &Cli) -> i32 {
    let filename = input
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned());

    let doc = match decode_with_filename(source, filename.as_deref()) {
        Ok(doc) => doc,
        Err(e) => {
            match input {
                Some(path) => eprintln!("{}: {}", path.display(), e),
                None => eprintln!("Decode error: {}", e),
            }
            return 1;
        }
    };

    if cli.check {
        match input {
            Some(path) => println!("{}: ok", path.display()),
            None => println!("ok"),
        }
        return 0;
    }

    let rendered = match render(&Value::Mapping(doc), cli.to) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error: Cannot convert to {}: {}", cli.to.name(), e);
            return 1;
        }
    };

    let destination = match (&cli.output, input) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(path)) if cli.write => Some(path.with_extension(cli.to.extension())),
        _ => None,
    };

    match write_output(&rendered, destination.as_deref()) {
        Ok(()) => 0,
        Err(e) => {
            match destination {
                Some(path) => eprintln!("Error writing {}: {}", path.display(), e),
                None => eprintln!("Error writing to stdout: {}", e),
            }
            1
        }
    }
}

fn render(value: &Value, format: Format) -> Result<Rendered, String> {
    match format {
        Format::Json => transcode::json::encode(value).map(Rendered::Text),
        Format::Yaml => transcode::yaml::encode(value).map(Rendered::Text),
        Format::Toml => transcode::toml::encode(value).map(Rendered::Text),
        Format::Cbor => transcode::cbor::encode(value).map(Rendered::Binary),
        Format::Diag => {
            let bytes = transcode::cbor::encode(value)?;
            transcode::cbor::diagnostic(&bytes).map(Rendered::Text)
        }
        Format::Debug => Ok(Rendered::Text(format!("{:#?}", value))),
    }
}

/// Write to `destination`, or to stdout when there is none. Text written to
/// stdout always ends with a newline.
fn write_output(rendered: &Rendered, destination: Option<&Path>) -> io::Result<()> {
    let bytes = match rendered {
        Rendered::Text(text) => text.as_bytes(),
        Rendered::Binary(bytes) => bytes.as_slice(),
    };

    if let Some(path) = destination {
        return fs::write(path, bytes);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(bytes)?;
    if let Rendered::Text(text) = rendered {
        if !text.ends_with('\n') {
            handle.write_all(b"\n")?;
        }
    }
    handle.flush()
}

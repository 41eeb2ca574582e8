//! `trifmt` CLI: convert documents between XML, JSON and YAML.
//!
//! ## Usage
//!
//! ```sh
//! # JSON on stdin to YAML on stdout
//! echo '{"name":"Alice","tags":["a","b"]}' | trifmt --from json --to yaml
//!
//! # Formats taken from the file extensions
//! trifmt -i catalog.xml -o catalog.json
//!
//! # Compact JSON, single-line YAML, XML without declaration
//! trifmt -i data.yaml --to json --indent 0
//! trifmt -i data.json --to yaml --flow
//! trifmt -i data.json --to xml --no-declaration
//!
//! # First document of a multi-document YAML stream
//! trifmt -i stream.yaml --to json --first-document
//!
//! # List supported formats
//! trifmt formats
//! ```
//!
//! Exit status: 0 on success, 1 for I/O and usage errors, 3 for an unknown
//! format, 4 for malformed input, 5 for input using an unsupported feature,
//! 6 when the target format cannot represent the document.

use std::ffi::OsStr;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use trifmt_core::{
    ConversionError, ConvertOptions, DecodeErrorKind, DecodeOptions, EncodeOptions, ErrorKind,
    Format, DEFAULT_INDENT,
};

#[derive(Parser)]
#[command(
    name = "trifmt",
    version,
    about = "Convert documents between XML, JSON and YAML",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,

    /// Increase log verbosity (-v debug, -vv trace); logs go to stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported formats and their file extensions
    Formats,
}

#[derive(Args)]
struct ConvertArgs {
    /// Source format (xml, json, yaml, yml); defaults to the input file extension
    #[arg(long, value_name = "FORMAT")]
    from: Option<String>,

    /// Target format (xml, json, yaml, yml); defaults to the output file extension
    #[arg(long, value_name = "FORMAT")]
    to: Option<String>,

    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,

    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// Spaces per nesting level for JSON and XML output (0 for compact)
    #[arg(long, default_value_t = DEFAULT_INDENT)]
    indent: usize,

    /// Write YAML in single-line flow style
    #[arg(long)]
    flow: bool,

    /// Convert only the first document of a multi-document YAML stream
    #[arg(long)]
    first_document: bool,

    /// Omit the <?xml ...?> declaration from XML output
    #[arg(long)]
    no_declaration: bool,
}

impl ConvertArgs {
    fn options(&self) -> ConvertOptions {
        ConvertOptions::default()
            .with_decode(DecodeOptions::default().with_first_document_only(self.first_document))
            .with_encode(
                EncodeOptions::default()
                    .with_indent(self.indent)
                    .with_yaml_flow_style(self.flow)
                    .with_xml_declaration(!self.no_declaration),
            )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Some(Commands::Formats) => {
            print_formats();
            Ok(())
        }
        None => run_convert(&cli.convert),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match conversion_error(&err) {
                // The conversion error already names its cause.
                Some(conversion) => eprintln!("Error: {conversion}"),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Install a stderr fmt subscriber. `RUST_LOG` applies unless `-v` is given.
fn init_tracing(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn print_formats() {
    for format in Format::ALL {
        let extensions: Vec<String> = format
            .extensions()
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect();
        println!("{:<6}{}", format.name(), extensions.join(", "));
    }
}

fn run_convert(args: &ConvertArgs) -> Result<()> {
    // Resolve both formats before touching stdin so a usage error never
    // blocks waiting for input.
    let from = resolve_format(args.from.as_deref(), args.input.as_deref(), "--from", "input")?;
    let to = resolve_format(args.to.as_deref(), args.output.as_deref(), "--to", "output")?;
    tracing::debug!(%from, %to, "resolved formats");

    let input = read_input(args.input.as_deref())?;
    let output = trifmt_core::convert_formats(&input, from, to, &args.options())?;
    write_output(args.output.as_deref(), &output)?;
    Ok(())
}

/// An explicit tag wins; otherwise the format comes from the file extension.
fn resolve_format(
    explicit: Option<&str>,
    path: Option<&str>,
    flag: &str,
    side: &str,
) -> Result<Format> {
    if let Some(tag) = explicit {
        return Ok(tag.parse()?);
    }
    let path = path.ok_or_else(|| {
        anyhow!("{flag} is required when the {side} is a standard stream")
    })?;
    let extension = Path::new(path)
        .extension()
        .and_then(OsStr::to_str)
        .ok_or_else(|| anyhow!("cannot infer a format from '{path}'; pass {flag}"))?;
    Ok(extension.parse()?)
}

fn conversion_error(err: &anyhow::Error) -> Option<&ConversionError> {
    err.chain().find_map(|cause| cause.downcast_ref::<ConversionError>())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match conversion_error(err).map(ConversionError::kind) {
        None => 1,
        Some(ErrorKind::UnsupportedFormat) => 3,
        Some(ErrorKind::Decode(DecodeErrorKind::Syntax)) => 4,
        Some(ErrorKind::Decode(_)) => 5,
        Some(ErrorKind::Encode(_)) => 6,
    }
}

fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read file: {}", path)),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content)
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

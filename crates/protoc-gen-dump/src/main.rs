//! protoc-gen-dump - Dump what protoc parsed from your .proto files
//!
//! As a protoc plugin (`protoc --dump_out=comments=hide:. foo.proto`) it reads
//! a `CodeGeneratorRequest` from stdin, writes the report to stderr and
//! answers with an empty `CodeGeneratorResponse` on stdout. With
//! `--descriptor-set` it dumps a `FileDescriptorSet` file instead.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use prost::Message;
use prost_types::compiler::code_generator_response::Feature;
use prost_types::compiler::CodeGeneratorResponse;
use prost_types::FileDescriptorSet;
use protodump_core::{DumpConfig, Error, LineSink, SchemaProvider, WriteSink};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

/// Dump the structure and comments of protobuf schemas
#[derive(Parser, Debug)]
#[command(name = "protoc-gen-dump")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Read a FileDescriptorSet instead of a plugin request on stdin
    /// (produce one with `protoc --include_source_info -o`)
    #[arg(short, long, value_name = "FILE")]
    descriptor_set: Option<PathBuf>,

    /// Files from the descriptor set to dump (default: all)
    #[arg(short, long, value_name = "NAME", requires = "descriptor_set")]
    generate: Vec<String>,

    /// Whether to include source comments
    #[arg(long, value_enum, requires = "descriptor_set")]
    comments: Option<CommentMode>,

    /// Plugin parameter string, e.g. "comments=hide,paths=source_relative"
    #[arg(long, requires = "descriptor_set")]
    param: Option<String>,

    /// Write the report to this file instead of stderr
    #[arg(short, long, value_name = "FILE", requires = "descriptor_set")]
    output: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Comment display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CommentMode {
    /// Print leading, detached and trailing comments
    Show,
    /// Omit all comments
    Hide,
}

impl CommentMode {
    fn show_comments(self) -> bool {
        self == CommentMode::Show
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // stdout carries the plugin response, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match cli.descriptor_set {
        Some(ref path) => run_descriptor_set(&cli, path),
        None => run_plugin_stdio(),
    }
}

/// Plugin mode: request on stdin, report on stderr, response on stdout
fn run_plugin_stdio() -> Result<()> {
    let mut input = Vec::new();
    io::stdin()
        .read_to_end(&mut input)
        .context("Failed to read CodeGeneratorRequest from stdin")?;
    debug!("Read {} bytes of plugin request", input.len());

    let mut sink = WriteSink::stderr();
    let response = run_plugin(&input, &mut sink)?;

    let mut stdout = io::stdout().lock();
    stdout
        .write_all(&response.encode_to_vec())
        .context("Failed to write CodeGeneratorResponse to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;

    Ok(())
}

/// Dumps a serialized plugin request and builds the response.
///
/// Schema and parameter problems are reported to protoc through the
/// response's `error` field; only a failing report sink aborts.
fn run_plugin<S: LineSink>(input: &[u8], sink: &mut S) -> Result<CodeGeneratorResponse> {
    let mut response = CodeGeneratorResponse {
        supported_features: Some(Feature::Proto3Optional as u64),
        ..Default::default()
    };

    let result = SchemaProvider::from_request_bytes(input).and_then(|provider| provider.dump(sink));

    match result {
        Ok(()) => {}
        Err(Error::Sink(e)) => return Err(e).context("Failed to write report"),
        Err(e) => {
            info!("Reporting error to protoc: {}", e);
            response.error = Some(e.to_string());
        }
    }

    Ok(response)
}

/// Standalone mode: dump a FileDescriptorSet file
fn run_descriptor_set(cli: &Cli, path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Descriptor set does not exist: {}", path.display());
    }

    let data = fs::read(path).map_err(|e| Error::file_read(path, e))?;
    let set = FileDescriptorSet::decode(data.as_slice())
        .with_context(|| format!("Failed to decode descriptor set: {}", path.display()))?;
    info!("Loaded {} files from {}", set.file.len(), path.display());

    let mut config =
        DumpConfig::parse(cli.param.as_deref().unwrap_or("")).context("Invalid --param")?;
    if let Some(mode) = cli.comments {
        config.show_comments = mode.show_comments();
    }

    let provider = SchemaProvider::from_file_descriptor_set(set, cli.generate.clone(), config)
        .context("Failed to resolve descriptor set")?;

    match cli.output {
        Some(ref output) => {
            let file = fs::File::create(output)
                .with_context(|| format!("Failed to create file: {}", output.display()))?;
            let mut sink = WriteSink::new(io::BufWriter::new(file));
            provider
                .dump(&mut sink)
                .with_context(|| format!("Failed to write report: {}", output.display()))?;
            sink.into_inner()
                .flush()
                .with_context(|| format!("Failed to write report: {}", output.display()))?;
            info!("Wrote {}", output.display());
        }
        None => provider
            .dump(&mut WriteSink::stderr())
            .context("Failed to write report")?,
    }

    Ok(())
}

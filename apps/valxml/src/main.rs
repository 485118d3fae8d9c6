//! valxml - convert JSON documents to XML.
//!
//! Reads a JSON document from a file or stdin, converts it with the `valxml`
//! serializer and writes the XML document to stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! valxml [OPTIONS] [FILE]
//!
//! Options:
//!   --root <NAME>       Root element name (overrides VALXML_ROOT_NAME)
//!   --no-declaration    Omit the XML declaration line
//!   --check             Check that the produced document is well-formed
//!   -h, --help          Print help
//!   -V, --version       Print version
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VALXML_ROOT_NAME` | `xmlData` | Root element name |
//! | `VALXML_XML_DECLARATION` | `true` | Emit the XML declaration line |
//! | `VALXML_DATETIME_FORMAT` | `%Y-%m-%d %H:%M:%S` | Date-time pattern |
//! | `VALXML_MAX_DEPTH` | `128` | Maximum nesting depth |
//! | `VALXML_VALIDATE_NAMES` | `true` | Reject keys that are not XML names |
//! | `VALXML_STRIP_INVALID_CHARS` | `true` | Drop characters XML does not allow |
//! | `VALXML_TAG_NAMING` | `decapitalize` | `decapitalize` or `verbatim` |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use valxml::{XmlConfig, XmlSerializer, check_well_formed};

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "valxml")]
#[command(about = "Convert a JSON document to XML", long_about = None)]
#[command(version)]
struct Args {
    /// Root element name (overrides VALXML_ROOT_NAME)
    #[arg(long, value_name = "NAME")]
    root: Option<String>,

    /// Omit the `<?xml ...?>` declaration line
    #[arg(long)]
    no_declaration: bool,

    /// Check that the produced document is well-formed
    #[arg(long)]
    check: bool,

    /// JSON input file; stdin when omitted
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,
}

/// Apply command-line overrides on top of the environment configuration.
fn apply_args(mut config: XmlConfig, args: &Args) -> XmlConfig {
    if let Some(root) = &args.root {
        config.root_name.clone_from(root);
    }
    if args.no_declaration {
        config.xml_declaration = false;
    }
    config
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Convert a JSON document into XML.
fn json_to_xml(serializer: &XmlSerializer, json: &str, check: bool) -> Result<String> {
    let doc: serde_json::Value = serde_json::from_str(json).context("input is not valid JSON")?;
    let xml = serializer
        .serialize(&doc)
        .context("failed to convert document")?;
    if check {
        check_well_formed(&xml).context("produced document is not well-formed")?;
        debug!("document is well-formed");
    }
    Ok(xml)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = apply_args(XmlConfig::from_env(), &args);

    init_tracing(&config.log_level)?;

    info!(
        root = %config.root_name,
        xml_declaration = config.xml_declaration,
        tag_naming = ?config.tag_naming,
        "converting document",
    );

    let serializer = XmlSerializer::new(config).context("invalid configuration")?;
    let input = read_input(args.input.as_ref())?;
    let xml = json_to_xml(&serializer, &input, args.check)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(xml.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}

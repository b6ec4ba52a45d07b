//! lvc - parse markup documents and merge updates into them.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};

use clap::{Parser, Subcommand};
use liveview_core::{Document, EventLog, PrintOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Parse LiveView markup and merge documents or fragment diffs into it
#[derive(Parser)]
#[command(name = "lvc")]
#[command(version)]
#[command(about = "Parse LiveView markup and merge updates into it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a markup file and print the normalized tree
    #[command(visible_alias = "p")]
    Parse {
        /// Markup file
        document: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Indent the output, one node per line
        #[arg(long)]
        pretty: bool,
    },

    /// Merge a second markup file into the first and print the changes
    #[command(visible_alias = "m")]
    Merge {
        /// Markup file to merge into
        document: String,
        /// Markup file to merge from
        source: String,
        /// Output file for the merged tree (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Indent the output, one node per line
        #[arg(long)]
        pretty: bool,
    },

    /// Apply fragment diffs to a markup file, in order
    Patch {
        /// Markup file to patch; use "-" to start from an empty document
        document: String,
        /// Fragment diff JSON files
        #[arg(required = true)]
        fragments: Vec<String>,
        /// Output file for the patched tree (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
        /// Indent the output, one node per line
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            document,
            output,
            pretty,
        } => run_parse(&document, output.as_deref(), pretty),
        Commands::Merge {
            document,
            source,
            output,
            pretty,
        } => run_merge(&document, &source, output.as_deref(), pretty),
        Commands::Patch {
            document,
            fragments,
            output,
            pretty,
        } => run_patch(&document, &fragments, output.as_deref(), pretty),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn run_parse(path: &str, output_path: Option<&str>, pretty: bool) -> CliResult {
    let doc = read_document(path)?;
    info!(nodes = doc.len(), "parsed {}", path);
    write_document(&doc, output_path, pretty)
}

fn run_merge(path: &str, source_path: &str, output_path: Option<&str>, pretty: bool) -> CliResult {
    let mut doc = read_document(path)?;
    let source = read_document(source_path)?;

    let mut log = EventLog::new();
    doc.merge(&source, &mut log);
    report(&log)?;

    write_document(&doc, output_path, pretty)
}

fn run_patch(
    path: &str,
    fragment_paths: &[String],
    output_path: Option<&str>,
    pretty: bool,
) -> CliResult {
    let mut doc = if path == "-" {
        Document::empty()
    } else {
        read_document(path)?
    };

    let mut log = EventLog::new();
    for fragment_path in fragment_paths {
        let json = fs::read_to_string(fragment_path)?;
        doc.merge_fragment_json(&json, &mut log)?;
        info!(events = log.event_count(), "applied {}", fragment_path);
        report(&log)?;
        log.clear();
    }

    write_document(&doc, output_path, pretty)
}

fn read_document(path: &str) -> Result<Document, Box<dyn std::error::Error>> {
    info!("Parsing {}", path);
    let markup = fs::read_to_string(path)?;
    Ok(Document::parse(&markup)?)
}

/// Writes change events to stderr, one per line.
fn report(log: &EventLog) -> io::Result<()> {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    log.write_to(&mut handle)
}

fn write_document(doc: &Document, output_path: Option<&str>, pretty: bool) -> CliResult {
    let options = if pretty {
        PrintOptions::Pretty
    } else {
        PrintOptions::Minified
    };

    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };

    let mut printed = doc.print(options);
    if !printed.ends_with('\n') {
        printed.push('\n');
    }
    output.write_all(printed.as_bytes())?;
    output.flush()?;
    Ok(())
}

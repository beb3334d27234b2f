//! docdown CLI - Word document to Markdown converter
//!
//! Converts DOCX files to Markdown, one `name.md` per `name.docx`.

use clap::{Parser, Subcommand};
use colored::*;
use docdown::render::{classify_style, JsonFormat, RenderOptions};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Word documents to Markdown
#[derive(Parser)]
#[command(
    name = "docdown",
    version,
    about = "Convert Word documents to Markdown",
    long_about = "docdown - Convert DOCX files to Markdown.\n\n\
                  Title and Heading styles become headings, tables become pipe tables."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert documents to NAME.md files
    Convert {
        /// Input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for the Markdown files (default: next to each input)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6", value_parser = clap::value_parser!(u8).range(1..=6))]
        max_heading: u8,
    },

    /// Convert a document to Markdown
    #[command(visible_alias = "md")]
    Markdown {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6", value_parser = clap::value_parser!(u8).range(1..=6))]
        max_heading: u8,
    },

    /// Dump the parsed document as JSON
    Json {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Show document information and metadata
    Info {
        /// Input file path
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Outcome counts of a batch conversion.
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchSummary {
    created: usize,
    skipped: usize,
    failed: usize,
}

fn main() {
    env_logger::init();

    if !docdown::DOCX_SUPPORT {
        eprintln!("{}: {}", "Error".red().bold(), docdown::Error::ReaderUnavailable);
        std::process::exit(1);
    }

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Run a command. `Ok(false)` means some inputs of a batch failed.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Convert {
            inputs,
            out_dir,
            max_heading,
        } => {
            if let Some(ref dir) = out_dir {
                fs::create_dir_all(dir)?;
            }
            let options = RenderOptions::new().with_max_heading(max_heading);
            let summary = convert_batch(&inputs, out_dir.as_deref(), &options);

            log::debug!("batch finished: {:?}", summary);
            return Ok(summary.failed == 0);
        }
        Commands::Markdown {
            input,
            output,
            max_heading,
        } => {
            let pb = create_spinner("Parsing document...");

            let doc = docdown::parse_file(&input)?;
            pb.set_message("Rendering to Markdown...");

            let options = RenderOptions::new().with_max_heading(max_heading);
            let markdown = docdown::render::to_markdown(&doc, &options);

            pb.finish_and_clear();
            write_output(output.as_deref(), &markdown)?;

            if let Some(path) = output {
                println!(
                    "{} Converted to Markdown: {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }
        Commands::Json {
            input,
            output,
            compact,
        } => {
            let pb = create_spinner("Parsing document...");

            let doc = docdown::parse_file(&input)?;
            pb.set_message("Rendering to JSON...");

            let format = if compact {
                JsonFormat::Compact
            } else {
                JsonFormat::Pretty
            };
            let json = docdown::render::to_json(&doc, format)?;

            pb.finish_and_clear();
            write_output(output.as_deref(), &json)?;

            if let Some(path) = output {
                println!("{} Converted to JSON: {}", "✓".green().bold(), path.display());
            }
        }
        Commands::Info { input } => {
            let pb = create_spinner("Analyzing document...");

            if !input.exists() {
                pb.finish_and_clear();
                return Err(docdown::Error::NotFound(input).into());
            }
            let format = docdown::detect_format_from_path(&input)?;
            let doc = docdown::parse_file(&input)?;

            pb.finish_and_clear();
            print_info(&input, format, &doc);
        }
        Commands::Version => {
            print_version();
        }
    }

    Ok(true)
}

/// Convert every input, reporting each one on stdout.
fn convert_batch(inputs: &[PathBuf], out_dir: Option<&Path>, options: &RenderOptions) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for input in inputs {
        if !input.exists() {
            println!("Skip (not found): {}", input.display());
            summary.skipped += 1;
            continue;
        }

        match docdown::convert_file_with_options(input, out_dir, options) {
            Ok(written) => {
                println!("{} {}", "Created:".green(), output_name(&written));
                summary.created += 1;
            }
            Err(e) => {
                eprintln!("{} {}: {}", "Failed:".red().bold(), input.display(), e);
                summary.failed += 1;
            }
        }
    }

    summary
}

/// File name of a written Markdown file, as reported after conversion.
fn output_name(written: &Path) -> String {
    written
        .file_name()
        .unwrap_or(written.as_os_str())
        .to_string_lossy()
        .into_owned()
}

fn print_info(input: &Path, format: docdown::FormatType, doc: &docdown::Document) {
    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {}",
        "File".bold(),
        input.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}: {} (.{})", "Format".bold(), format, format.extension());

    let meta = &doc.metadata;
    for (label, value) in [
        ("Title", &meta.title),
        ("Author", &meta.author),
        ("Subject", &meta.subject),
        ("Created", &meta.created),
        ("Modified", &meta.modified),
    ] {
        if let Some(value) = value {
            println!("{}: {}", label.bold(), value);
        }
    }

    let headings = doc
        .paragraphs
        .iter()
        .filter(|p| !p.is_empty() && classify_style(p.style()).is_heading())
        .count();

    println!("\n{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Paragraphs".bold(), doc.paragraphs.len());
    println!("{}: {}", "Headings".bold(), headings);
    println!("{}: {}", "Tables".bold(), doc.tables.len());
    println!(
        "{}: {}",
        "Words".bold(),
        doc.plain_text().split_whitespace().count()
    );
}

fn print_version() {
    println!("{} {}", "docdown".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Word documents to Markdown");
    println!();
    println!("Supported formats: DOCX");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&Path>, content: &str) -> io::Result<()> {
    match path {
        Some(p) => fs::write(p, content),
        None => {
            let mut handle = io::stdout().lock();
            writeln!(handle, "{}", content)
        }
    }
}

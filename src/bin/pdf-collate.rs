//! pdf-collate CLI tool
//!
//! A command-line tool for merging PDFs and cutting page ranges out of them.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;

use pdf_collate::collection::AddOutcome;
use pdf_collate::engine::OutputPlan;
use pdf_collate::pdf::{extract_info, WriteOptions, WriteSummary};
use pdf_collate::ranges::PageRange;
use pdf_collate::session::{MergeSession, SplitSession};

/// pdf-collate - Merge PDFs and extract page ranges
#[derive(Parser)]
#[command(name = "pdf-collate")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge PDFs in order, skipping files whose content is already included
    pdf-collate merge -o combined.pdf intro.pdf \"chapters/*.pdf\" appendix.pdf

    # Keep duplicate files
    pdf-collate merge -o combined.pdf --allow-duplicates a.pdf a-copy.pdf

    # Pages 1-3 followed by page 7
    pdf-collate split report.pdf -o excerpt.pdf -r 1-3 -r 7

    # Show what would be written without writing
    pdf-collate split report.pdf -o excerpt.pdf -r 2-4 --dry-run")]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge multiple PDF files into one
    Merge {
        /// Input PDF files (in order). Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Include files whose content duplicates an earlier input
        #[arg(long)]
        allow_duplicates: bool,

        /// Drop duplicate content before writing, keeping the first copy
        #[arg(long)]
        dedupe: bool,

        /// Write streams uncompressed
        #[arg(long)]
        no_compress: bool,

        /// Print the page plan without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Write selected page ranges of one PDF to a new file
    Split {
        /// Input PDF file
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long)]
        output: PathBuf,

        /// Page range, "N" or "N-M" (1-indexed, inclusive). Repeat for more;
        /// ranges are written in the order given
        #[arg(short, long = "range", required = true)]
        ranges: Vec<String>,

        /// Write streams uncompressed
        #[arg(long)]
        no_compress: bool,

        /// Print the page plan without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Merge {
            inputs,
            output,
            allow_duplicates,
            dedupe,
            no_compress,
            dry_run,
            open,
        } => cmd_merge(MergeArgs {
            inputs,
            output,
            allow_duplicates,
            dedupe,
            no_compress,
            dry_run,
            open,
        }),
        Commands::Split {
            input,
            output,
            ranges,
            no_compress,
            dry_run,
            open,
        } => cmd_split(input, output, ranges, no_compress, dry_run, open),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Expand glob patterns in input paths
///
/// Matches of one pattern are sorted; patterns keep their command-line order.
fn expand_globs(patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched = Vec::new();
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))? {
                match entry {
                    Ok(path) => matched.push(path),
                    Err(e) => log::warn!("Glob error for {}: {}", pattern, e),
                }
            }
            if matched.is_empty() {
                bail!("No files matched pattern: {}", pattern);
            }
            matched.sort();
            paths.extend(matched);
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    Ok(paths)
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

fn write_options(no_compress: bool) -> WriteOptions {
    WriteOptions {
        compress: !no_compress,
        ..WriteOptions::default()
    }
}

fn print_plan(plan: &OutputPlan) {
    println!("Would write {} pages:", plan.len());
    for (position, entry) in plan.iter().enumerate() {
        println!(
            "  {:>4}: {} page {}",
            position + 1,
            entry.source.display(),
            entry.page_index + 1
        );
    }
}

fn finish(summary: &WriteSummary, open: bool) -> Result<()> {
    eprintln!(
        "Wrote {} pages ({} bytes) to {}",
        summary.page_count,
        summary.file_size,
        summary.output.display()
    );

    if open {
        open_file(&summary.output)?;
    }
    Ok(())
}

struct MergeArgs {
    inputs: Vec<String>,
    output: PathBuf,
    allow_duplicates: bool,
    dedupe: bool,
    no_compress: bool,
    dry_run: bool,
    open: bool,
}

/// Merge multiple PDFs into one
fn cmd_merge(args: MergeArgs) -> Result<()> {
    let inputs = expand_globs(args.inputs)?;
    let mut session = MergeSession::new(write_options(args.no_compress));

    let mut failed = 0;
    for path in &inputs {
        let collection = session.collection_mut();
        match collection.add(path) {
            Ok(AddOutcome::Added { .. }) => {}
            Ok(AddOutcome::DuplicateConflict { existing, .. }) if args.allow_duplicates => {
                log::info!("{} duplicates {}; adding anyway", path.display(), existing);
                if let Err(e) = collection.force_add(path) {
                    eprintln!("Warning: skipping {}: {}", path.display(), e);
                    failed += 1;
                }
            }
            Ok(AddOutcome::DuplicateConflict { existing, .. }) => {
                let earlier = collection
                    .get(existing)
                    .map(|doc| doc.path().display().to_string())
                    .unwrap_or_else(|| existing.to_string());
                eprintln!(
                    "Warning: skipping {}: same content as {} (use --allow-duplicates to keep it)",
                    path.display(),
                    earlier
                );
            }
            Err(e) => {
                eprintln!("Warning: skipping {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if args.dedupe {
        let removed = session.collection_mut().remove_duplicates();
        if removed > 0 {
            eprintln!("Removed {} duplicate files", removed);
        }
    }

    let collection = session.collection();
    if collection.is_empty() {
        bail!("None of the {} inputs could be loaded", inputs.len());
    }
    for doc in collection.iter() {
        let marker = if doc.is_duplicate() { " [duplicate]" } else { "" };
        log::info!("{}{}", doc.label(), marker);
    }

    eprintln!(
        "Merging {} PDF files ({} pages)...",
        collection.len(),
        collection.total_pages()
    );
    if failed > 0 {
        eprintln!("{} inputs could not be loaded", failed);
    }

    if args.dry_run {
        print_plan(&session.plan());
        return Ok(());
    }

    let summary = session
        .export(&args.output)
        .with_context(|| format!("Failed to merge into {}", args.output.display()))?;
    finish(&summary, args.open)
}

/// Write page ranges of one PDF to a new file
fn cmd_split(
    input: PathBuf,
    output: PathBuf,
    ranges: Vec<String>,
    no_compress: bool,
    dry_run: bool,
    open: bool,
) -> Result<()> {
    let mut session = SplitSession::new(write_options(no_compress));
    let total_pages = session.load(&input)?;

    for expr in &ranges {
        let range = PageRange::parse(expr, total_pages)?;
        session.add_range(range.start(), range.end())?;
    }

    eprintln!(
        "Selected {} ranges from {} ({} pages)",
        session.ranges().len(),
        input.display(),
        total_pages
    );
    for entry in session.ranges().iter() {
        log::info!("{}: {}", entry.id, entry.range);
    }

    if dry_run {
        print_plan(&session.plan()?);
        return Ok(());
    }

    let summary = session
        .export(&output)
        .with_context(|| format!("Failed to split into {}", output.display()))?;
    finish(&summary, open)
}

/// Show information about a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let info = extract_info(&input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", info.page_count);
    println!("SHA-256: {}", info.fingerprint);

    if let Some(title) = info.title {
        println!("Title: {}", title);
    }
    if let Some(author) = info.author {
        println!("Author: {}", author);
    }

    Ok(())
}

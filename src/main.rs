//! alnscore - Pairwise Alignment Scoring
//!
//! Scores every pair of sequences in an aligned FASTA file.
//!
//! ## Usage
//!
//! ```bash
//! alnscore <alignment.fasta>
//! alnscore <alignment.fasta> -p params.txt -o scores.txt
//! alnscore <alignment.fasta> -o -            # Write to stdout
//! ```
//!
//! ## Parameter File
//!
//! ```text
//! match_score = 1
//! transition = -1
//! transversion = -2
//! gap_penalty = -1
//! ```

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info};

use alnscore::fasta::{is_fasta_path, parse_fasta_file, FASTA_EXTENSIONS};
use alnscore::params::{load_params_file, ScoringParams};
use alnscore::report::write_report;
use alnscore::scoring::score_all_with_threads;

/// Output path used when -o/--output is not given.
const DEFAULT_OUTPUT: &str = "output_fasta.txt";

/// alnscore - Pairwise identity and substitution scores for aligned FASTA files
///
/// Every pair of sequences is scored column by column: matches, transitions
/// (A<->G, C<->T), transversions and gaps are weighted; columns holding N or
/// a gap on both sides are disregarded.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Aligned FASTA file (.fasta, .fas, .fa, .fna, .ffn, .faa, .mpfa, .frn)
    input: PathBuf,

    /// Parameter file (.txt) overriding match_score, transition, transversion or gap_penalty
    #[arg(short = 'p', long = "params")]
    params: Option<PathBuf>,

    /// Output file (.txt). Use "-" for stdout.
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    output: String,

    /// Overwrite the output file if it already exists
    #[arg(long = "force")]
    force: bool,

    /// Number of threads used to score pairs
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    threads: usize,
}

fn has_txt_extension(path: &Path) -> bool {
    path.extension().map(|ext| ext.eq_ignore_ascii_case("txt")).unwrap_or(false)
}

/// Checks paths before any work is done.
fn validate_args(args: &Args) -> Result<()> {
    if !args.input.exists() {
        bail!("The input file does not exist: {}", args.input.display());
    }
    if !is_fasta_path(&args.input) {
        bail!(
            "The input file must be a FASTA file (extensions: {})",
            FASTA_EXTENSIONS.join(", ")
        );
    }

    if let Some(params) = &args.params {
        if !has_txt_extension(params) {
            bail!("The parameters file must be a text file (.txt): {}", params.display());
        }
    }

    if args.output != "-" {
        let output = Path::new(&args.output);
        if !has_txt_extension(output) {
            bail!("The output file must be a .txt file: {}", args.output);
        }
        if output.exists() && args.output != DEFAULT_OUTPUT && !args.force {
            bail!(
                "The output path \"{}\" already contains a file (use --force to overwrite)",
                args.output
            );
        }
    }

    if args.threads == 0 {
        bail!("Thread count must be at least 1");
    }

    Ok(())
}

/// Creates a buffered writer over the output file, or stdout for "-".
fn get_writer(output: &str) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(output)
            .with_context(|| format!("Failed to create output file {}", output))?;
        Box::new(BufWriter::new(file))
    };
    Ok(writer)
}

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let args = Args::parse();
    validate_args(&args)?;

    let alignment = parse_fasta_file(&args.input)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    info!(
        "Loaded {} sequences of length {}",
        alignment.sequence_count(),
        alignment.alignment_length()
    );

    let params = match &args.params {
        Some(path) => load_params_file(path)
            .with_context(|| format!("Failed to load parameters from {}", path.display()))?,
        None => ScoringParams::default(),
    };

    let summaries = score_all_with_threads(&alignment, &params, args.threads)?;
    info!("Scored {} pairs", summaries.len());

    // Nothing is written unless every pair scored
    let mut writer = get_writer(&args.output)?;
    write_report(&mut writer, &summaries)?;
    if args.output != "-" {
        info!("Wrote scores to {}", args.output);
    }

    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));
        std::process::exit(1);
    }
}

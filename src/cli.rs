//! Command-line surface for discovery and scoring runs

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use crate::analysis::{
    discover, parse_length_spec, render_discovery_fasta, render_discovery_table,
    render_scoring_table, score, write_output, AnalysisError, DiscoverParams, ProgressUpdate,
    ScoreParams, SequenceSet, Threshold, ThreadCount,
};

#[derive(Debug, Parser)]
#[command(
    name = "oligofind",
    version,
    about = "Find and score specific primer/probe candidates against target and reference sequence sets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print progress information to the console
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enumerate candidate oligos prevalent in a target set and rare in a
    /// reference set
    Discover(DiscoverArgs),
    /// Score existing oligos against a reference set, tolerating mismatches
    Score(ScoreArgs),
}

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Fasta file with the sequences the oligos should match
    #[arg(short, long)]
    pub target: PathBuf,

    /// Fasta file with the sequences the oligos should not match
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Output prefix; writes <PREFIX>.tsv and <PREFIX>.fasta
    #[arg(short, long)]
    pub output: PathBuf,

    /// Oligo length(s): a range like '18-22' or an explicit list like
    /// '18+20+22'
    #[arg(short, long, default_value = "18-22")]
    pub length: String,

    /// Minimum fraction of target sequences containing the oligo (0-1)
    /// [default: 0.8]
    #[arg(short = 'm', long)]
    pub min_target: Option<f64>,

    /// Maximum fraction of reference sequences containing the oligo (0-1)
    /// [default: 0.001]
    #[arg(short = 's', long)]
    pub max_reference: Option<f64>,

    /// Same as --min-target but as an absolute sequence count; overrides the
    /// fractional variant
    #[arg(short = 'M', long)]
    pub min_target_abs: Option<u64>,

    /// Same as --max-reference but as an absolute sequence count; overrides
    /// the fractional variant
    #[arg(short = 'S', long)]
    pub max_reference_abs: Option<u64>,

    /// Also report the reverse complement of each oligo, for reverse primers
    /// or probes
    #[arg(short, long)]
    pub probe: bool,

    /// Number of worker threads [default: all cores]
    #[arg(long)]
    pub threads: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Fasta file with the primers/probes to score
    #[arg(short = 'f', long)]
    pub oligos: PathBuf,

    /// Reference fasta file to look against
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Output file [default: oligos file with '_log.tsv' extension]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of tolerated mismatches; scores k = 1 up to this value
    #[arg(short = 'm', long, default_value_t = 2)]
    pub max_mismatch: u8,

    /// Reverse-complement the oligos before searching
    #[arg(short, long)]
    pub probe: bool,

    /// Number of worker threads [default: all cores]
    #[arg(long)]
    pub threads: Option<usize>,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Discover(args) => run_discover(args, cli.verbose),
        Command::Score(args) => run_score(args, cli.verbose),
    }
}

fn run_discover(args: DiscoverArgs, verbose: bool) -> anyhow::Result<()> {
    // Configuration is validated before any file is read
    let params = DiscoverParams {
        lengths: parse_length_spec(&args.length)?,
        min_target: resolve_threshold(args.min_target, args.min_target_abs, 0.8, "min-target")?,
        max_reference: resolve_threshold(
            args.max_reference,
            args.max_reference_abs,
            0.001,
            "max-reference",
        )?,
        reverse_complement: args.probe,
        thread_count: thread_count(args.threads),
    };

    let target = SequenceSet::load(&args.target)?;
    info!("target set '{}': {} sequences", args.target.display(), target.len());
    if target.has_gaps() {
        warn!("'{}' contains gaps", args.target.display());
    }

    let reference = SequenceSet::load(&args.reference)?;
    info!(
        "reference set '{}': {} sequences",
        args.reference.display(),
        reference.len()
    );
    if reference.has_gaps() {
        warn!("'{}' contains gaps", args.reference.display());
    }

    let (progress, reporter) = progress_reporter(verbose);
    let results = discover(&target, &reference, &params, progress.as_ref(), None);
    drop(progress);
    if let Some(handle) = reporter {
        let _ = handle.join();
    }
    let results = results?;

    let table_path = with_suffix(&args.output, ".tsv");
    let fasta_path = with_suffix(&args.output, ".fasta");
    write_output(&table_path, &render_discovery_table(&results, args.probe))
        .with_context(|| format!("failed to write '{}'", table_path.display()))?;
    write_output(&fasta_path, &render_discovery_fasta(&results))
        .with_context(|| format!("failed to write '{}'", fasta_path.display()))?;

    info!(
        "{} candidate oligos written to '{}' and '{}'",
        results.candidates.len(),
        table_path.display(),
        fasta_path.display()
    );
    Ok(())
}

fn run_score(args: ScoreArgs, verbose: bool) -> anyhow::Result<()> {
    if args.max_mismatch == 0 {
        return Err(
            AnalysisError::Config("maximum mismatch count must be at least 1".to_string()).into(),
        );
    }
    let params = ScoreParams {
        max_mismatches: args.max_mismatch,
        reverse_complement: args.probe,
        thread_count: thread_count(args.threads),
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| derive_scoring_output(&args.oligos));

    let oligos = SequenceSet::load(&args.oligos)?;
    info!("oligos '{}': {} sequences", args.oligos.display(), oligos.len());
    if oligos.has_gaps() {
        warn!(
            "'{}' is aligned; gaps will be removed for pattern matching",
            args.oligos.display()
        );
    }

    let reference = SequenceSet::load(&args.reference)?;
    info!(
        "reference set '{}': {} sequences",
        args.reference.display(),
        reference.len()
    );
    if reference.has_gaps() {
        warn!(
            "'{}' is aligned; gaps will be removed for pattern matching",
            args.reference.display()
        );
    }

    let (progress, reporter) = progress_reporter(verbose);
    let results = score(&oligos, &reference, &params, progress.as_ref(), None);
    drop(progress);
    if let Some(handle) = reporter {
        let _ = handle.join();
    }
    let results = results?;

    write_output(&output, &render_scoring_table(&results))
        .with_context(|| format!("failed to write '{}'", output.display()))?;

    info!(
        "{} oligos scored against {} reference sequences, written to '{}'",
        results.oligos.len(),
        results.reference_size,
        output.display()
    );
    Ok(())
}

/// Pick between the fractional and absolute variants of a threshold. When
/// both are supplied the absolute one wins, with a warning.
fn resolve_threshold(
    fraction: Option<f64>,
    absolute: Option<u64>,
    default: f64,
    name: &str,
) -> Result<Threshold, AnalysisError> {
    if let Some(f) = fraction {
        if !(0.0..=1.0).contains(&f) {
            return Err(AnalysisError::Config(format!(
                "--{name} must be between 0 and 1, got {f}"
            )));
        }
    }
    match (absolute, fraction) {
        (Some(n), Some(_)) => {
            warn!("--{name}-abs overrides --{name}; taking the absolute value");
            Ok(Threshold::Absolute(n))
        }
        (Some(n), None) => Ok(Threshold::Absolute(n)),
        (None, Some(f)) => Ok(Threshold::Fraction(f)),
        (None, None) => Ok(Threshold::Fraction(default)),
    }
}

fn thread_count(threads: Option<usize>) -> ThreadCount {
    match threads {
        Some(n) if n > 0 => ThreadCount::Fixed(n),
        _ => ThreadCount::Auto,
    }
}

/// When verbose, forward analysis progress updates to the log from a
/// dedicated thread so the hot loops never block on console output.
fn progress_reporter(
    verbose: bool,
) -> (Option<mpsc::Sender<ProgressUpdate>>, Option<thread::JoinHandle<()>>) {
    if !verbose {
        return (None, None);
    }
    let (tx, rx) = mpsc::channel::<ProgressUpdate>();
    let handle = thread::spawn(move || {
        for update in rx {
            info!("{}", update.message);
        }
    });
    (Some(tx), Some(handle))
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// Default scoring output: the oligos file name with its extension replaced
/// by `_log.tsv`.
fn derive_scoring_output(oligos: &Path) -> PathBuf {
    let stem = oligos
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "oligos".to_string());
    oligos.with_file_name(format!("{stem}_log.tsv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_threshold_default() {
        assert_eq!(
            resolve_threshold(None, None, 0.8, "min-target").unwrap(),
            Threshold::Fraction(0.8)
        );
    }

    #[test]
    fn test_resolve_threshold_absolute_wins() {
        assert_eq!(
            resolve_threshold(Some(0.5), Some(3), 0.8, "min-target").unwrap(),
            Threshold::Absolute(3)
        );
    }

    #[test]
    fn test_resolve_threshold_out_of_range() {
        assert!(resolve_threshold(Some(1.5), None, 0.8, "min-target").is_err());
        assert!(resolve_threshold(Some(-0.1), None, 0.8, "min-target").is_err());
    }

    #[test]
    fn test_derive_scoring_output() {
        assert_eq!(
            derive_scoring_output(Path::new("probes.fasta")),
            PathBuf::from("probes_log.tsv")
        );
        assert_eq!(
            derive_scoring_output(Path::new("dir/probes.fa")),
            PathBuf::from("dir/probes_log.tsv")
        );
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(with_suffix(Path::new("out/run1"), ".tsv"), PathBuf::from("out/run1.tsv"));
    }

    #[test]
    fn test_cli_parses_discover() {
        let cli = Cli::try_parse_from([
            "oligofind", "discover", "-t", "t.fasta", "-r", "r.fasta", "-o", "out", "-l",
            "18+20", "-M", "5", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Discover(args) => {
                assert_eq!(args.length, "18+20");
                assert_eq!(args.min_target_abs, Some(5));
                assert!(!args.probe);
            }
            _ => panic!("expected discover subcommand"),
        }
    }

    #[test]
    fn test_cli_parses_score() {
        let cli = Cli::try_parse_from([
            "oligofind", "score", "-f", "probes.fasta", "-r", "r.fasta", "-m", "3", "-p",
        ])
        .unwrap();
        match cli.command {
            Command::Score(args) => {
                assert_eq!(args.max_mismatch, 3);
                assert!(args.probe);
                assert!(args.output.is_none());
            }
            _ => panic!("expected score subcommand"),
        }
    }
}

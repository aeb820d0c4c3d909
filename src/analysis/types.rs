//! Data types for oligo discovery and scoring

use serde::{Deserialize, Serialize};

use super::error::{AnalysisError, Result};

/// A prevalence threshold, interpreted either as a fraction of the set size
/// or as an absolute sequence count. Which interpretation applies is fixed
/// per parameter for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    /// count / |set|, in [0, 1]
    Fraction(f64),
    /// absolute number of member sequences
    Absolute(u64),
}

impl Threshold {
    /// Fraction of a set covered by `count`. An empty set yields 0.0 rather
    /// than a division error.
    pub fn fraction(count: u64, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    }

    /// True if `count` out of `total` clears this threshold as a minimum.
    pub fn met_as_minimum(&self, count: u64, total: usize) -> bool {
        match self {
            Self::Fraction(f) => Self::fraction(count, total) >= *f,
            Self::Absolute(n) => count >= *n,
        }
    }

    /// True if `count` out of `total` stays within this threshold as a maximum.
    pub fn met_as_maximum(&self, count: u64, total: usize) -> bool {
        match self {
            Self::Fraction(f) => Self::fraction(count, total) <= *f,
            Self::Absolute(n) => count <= *n,
        }
    }
}

/// Thread count configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadCount {
    /// Use all available CPU cores
    Auto,
    /// Use a specific number of threads
    Fixed(usize),
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::Auto
    }
}

impl ThreadCount {
    /// Get the actual number of threads to use
    pub fn get_count(&self) -> usize {
        match self {
            Self::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Self::Fixed(n) => *n,
        }
    }
}

/// Parameters for candidate discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverParams {
    /// Window widths to try, ascending
    pub lengths: Vec<usize>,
    /// Minimum prevalence in the target set
    pub min_target: Threshold,
    /// Maximum prevalence in the reference set
    pub max_reference: Threshold,
    /// Report the reverse complement of each accepted candidate
    pub reverse_complement: bool,
    pub thread_count: ThreadCount,
}

/// Parameters for approximate-match scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreParams {
    /// Mismatch budgets 1..=max are scored
    pub max_mismatches: u8,
    /// Reverse-complement every oligo before matching
    pub reverse_complement: bool,
    pub thread_count: ThreadCount,
}

/// An accepted candidate oligo with its exact-match prevalence and metrics.
/// Never mutated after creation; `id` carries the 1-based discovery index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateOligo {
    pub id: String,
    pub length: usize,
    pub sequence: String,
    /// Present only when reverse-complement reporting is enabled
    pub reverse_complement: Option<String>,
    /// GC fraction, rounded to 4 decimal places
    pub gc: f64,
    /// Approximate melting temperature, rounded to 2 decimal places
    pub tm: f64,
    pub target_hits: u64,
    pub target_fraction: f64,
    pub reference_hits: u64,
    pub reference_fraction: f64,
}

/// Complete discovery results, in discovery order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResults {
    pub candidates: Vec<CandidateOligo>,
    pub target_size: usize,
    pub reference_size: usize,
}

/// Approximate-match prevalence of one oligo at one mismatch budget
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MismatchScore {
    pub mismatches: u8,
    pub hits: u64,
    pub fraction: f64,
}

/// Scores for one oligo at every mismatch budget 1..=K, k ascending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OligoScore {
    pub id: String,
    /// The sequence actually matched (gap-stripped, possibly
    /// reverse-complemented)
    pub sequence: String,
    pub scores: Vec<MismatchScore>,
}

/// Complete scoring results, in oligo input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringResults {
    pub oligos: Vec<OligoScore>,
    pub reference_size: usize,
    pub max_mismatches: u8,
}

/// Progress update during analysis
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// Parse a length specification: a single length (`"20"`), a contiguous
/// range (`"18-22"`) or an explicit list (`"18+20+22"`). Mixing both
/// syntaxes is rejected. The result is ascending and deduplicated.
pub fn parse_length_spec(spec: &str) -> Result<Vec<usize>> {
    let spec = spec.trim();
    let has_range = spec.contains('-');
    let has_list = spec.contains('+');

    if has_range && has_list {
        return Err(AnalysisError::Config(format!(
            "length '{spec}' mixes range ('-') and list ('+') syntax; use one or the other"
        )));
    }

    let parse_one = |s: &str| -> Result<usize> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| AnalysisError::Config(format!("invalid length '{s}'")))?;
        if n == 0 {
            return Err(AnalysisError::Config("length must be positive".to_string()));
        }
        Ok(n)
    };

    let mut lengths = if has_range {
        let (lo, hi) = spec
            .split_once('-')
            .ok_or_else(|| AnalysisError::Config(format!("invalid length range '{spec}'")))?;
        let (lo, hi) = (parse_one(lo)?, parse_one(hi)?);
        if lo > hi {
            return Err(AnalysisError::Config(format!(
                "length range '{spec}' is reversed"
            )));
        }
        (lo..=hi).collect()
    } else if has_list {
        spec.split('+').map(parse_one).collect::<Result<Vec<_>>>()?
    } else {
        vec![parse_one(spec)?]
    };

    lengths.sort_unstable();
    lengths.dedup();
    Ok(lengths)
}

//! Approximate-match scoring against a reference set
//!
//! For each oligo and each mismatch budget k = 1..K, counts the reference
//! sequences containing at least one substring within edit distance k of the
//! oligo (insertions, deletions and substitutions each count one unit).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use bio::pattern_matching::myers::{self, Myers};
use rayon::prelude::*;

use super::dna::{is_standard_base, reverse_complement, strip_gaps};
use super::error::{AnalysisError, Result};
use super::fasta::SequenceSet;
use super::types::{
    MismatchScore, OligoScore, ProgressUpdate, ScoreParams, ScoringResults, Threshold,
};

/// Bit-parallel bounded-edit-distance matcher for one oligo. The standard
/// Myers automaton covers patterns up to 64 bases; the block-based variant
/// covers anything longer.
#[derive(Clone)]
enum OligoPattern {
    Short(Myers<u64>),
    Long(myers::long::Myers<u64>),
}

impl OligoPattern {
    fn build(pattern: &[u8]) -> Self {
        if pattern.len() <= 64 {
            Self::Short(Myers::<u64>::new(pattern))
        } else {
            Self::Long(myers::long::Myers::<u64>::new(pattern))
        }
    }

    /// Minimum edit distance of any approximate occurrence of the pattern in
    /// `text`, or None if no occurrence is within `max` edits.
    fn min_distance(&mut self, text: &[u8], max: u8) -> Option<u8> {
        match self {
            Self::Short(m) => m.find_all_end(text, max).map(|(_, dist)| dist).min(),
            Self::Long(m) => m
                .find_all_end(text, max as usize)
                .map(|(_, dist)| dist as u8)
                .min(),
        }
    }
}

/// Score a list of oligos against a reference set.
///
/// Oligos are processed in input order; gaps are stripped from both the
/// oligos and the reference sequences before matching. An oligo containing
/// anything other than A, C, G, T after gap stripping aborts the run with a
/// `Data` error rather than being silently mis-scored.
///
/// A sequence counts at most once per k regardless of how many approximate
/// occurrences it contains; counts per k are derived from one bounded
/// min-distance pass per (oligo, sequence) pair, which by monotonicity gives
/// the same result as scoring each k independently.
pub fn score(
    oligos: &SequenceSet,
    reference: &SequenceSet,
    params: &ScoreParams,
    progress: Option<&Sender<ProgressUpdate>>,
    cancel: Option<&AtomicBool>,
) -> Result<ScoringResults> {
    if params.max_mismatches == 0 {
        return Err(AnalysisError::Config(
            "maximum mismatch count must be at least 1".to_string(),
        ));
    }
    let max_k = params.max_mismatches;

    let queries = prepare_oligos(oligos, params.reverse_complement)?;
    let reference = reference.without_gaps();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.thread_count.get_count())
        .build()
        .or_else(|_| rayon::ThreadPoolBuilder::new().build())
        .map_err(|e| AnalysisError::Config(format!("failed to build thread pool: {e}")))?;

    let mut results: Vec<OligoScore> = Vec::with_capacity(queries.len());

    for (oligo_idx, (id, sequence)) in queries.iter().enumerate() {
        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Err(AnalysisError::Cancelled);
        }

        let pattern = OligoPattern::build(sequence.as_bytes());
        let hits_per_k: Vec<u64> = pool.install(|| {
            reference
                .records()
                .par_iter()
                .map_with(pattern.clone(), |pat, record| {
                    pat.min_distance(record.sequence.as_bytes(), max_k)
                })
                .fold(
                    || vec![0u64; max_k as usize],
                    |mut acc, best| {
                        if let Some(dist) = best {
                            for k in dist.max(1)..=max_k {
                                acc[k as usize - 1] += 1;
                            }
                        }
                        acc
                    },
                )
                .reduce(
                    || vec![0u64; max_k as usize],
                    |mut a, b| {
                        for (x, y) in a.iter_mut().zip(b) {
                            *x += y;
                        }
                        a
                    },
                )
        });

        let scores = (1..=max_k)
            .map(|k| {
                let hits = hits_per_k[k as usize - 1];
                MismatchScore {
                    mismatches: k,
                    hits,
                    fraction: Threshold::fraction(hits, reference.len()),
                }
            })
            .collect();

        results.push(OligoScore {
            id: id.clone(),
            sequence: sequence.clone(),
            scores,
        });

        if let Some(tx) = progress {
            let _ = tx.send(ProgressUpdate {
                current: oligo_idx + 1,
                total: queries.len(),
                message: format!("scored oligo {}/{} ('{}')", oligo_idx + 1, queries.len(), id),
            });
        }
    }

    Ok(ScoringResults {
        oligos: results,
        reference_size: reference.len(),
        max_mismatches: max_k,
    })
}

/// Normalize oligos for matching: strip gaps, optionally reverse-complement,
/// and validate the remaining alphabet.
fn prepare_oligos(
    oligos: &SequenceSet,
    do_reverse_complement: bool,
) -> Result<Vec<(String, String)>> {
    oligos
        .iter()
        .map(|record| {
            let mut sequence = strip_gaps(&record.sequence);
            if sequence.is_empty() {
                return Err(AnalysisError::Data {
                    id: record.id.clone(),
                    reason: "empty after gap removal".to_string(),
                });
            }
            if let Some(bad) = sequence.bytes().find(|&b| !is_standard_base(b)) {
                return Err(AnalysisError::Data {
                    id: record.id.clone(),
                    reason: format!("contains invalid character '{}'", bad as char),
                });
            }
            if do_reverse_complement {
                sequence = reverse_complement(&sequence);
            }
            Ok((record.id.clone(), sequence))
        })
        .collect()
}

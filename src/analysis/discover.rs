//! Exact-match candidate enumeration
//!
//! Slides a window of each requested width across every target sequence and
//! keeps the substrings that are prevalent in the target set while staying
//! rare in the reference set.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use super::dna::reverse_complement;
use super::error::{AnalysisError, Result};
use super::fasta::SequenceSet;
use super::index::SubstringIndex;
use super::metrics::{gc_fraction, melting_temperature};
use super::types::{
    CandidateOligo, DiscoverParams, DiscoveryResults, ProgressUpdate, Threshold,
};

/// Enumerate candidate oligos.
///
/// Candidates are emitted in discovery order: lengths ascending, then target
/// sequences in file order, then window start ascending. The 1-based
/// discovery index is carried in the candidate id (`oligo1`, `oligo2`, ...)
/// and is deterministic regardless of thread count: only the prevalence
/// indexes are built in parallel, the enumeration itself is sequential.
pub fn discover(
    target: &SequenceSet,
    reference: &SequenceSet,
    params: &DiscoverParams,
    progress: Option<&Sender<ProgressUpdate>>,
    cancel: Option<&AtomicBool>,
) -> Result<DiscoveryResults> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.thread_count.get_count())
        .build()
        .or_else(|_| rayon::ThreadPoolBuilder::new().build())
        .map_err(|e| AnalysisError::Config(format!("failed to build thread pool: {e}")))?;

    let mut candidates: Vec<CandidateOligo> = Vec::new();
    let mut discovery_index = 0usize;

    for &length in &params.lengths {
        if is_cancelled(cancel) {
            return Err(AnalysisError::Cancelled);
        }

        let target_index = pool.install(|| SubstringIndex::build(target, length));
        let reference_index = pool.install(|| SubstringIndex::build(reference, length));

        // Memoizes every substring already decided at this width, accepted
        // or not. Identical text at different widths cannot collide, so a
        // per-length set is enough.
        let mut evaluated: HashSet<&str> = HashSet::new();

        for (seq_idx, record) in target.iter().enumerate() {
            if is_cancelled(cancel) {
                return Err(AnalysisError::Cancelled);
            }

            let seq = record.sequence.as_str();
            if seq.len() >= length {
                for start in 0..=seq.len() - length {
                    let window = &seq[start..start + length];
                    if !evaluated.insert(window) {
                        continue;
                    }

                    let target_hits = target_index.sequences_containing(window.as_bytes());
                    if !params.min_target.met_as_minimum(target_hits, target.len()) {
                        continue;
                    }
                    let reference_hits =
                        reference_index.sequences_containing(window.as_bytes());
                    if !params
                        .max_reference
                        .met_as_maximum(reference_hits, reference.len())
                    {
                        continue;
                    }

                    discovery_index += 1;
                    candidates.push(CandidateOligo {
                        id: format!("oligo{discovery_index}"),
                        length,
                        sequence: window.to_string(),
                        reverse_complement: params
                            .reverse_complement
                            .then(|| reverse_complement(window)),
                        gc: gc_fraction(window),
                        tm: melting_temperature(window),
                        target_hits,
                        target_fraction: Threshold::fraction(target_hits, target.len()),
                        reference_hits,
                        reference_fraction: Threshold::fraction(
                            reference_hits,
                            reference.len(),
                        ),
                    });
                }
            }

            if let Some(tx) = progress {
                let done = seq_idx + 1;
                if done % 10 == 0 || done == target.len() {
                    let _ = tx.send(ProgressUpdate {
                        current: done,
                        total: target.len(),
                        message: format!(
                            "length {}: sequence {}/{}, {} candidates so far",
                            length,
                            done,
                            target.len(),
                            candidates.len()
                        ),
                    });
                }
            }
        }
    }

    Ok(DiscoveryResults {
        candidates,
        target_size: target.len(),
        reference_size: reference.len(),
    })
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|c| c.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::ThreadCount;

    fn set(records: &[(&str, &str)]) -> SequenceSet {
        let text: String = records
            .iter()
            .map(|(id, seq)| format!(">{id}\n{seq}\n"))
            .collect();
        SequenceSet::parse(&text).unwrap()
    }

    fn params(lengths: Vec<usize>, min_target: Threshold, max_reference: Threshold) -> DiscoverParams {
        DiscoverParams {
            lengths,
            min_target,
            max_reference,
            reverse_complement: false,
            thread_count: ThreadCount::Fixed(2),
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let target = set(&[("seq1", "ACGTACGTAA"), ("seq2", "ACGTACGTAC")]);
        let reference = set(&[("ref1", "TTTTTTTTTT")]);
        let p = params(vec![4], Threshold::Fraction(1.0), Threshold::Absolute(0));

        let results = discover(&target, &reference, &p, None, None).unwrap();
        let sequences: Vec<&str> =
            results.candidates.iter().map(|c| c.sequence.as_str()).collect();
        // Discovery order: seq1 windows left to right, duplicates and
        // below-threshold windows skipped
        assert_eq!(sequences, vec!["ACGT", "CGTA", "GTAC", "TACG"]);
        let ids: Vec<&str> = results.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["oligo1", "oligo2", "oligo3", "oligo4"]);
        for c in &results.candidates {
            assert_eq!(c.target_hits, 2);
            assert_eq!(c.target_fraction, 1.0);
            assert_eq!(c.reference_hits, 0);
            assert_eq!(c.reference_fraction, 0.0);
        }
    }

    #[test]
    fn test_every_candidate_satisfies_thresholds() {
        let target = set(&[
            ("s1", "ACGTACGTAA"),
            ("s2", "ACGTACCTAC"),
            ("s3", "TTGTACGTTT"),
        ]);
        let reference = set(&[("r1", "ACGTACGTAA"), ("r2", "GGGGGGGGGG")]);
        let p = params(vec![4, 5], Threshold::Fraction(0.6), Threshold::Fraction(0.5));

        let results = discover(&target, &reference, &p, None, None).unwrap();
        assert!(!results.candidates.is_empty());
        for c in &results.candidates {
            assert!(c.target_fraction >= 0.6, "{c:?}");
            assert!(c.reference_fraction <= 0.5, "{c:?}");
        }
    }

    #[test]
    fn test_idempotent() {
        let target = set(&[("s1", "ACGTACGTAA"), ("s2", "ACGTACCTAC")]);
        let reference = set(&[("r1", "TTTTTTTTTT")]);
        let p = params(vec![4, 5], Threshold::Fraction(0.5), Threshold::Absolute(0));

        let a = discover(&target, &reference, &p, None, None).unwrap();
        let b = discover(&target, &reference, &p, None, None).unwrap();
        assert_eq!(a.candidates.len(), b.candidates.len());
        for (x, y) in a.candidates.iter().zip(&b.candidates) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.sequence, y.sequence);
        }
    }

    #[test]
    fn test_lengths_ascending_governs_ordering() {
        let target = set(&[("s1", "ACGTA")]);
        let reference = set(&[("r1", "GGGGG")]);
        let p = params(vec![4, 5], Threshold::Fraction(1.0), Threshold::Absolute(0));

        let results = discover(&target, &reference, &p, None, None).unwrap();
        let lengths: Vec<usize> = results.candidates.iter().map(|c| c.length).collect();
        assert_eq!(lengths, vec![4, 4, 5]);
    }

    #[test]
    fn test_target_shorter_than_window() {
        let target = set(&[("s1", "ACG")]);
        let reference = set(&[("r1", "TTTT")]);
        let p = params(vec![4], Threshold::Fraction(0.0), Threshold::Fraction(1.0));

        let results = discover(&target, &reference, &p, None, None).unwrap();
        assert!(results.candidates.is_empty());
    }

    #[test]
    fn test_absolute_thresholds() {
        let target = set(&[("s1", "ACGTAA"), ("s2", "ACGTCC"), ("s3", "GGGCCC")]);
        let reference = set(&[("r1", "ACGTAA"), ("r2", "TTTTTT")]);
        let p = params(vec![4], Threshold::Absolute(2), Threshold::Absolute(1));

        let results = discover(&target, &reference, &p, None, None).unwrap();
        // ACGT: 2 target hits, 1 reference hit -> accepted
        assert!(results.candidates.iter().any(|c| c.sequence == "ACGT"));
        for c in &results.candidates {
            assert!(c.target_hits >= 2);
            assert!(c.reference_hits <= 1);
        }
    }

    #[test]
    fn test_reverse_complement_column() {
        let target = set(&[("s1", "AACG")]);
        let reference = set(&[("r1", "TTTT")]);
        let mut p = params(vec![4], Threshold::Fraction(1.0), Threshold::Absolute(0));
        p.reverse_complement = true;

        let results = discover(&target, &reference, &p, None, None).unwrap();
        assert_eq!(
            results.candidates[0].reverse_complement.as_deref(),
            Some("CGTT")
        );
    }

    #[test]
    fn test_metrics_populated() {
        let target = set(&[("s1", "ACGT")]);
        let reference = set(&[("r1", "TTTT")]);
        let p = params(vec![4], Threshold::Fraction(1.0), Threshold::Absolute(0));

        let results = discover(&target, &reference, &p, None, None).unwrap();
        let c = &results.candidates[0];
        assert_eq!(c.gc, 0.5);
        // 2*(A+T) + 4*(G+C) = 2*2 + 4*2 = 12
        assert_eq!(c.tm, 12.0);
    }

    #[test]
    fn test_cancellation() {
        let target = set(&[("s1", "ACGTACGT")]);
        let reference = set(&[("r1", "TTTT")]);
        let p = params(vec![4], Threshold::Fraction(1.0), Threshold::Absolute(0));

        let cancel = AtomicBool::new(true);
        let err = discover(&target, &reference, &p, None, Some(&cancel)).unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled));
    }
}

//! Per-length substring prevalence index
//!
//! Built once per sequence set and window width, so that every candidate
//! lookup is an O(1) map probe instead of a rescan of the whole set.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use super::fasta::SequenceSet;

/// Maps every distinct window of a fixed width to the number of member
/// sequences containing it at least once (sequences, not occurrences).
pub struct SubstringIndex<'a> {
    counts: HashMap<&'a [u8], u32>,
}

impl<'a> SubstringIndex<'a> {
    /// Index all windows of `length` over the set. Sequences shorter than
    /// `length` contribute nothing. Per-sequence window sets are computed in
    /// parallel; the count merge is commutative, so the result does not
    /// depend on the degree of parallelism.
    pub fn build(set: &'a SequenceSet, length: usize) -> Self {
        let counts = set
            .records()
            .par_iter()
            .map(|record| {
                let bytes = record.sequence.as_bytes();
                let mut windows: HashSet<&[u8]> = HashSet::new();
                if bytes.len() >= length {
                    for start in 0..=bytes.len() - length {
                        windows.insert(&bytes[start..start + length]);
                    }
                }
                windows
            })
            .fold(HashMap::<&[u8], u32>::new, |mut acc, windows| {
                for w in windows {
                    *acc.entry(w).or_insert(0) += 1;
                }
                acc
            })
            .reduce(HashMap::new, |mut a, b| {
                for (w, n) in b {
                    *a.entry(w).or_insert(0) += n;
                }
                a
            });

        Self { counts }
    }

    /// Number of member sequences containing `substring` as an exact infix.
    pub fn sequences_containing(&self, substring: &[u8]) -> u64 {
        self.counts.get(substring).copied().unwrap_or(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(records: &[(&str, &str)]) -> SequenceSet {
        let text: String = records
            .iter()
            .map(|(id, seq)| format!(">{id}\n{seq}\n"))
            .collect();
        SequenceSet::parse(&text).unwrap()
    }

    #[test]
    fn test_counts_sequences_not_occurrences() {
        // ACGT occurs twice in seq1 but counts once
        let s = set(&[("seq1", "ACGTACGT"), ("seq2", "ACGTTTTT")]);
        let index = SubstringIndex::build(&s, 4);
        assert_eq!(index.sequences_containing(b"ACGT"), 2);
        assert_eq!(index.sequences_containing(b"CGTA"), 1);
        assert_eq!(index.sequences_containing(b"GGGG"), 0);
    }

    #[test]
    fn test_short_sequences_contribute_nothing() {
        let s = set(&[("seq1", "ACG"), ("seq2", "ACGTA")]);
        let index = SubstringIndex::build(&s, 4);
        assert_eq!(index.sequences_containing(b"ACGT"), 1);
    }

    #[test]
    fn test_matches_brute_force_membership() {
        let s = set(&[("a", "ACGTACCA"), ("b", "TTACGTAC"), ("c", "CCCCACGT")]);
        let index = SubstringIndex::build(&s, 4);
        for record in s.iter() {
            let bytes = record.sequence.as_bytes();
            for start in 0..=bytes.len() - 4 {
                let window = &bytes[start..start + 4];
                let brute = s
                    .iter()
                    .filter(|r| {
                        r.sequence
                            .as_bytes()
                            .windows(4)
                            .any(|w| w == window)
                    })
                    .count() as u64;
                assert_eq!(index.sequences_containing(window), brute);
            }
        }
    }
}

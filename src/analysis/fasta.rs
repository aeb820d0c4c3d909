//! FASTA loading for target, reference and oligo sequence sets

use std::collections::HashSet;
use std::path::Path;

use super::dna::{is_gap, strip_gaps};
use super::error::{AnalysisError, Result};

/// One identifier/sequence record
#[derive(Debug, Clone)]
pub struct SequenceRecord {
    pub id: String,
    pub sequence: String,
}

/// An immutable, insertion-ordered set of sequences loaded from one file.
/// Sequences are stored uppercased; `.` gaps are normalized to `-`.
#[derive(Debug, Clone)]
pub struct SequenceSet {
    records: Vec<SequenceRecord>,
    has_gaps: bool,
}

impl SequenceSet {
    /// Load a sequence set from a FASTA file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AnalysisError::NotFound { path: path.to_path_buf() }
            } else {
                AnalysisError::Io(e)
            }
        })?;
        Self::parse(&text).map_err(|reason| AnalysisError::Format {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse FASTA text into a sequence set.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut records: Vec<SequenceRecord> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut current_id: Option<String> = None;
        let mut current_seq = String::new();
        let mut has_gaps = false;

        let mut flush = |id: Option<String>, seq: &mut String| -> std::result::Result<(), String> {
            if let Some(id) = id {
                if seq.is_empty() {
                    return Err(format!("record '{id}' has no sequence"));
                }
                if !seen_ids.insert(id.clone()) {
                    return Err(format!("duplicate identifier '{id}'"));
                }
                records.push(SequenceRecord {
                    id,
                    sequence: std::mem::take(seq),
                });
            }
            Ok(())
        };

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix('>') {
                flush(current_id.take(), &mut current_seq)?;
                // The identifier is the first whitespace-delimited word
                let id = header.split_whitespace().next().unwrap_or("").to_string();
                if id.is_empty() {
                    return Err("record with empty identifier".to_string());
                }
                current_id = Some(id);
            } else {
                if current_id.is_none() {
                    return Err("sequence data before first '>' header".to_string());
                }
                for c in line.chars() {
                    let c = c.to_ascii_uppercase();
                    if c.is_ascii_alphabetic() {
                        current_seq.push(c);
                    } else if is_gap(c as u8) {
                        has_gaps = true;
                        current_seq.push('-');
                    } else {
                        return Err(format!("invalid character '{c}' in sequence"));
                    }
                }
            }
        }
        flush(current_id.take(), &mut current_seq)?;

        if records.is_empty() {
            return Err("no sequences found".to_string());
        }

        Ok(Self { records, has_gaps })
    }

    /// Number of sequences in the set. Fixed at load time; prevalence
    /// fractions always use this as their denominator.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True if any sequence contained a gap symbol at load time. Reported
    /// as a warning by callers; never used for control flow.
    pub fn has_gaps(&self) -> bool {
        self.has_gaps
    }

    /// Iterate records in file order.
    pub fn iter(&self) -> impl Iterator<Item = &SequenceRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[SequenceRecord] {
        &self.records
    }

    /// A copy of this set with all gap symbols removed, for approximate
    /// matching where gaps are alignment artifacts.
    pub fn without_gaps(&self) -> Self {
        Self {
            records: self
                .records
                .iter()
                .map(|r| SequenceRecord {
                    id: r.id.clone(),
                    sequence: strip_gaps(&r.sequence),
                })
                .collect(),
            has_gaps: false,
        }
    }
}

//! Result table rendering
//!
//! Tables are rendered fully in memory and only written to disk once a run
//! has succeeded, so an aborted run never leaves a truncated output file.

use std::fmt::Write as _;
use std::path::Path;

use super::error::Result;
use super::types::{DiscoveryResults, ScoringResults};

/// Render the discovery table (tab-separated, header row first).
pub fn render_discovery_table(
    results: &DiscoveryResults,
    include_reverse_complement: bool,
) -> String {
    let mut out = String::new();
    out.push_str("identifier\tlength\tsequence");
    if include_reverse_complement {
        out.push_str("\tsequence_reverse_complement");
    }
    out.push_str(
        "\tGC\tTm\ttarget_hit_fraction\ttarget_hit_absolute\treference_hit_fraction\treference_hit_absolute\n",
    );

    for c in &results.candidates {
        let _ = write!(out, "{}\t{}\t{}", c.id, c.length, c.sequence);
        if include_reverse_complement {
            let _ = write!(out, "\t{}", c.reverse_complement.as_deref().unwrap_or(""));
        }
        let _ = writeln!(
            out,
            "\t{}\t{}\t{}\t{}\t{}\t{}",
            c.gc, c.tm, c.target_fraction, c.target_hits, c.reference_fraction, c.reference_hits
        );
    }
    out
}

/// Render the accepted oligos as FASTA, for feeding into scoring runs.
pub fn render_discovery_fasta(results: &DiscoveryResults) -> String {
    let mut out = String::new();
    for c in &results.candidates {
        let _ = writeln!(out, ">{}\n{}", c.id, c.sequence);
    }
    out
}

/// Render the scoring table (tab-separated, header row first).
pub fn render_scoring_table(results: &ScoringResults) -> String {
    let mut out = String::new();
    out.push_str("identifier\tsequence");
    for k in 1..=results.max_mismatches {
        let _ = write!(out, "\tmismatch{k}_fraction\tmismatch{k}_absolute");
    }
    out.push('\n');

    for oligo in &results.oligos {
        let _ = write!(out, "{}\t{}", oligo.id, oligo.sequence);
        for s in &oligo.scores {
            let _ = write!(out, "\t{}\t{}", s.fraction, s.hits);
        }
        out.push('\n');
    }
    out
}

/// Write rendered output to disk in one shot.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)?;
    Ok(())
}

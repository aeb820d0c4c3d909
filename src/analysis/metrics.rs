//! Composition metrics for accepted oligos
//!
//! Kept standalone so scoring output can be joined with these without
//! recomputation inside the matcher.

/// Round to 4 decimal places
fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Round to 2 decimal places
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn base_counts(seq: &str) -> (u32, u32) {
    let mut at = 0u32;
    let mut gc = 0u32;
    for b in seq.bytes() {
        match b {
            b'A' | b'T' => at += 1,
            b'G' | b'C' => gc += 1,
            _ => {}
        }
    }
    (at, gc)
}

/// GC fraction of a sequence, rounded to 4 decimal places. The denominator
/// is the full sequence length, gap symbols included.
pub fn gc_fraction(seq: &str) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let (_, gc) = base_counts(seq);
    round4(gc as f64 / seq.len() as f64)
}

/// Basic melting temperature estimate, rounded to 2 decimal places.
///
/// Two empirical regimes: below 14 bases `Tm = 2*(A+T) + 4*(G+C)`,
/// from 14 bases on `Tm = 64.9 + 41*(G+C - 16.4) / len`.
pub fn melting_temperature(seq: &str) -> f64 {
    let (at, gc) = base_counts(seq);
    let tm = if seq.len() < 14 {
        (2 * at + 4 * gc) as f64
    } else {
        64.9 + 41.0 * (gc as f64 - 16.4) / seq.len() as f64
    };
    round2(tm)
}

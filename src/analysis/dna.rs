//! DNA alphabet helpers

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Complement mapping for reverse complement. Gaps complement to themselves.
static COMPLEMENT: Lazy<HashMap<u8, u8>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(b'A', b'T');
    map.insert(b'T', b'A');
    map.insert(b'C', b'G');
    map.insert(b'G', b'C');
    map.insert(b'N', b'N');
    map.insert(b'-', b'-');
    map
});

/// Check if a byte is a standard DNA base (uppercase)
pub fn is_standard_base(b: u8) -> bool {
    matches!(b, b'A' | b'C' | b'G' | b'T')
}

/// Check if a byte is a gap symbol
pub fn is_gap(b: u8) -> bool {
    matches!(b, b'-' | b'.')
}

/// Reverse complement of a sequence. Bases without a defined complement
/// (IUPAC ambiguities other than N) are kept as-is.
pub fn reverse_complement(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(|b| *COMPLEMENT.get(&b).unwrap_or(&b) as char)
        .collect()
}

/// Remove gap symbols from a sequence.
pub fn strip_gaps(seq: &str) -> String {
    seq.chars().filter(|&c| c != '-').collect()
}

//! oligofind - Primer/Probe Discovery and Scoring
//!
//! Finds short candidate oligos that are prevalent in a target sequence set
//! while staying rare in a reference set, and scores finished oligos against
//! a reference set with a bounded number of tolerated mismatches.

pub mod analysis;
pub mod cli;

pub use analysis::*;

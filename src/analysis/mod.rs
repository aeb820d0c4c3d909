mod discover;
mod dna;
mod error;
mod fasta;
mod index;
mod matcher;
mod metrics;
mod types;
mod writer;

pub use discover::*;
pub use dna::*;
pub use error::*;
pub use fasta::*;
pub use index::*;
pub use matcher::*;
pub use metrics::*;
pub use types::*;
pub use writer::*;

pub mod analysis_table;
pub mod fasta;
pub mod knowledge_base;

use crate::errors::Result;

/// A file-backed input that can be loaded into memory.
pub trait Dataset {
    type Output;

    fn load(&self) -> Result<Self::Output>;
}

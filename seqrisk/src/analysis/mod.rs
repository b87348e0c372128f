pub mod clustering;
pub mod features;
pub mod risk;
pub mod sequence_analysis;
pub mod summary;

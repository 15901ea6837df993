//! Refinement engine: bucket tree, stage drivers, content probes, purge.

pub mod arg_parser;
pub mod bucket;
pub mod cli;
pub mod compare;
pub mod hashing;
pub mod progress;
pub mod purge;
pub mod readers;
pub mod refine;
pub mod tools;

// Re-export the engine surface for API callers
pub use bucket::{Bucket, GroupBuilder, Node, shape_results};
pub use purge::{PURGE_LABEL, purge_dups};
pub use refine::filter_dups;
pub use tools::{compile_cards, fullpath};

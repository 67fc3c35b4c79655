//! Pure text heuristics for the PVA phase engines
//!
//! Everything here is a pure function over strings: no I/O, no tool calls,
//! no shared state. The matching tables are static data maps so they can be
//! swapped and tested independently of the orchestration that uses them.
//!
//! Determinism matters: identical inputs always produce identical outputs,
//! and collection-valued results preserve a fixed table order.

pub mod key_files;
pub mod phrases;
pub mod technology;
pub mod vision;

pub use key_files::{classify_path, rank_key_files, FileRank};
pub use phrases::{
    capture_phrases, extract_features, extract_requirements, extract_requirements_relaxed,
    token_overlap, PhraseTag, TaggedPhrase,
};
pub use technology::{detect_technologies, infer_from_extensions, FileSample};
pub use vision::{
    complexity_score, extract_integrations, extract_non_functional, ExplorationRichness,
};

//! Public library API for decoding binary behavior tree documents.

/// Field layout tables, format indexers, decoders, and the re-encoder.
pub mod tree;

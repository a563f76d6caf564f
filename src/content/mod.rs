//! Content extraction and chunking
//!
//! Turns a fetched HTML page into typed logical blocks, then packs those
//! blocks into size-bounded output chunks with content fingerprints.

mod chunker;
mod extractor;

pub use chunker::{chunk, ChunkMetadata, OutputChunk, MAX_CHUNK_CHARS};
pub use extractor::{extract, BlockType, ExtractedDocument, LogicalBlock};

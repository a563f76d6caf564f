//! Greedy chunk packing over the extracted block sequence
//!
//! Non-code blocks accumulate into a buffer flushed at 1500 characters; code
//! blocks always flush the buffer and stand alone. `chunkCount` is backfilled
//! by an explicit second pass once all chunks for the page exist.

use crate::content::extractor::{BlockType, ExtractedDocument};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Character capacity of one text chunk
pub const MAX_CHUNK_CHARS: usize = 1500;

/// Fixed per-chunk metadata carried through to the index
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub status_code: u16,
    pub content_type_header: String,
}

impl Default for ChunkMetadata {
    fn default() -> Self {
        Self {
            status_code: 200,
            content_type_header: "text/html".to_string(),
        }
    }
}

/// One output record: a bounded segment of extracted page content
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputChunk {
    pub id: String,
    pub url: String,
    pub canonical_url: Option<String>,
    pub root_url: String,
    pub title: String,
    pub headings: Vec<String>,
    pub chunk_index: usize,
    pub chunk_count: usize,
    pub content: String,
    pub content_type: String,
    pub block_types: Vec<String>,
    pub code_language: Option<String>,
    pub page_hash: String,
    pub chunk_hash: String,
    pub depth: u32,
    pub h_path: Vec<String>,
    pub lang: String,
    pub crawled_at: DateTime<Utc>,
    pub source: String,
    pub metadata: ChunkMetadata,
}

/// Packs a page's blocks into output chunks
///
/// Every chunk's `chunk_index` is its position in emission order; the
/// `chunk_count` field is backfilled with the total across the page, so the
/// indices are contiguous in `[0, chunk_count)`.
pub fn chunk(doc: &ExtractedDocument) -> Vec<OutputChunk> {
    let mut out: Vec<OutputChunk> = Vec::new();
    if doc.blocks.is_empty() {
        return out;
    }

    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_types: Vec<String> = Vec::new();
    let mut char_count = 0usize;

    for block in &doc.blocks {
        let text = block.text.trim();
        if text.is_empty() {
            continue;
        }

        if block.kind == BlockType::Code {
            if !buffer.is_empty() {
                let index = out.len();
                out.push(build_chunk(
                    doc,
                    index,
                    buffer.join("\n\n"),
                    std::mem::take(&mut buffer_types),
                    None,
                ));
                buffer.clear();
                char_count = 0;
            }
            let index = out.len();
            out.push(build_chunk(
                doc,
                index,
                text.to_string(),
                vec!["code".to_string()],
                block.code_language.clone(),
            ));
            continue;
        }

        // Sized as the block text plus its two-newline separator.
        let added = text.chars().count() + 2;
        if char_count + added > MAX_CHUNK_CHARS && !buffer.is_empty() {
            let index = out.len();
            out.push(build_chunk(
                doc,
                index,
                buffer.join("\n\n"),
                std::mem::take(&mut buffer_types),
                None,
            ));
            buffer.clear();
            char_count = 0;
        }
        buffer.push(text);
        buffer_types.push(block.kind.as_str().to_string());
        char_count += added;
    }

    if !buffer.is_empty() {
        let index = out.len();
        out.push(build_chunk(
            doc,
            index,
            buffer.join("\n\n"),
            buffer_types,
            None,
        ));
    }

    // Second pass: backfill the total without mutating shared chunks.
    let total = out.len();
    out.into_iter()
        .map(|chunk| OutputChunk {
            chunk_count: total,
            ..chunk
        })
        .collect()
}

fn build_chunk(
    doc: &ExtractedDocument,
    chunk_index: usize,
    content: String,
    block_types: Vec<String>,
    code_language: Option<String>,
) -> OutputChunk {
    let page_hash = sha256_hex(&doc.url);
    let chunk_hash = sha256_hex(&format!("{}:{}:{}", doc.url, chunk_index, content));
    let content_type = if block_types.len() == 1 && block_types[0] == "code" {
        "code"
    } else {
        "text"
    };

    OutputChunk {
        id: Uuid::new_v4().to_string(),
        url: doc.url.clone(),
        canonical_url: doc.canonical_url.clone(),
        root_url: doc.root_url.clone(),
        title: doc.title.clone(),
        headings: doc.headings.clone(),
        chunk_index,
        chunk_count: 0,
        content,
        content_type: content_type.to_string(),
        block_types,
        code_language,
        page_hash,
        chunk_hash,
        depth: doc.depth,
        h_path: doc.headings.clone(),
        lang: "en".to_string(),
        crawled_at: doc.crawled_at,
        source: "web-docs".to_string(),
        metadata: ChunkMetadata::default(),
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

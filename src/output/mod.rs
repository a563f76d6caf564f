//! JSON Lines output sink
//!
//! Appends one serialized chunk record per line. Concurrent writers are
//! serialized, and every record is flushed before the next writer proceeds.

use crate::content::OutputChunk;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// Durable append-only writer for chunk records
pub struct JsonlChunkWriter {
    inner: Mutex<BufWriter<File>>,
}

impl JsonlChunkWriter {
    /// Creates (or truncates) the output file, creating parent directories
    pub async fn create(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let file = File::create(path).await?;
        Ok(Self {
            inner: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Appends one chunk as a JSON line and flushes it
    pub async fn write_chunk(&self, chunk: &OutputChunk) -> crate::Result<()> {
        let mut line = serde_json::to_vec(chunk)?;
        line.push(b'\n');

        let mut writer = self.inner.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{chunk, BlockType, ExtractedDocument, LogicalBlock};
    use chrono::Utc;

    fn sample_chunks() -> Vec<OutputChunk> {
        let doc = ExtractedDocument {
            url: "https://ex.com/page".to_string(),
            canonical_url: None,
            root_url: "https://ex.com/page".to_string(),
            title: "T".to_string(),
            headings: vec![],
            blocks: vec![
                LogicalBlock {
                    kind: BlockType::Paragraph,
                    text: "hello".to_string(),
                    code_language: None,
                },
                LogicalBlock {
                    kind: BlockType::Code,
                    text: "let x = 1;".to_string(),
                    code_language: None,
                },
            ],
            depth: 0,
            crawled_at: Utc::now(),
        };
        chunk(&doc)
    }

    #[tokio::test]
    async fn test_writes_one_json_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.jsonl");
        let writer = JsonlChunkWriter::create(&path).await.unwrap();

        for chunk in sample_chunks() {
            writer.write_chunk(&chunk).await.unwrap();
        }

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["url"], "https://ex.com/page");
            assert_eq!(value["chunkCount"], 2);
        }
    }

    #[tokio::test]
    async fn test_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/chunks.jsonl");
        let writer = JsonlChunkWriter::create(&path).await.unwrap();

        let chunks = sample_chunks();
        writer.write_chunk(&chunks[0]).await.unwrap();
        assert!(path.exists());
    }
}

use crate::qid_source::{extract_qids, QidSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

/// Reads QIDs from a local file: either saved wikitext (`[[Q...]]` links) or
/// a plain one-QID-per-line list.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: String,
}

impl SourceFile {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

#[async_trait]
impl QidSource for SourceFile {
    fn name(&self) -> String {
        "file".to_string()
    }

    async fn run(&self) -> Result<Vec<String>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Could not read {}", self.path))?;
        let mut qids = if text.contains("[[") {
            extract_qids(&text)
        } else {
            text.lines()
                .map(|line| line.trim().to_string())
                .filter(|line| line.starts_with('Q'))
                .collect()
        };
        qids.sort();
        qids.dedup();
        info!("Read {} unique QIDs from {}", qids.len(), self.path);
        Ok(qids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_plain_list() {
        let dir = std::env::temp_dir().join("wdqc_source_file_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ids.txt");
        std::fs::write(&path, "Q5\nQ2\n\nQ5\nnot-a-qid\n").unwrap();
        let source = SourceFile::new(path.to_str().unwrap());
        assert_eq!(source.run().await.unwrap(), vec!["Q2", "Q5"]);
    }

    #[tokio::test]
    async fn reads_wikitext() {
        let dir = std::env::temp_dir().join("wdqc_source_file_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("page.txt");
        std::fs::write(&path, "intro\n* [[Q99]]\n* [[Q3]]\n").unwrap();
        let source = SourceFile::new(path.to_str().unwrap());
        assert_eq!(source.run().await.unwrap(), vec!["Q3", "Q99"]);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let source = SourceFile::new("/nonexistent/qids.txt");
        assert!(source.run().await.is_err());
    }
}

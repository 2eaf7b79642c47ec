use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

pub struct FileReader;

impl FileReader {
    pub async fn read_file(path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");

        match extension {
            "jsonl" | "ndjson" | "json" => {
                let content = fs::read_to_string(path)
                    .await
                    .context(format!("Failed to read file: {:?}", path))?;
                Ok(content)
            }
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        }
    }

    /// One value per non-blank line. A bad line fails the whole file.
    pub async fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let content = Self::read_file(path).await?;
        let mut items = Vec::new();

        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let item = serde_json::from_str(line)
                .context(format!("Malformed record at {:?} line {}", path, index + 1))?;
            items.push(item);
        }

        Ok(items)
    }

    pub async fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directory: {:?}", parent))?;
        }

        let mut content = String::new();
        for item in items {
            content.push_str(&serde_json::to_string(item)?);
            content.push('\n');
        }

        fs::write(path, content)
            .await
            .context(format!("Failed to write file: {:?}", path))?;
        Ok(())
    }
}

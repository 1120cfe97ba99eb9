//! Subcommand implementations and the input plumbing they share.

pub mod assert;
pub mod check;
pub mod types;

use anyhow::Context;
use std::io::Read;
use std::path::{Path, PathBuf};
use tyguard::{RegistryConfig, TypeRegistry, Value};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG: &str = "tyguard.toml";

/// One JSON document and where it came from
pub struct Document {
    pub source: String,
    pub value: Value,
}

/// Registry from an explicit config, `./tyguard.toml`, or the built-ins alone
pub fn load_registry(config: Option<&Path>) -> anyhow::Result<TypeRegistry> {
    let path = match config {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG);
            local.is_file().then_some(local)
        }
    };

    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading registry config");
            let config = RegistryConfig::load(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            Ok(config.build_registry()?)
        }
        None => Ok(TypeRegistry::with_defaults()),
    }
}

/// Read documents from `files`, or stdin when there are none
pub fn read_documents(files: &[PathBuf], lines: bool) -> anyhow::Result<Vec<Document>> {
    let mut sources = Vec::new();
    if files.is_empty() {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        sources.push(("<stdin>".to_string(), content));
    } else {
        for file in files {
            let content = std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            sources.push((file.display().to_string(), content));
        }
    }

    let mut documents = Vec::new();
    for (source, content) in sources {
        if lines {
            for (index, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let label = format!("{}:{}", source, index + 1);
                documents.push(parse_document(label, line)?);
            }
        } else {
            documents.push(parse_document(source, &content)?);
        }
    }
    Ok(documents)
}

fn parse_document(source: String, content: &str) -> anyhow::Result<Document> {
    let json: serde_json::Value =
        serde_json::from_str(content).with_context(|| format!("Invalid JSON in {}", source))?;
    Ok(Document {
        source,
        value: Value::from(json),
    })
}

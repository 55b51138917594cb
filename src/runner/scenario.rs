use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read a `.ron` or `.json` document.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse(path, &text)
}

pub fn parse<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => ron::from_str(text).with_context(|| format!("parsing {} as RON", path.display())),
        Some("json") => {
            serde_json::from_str(text).with_context(|| format!("parsing {} as JSON", path.display()))
        }
        other => bail!(
            "unsupported input format {:?} for {}; expected .ron or .json",
            other.unwrap_or(""),
            path.display()
        ),
    }
}

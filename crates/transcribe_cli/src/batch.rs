use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::Cli;

/// Reads a YAML sequence of references.
pub fn load_reference_list(path: &Path) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read list {}", path.display()))?;
    let references: Option<Vec<String>> = serde_yaml::from_str(&content)
        .with_context(|| format!("{} is not a YAML list of strings", path.display()))?;
    Ok(references.unwrap_or_default())
}

/// The target first, then the list entries.
pub fn collect_references(cli: &Cli) -> Result<Vec<String>> {
    let mut references = Vec::new();
    if let Some(target) = &cli.target {
        references.push(target.clone());
    }
    if let Some(list) = &cli.list {
        references.extend(load_reference_list(list)?);
    }
    Ok(references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn yaml_sequence_is_loaded_in_order() {
        let temp = TempDir::new().unwrap();
        let list = temp.path().join("urls.yaml");
        fs::write(&list, "- https://a.example/one\n- https://b.example/two\n").unwrap();

        assert_eq!(
            load_reference_list(&list).unwrap(),
            vec!["https://a.example/one", "https://b.example/two"]
        );
    }

    #[test]
    fn empty_file_is_an_empty_list() {
        let temp = TempDir::new().unwrap();
        let list = temp.path().join("empty.yaml");
        fs::write(&list, "").unwrap();
        assert!(load_reference_list(&list).unwrap().is_empty());
    }

    #[test]
    fn mapping_is_rejected() {
        let temp = TempDir::new().unwrap();
        let list = temp.path().join("bad.yaml");
        fs::write(&list, "url: https://a.example\n").unwrap();
        assert!(load_reference_list(&list).is_err());
    }

    #[test]
    fn target_comes_before_list() {
        let temp = TempDir::new().unwrap();
        let list = temp.path().join("urls.yaml");
        fs::write(&list, "- https://b.example\n").unwrap();
        let cli = Cli::parse_from([
            OsString::from("transcribe"),
            "-l".into(),
            list.into_os_string(),
            "-t".into(),
            "https://a.example".into(),
        ]);

        assert_eq!(
            collect_references(&cli).unwrap(),
            vec!["https://a.example", "https://b.example"]
        );
    }
}

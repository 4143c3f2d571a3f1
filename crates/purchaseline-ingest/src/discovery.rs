//! Source file discovery

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Files selected for a run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Discovered {
    /// Files to load, in load order
    pub files: Vec<PathBuf>,
    /// Held-out file, never loaded
    pub validation: Option<PathBuf>,
}

/// List files in `input_dir` matching `pattern`, sorted by name.
///
/// With `hold_out_validation`, the last file is moved to `validation`.
pub fn discover(input_dir: &Path, pattern: &str, hold_out_validation: bool) -> Result<Discovered> {
    if !input_dir.is_dir() {
        bail!("Input directory not found: {}", input_dir.display());
    }

    let full = input_dir.join(pattern);
    let full_str = full.to_string_lossy();
    let mut files: Vec<PathBuf> = glob::glob(&full_str)
        .with_context(|| format!("Invalid file pattern: {pattern}"))?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .collect();

    if files.is_empty() {
        bail!("No files found matching {}", full.display());
    }
    files.sort();

    let validation = if hold_out_validation {
        files.pop()
    } else {
        None
    };
    if let Some(v) = &validation {
        log::info!("Holding out {} for validation", v.display());
    }

    Ok(Discovered { files, validation })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, names: &[&str]) {
        for name in names {
            std::fs::write(dir.join(name), b"d,p,u\n").unwrap();
        }
    }

    #[test]
    fn sorted_with_last_held_out() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["2012-3.csv", "2012-1.csv", "validation.csv", "2012-2.csv"]);

        let found = discover(dir.path(), "*.csv", true).unwrap();

        let names: Vec<_> = found
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["2012-1.csv", "2012-2.csv", "2012-3.csv"]);
        assert_eq!(found.validation, Some(dir.path().join("validation.csv")));
    }

    #[test]
    fn no_hold_out_keeps_everything() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.csv", "b.csv"]);
        let found = discover(dir.path(), "*.csv", false).unwrap();
        assert_eq!(found.files.len(), 2);
        assert!(found.validation.is_none());
    }

    #[test]
    fn pattern_filters_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["a.csv", "notes.txt"]);
        std::fs::create_dir(dir.path().join("sub.csv")).unwrap();
        let found = discover(dir.path(), "*.csv", false).unwrap();
        assert_eq!(found.files, vec![dir.path().join("a.csv")]);
    }

    #[test]
    fn single_file_with_hold_out_loads_nothing() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), &["only.csv"]);
        let found = discover(dir.path(), "*.csv", true).unwrap();
        assert!(found.files.is_empty());
        assert_eq!(found.validation, Some(dir.path().join("only.csv")));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = discover(dir.path(), "*.csv", true).unwrap_err();
        assert!(format!("{err:#}").contains("No files found"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = discover(Path::new("/nonexistent/purchases"), "*.csv", true).unwrap_err();
        assert!(format!("{err:#}").contains("Input directory not found"));
    }
}

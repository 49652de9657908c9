//! File slots attached to an assistant session.

use crate::error::{PalaverError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Kind of file the assistant can work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Csv,
    Json,
}

impl FileKind {
    pub const ALL: [FileKind; 3] = [FileKind::Image, FileKind::Csv, FileKind::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Csv => "csv",
            FileKind::Json => "json",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = PalaverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "image" => Ok(FileKind::Image),
            "csv" => Ok(FileKind::Csv),
            "json" => Ok(FileKind::Json),
            other => Err(PalaverError::InvalidInput(format!(
                "Unknown file kind '{}' (expected image, csv or json)",
                other
            ))),
        }
    }
}

/// The most recent file of each kind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachedFiles {
    pub image: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

impl AttachedFiles {
    pub fn get(&self, kind: FileKind) -> Option<&Path> {
        match kind {
            FileKind::Image => self.image.as_deref(),
            FileKind::Csv => self.csv.as_deref(),
            FileKind::Json => self.json.as_deref(),
        }
    }

    pub fn set(&mut self, kind: FileKind, path: PathBuf) {
        let slot = match kind {
            FileKind::Image => &mut self.image,
            FileKind::Csv => &mut self.csv,
            FileKind::Json => &mut self.json,
        };
        *slot = Some(path);
    }

    /// Attached files in image, csv, json order.
    pub fn iter(&self) -> impl Iterator<Item = (FileKind, &Path)> {
        FileKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|path| (kind, path)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// System note listing the attached files, if any.
    pub fn context(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut context = String::from("Available files:\n");
        for (kind, path) in self.iter() {
            context.push_str(&format!("- {}: {}\n", kind, path.display()));
        }
        Some(context)
    }
}

/// Copy `source` into `uploads_dir` as `<kind>_<timestamp>_<name>`.
pub fn copy_to_uploads(source: &Path, kind: FileKind, uploads_dir: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| PalaverError::InvalidInput(format!("Not a file: {}", source.display())))?
        .to_string_lossy();
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    std::fs::create_dir_all(uploads_dir)?;
    let target = uploads_dir.join(format!("{}_{}_{}", kind, timestamp, name));
    std::fs::copy(source, &target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("CSV".parse::<FileKind>().unwrap(), FileKind::Csv);
        assert!("pdf".parse::<FileKind>().is_err());
    }

    #[test]
    fn test_context_lists_attached_only() {
        let mut files = AttachedFiles::default();
        assert_eq!(files.context(), None);

        files.set(FileKind::Json, PathBuf::from("/tmp/b.json"));
        files.set(FileKind::Csv, PathBuf::from("/tmp/a.csv"));
        assert_eq!(
            files.context().unwrap(),
            "Available files:\n- csv: /tmp/a.csv\n- json: /tmp/b.json\n"
        );
    }

    #[test]
    fn test_copy_to_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("sales.csv");
        std::fs::write(&source, "a,b\n1,2\n").unwrap();
        let uploads = dir.path().join("uploads");

        let copied = copy_to_uploads(&source, FileKind::Csv, &uploads).unwrap();
        let name = copied.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("csv_"));
        assert!(name.ends_with("_sales.csv"));
        assert_eq!(std::fs::read_to_string(copied).unwrap(), "a,b\n1,2\n");
    }
}

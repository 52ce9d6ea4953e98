//! Dataset discovery in directories.

use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::{Dataset, SubjectDir};
use crate::error::{Error, Result};

/// Image extensions eligible as probes.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "gif", "png", "bmp"];

/// Scan `root` for subject directories and loose distractor files.
pub fn discover_dataset(root: &Path) -> Result<Dataset> {
    if !root.exists() {
        return Err(Error::InputNotFound(root.to_path_buf()));
    }

    if !root.is_dir() {
        return Err(Error::Dataset(format!("Path is not a directory: {}", root.display())));
    }

    let mut subject_dirs = Vec::new();
    let mut distractors = Vec::new();

    for entry in read_dir_sorted(root)? {
        if is_hidden(&entry) {
            continue;
        }
        if entry.is_dir() {
            subject_dirs.push(entry);
        } else if is_eligible_image(&entry) {
            distractors.push(entry);
        }
    }

    let subjects = subject_dirs
        .into_iter()
        .map(|dir| {
            let files = read_dir_sorted(&dir)?
                .into_iter()
                .filter(|p| !is_hidden(p) && is_eligible_image(p))
                .collect();
            let name = dir
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            Ok(SubjectDir { name, files })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        root = %root.display(),
        subjects = subjects.len(),
        distractors = distractors.len(),
        "dataset scanned"
    );

    Ok(Dataset {
        root: root.to_path_buf(),
        subjects,
        distractors,
    })
}

/// Directory entries sorted by file name.
fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::Dataset(format!("Failed to read directory {}: {}", dir.display(), e))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::Dataset(format!("Failed to read entry in {}: {}", dir.display(), e))
        })?;
        paths.push(entry.path());
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.starts_with('.'))
}

fn is_eligible_image(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_discover_sorted_subjects_and_distractors() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for subject in ["bob", "alice", ".cache"] {
            fs::create_dir(root.join(subject)).unwrap();
        }
        touch(&root.join("bob/2.png"));
        touch(&root.join("bob/1.JPG"));
        touch(&root.join("bob/notes.txt"));
        touch(&root.join("alice/a.bmp"));
        touch(&root.join("z.gif"));
        touch(&root.join("a.jpeg"));
        touch(&root.join("readme.md"));

        let dataset = discover_dataset(root).unwrap();
        let names: Vec<&str> = dataset.subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["alice", "bob"]);

        let bob: Vec<_> = dataset.subjects[1]
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(bob, ["1.JPG", "2.png"]);

        let loose: Vec<_> = dataset
            .distractors
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(loose, ["a.jpeg", "z.gif"]);
    }

    #[test]
    fn test_discover_missing_root() {
        let err = discover_dataset(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }
}

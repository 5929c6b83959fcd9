use std::path::{Path, PathBuf};

use crate::ScanError;

/// Collect the directories to inspect: the root itself, then (if recursive)
/// every descendant directory by depth-first descent in listing order.
///
/// The caller sorts the result before use; a directory vanishing mid-walk is
/// fatal for the invocation.
pub fn collect_dirs(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, ScanError> {
    let mut dirs = Vec::new();
    descend(root, recursive, &mut dirs)?;
    Ok(dirs)
}

fn descend(dir: &Path, recursive: bool, dirs: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    dirs.push(dir.to_path_buf());
    if recursive {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                descend(&path, true, dirs)?;
            }
        }
    }
    Ok(())
}

/// File names (not paths) of directory entries, excluding subdirectories.
pub fn list_file_names(dir: &Path) -> Result<Vec<String>, ScanError> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_root_and_descendants() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("a/inner")).unwrap();
        std::fs::create_dir(root.join("b")).unwrap();
        std::fs::write(root.join("file.txt"), b"x").unwrap();

        let mut dirs = collect_dirs(root, true).unwrap();
        dirs.sort();
        assert_eq!(
            dirs,
            vec![
                root.to_path_buf(),
                root.join("a"),
                root.join("a/inner"),
                root.join("b"),
            ]
        );
    }

    #[test]
    fn non_recursive_is_root_only() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let dirs = collect_dirs(tmp.path(), false).unwrap();
        assert_eq!(dirs, vec![tmp.path().to_path_buf()]);
    }

    #[test]
    fn missing_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("missing");
        assert!(collect_dirs(&gone, true).is_err());
    }
}

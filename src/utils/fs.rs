// ABOUTME: File system helpers for the working directory.
// ABOUTME: App-data location, recursive copies and emptying a directory with a keep-list.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Per-user application data directory for `name`:
/// `~/Library/Application Support/<name>` on macOS, `%LOCALAPPDATA%\<name>`
/// on Windows, `$XDG_DATA_HOME/<name>` or `~/.local/share/<name>` elsewhere.
pub fn app_data_path(name: &str) -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(name)
}

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        tracing::trace!("Directory already exists: {}", dir.display());
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    tracing::trace!("Directory created: {}", dir.display());
    Ok(())
}

/// Copy a file, or a directory tree, from `src` to `dest`. Existing files are
/// overwritten. A missing source is skipped and reported as `Ok(false)`.
pub fn copy_path(src: &Path, dest: &Path) -> io::Result<bool> {
    if !src.exists() {
        tracing::warn!("Nothing to copy at {}", src.display());
        return Ok(false);
    }
    if src.is_dir() {
        copy_dir(src, dest)?;
    } else {
        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        fs::copy(src, dest)?;
    }
    Ok(true)
}

fn copy_dir(src: &Path, dest: &Path) -> io::Result<()> {
    ensure_dir(dest)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dest.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove everything inside `dir` except entries named in `keep`.
pub fn empty_dir(dir: &Path, keep: &[&str]) -> io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if keep.iter().any(|k| entry.file_name() == *k) {
            continue;
        }
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Remove `dir` and everything below it; a missing directory is fine.
pub fn remove_dir(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn copies_nested_trees() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), "a").unwrap();
        fs::write(src.join("nested/b.txt"), "b").unwrap();

        let dest = temp.path().join("out/config");
        assert!(copy_path(&src, &dest).unwrap());
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dest.join("nested/b.txt")).unwrap(), "b");
    }

    #[test]
    fn missing_source_is_skipped() {
        let temp = TempDir::new().unwrap();
        assert!(!copy_path(&temp.path().join("nope"), &temp.path().join("x")).unwrap());
        assert!(!temp.path().join("x").exists());
    }

    #[test]
    fn empty_dir_honours_keep_list() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".gitignore"), "*").unwrap();
        fs::write(temp.path().join("record.rcd"), "r").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();

        empty_dir(temp.path(), &[".gitignore"]).unwrap();

        let left: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(left, vec![std::ffi::OsString::from(".gitignore")]);
    }

    #[test]
    fn removing_missing_dir_is_ok() {
        let temp = TempDir::new().unwrap();
        remove_dir(&temp.path().join("network-logs")).unwrap();
    }
}

//! Directory tree enumeration with extension exclusion

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Case-sensitive set of excluded file extensions (with leading dot)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter {
    excluded: HashSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from extensions such as `.tmp`
    ///
    /// An entry given without its leading dot (`tmp`) gets one prepended.
    /// Empty entries are ignored. A bare `.` matches names ending in a dot
    /// (`notes.`), whose extension is empty.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().to_string())
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Self { excluded }
    }

    /// Whether `path`'s extension is excluded. Files without one never are.
    pub fn is_excluded(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => self
                .excluded
                .contains(&format!(".{}", ext.to_string_lossy())),
            None => false,
        }
    }

    /// Excluded extensions in sorted order
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.excluded.iter().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

/// Lazily enumerate regular files under `root`, skipping excluded extensions
///
/// Recurses into every subdirectory without descending into symlinked
/// directories. A symlink whose target is a regular file is yielded under its
/// own path. Entries that cannot be read are logged and skipped. Order is
/// whatever the filesystem returns.
pub fn walk<'a>(root: &Path, filter: &'a ExtensionFilter) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(is_regular_file)
        .map(DirEntry::into_path)
        .filter(move |path| !filter.is_excluded(path))
}

fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    file_type.is_symlink()
        && std::fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collect(root: &Path, filter: &ExtensionFilter) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = walk(root, filter).collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_walk_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(collect(temp_dir.path(), &ExtensionFilter::default()).is_empty());
    }

    #[test]
    fn test_walk_recurses_and_skips_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("sub/b.rs"), "b").unwrap();
        fs::write(root.join("sub/deeper/c"), "c").unwrap();

        let paths = collect(root, &ExtensionFilter::default());
        assert_eq!(
            paths,
            vec![
                root.join("a.txt"),
                root.join("sub/b.rs"),
                root.join("sub/deeper/c"),
            ]
        );
    }

    #[test]
    fn test_excluded_extensions_never_yielded() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("keep.txt"), "").unwrap();
        fs::write(root.join("drop.tmp"), "").unwrap();
        fs::write(root.join("nested/drop.tmp"), "").unwrap();
        fs::write(root.join("nested/keep.log"), "").unwrap();

        let filter = ExtensionFilter::new([".tmp"]);
        let paths = collect(root, &filter);
        assert_eq!(paths, vec![root.join("keep.txt"), root.join("nested/keep.log")]);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let filter = ExtensionFilter::new([".tmp"]);
        assert!(filter.is_excluded(Path::new("/x/a.tmp")));
        assert!(!filter.is_excluded(Path::new("/x/a.TMP")));
    }

    #[test]
    fn test_filter_uses_last_extension_only() {
        let filter = ExtensionFilter::new([".gz"]);
        assert!(filter.is_excluded(Path::new("/x/archive.tar.gz")));
        assert!(!filter.is_excluded(Path::new("/x/.gz")));
        assert!(!filter.is_excluded(Path::new("/x/Makefile")));
    }

    #[test]
    fn test_filter_normalizes_missing_dot() {
        let filter = ExtensionFilter::new(["tmp", ".bak", "", "  "]);
        assert_eq!(filter.extensions(), vec![".bak", ".tmp"]);
        assert!(filter.is_excluded(Path::new("a.tmp")));
    }

    #[test]
    fn test_bare_dot_excludes_trailing_dot_names() {
        let filter = ExtensionFilter::new(["."]);
        assert_eq!(filter.extensions(), vec!["."]);
        assert!(filter.is_excluded(Path::new("/x/notes.")));
        assert!(!filter.is_excluded(Path::new("/x/notes.txt")));
        assert!(!filter.is_excluded(Path::new("/x/notes")));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_yielded_but_dirs_not_descended() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(outside.path().join("real.txt"), "real").unwrap();
        fs::create_dir(outside.path().join("dir")).unwrap();
        fs::write(outside.path().join("dir/inner.txt"), "inner").unwrap();

        symlink(outside.path().join("real.txt"), root.join("link.txt")).unwrap();
        symlink(outside.path().join("dir"), root.join("linked_dir")).unwrap();
        symlink(outside.path().join("missing.txt"), root.join("dangling.txt")).unwrap();

        let paths = collect(root, &ExtensionFilter::default());
        assert_eq!(paths, vec![root.join("link.txt")]);
    }
}

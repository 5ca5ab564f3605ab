//! Confined file access below the site's base path.
//!
//! [`SafeFileLoader`] is the only way the renderer reaches the filesystem
//! for content, layouts and menus.

use std::path::{Component, Path, PathBuf};

use crate::error::SiteError;

/// Resolves relative paths against a fixed base directory.
#[derive(Clone, Debug)]
pub struct SafeFileLoader {
    base_path: PathBuf,
}

impl SafeFileLoader {
    /// Create a loader confined to `base_path`.
    #[must_use]
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Root directory all reads are confined to.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve `relative` to an existing file below the base path.
    ///
    /// # Errors
    ///
    /// Returns `SiteError::InvalidPath` if the path could escape the base path
    /// and `SiteError::NotFound` if no regular file exists there.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, SiteError> {
        validate_relative(relative)?;

        let path = self.base_path.join(relative);
        if !path.is_file() {
            return Err(SiteError::NotFound(path));
        }

        tracing::debug!(path = %path.display(), "Resolved site file");
        Ok(path)
    }

    /// Read the file at `relative` below the base path.
    ///
    /// # Errors
    ///
    /// Same as [`SafeFileLoader::resolve`], plus `SiteError::Io` on read failure.
    pub fn read(&self, relative: &str) -> Result<String, SiteError> {
        let path = self.resolve(relative)?;
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Reject any relative path that could leave the base directory.
///
/// A `..` anywhere in the string is rejected, not only as a full segment.
fn validate_relative(relative: &str) -> Result<(), SiteError> {
    let escapes = relative.contains("..")
        || relative.starts_with('/')
        || relative.starts_with('\\')
        || Path::new(relative)
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir));

    if escapes {
        tracing::warn!(path = relative, "Rejected file path outside base path");
        return Err(SiteError::InvalidPath(relative.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn create_loader() -> (tempfile::TempDir, SafeFileLoader) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content/blog")).unwrap();
        fs::write(dir.path().join("content/blog/post.html"), "post").unwrap();
        let loader = SafeFileLoader::new(dir.path());
        (dir, loader)
    }

    #[test]
    fn test_read_existing_file() {
        let (_dir, loader) = create_loader();
        assert_eq!(loader.read("content/blog/post.html").unwrap(), "post");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let (_dir, loader) = create_loader();
        let err = loader.read("content/blog/missing.html").unwrap_err();
        assert!(matches!(err, SiteError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn test_directory_is_not_found() {
        let (_dir, loader) = create_loader();
        let err = loader.resolve("content/blog").unwrap_err();
        assert!(matches!(err, SiteError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn test_parent_segments_rejected() {
        let (_dir, loader) = create_loader();
        for path in [
            "../secret",
            "content/../../secret",
            "content/..",
            "content/blog/..hidden.html",
        ] {
            let err = loader.resolve(path).unwrap_err();
            assert!(matches!(err, SiteError::InvalidPath(_)), "{path}: got {err:?}");
        }
    }

    #[test]
    fn test_absolute_paths_rejected() {
        let (_dir, loader) = create_loader();
        for path in ["/etc/passwd", "\\windows\\system.ini"] {
            let err = loader.resolve(path).unwrap_err();
            assert!(matches!(err, SiteError::InvalidPath(_)), "{path}: got {err:?}");
        }
    }

    #[test]
    fn test_rejection_happens_before_existence_check() {
        // The target exists, but the path still may not name it.
        let (dir, _) = create_loader();
        let nested = SafeFileLoader::new(dir.path().join("content"));
        let err = nested.resolve("../content/blog/post.html").unwrap_err();
        assert!(matches!(err, SiteError::InvalidPath(_)));
    }
}

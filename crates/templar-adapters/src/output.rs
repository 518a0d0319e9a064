//! Rendered-output writer using std::fs.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use templar_core::application::ApplicationError;
use templar_core::domain::TemplateFile;

/// Writes rendered files under an output root directory.
#[derive(Debug, Clone)]
pub struct LocalOutput {
    root: PathBuf,
}

impl LocalOutput {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write every file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// [`ApplicationError::UnsafeOutputPath`] when a rendered file name is
    /// absolute or contains `..`; [`ApplicationError::Filesystem`] on I/O
    /// failure.
    #[instrument(skip_all, fields(root = %self.root.display(), files = files.len()))]
    pub fn write_all(&self, files: &[TemplateFile]) -> Result<(), ApplicationError> {
        for file in files {
            let target = self.resolve(&file.name)?;
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ApplicationError::Filesystem {
                    path: parent.to_path_buf(),
                    reason: format!("Failed to create directory: {e}"),
                })?;
            }
            std::fs::write(&target, &file.content).map_err(|e| ApplicationError::Filesystem {
                path: target.clone(),
                reason: format!("Failed to write file: {e}"),
            })?;
            debug!(file = %file.name, "wrote rendered file");
        }
        Ok(())
    }

    /// Resolve a rendered name against the root, rejecting escapes.
    ///
    /// Tag values flow into file names, so a hostile or buggy template could
    /// otherwise write outside the output directory.
    fn resolve(&self, name: &str) -> Result<PathBuf, ApplicationError> {
        let relative = Path::new(name);
        let safe = relative.components().all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !safe {
            return Err(ApplicationError::UnsafeOutputPath {
                name: name.to_owned(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = LocalOutput::new(dir.path());

        output
            .write_all(&[
                TemplateFile::new("README.md", "# hi\n"),
                TemplateFile::new("src/app/main.txt", "main\n"),
            ])
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("src/app/main.txt")).unwrap(),
            "main\n"
        );
    }

    #[test]
    fn rejects_escaping_names() {
        let dir = tempfile::tempdir().unwrap();
        let output = LocalOutput::new(dir.path());

        for name in ["../escape.txt", "/etc/passwd", "a/../../b", ""] {
            let err = output
                .write_all(&[TemplateFile::new(name, "x")])
                .unwrap_err();
            assert!(matches!(err, ApplicationError::UnsafeOutputPath { .. }), "{name}");
        }
    }
}

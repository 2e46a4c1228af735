//! Fragment types of a split document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::SplitError;
use crate::yaml::OutputFormat;

/// A piece of a split document, to be written to its own file.
///
/// ```rust
/// use serde_json::json;
/// use specloom_core::split::Fragment;
/// use std::path::PathBuf;
///
/// let fragment = Fragment::new("out/schemas/Menu.yaml", json!({"type": "object"}));
///
/// assert_eq!(fragment.path, PathBuf::from("out/schemas/Menu.yaml"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment<T: Serialize = Value> {
    /// Where this fragment is written.
    pub path: PathBuf,

    /// The content to serialize into the fragment file.
    pub content: T,
}

impl<T: Serialize> Fragment<T> {
    /// Creates a new fragment with the given path and content.
    pub fn new(path: impl Into<PathBuf>, content: T) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }

    /// Writes this fragment, creating its parent directories.
    ///
    /// # Errors
    ///
    /// Fails when the content cannot be serialized or the file cannot be
    /// written; I/O errors are propagated unmodified.
    pub fn write(&self, format: OutputFormat) -> Result<(), SplitError> {
        let text = format.serialize(&self.content)?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), "fragment written");
        Ok(())
    }
}

/// The result of splitting a document.
///
/// Contains the index, with `$ref` links to the extracted files, and the
/// fragments to write next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult<T: Serialize = Value> {
    /// The index document.
    pub index: Fragment<T>,

    /// Extracted fragments to be written to separate files.
    pub fragments: Vec<Fragment<T>>,
}

impl<T: Serialize> SplitResult<T> {
    /// Creates a new split result with no fragments.
    pub fn new(index: Fragment<T>) -> Self {
        Self {
            index,
            fragments: Vec::new(),
        }
    }

    /// Adds a fragment to the result.
    pub fn add_fragment(&mut self, fragment: Fragment<T>) {
        self.fragments.push(fragment);
    }

    /// Returns the number of fragments.
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Returns the fragment written at `path`, if any.
    pub fn fragment(&self, path: &Path) -> Option<&Fragment<T>> {
        self.fragments.iter().find(|fragment| fragment.path == path)
    }

    /// Writes every fragment, then the index.
    ///
    /// Returns the path of the index file.
    ///
    /// # Errors
    ///
    /// Stops at the first failing write; files already written are kept.
    pub fn write(&self, format: OutputFormat) -> Result<PathBuf, SplitError> {
        for fragment in &self.fragments {
            fragment.write(format)?;
        }
        self.index.write(format)?;
        debug!(
            index = %self.index.path.display(),
            fragments = self.fragments.len(),
            %format,
            "split tree written"
        );
        Ok(self.index.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_add_fragments() {
        let mut result = SplitResult::new(Fragment::new("openapi.yaml", json!({})));

        result.add_fragment(Fragment::new("schemas/Menu.yaml", json!({"type": "object"})));
        result.add_fragment(Fragment::new("paths/menu.yaml", json!({})));

        assert_eq!(result.fragment_count(), 2);
        assert!(result.fragment(Path::new("schemas/Menu.yaml")).is_some());
        assert!(result.fragment(Path::new("schemas/Other.yaml")).is_none());
    }

    #[test]
    fn should_write_tree_with_parent_directories() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        let mut result = SplitResult::new(Fragment::new(
            root.join("openapi.json"),
            json!({"openapi": "3.1.0"}),
        ));
        result.add_fragment(Fragment::new(
            root.join("schemas/resturant/Menu.json"),
            json!({"type": "object"}),
        ));

        let index = result.write(OutputFormat::Json)?;
        // writing twice is idempotent
        result.write(OutputFormat::Json)?;

        assert_eq!(index, root.join("openapi.json"));
        let menu = fs::read_to_string(root.join("schemas/resturant/Menu.json"))?;
        assert_eq!(menu, "{\n  \"type\": \"object\"\n}\n");
        Ok(())
    }

    #[test]
    fn should_propagate_io_errors() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let blocker = temp.path().join("schemas");
        fs::write(&blocker, "not a directory")?;
        let fragment = Fragment::new(blocker.join("Menu.yaml"), json!({}));

        let error = fragment
            .write(OutputFormat::Yaml)
            .expect_err("should fail");

        assert!(matches!(error, SplitError::IoError(_)));
        Ok(())
    }
}

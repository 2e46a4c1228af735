use std::path::{Path, PathBuf};

use crate::yaml::OutputFormat;

/// Where and how a split tree is written.
///
/// ```rust
/// use specloom_core::OutputFormat;
/// use specloom_core::split::SplitLayout;
/// use std::path::Path;
///
/// let layout = SplitLayout::new("out").with_format(OutputFormat::Json);
///
/// assert_eq!(layout.schemas_root(), Path::new("out/schemas"));
/// assert_eq!(layout.paths_root(), Path::new("out/paths"));
/// assert_eq!(layout.index_path(), Path::new("out/openapi.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLayout {
    root: PathBuf,
    schemas_dir: String,
    paths_dir: String,
    index_stem: String,
    format: OutputFormat,
}

impl SplitLayout {
    /// Creates the default layout under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            schemas_dir: "schemas".to_string(),
            paths_dir: "paths".to_string(),
            index_stem: "openapi".to_string(),
            format: OutputFormat::default(),
        }
    }

    /// Sets the directory of schema files, relative to the root.
    #[must_use]
    pub fn with_schemas_dir(mut self, schemas_dir: impl Into<String>) -> Self {
        self.schemas_dir = schemas_dir.into();
        self
    }

    /// Sets the directory of path files, relative to the root.
    #[must_use]
    pub fn with_paths_dir(mut self, paths_dir: impl Into<String>) -> Self {
        self.paths_dir = paths_dir.into();
        self
    }

    /// Sets the file stem of the index.
    #[must_use]
    pub fn with_index_stem(mut self, index_stem: impl Into<String>) -> Self {
        self.index_stem = index_stem.into();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Returns the output root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the output format.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns the directory receiving schema files.
    #[must_use]
    pub fn schemas_root(&self) -> PathBuf {
        self.root.join(&self.schemas_dir)
    }

    /// Returns the directory receiving path files.
    #[must_use]
    pub fn paths_root(&self) -> PathBuf {
        self.root.join(&self.paths_dir)
    }

    /// Returns the location of the index file.
    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.root
            .join(format!("{}.{}", self.index_stem, self.format.extension()))
    }
}

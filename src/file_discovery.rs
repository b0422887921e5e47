use crate::error::{CatalogueError, Result};
use globset::{GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Async recursive discovery of XML catalogue files
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// Lowercase file extensions to include, without the dot
    extensions: Vec<String>,
    include_set: Option<GlobSet>,
    exclude_set: Option<GlobSet>,
    /// Maximum depth for directory traversal (None = unlimited)
    max_depth: Option<usize>,
    follow_symlinks: bool,
}

/// Files found by one walk, in walk order
#[derive(Debug, Default, Clone)]
pub struct DiscoveredFiles {
    pub files: Vec<PathBuf>,
    /// Entries that could not be read and were skipped
    pub errors: usize,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self {
            extensions: vec!["xml".to_string()],
            include_set: None,
            exclude_set: None,
            max_depth: None,
            follow_symlinks: false,
        }
    }

    /// Set file extensions to discover (compared case-insensitively)
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Result<Self> {
        self.include_set = build_glob_set(&patterns, "include")?;
        Ok(self)
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Result<Self> {
        self.exclude_set = build_glob_set(&patterns, "exclude")?;
        Ok(self)
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Discover matching files below `path` (or `path` itself if it is a file)
    pub async fn discover_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        Ok(self.discover(path).await?.files)
    }

    /// Walk `path`, skipping unreadable entries instead of failing.
    ///
    /// The order is the order in which the directory reads return entries: stable
    /// for a given tree within one walk, but not sorted.
    pub async fn discover(&self, path: &Path) -> Result<DiscoveredFiles> {
        let metadata = fs::metadata(path).await?;
        let mut found = DiscoveredFiles::default();

        if metadata.is_file() {
            if self.should_process(path) {
                found.files.push(path.to_path_buf());
            }
            return Ok(found);
        }

        if !metadata.is_dir() {
            return Err(CatalogueError::FileSystemTraversal {
                path: path.to_path_buf(),
                reason: "not a file or directory".to_string(),
            });
        }

        self.walk_directory(path, 0, &mut found).await?;
        debug!(
            root = %path.display(),
            files = found.files.len(),
            errors = found.errors,
            "File discovery finished"
        );
        Ok(found)
    }

    /// Entries directly inside `dir` sit at `depth`
    fn walk_directory<'a>(
        &'a self,
        dir: &'a Path,
        depth: usize,
        found: &'a mut DiscoveredFiles,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut read_dir = fs::read_dir(dir).await?;

            while let Some(entry) = read_dir.next_entry().await? {
                let entry_path = entry.path();

                if entry_path.is_symlink() && !self.follow_symlinks {
                    continue;
                }

                if let Err(e) = self.visit(&entry_path, depth, found).await {
                    warn!(path = %entry_path.display(), error = %e, "Skipping unreadable entry");
                    found.errors += 1;
                }
            }

            Ok(())
        })
    }

    async fn visit(&self, path: &Path, depth: usize, found: &mut DiscoveredFiles) -> Result<()> {
        if let Some(max_depth) = self.max_depth
            && depth > max_depth
        {
            return Ok(());
        }

        let metadata = fs::metadata(path).await?;

        if metadata.is_file() {
            if self.should_process(path) {
                found.files.push(path.to_path_buf());
            }
        } else if metadata.is_dir() {
            if let Some(max_depth) = self.max_depth
                && depth >= max_depth
            {
                return Ok(());
            }
            self.walk_directory(path, depth + 1, found).await?;
        }

        Ok(())
    }

    /// Check if a file should be processed based on extensions and patterns
    pub fn should_process(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        if !self.extensions.contains(&extension.to_lowercase()) {
            return false;
        }

        if let Some(exclude_set) = &self.exclude_set
            && exclude_set.is_match(path)
        {
            return false;
        }

        // If include patterns are given, at least one must match
        if let Some(include_set) = &self.include_set {
            return include_set.is_match(path);
        }

        true
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

fn build_glob_set(patterns: &[String], kind: &str) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = globset::GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                CatalogueError::Config(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
        builder.add(glob);
    }

    let set = builder.build().map_err(|e| {
        CatalogueError::Config(format!("Failed to build {} glob set: {}", kind, e))
    })?;
    Ok(Some(set))
}

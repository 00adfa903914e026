//! Template sources: where a scaffold run reads its files from.
//!
//! The [`TemplateSource`] trait is the collaborator boundary for the template
//! root contract: a tree of files addressed by root-relative paths. Two
//! implementations exist: [`DirTemplates`] for a template directory on disk
//! (the `--template` flag) and [`EmbeddedTemplates`] for the built-in
//! template compiled into the binary.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use rust_embed::RustEmbed;
use walkdir::WalkDir;

use crate::errors::SourceError;

/// A readable tree of template files.
///
/// Paths are always relative to the template root. `read` suspends on disk
/// I/O for directory sources; the renderer relies on this when resolving
/// includes mid-render.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// All file paths in the template, relative to the root, sorted.
    fn entries(&self) -> Result<Vec<PathBuf>, SourceError>;

    /// Read one file as UTF-8 text.
    async fn read(&self, rel: &Path) -> Result<String, SourceError>;

    /// Read one file byte-for-byte.
    async fn read_bytes(&self, rel: &Path) -> Result<Vec<u8>, SourceError>;
}

/// Resolve an include target against the directory of the file being
/// rendered, normalizing `.` and `..` components.
///
/// Returns `None` when the target is absolute or traverses above the
/// template root; includes may only reach files inside the template.
pub fn resolve_relative(base_dir: &Path, target: &str) -> Option<PathBuf> {
    let mut resolved: Vec<std::ffi::OsString> = base_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_os_string()),
            _ => None,
        })
        .collect();

    for component in Path::new(target).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop()?;
            }
            Component::Normal(part) => resolved.push(part.to_os_string()),
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    Some(resolved.iter().collect())
}

/// A template rooted at a directory on disk.
pub struct DirTemplates {
    root: PathBuf,
}

impl DirTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn map_read_error(rel: &Path, source: std::io::Error) -> SourceError {
        match source.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound {
                path: rel.to_path_buf(),
            },
            std::io::ErrorKind::InvalidData => SourceError::NotUtf8 {
                path: rel.to_path_buf(),
            },
            _ => SourceError::Io {
                path: rel.to_path_buf(),
                source,
            },
        }
    }
}

#[async_trait]
impl TemplateSource for DirTemplates {
    fn entries(&self) -> Result<Vec<PathBuf>, SourceError> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|source| SourceError::Walk {
                path: self.root.clone(),
                source,
            })?;
            if entry.file_type().is_file() {
                let rel = entry
                    .path()
                    .strip_prefix(&self.root)
                    .expect("walked entries live under the walk root")
                    .to_path_buf();
                entries.push(rel);
            }
        }
        Ok(entries)
    }

    async fn read(&self, rel: &Path) -> Result<String, SourceError> {
        tokio::fs::read_to_string(self.root.join(rel))
            .await
            .map_err(|source| Self::map_read_error(rel, source))
    }

    async fn read_bytes(&self, rel: &Path) -> Result<Vec<u8>, SourceError> {
        tokio::fs::read(self.root.join(rel))
            .await
            .map_err(|source| Self::map_read_error(rel, source))
    }
}

#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/template"]
struct BuiltinAssets;

/// The built-in plugin template, embedded at compile time.
pub struct EmbeddedTemplates;

/// Embedded assets are keyed by forward-slash paths.
fn asset_key(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl TemplateSource for EmbeddedTemplates {
    fn entries(&self) -> Result<Vec<PathBuf>, SourceError> {
        let mut entries: Vec<PathBuf> = BuiltinAssets::iter()
            .map(|path| PathBuf::from(path.as_ref()))
            .collect();
        entries.sort();
        Ok(entries)
    }

    async fn read(&self, rel: &Path) -> Result<String, SourceError> {
        let bytes = self.read_bytes(rel).await?;
        String::from_utf8(bytes).map_err(|_| SourceError::NotUtf8 {
            path: rel.to_path_buf(),
        })
    }

    async fn read_bytes(&self, rel: &Path) -> Result<Vec<u8>, SourceError> {
        let file = BuiltinAssets::get(&asset_key(rel)).ok_or_else(|| SourceError::NotFound {
            path: rel.to_path_buf(),
        })?;
        Ok(file.data.into_owned())
    }
}

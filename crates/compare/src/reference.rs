//! Reference-asset lookup: previously generated creatives per campaign.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::LookupError;
use crate::types::ReferenceAsset;

/// Optional per-reference manifest carrying provider/version metadata.
pub const MANIFEST_FILE: &str = "creatives.json";

const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Lists the creatives that belong to a reference set.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    async fn list_creative_images(
        &self,
        reference_id: &str,
    ) -> Result<Vec<ReferenceAsset>, LookupError>;
}

/// Creatives stored as `<root>/<reference_id>/<creative_id>.<ext>`.
///
/// A `creatives.json` manifest next to the images
/// (`[{"id": "..", "provider": "..", "version": 2}]`) adds metadata and may
/// name creatives whose image was never rendered; those come back with
/// `image_path: None`. A missing reference directory is an empty set.
#[derive(Debug, Clone)]
pub struct DirectoryReferenceLookup {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: String,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    version: Option<u32>,
}

impl DirectoryReferenceLookup {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ReferenceLookup for DirectoryReferenceLookup {
    async fn list_creative_images(
        &self,
        reference_id: &str,
    ) -> Result<Vec<ReferenceAsset>, LookupError> {
        let dir = self.root.join(reference_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut by_id: BTreeMap<String, ReferenceAsset> = BTreeMap::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            let is_raster = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| RASTER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if !is_raster {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let creative_id = stem.to_string();
            by_id.insert(creative_id.clone(), ReferenceAsset::new(creative_id, path));
        }

        match tokio::fs::read(dir.join(MANIFEST_FILE)).await {
            Ok(raw) => {
                let manifest: Vec<ManifestEntry> = serde_json::from_slice(&raw)?;
                for item in manifest {
                    let asset = by_id
                        .entry(item.id.clone())
                        .or_insert_with(|| ReferenceAsset::without_image(item.id));
                    asset.provider = item.provider;
                    if let Some(version) = item.version {
                        asset.version = version;
                    }
                }
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }

        Ok(by_id.into_values().collect())
    }
}

/// Fixed reference sets held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReferenceLookup {
    sets: HashMap<String, Vec<ReferenceAsset>>,
}

impl InMemoryReferenceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_set(mut self, reference_id: impl Into<String>, assets: Vec<ReferenceAsset>) -> Self {
        self.sets.insert(reference_id.into(), assets);
        self
    }
}

#[async_trait]
impl ReferenceLookup for InMemoryReferenceLookup {
    async fn list_creative_images(
        &self,
        reference_id: &str,
    ) -> Result<Vec<ReferenceAsset>, LookupError> {
        Ok(self.sets.get(reference_id).cloned().unwrap_or_default())
    }
}

// ==============================================================================
// resources.rs — ASSET PROVIDER
// ------------------------------------------------------------------------------
// Resolves every manifest entry against the base directory in a background
// task and fires one readiness signal when all entries are settled.
//
// A missing file is not fatal: the entry is recorded as missing and whoever
// asks for it gets `None`, which the actors turn into a node with no visual.
// ==============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::config::{AssetKind, AssetManifest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedAsset {
    pub name: String,
    pub path: PathBuf,
    pub kind: AssetKind,
    pub bytes: u64,
}

#[derive(Debug, Default)]
pub struct Resources {
    loaded: HashMap<String, LoadedAsset>,
    missing: Vec<String>,
}

impl Resources {
    pub async fn load(manifest: &AssetManifest) -> Self {
        let base = Path::new(&manifest.base_dir);
        let mut resources = Self::default();

        for entry in &manifest.entries {
            let path = base.join(&entry.path);
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {
                    resources.loaded.insert(
                        entry.name.clone(),
                        LoadedAsset {
                            name: entry.name.clone(),
                            path,
                            kind: entry.kind,
                            bytes: meta.len(),
                        },
                    );
                }
                Ok(_) => {
                    warn!(asset = %entry.name, path = %path.display(), "asset path is not a file");
                    resources.missing.push(entry.name.clone());
                }
                Err(e) => {
                    warn!(asset = %entry.name, path = %path.display(), error = %e, "asset missing");
                    resources.missing.push(entry.name.clone());
                }
            }
        }

        info!(
            loaded = resources.loaded.len(),
            missing = resources.missing.len(),
            "resources ready"
        );
        resources
    }

    pub fn get(&self, name: &str) -> Option<&LoadedAsset> {
        self.loaded.get(name)
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

/// Fires once, when every manifest entry has been resolved.
#[derive(Debug)]
pub struct ReadySignal {
    receiver: Option<oneshot::Receiver<Resources>>,
}

impl ReadySignal {
    /// Starts resolving the manifest on the runtime.
    pub fn spawn(manifest: AssetManifest) -> Self {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let resources = Resources::load(&manifest).await;
            // The receiver may be gone if the app shut down first.
            let _ = tx.send(resources);
        });
        Self { receiver: Some(rx) }
    }

    /// A signal that is already ready with `resources`.
    pub fn ready(resources: Resources) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(resources);
        Self { receiver: Some(rx) }
    }

    /// Takes the resources if they are ready. Yields `Some` at most once.
    pub fn try_take(&mut self) -> Option<Resources> {
        let receiver = self.receiver.as_mut()?;
        match receiver.try_recv() {
            Ok(resources) => {
                self.receiver = None;
                Some(resources)
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                warn!("resource loader ended without a result");
                self.receiver = None;
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }
}

// model_store.rs
// Purpose: Persist the single current fuel model behind an injectable repository
//
// Every backend stores the whole serialized blob under one key and replaces
// it in a single operation, so readers never see a half-written model.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sled::Db;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config_loader::{StoreBackend, StoreConfig};
use crate::errors::{FuelError, FuelResult, SafeLock};
use crate::fitted_model::{FittedModel, MODEL_SCHEMA_VERSION};

/// Fixed identifier of the stored model.
pub const MODEL_KEY: &str = "fuelMLModel_v1";
const MODEL_TREE: &str = "models";

pub trait ModelRepository: Send + Sync {
    fn read_blob(&self) -> FuelResult<Option<Vec<u8>>>;

    /// Replace the stored blob in one step.
    fn write_blob(&self, bytes: &[u8]) -> FuelResult<()>;

    fn clear(&self) -> FuelResult<()>;

    fn save(&self, model: &FittedModel) -> FuelResult<()> {
        let bytes = serde_json::to_vec(model)
            .map_err(|e| FuelError::serialization("encode fitted model", e))?;
        self.write_blob(&bytes)?;
        debug!(bytes = bytes.len(), samples = model.sample_count, "saved fuel model");
        Ok(())
    }

    /// Stored model, or `None` when absent, unreadable, corrupt or from an
    /// incompatible schema.
    fn load(&self) -> Option<FittedModel> {
        let bytes = match self.read_blob() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "could not read stored fuel model");
                return None;
            }
        };
        decode_model(&bytes)
    }
}

/// Parse a stored blob. Corrupt JSON is treated as "no model".
pub fn decode_model(bytes: &[u8]) -> Option<FittedModel> {
    match serde_json::from_slice::<FittedModel>(bytes) {
        Ok(model) if model.is_compatible() => Some(model),
        Ok(model) => {
            warn!(
                stored = model.schema_version,
                expected = MODEL_SCHEMA_VERSION,
                "ignoring stored fuel model with incompatible schema"
            );
            None
        }
        Err(e) => {
            warn!(error = %e, "ignoring corrupt stored fuel model");
            None
        }
    }
}

/// In-process store, mostly for tests and one-shot CLI runs.
#[derive(Default)]
pub struct MemoryModelRepository {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryModelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelRepository for MemoryModelRepository {
    fn read_blob(&self) -> FuelResult<Option<Vec<u8>>> {
        Ok(self.blob.safe_lock()?.clone())
    }

    fn write_blob(&self, bytes: &[u8]) -> FuelResult<()> {
        *self.blob.safe_lock()? = Some(bytes.to_vec());
        Ok(())
    }

    fn clear(&self) -> FuelResult<()> {
        *self.blob.safe_lock()? = None;
        Ok(())
    }
}

/// JSON file store. Each write goes to its own synced temp file in the same
/// directory, which is then renamed over the target.
pub struct FileModelRepository {
    path: PathBuf,
}

impl FileModelRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/fuelMLModel_v1.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{MODEL_KEY}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl ModelRepository for FileModelRepository {
    fn read_blob(&self) -> FuelResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FuelError::io("read model file", e)),
        }
    }

    fn write_blob(&self, bytes: &[u8]) -> FuelResult<()> {
        let dir = self.dir();
        fs::create_dir_all(dir).map_err(|e| FuelError::io("create model dir", e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FuelError::io("create model temp file", e))?;
        tmp.write_all(bytes)
            .map_err(|e| FuelError::io("write model temp file", e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| FuelError::io("sync model temp file", e))?;
        tmp.persist(&self.path)
            .map_err(|e| FuelError::io("replace model file", e.error))?;
        Ok(())
    }

    fn clear(&self) -> FuelResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FuelError::io("remove model file", e)),
        }
    }
}

/// sled-backed store; the model lives under [`MODEL_KEY`] in the `models` tree.
pub struct SledModelRepository {
    db: Db,
}

impl SledModelRepository {
    pub fn open(path: &Path) -> FuelResult<Self> {
        let db = sled::open(path).map_err(|e| FuelError::database("open sled model store", e))?;
        Ok(Self { db })
    }

    fn tree(&self) -> FuelResult<sled::Tree> {
        self.db
            .open_tree(MODEL_TREE)
            .map_err(|e| FuelError::database("open models tree", e))
    }
}

impl ModelRepository for SledModelRepository {
    fn read_blob(&self) -> FuelResult<Option<Vec<u8>>> {
        Ok(self.tree()?.get(MODEL_KEY.as_bytes())?.map(|v| v.to_vec()))
    }

    fn write_blob(&self, bytes: &[u8]) -> FuelResult<()> {
        let tree = self.tree()?;
        tree.insert(MODEL_KEY.as_bytes(), bytes)?;
        tree.flush()?;
        Ok(())
    }

    fn clear(&self) -> FuelResult<()> {
        let tree = self.tree()?;
        tree.remove(MODEL_KEY.as_bytes())?;
        tree.flush()?;
        Ok(())
    }
}

/// Build the repository named by the store config.
pub fn open_repository(cfg: &StoreConfig) -> FuelResult<Box<dyn ModelRepository>> {
    let repo: Box<dyn ModelRepository> = match cfg.backend {
        StoreBackend::Sled => Box::new(SledModelRepository::open(&cfg.path)?),
        StoreBackend::File => Box::new(FileModelRepository::in_dir(&cfg.path)),
        StoreBackend::Memory => Box::new(MemoryModelRepository::new()),
    };
    info!(backend = ?cfg.backend, path = %cfg.path.display(), "model store ready");
    Ok(repo)
}

impl<T: ModelRepository + ?Sized> ModelRepository for Box<T> {
    fn read_blob(&self) -> FuelResult<Option<Vec<u8>>> {
        (**self).read_blob()
    }

    fn write_blob(&self, bytes: &[u8]) -> FuelResult<()> {
        (**self).write_blob(bytes)
    }

    fn clear(&self) -> FuelResult<()> {
        (**self).clear()
    }
}

/// Deployment record written next to an exported model file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelManifest {
    pub model_file: String,
    pub sha256: String,
    pub schema_version: u32,
    pub sample_count: usize,
    pub augmented: bool,
    pub r2: f64,
    pub timestamp: DateTime<Utc>,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Write `model` as pretty JSON to `path` and `model_manifest.json` beside it.
pub fn export_model(model: &FittedModel, path: &Path) -> FuelResult<ModelManifest> {
    let json = serde_json::to_vec_pretty(model)
        .map_err(|e| FuelError::serialization("encode exported model", e))?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| FuelError::io("create export dir", e))?;
        }
    }
    fs::write(path, &json).map_err(|e| FuelError::io("write exported model", e))?;

    let manifest = ModelManifest {
        model_file: path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
        sha256: sha256_hex(&json),
        schema_version: model.schema_version,
        sample_count: model.sample_count,
        augmented: model.augmented,
        r2: model.r2,
        timestamp: Utc::now(),
    };

    let manifest_path = path.with_file_name("model_manifest.json");
    let manifest_json = serde_json::to_string_pretty(&manifest)?;
    fs::write(&manifest_path, manifest_json).map_err(|e| FuelError::io("write model manifest", e))?;

    Ok(manifest)
}

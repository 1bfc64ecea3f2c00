//! In-memory model store backed by on-disk model files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::descriptor::ModelDescriptor;
use crate::engine::Engine;
use crate::instance::ValidatedInstance;
use crate::observability::Logger;

use super::errors::{RegistryError, RegistryResult};
use super::file::ModelFile;

/// Registry of model descriptors, keyed by model name.
///
/// Models register once and never change; many construction calls can
/// then share the registry read-only. Model files live at
/// `<data_dir>/models/model_<name>.json`.
pub struct ModelRegistry {
    /// Directory containing model files
    model_dir: PathBuf,
    /// Registered models by name
    models: HashMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    /// Creates a registry rooted at the given data directory.
    ///
    /// Nothing is read from disk until [`ModelRegistry::load_all`].
    pub fn new(data_dir: &Path) -> Self {
        Self {
            model_dir: data_dir.join("models"),
            models: HashMap::new(),
        }
    }

    /// Returns the model directory path.
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Loads every model file from the model directory.
    ///
    /// A missing directory is created and loads nothing. Malformed files
    /// are fatal: a registry that silently skipped a definition would
    /// validate against a different world than the one on disk.
    pub fn load_all(&mut self) -> RegistryResult<()> {
        if !self.model_dir.exists() {
            fs::create_dir_all(&self.model_dir).map_err(|e| {
                RegistryError::malformed_file(
                    self.model_dir.display().to_string(),
                    format!("failed to create model directory: {}", e),
                )
            })?;
            return Ok(());
        }

        let entries = fs::read_dir(&self.model_dir).map_err(|e| {
            RegistryError::malformed_file(
                self.model_dir.display().to_string(),
                format!("failed to read model directory: {}", e),
            )
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                RegistryError::malformed_file(
                    self.model_dir.display().to_string(),
                    format!("failed to read directory entry: {}", e),
                )
            })?;

            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            self.load_model_file(&path)?;
        }

        Ok(())
    }

    fn load_model_file(&mut self, path: &Path) -> RegistryResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            RegistryError::malformed_file(
                path.display().to_string(),
                format!("failed to read file: {}", e),
            )
        })?;

        let file: ModelFile = serde_json::from_str(&content).map_err(|e| {
            RegistryError::malformed_file(path.display().to_string(), format!("invalid JSON: {}", e))
        })?;

        let model = file
            .into_model()
            .map_err(|reason| RegistryError::malformed_file(path.display().to_string(), reason))?;

        Logger::info(
            "MODEL_FILE_LOADED",
            &[("model", model.name()), ("path", &path.display().to_string())],
        );
        self.register(model)
    }

    /// Registers a model directly.
    ///
    /// Re-registering a name is an error; registered models are immutable.
    pub fn register(&mut self, model: ModelDescriptor) -> RegistryResult<()> {
        if self.models.contains_key(model.name()) {
            return Err(RegistryError::model_immutable(model.name()));
        }
        Logger::info("MODEL_REGISTERED", &[("model", model.name())]);
        self.models.insert(model.name().to_string(), model);
        Ok(())
    }

    /// Gets a model by name.
    pub fn get(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.get(name)
    }

    /// Checks whether a model name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Returns all registered models.
    pub fn models(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.values()
    }

    /// Returns the number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Constructs an instance of a registered model.
    pub fn construct(&self, name: &str, raw: &Value) -> RegistryResult<ValidatedInstance> {
        let model = self
            .get(name)
            .ok_or_else(|| RegistryError::unknown_model(name))?;
        Engine::new(model)
            .construct(raw)
            .map_err(|validation| RegistryError::construction_failed(name, validation))
    }

    /// Saves a registered model to its file.
    ///
    /// Refuses to overwrite: model files are as immutable as registered
    /// models.
    pub fn save(&self, name: &str) -> RegistryResult<PathBuf> {
        let model = self
            .get(name)
            .ok_or_else(|| RegistryError::unknown_model(name))?;

        let path = self.model_dir.join(format!("model_{}.json", model.name()));
        if path.exists() {
            return Err(RegistryError::model_immutable(model.name()));
        }

        if !self.model_dir.exists() {
            fs::create_dir_all(&self.model_dir).map_err(|e| {
                RegistryError::malformed_file(
                    self.model_dir.display().to_string(),
                    format!("failed to create model directory: {}", e),
                )
            })?;
        }

        let content = serde_json::to_string_pretty(&ModelFile::from_model(model)).map_err(|e| {
            RegistryError::malformed_file(
                path.display().to_string(),
                format!("failed to serialize model: {}", e),
            )
        })?;

        fs::write(&path, content).map_err(|e| {
            RegistryError::malformed_file(
                path.display().to_string(),
                format!("failed to write file: {}", e),
            )
        })?;

        Ok(path)
    }
}

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use arbor_core::{Group, TableId};
use arbor_storage_common::IndexDef;
use sled::{Config, Db};
use tracing::{debug, info};

use crate::error::IndexError;
use crate::index::{IndexManager, SledIndex};

/// How to open the underlying sled database
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub path: Option<PathBuf>,
    /// Delete the database when the engine is dropped
    pub temporary: bool,
    /// None disables background flushing
    pub flush_every_ms: Option<u64>,
    pub cache_capacity_bytes: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self { Self { path: None, temporary: false, flush_every_ms: Some(500), cache_capacity_bytes: None } }
}

impl EngineConfig {
    pub fn at(path: impl Into<PathBuf>) -> Self { Self { path: Some(path.into()), ..Self::default() } }

    pub fn temporary() -> Self { Self { temporary: true, flush_every_ms: None, ..Self::default() } }

    fn to_sled(&self) -> Config {
        let mut config = Config::new().temporary(self.temporary).flush_every_ms(self.flush_every_ms);
        if let Some(path) = &self.path {
            config = config.path(path);
        }
        if let Some(bytes) = self.cache_capacity_bytes {
            config = config.cache_capacity(bytes);
        }
        config
    }
}

pub struct SledStorageEngine {
    pub db: Db,
    groups: RwLock<HashMap<String, Arc<Group>>>,
    indexes: IndexManager,
}

impl SledStorageEngine {
    pub fn open(config: EngineConfig) -> Result<Self, IndexError> {
        debug!("opening sled storage engine with {:?}", config);
        let db = config.to_sled().open()?;
        let indexes = IndexManager::open(db.open_tree("index_config")?)?;
        Ok(Self { db, groups: RwLock::new(HashMap::new()), indexes })
    }

    pub fn with_homedir_folder(folder_name: &str) -> anyhow::Result<Self> {
        let dir = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?.join(folder_name);

        Self::with_path(dir)
    }

    pub fn with_path(path: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&path)?;
        Ok(Self::open(EngineConfig::at(path.join("sled")))?)
    }

    pub fn new() -> anyhow::Result<Self> { Self::with_homedir_folder(".arbor") }

    pub fn new_test() -> anyhow::Result<Self> { Ok(Self::open(EngineConfig::temporary())?) }

    /// Make a group's tables known to the engine and open any indexes already defined on it
    pub fn register_group(&self, group: Group) -> Result<Arc<Group>, IndexError> {
        let mut groups = self.groups.write().unwrap_or_else(|e| e.into_inner());
        if groups.contains_key(group.name()) {
            return Err(IndexError::GroupExists(group.name().to_owned()));
        }
        let group = Arc::new(group);
        let reopened = self.indexes.attach(&group, &self.db)?;
        info!("registered group {} ({} tables, {} existing indexes)", group.name(), group.tables().len(), reopened);
        groups.insert(group.name().to_owned(), group.clone());
        Ok(group)
    }

    pub fn group(&self, name: &str) -> Option<Arc<Group>> { self.groups.read().unwrap_or_else(|e| e.into_inner()).get(name).cloned() }

    /// Define a new, empty index over `columns` of a registered group
    pub fn create_index(&self, group: &str, name: &str, leaf_table: TableId, columns: &[(TableId, &str)]) -> Result<SledIndex, IndexError> {
        let group = self.group(group).ok_or_else(|| IndexError::UnknownGroup(group.to_owned()))?;
        let def = IndexDef::new(&group, name, leaf_table, columns)?;
        self.indexes.create(def, group, &self.db)
    }

    pub fn index(&self, name: &str) -> Option<SledIndex> { self.indexes.get(name) }

    pub fn list_indexes(&self) -> Vec<String> { self.indexes.names() }

    pub fn flush(&self) -> Result<usize, IndexError> { Ok(self.db.flush()?) }
}

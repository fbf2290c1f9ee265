use arbor_core::indexing::{decode_index_key, encode_index_key};
use arbor_core::{Group, HKey, Row, TableId, Value};
use arbor_storage_common::{check_request, IndexDef, IndexScan, RangeError};
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::error::IndexError;
use crate::scan_index::SledIndexCursor;

/// Catalog entry persisted in the `index_config` tree, keyed by big-endian index id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    pub id: u32,
    pub def: IndexDef,
    pub created_at_unix_ms: i64,
}

#[derive(Clone)]
pub struct SledIndex(Arc<SledIndexInner>);

struct SledIndexInner {
    id: u32,
    def: IndexDef,
    group: Arc<Group>,
    created_at_unix_ms: i64,
    tree: Tree,
}

impl SledIndex {
    fn from_record(rec: &IndexRecord, group: Arc<Group>, db: &Db) -> Result<Self, IndexError> {
        Ok(Self(Arc::new(SledIndexInner {
            id: rec.id,
            def: rec.def.clone(),
            group,
            created_at_unix_ms: rec.created_at_unix_ms,
            tree: db.open_tree(format!("index_{}", rec.id))?,
        })))
    }

    pub fn id(&self) -> u32 { self.0.id }
    pub fn name(&self) -> &str { &self.0.def.name }
    pub fn def(&self) -> &IndexDef { &self.0.def }
    pub fn group(&self) -> &Arc<Group> { &self.0.group }
    pub fn width(&self) -> usize { self.0.def.width() }
    pub fn tree(&self) -> &Tree { &self.0.tree }
    pub fn created_at_unix_ms(&self) -> i64 { self.0.created_at_unix_ms }
    pub fn len(&self) -> usize { self.0.tree.len() }
    pub fn is_empty(&self) -> bool { self.0.tree.is_empty() }

    /// Store one entry: the index column values of a row and the row's HKey.
    ///
    /// The HKey must follow the index branch from the root, and may stop above the leaf table (a row of an
    /// ancestor table whose deeper columns are NULL).
    pub fn insert(&self, values: &[Value], hkey: &HKey) -> Result<(), IndexError> {
        let def = &self.0.def;
        if values.len() != def.width() {
            return Err(IndexError::WidthMismatch { index: def.name.clone(), expected: def.width(), got: values.len() });
        }
        for (column, value) in def.columns.iter().zip(values) {
            if !column.value_type.admits(value) {
                return Err(IndexError::TypeMismatch { column: column.column.clone(), expected: column.value_type, got: value.clone() });
            }
        }
        let on_branch = !hkey.is_empty()
            && hkey.len() <= def.branch.len()
            && hkey.segments().iter().zip(&def.branch).all(|(segment, table)| segment.ordinal == table.ordinal());
        if !on_branch {
            return Err(IndexError::HKeyOffBranch(hkey.to_string()));
        }
        self.0.tree.insert(encode_index_key(values, hkey), &[])?;
        Ok(())
    }

    /// Rebuild the row an index key describes
    pub fn decode_row(&self, key: &[u8]) -> Result<Row, IndexError> {
        let (values, hkey) = decode_index_key(key, self.width())?;
        let ordinal = hkey.leaf_ordinal().ok_or_else(|| IndexError::HKeyOffBranch(hkey.to_string()))?;
        let table = self.0.group.table(TableId(ordinal)).ok_or(IndexError::UnknownOrdinal(ordinal))?;
        Ok(Row::new(table.row_type().clone(), values, hkey))
    }

    /// Build a cursor for `scan`. Structural problems are reported here; range semantics are checked on open.
    pub fn scan(&self, scan: IndexScan) -> Result<SledIndexCursor, RangeError> {
        check_request(&self.0.def, &scan)?;
        Ok(SledIndexCursor::new(self.clone(), scan))
    }
}

pub struct IndexManager {
    pub index_config_tree: Tree,
    records: RwLock<HashMap<String, IndexRecord>>,
    indexes: RwLock<HashMap<String, SledIndex>>,
}

impl IndexManager {
    pub fn open(index_config_tree: Tree) -> Result<Self, IndexError> {
        let mut records = HashMap::new();
        for item in index_config_tree.iter() {
            let (key, bytes) = item?;
            let key = u32::from_be_bytes(key.as_ref().try_into().map_err(|_| IndexError::InvalidKeyLength)?);
            let mut rec: IndexRecord = bincode::deserialize(&bytes)?;
            // Trust key as source of truth for id
            rec.id = key;
            records.insert(rec.def.name.clone(), rec);
        }
        debug!("index catalog holds {} definitions", records.len());
        Ok(Self { index_config_tree, records: RwLock::new(records), indexes: RwLock::new(HashMap::new()) })
    }

    pub fn next_index_id(&self) -> Result<u32, IndexError> {
        if let Some((k, _)) = self.index_config_tree.last()? {
            let arr: [u8; 4] = k.as_ref().try_into().map_err(|_| IndexError::InvalidKeyLength)?;
            Ok(u32::from_be_bytes(arr) + 1)
        } else {
            Ok(0)
        }
    }

    /// Open the persisted indexes of a newly registered group
    pub fn attach(&self, group: &Arc<Group>, db: &Db) -> Result<usize, IndexError> {
        let records: Vec<IndexRecord> = read(&self.records).values().filter(|rec| rec.def.group == group.name()).cloned().collect();
        let mut indexes = write(&self.indexes);
        for rec in &records {
            indexes.insert(rec.def.name.clone(), SledIndex::from_record(rec, group.clone(), db)?);
        }
        Ok(records.len())
    }

    pub fn create(&self, def: IndexDef, group: Arc<Group>, db: &Db) -> Result<SledIndex, IndexError> {
        let mut records = write(&self.records);
        if records.contains_key(&def.name) {
            return Err(IndexError::IndexExists(def.name));
        }
        let rec = IndexRecord { id: self.next_index_id()?, def, created_at_unix_ms: chrono::Utc::now().timestamp_millis() };
        self.index_config_tree.insert(rec.id.to_be_bytes(), bincode::serialize(&rec)?)?;
        let index = SledIndex::from_record(&rec, group, db)?;
        info!("created index {} (id {}) on group {}", rec.def.name, rec.id, rec.def.group);
        write(&self.indexes).insert(rec.def.name.clone(), index.clone());
        records.insert(rec.def.name.clone(), rec);
        Ok(index)
    }

    pub fn get(&self, name: &str) -> Option<SledIndex> { read(&self.indexes).get(name).cloned() }

    /// Names of every index in the catalog, including those whose group is not registered yet
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.records).keys().cloned().collect();
        names.sort();
        names
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> { lock.read().unwrap_or_else(|e| e.into_inner()) }

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> { lock.write().unwrap_or_else(|e| e.into_inner()) }

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::SchemaError;
use crate::value::ValueType;

/// Identifies a table within its group. Doubles as the table's HKey ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableId(pub u32);

impl TableId {
    pub fn ordinal(&self) -> u32 { self.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub value_type: ValueType,
}

impl Column {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self { Self { name: name.into(), value_type } }
}

/// The type of a row: which table it belongs to and how deep that table sits in the hierarchy.
///
/// Cloning is cheap; two row types are equal only if they describe the same table.
#[derive(Clone)]
pub struct RowType(Arc<RowTypeInner>);

struct RowTypeInner {
    table: TableId,
    name: String,
    depth: usize,
}

impl RowType {
    pub fn table(&self) -> TableId { self.0.table }
    pub fn name(&self) -> &str { &self.0.name }
    pub fn depth(&self) -> usize { self.0.depth }
}

impl PartialEq for RowType {
    fn eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) || self.0.table == other.0.table }
}

impl Eq for RowType {}

impl std::fmt::Debug for RowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "RowType({}@{})", self.0.name, self.0.depth) }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub parent: Option<TableId>,
    pub depth: usize,
    pub columns: Vec<Column>,
    row_type: RowType,
}

impl Table {
    pub fn row_type(&self) -> &RowType { &self.row_type }

    pub fn column_position(&self, name: &str) -> Option<usize> { self.columns.iter().position(|c| c.name == name) }
}

/// A tree of tables whose rows are stored together and identified by hierarchical keys.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    tables: Vec<Table>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self { Self { name: name.into(), tables: Vec::new() } }

    pub fn name(&self) -> &str { &self.name }

    /// Add the root table. A group has exactly one root.
    pub fn add_root(&mut self, name: &str, columns: Vec<Column>) -> Result<TableId, SchemaError> {
        if !self.tables.is_empty() {
            return Err(SchemaError::RootExists(self.name.clone()));
        }
        self.add_table(name, None, columns)
    }

    pub fn add_child(&mut self, name: &str, parent: TableId, columns: Vec<Column>) -> Result<TableId, SchemaError> {
        if self.table(parent).is_none() {
            return Err(SchemaError::UnknownTable(parent));
        }
        self.add_table(name, Some(parent), columns)
    }

    fn add_table(&mut self, name: &str, parent: Option<TableId>, columns: Vec<Column>) -> Result<TableId, SchemaError> {
        if self.table_by_name(name).is_some() {
            return Err(SchemaError::DuplicateTable(name.to_owned()));
        }
        // Ordinals are 1-based and assigned in creation order, so they increase with depth along every branch
        let id = TableId(self.tables.len() as u32 + 1);
        let depth = match parent {
            Some(p) => self.table(p).map_or(0, |t| t.depth + 1),
            None => 0,
        };
        let row_type = RowType(Arc::new(RowTypeInner { table: id, name: name.to_owned(), depth }));
        debug!("group {}: table {} ordinal={} depth={}", self.name, name, id.0, depth);
        self.tables.push(Table { id, name: name.to_owned(), parent, depth, columns, row_type });
        Ok(id)
    }

    pub fn table(&self, id: TableId) -> Option<&Table> { id.0.checked_sub(1).and_then(|i| self.tables.get(i as usize)) }

    pub fn table_by_name(&self, name: &str) -> Option<&Table> { self.tables.iter().find(|t| t.name == name) }

    pub fn tables(&self) -> &[Table] { &self.tables }

    /// Tables from the root down to `leaf`, inclusive
    pub fn branch(&self, leaf: TableId) -> Result<Vec<TableId>, SchemaError> {
        let mut path = Vec::new();
        let mut current = Some(leaf);
        while let Some(id) = current {
            let table = self.table(id).ok_or(SchemaError::UnknownTable(id))?;
            path.push(id);
            current = table.parent;
        }
        path.reverse();
        Ok(path)
    }

    pub fn max_depth(&self) -> usize { self.tables.iter().map(|t| t.depth).max().unwrap_or(0) }
}

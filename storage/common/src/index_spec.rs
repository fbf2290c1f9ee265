use arbor_core::{Group, SchemaError, TableId, ValueType};
use serde::{Deserialize, Serialize};

/// One column of an index: a column of some table on the index's branch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexColumn {
    pub table: TableId,
    pub column: String,
    pub value_type: ValueType,
}

/// Definition of an ordered index over one or more levels of a group.
///
/// Entries sort by the column values in natural (ascending) order, ties broken by the row's HKey.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexDef {
    pub name: String,
    pub group: String,
    pub leaf_table: TableId,
    pub columns: Vec<IndexColumn>,
    /// Tables from the group root down to `leaf_table`
    pub branch: Vec<TableId>,
}

impl IndexDef {
    /// Resolve `(table, column name)` pairs against the group. Every column must belong to a table on the path
    /// from the root to `leaf_table`.
    pub fn new(group: &Group, name: &str, leaf_table: TableId, columns: &[(TableId, &str)]) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::NoColumns(name.to_owned()));
        }
        let branch = group.branch(leaf_table)?;
        let mut resolved = Vec::with_capacity(columns.len());
        for &(table_id, column) in columns {
            if !branch.contains(&table_id) {
                return Err(SchemaError::ColumnOffBranch { table: table_id, column: column.to_owned(), leaf: leaf_table });
            }
            let table = group.table(table_id).ok_or(SchemaError::UnknownTable(table_id))?;
            let position = table
                .column_position(column)
                .ok_or_else(|| SchemaError::UnknownColumn { table: table_id, column: column.to_owned() })?;
            resolved.push(IndexColumn { table: table_id, column: column.to_owned(), value_type: table.columns[position].value_type });
        }
        Ok(Self { name: name.to_owned(), group: group.name().to_owned(), leaf_table, columns: resolved, branch })
    }

    pub fn width(&self) -> usize { self.columns.len() }

    pub fn on_branch(&self, table: TableId) -> bool { self.branch.contains(&table) }

    /// True if the index spans more than one table
    pub fn is_group_index(&self) -> bool { self.columns.iter().any(|c| c.table != self.leaf_table) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_core::Column;

    fn coi() -> (Group, TableId, TableId, TableId, TableId) {
        let mut group = Group::new("coi");
        let customer = group.add_root("customer", vec![Column::new("cid", ValueType::I64), Column::new("name", ValueType::String)]).unwrap();
        let order = group.add_child("order", customer, vec![Column::new("oid", ValueType::I64)]).unwrap();
        let item = group.add_child("item", order, vec![Column::new("oid", ValueType::I64), Column::new("iid", ValueType::I64)]).unwrap();
        let address = group.add_child("address", customer, vec![Column::new("aid", ValueType::I64)]).unwrap();
        (group, customer, order, item, address)
    }

    #[test]
    fn test_single_table_index() {
        let (group, _, order, item, address) = coi();
        let index = IndexDef::new(&group, "itemOidIid", item, &[(item, "oid"), (item, "iid")]).unwrap();
        assert_eq!(index.width(), 2);
        assert_eq!(index.columns[1].value_type, ValueType::I64);
        assert!(!index.is_group_index());
        assert!(index.on_branch(order));
        assert!(!index.on_branch(address));
    }

    #[test]
    fn test_group_index() {
        let (group, customer, order, ..) = coi();
        let index = IndexDef::new(&group, "nameOid", order, &[(customer, "name"), (order, "oid")]).unwrap();
        assert!(index.is_group_index());
        assert_eq!(index.branch, vec![customer, order]);
        assert_eq!(index.columns[0].value_type, ValueType::String);
    }

    #[test]
    fn test_group_index_columns_must_share_a_branch() {
        let (group, customer, _, item, address) = coi();
        let err = IndexDef::new(&group, "bad", item, &[(customer, "name"), (address, "aid")]).unwrap_err();
        assert_eq!(err, SchemaError::ColumnOffBranch { table: address, column: "aid".into(), leaf: item });
    }

    #[test]
    fn test_unknown_column() {
        let (group, customer, ..) = coi();
        assert!(matches!(IndexDef::new(&group, "x", customer, &[(customer, "nope")]), Err(SchemaError::UnknownColumn { .. })));
        assert!(matches!(IndexDef::new(&group, "x", customer, &[]), Err(SchemaError::NoColumns(_))));
    }
}

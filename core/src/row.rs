use crate::hkey::HKey;
use crate::schema::RowType;
use crate::value::Value;

/// An immutable row produced by a cursor.
///
/// A row owns its values, so anything read from it stays valid after the cursor that produced it moves on.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    row_type: RowType,
    values: Vec<Value>,
    hkey: HKey,
}

impl Row {
    pub fn new(row_type: RowType, values: Vec<Value>, hkey: HKey) -> Self { Self { row_type, values, hkey } }

    pub fn row_type(&self) -> &RowType { &self.row_type }

    pub fn hkey(&self) -> &HKey { &self.hkey }

    pub fn values(&self) -> &[Value] { &self.values }

    pub fn value(&self, position: usize) -> Option<&Value> { self.values.get(position) }

    pub fn depth(&self) -> usize { self.row_type.depth() }

    pub fn into_values(self) -> Vec<Value> { self.values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Group};
    use crate::value::ValueType;

    #[test]
    fn test_values_outlive_row() {
        let mut group = Group::new("g");
        let root = group.add_root("customer", vec![Column::new("cid", ValueType::I64)]).unwrap();
        let row_type = group.table(root).unwrap().row_type().clone();

        let first = Row::new(row_type.clone(), vec![Value::I64(1), "one".into()], HKey::root(1, 1));
        let v0 = first.value(0).cloned();
        let v1 = first.value(1).cloned();
        let second = Row::new(row_type, vec![Value::I64(2), "two".into()], HKey::root(1, 2));
        drop(first);

        assert_eq!(v0, Some(Value::I64(1)));
        assert_eq!(v1, Some(Value::String("one".into())));
        assert_eq!(second.value(0), Some(&Value::I64(2)));
        assert_eq!(second.value(2), None);
        assert_eq!(second.depth(), 0);
    }
}

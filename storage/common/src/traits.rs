use arbor_core::Row;

use crate::error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Closed,
    Open,
}

/// A pull-based cursor over rows.
///
/// `open` validates and positions, `next` yields rows until it returns `Ok(None)` (and keeps doing so),
/// `close` releases storage access and may be called in any state. A closed cursor can be reopened.
pub trait RowCursor {
    fn open(&mut self) -> Result<(), ScanError>;

    fn next(&mut self) -> Result<Option<Row>, ScanError>;

    fn close(&mut self);

    fn state(&self) -> CursorState;

    /// Open, drain and close. The cursor is closed even if a step fails.
    fn collect_rows(&mut self) -> Result<Vec<Row>, ScanError>
    where Self: Sized {
        let result = self.open().and_then(|_| self.rows().collect());
        self.close();
        result
    }

    /// Iterate the remaining rows of an open cursor. Stops after the first error.
    fn rows(&mut self) -> Rows<'_, Self>
    where Self: Sized {
        Rows { cursor: self, done: false }
    }
}

pub struct Rows<'a, C: RowCursor> {
    cursor: &'a mut C,
    done: bool,
}

impl<C: RowCursor> Iterator for Rows<'_, C> {
    type Item = Result<Row, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.next() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// A cursor over rows held in memory, for exercising cursor consumers
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub struct VecCursor {
        rows: Vec<Row>,
        position: usize,
        state: CursorState,
    }

    impl VecCursor {
        pub fn new(rows: Vec<Row>) -> Self { Self { rows, position: 0, state: CursorState::Closed } }
    }

    impl RowCursor for VecCursor {
        fn open(&mut self) -> Result<(), ScanError> {
            if self.state == CursorState::Open {
                return Err(ScanError::AlreadyOpen);
            }
            self.position = 0;
            self.state = CursorState::Open;
            Ok(())
        }

        fn next(&mut self) -> Result<Option<Row>, ScanError> {
            if self.state != CursorState::Open {
                return Err(ScanError::NotOpen);
            }
            let row = self.rows.get(self.position).cloned();
            self.position = (self.position + 1).min(self.rows.len());
            Ok(row)
        }

        fn close(&mut self) { self.state = CursorState::Closed; }

        fn state(&self) -> CursorState { self.state }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::VecCursor;
    use super::*;
    use arbor_core::{Column, Group, HKey, Value, ValueType};

    fn rows() -> Vec<Row> {
        let mut group = Group::new("g");
        let customer = group.add_root("customer", vec![Column::new("cid", ValueType::I64)]).unwrap();
        let row_type = group.table(customer).unwrap().row_type().clone();
        (1..=3).map(|cid| Row::new(row_type.clone(), vec![Value::I64(cid)], HKey::root(1, cid))).collect()
    }

    #[test]
    fn test_collect_rows_closes() {
        let mut cursor = VecCursor::new(rows());
        let collected = cursor.collect_rows().unwrap();
        assert_eq!(collected.len(), 3);
        assert_eq!(cursor.state(), CursorState::Closed);
        // Reopening restarts
        assert_eq!(cursor.collect_rows().unwrap().len(), 3);
    }

    #[test]
    fn test_collect_rows_closes_on_error() {
        let mut cursor = VecCursor::new(rows());
        cursor.open().unwrap();
        assert!(matches!(cursor.collect_rows(), Err(ScanError::AlreadyOpen)));
        assert_eq!(cursor.state(), CursorState::Closed);
    }

    #[test]
    fn test_rows_stops_at_end() {
        let mut cursor = VecCursor::new(rows());
        cursor.open().unwrap();
        let cids: Vec<i64> = cursor.rows().map(|r| r.unwrap().value(0).and_then(Value::as_i64).unwrap()).collect();
        assert_eq!(cids, vec![1, 2, 3]);
        assert!(cursor.next().unwrap().is_none());
        assert!(cursor.next().unwrap().is_none());
    }
}

use arbor_core::indexing::{prefix_len, prefix_successor};
use arbor_core::{Row, TableId};
use arbor_storage_common::{plan_scan, CursorState, IndexScan, RowCursor, ScanDirection, ScanError, ScanOrder};
use sled::{IVec, Tree};
use tracing::{debug, trace, warn};

use crate::error::IndexError;
use crate::index::SledIndex;
use crate::planner_integration::{range_to_interval, KeyInterval};

enum SledIndexIter {
    Forward(sled::Iter),
    Reverse(std::iter::Rev<sled::Iter>),
}

impl SledIndexIter {
    fn new(tree: &Tree, interval: &KeyInterval, direction: ScanDirection) -> Self {
        match direction {
            ScanDirection::Forward => SledIndexIter::Forward(tree.range(interval.to_range())),
            ScanDirection::Reverse => SledIndexIter::Reverse(tree.range(interval.to_range()).rev()),
        }
    }
}

impl Iterator for SledIndexIter {
    type Item = Result<(IVec, IVec), sled::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            SledIndexIter::Forward(iter) => iter.next(),
            SledIndexIter::Reverse(iter) => iter.next(),
        }
    }
}

/// Walks the index with a different direction per leading column.
///
/// Each level below the last ordering column enumerates the distinct values of its column inside the
/// interval chosen by the level above, seeking to the next value in that column's direction. The last
/// ordering column, any columns after it and the HKey are read with a plain iterator over the innermost
/// interval.
struct MixedOrderScan {
    tree: Tree,
    directions: Vec<ScanDirection>,
    /// Remaining interval of each enumerating level, outermost first
    levels: Vec<KeyInterval>,
    leaf: Option<SledIndexIter>,
}

impl MixedOrderScan {
    fn new(tree: Tree, interval: KeyInterval, directions: Vec<ScanDirection>) -> Self {
        let mut scan = Self { tree, directions, levels: Vec::new(), leaf: None };
        if scan.directions.len() > 1 {
            scan.levels.push(interval);
        } else {
            scan.leaf = Some(SledIndexIter::new(&scan.tree, &interval, scan.last_direction()));
        }
        scan
    }

    fn last_direction(&self) -> ScanDirection { self.directions.last().copied().unwrap_or(ScanDirection::Forward) }

    fn next_key(&mut self) -> Result<Option<IVec>, IndexError> {
        loop {
            if let Some(leaf) = &mut self.leaf {
                match leaf.next() {
                    Some(Ok((key, _))) => return Ok(Some(key)),
                    Some(Err(e)) => return Err(e.into()),
                    None => self.leaf = None,
                }
            }
            let Some(depth) = self.levels.len().checked_sub(1) else {
                return Ok(None);
            };
            match self.next_prefix(depth)? {
                Some(child) if depth + 2 == self.directions.len() => {
                    self.leaf = Some(SledIndexIter::new(&self.tree, &child, self.last_direction()));
                }
                Some(child) => self.levels.push(child),
                None => {
                    self.levels.pop();
                }
            }
        }
    }

    /// Take the next distinct value of column `depth` from that level's remaining interval and return the
    /// interval of entries that share it
    fn next_prefix(&mut self, depth: usize) -> Result<Option<KeyInterval>, IndexError> {
        let direction = self.directions[depth];
        let remaining = &mut self.levels[depth];
        if remaining.is_empty() {
            return Ok(None);
        }
        let found = match direction {
            ScanDirection::Forward => self.tree.range(remaining.to_range()).next(),
            ScanDirection::Reverse => self.tree.range(remaining.to_range()).next_back(),
        };
        let key = match found {
            Some(entry) => entry?.0,
            None => {
                *remaining = KeyInterval::empty();
                return Ok(None);
            }
        };
        let prefix = &key[..prefix_len(&key, depth + 1)?];
        trace!("mixed scan level {} at prefix {:02x?}", depth, prefix);
        let child = remaining.intersect(&KeyInterval::prefix(prefix));
        match direction {
            ScanDirection::Forward => match prefix_successor(prefix) {
                Some(succ) => remaining.start = Some(succ),
                None => *remaining = KeyInterval::empty(),
            },
            ScanDirection::Reverse => remaining.end = Some(prefix.to_vec()),
        }
        Ok(Some(child))
    }
}

enum Traversal {
    Unidirectional(SledIndexIter),
    Mixed(MixedOrderScan),
    Exhausted,
}

impl Traversal {
    fn next_key(&mut self) -> Result<Option<IVec>, IndexError> {
        match self {
            Traversal::Unidirectional(iter) => match iter.next() {
                Some(Ok((key, _))) => Ok(Some(key)),
                Some(Err(e)) => Err(e.into()),
                None => Ok(None),
            },
            Traversal::Mixed(scan) => scan.next_key(),
            Traversal::Exhausted => Ok(None),
        }
    }
}

/// Range scan cursor over a sled index
pub struct SledIndexCursor {
    index: SledIndex,
    scan: IndexScan,
    traversal: Option<Traversal>,
    leaf: Option<TableId>,
    failed: bool,
}

impl SledIndexCursor {
    pub(crate) fn new(index: SledIndex, scan: IndexScan) -> Self { Self { index, scan, traversal: None, leaf: None, failed: false } }

    pub fn index(&self) -> &SledIndex { &self.index }

    fn fail(&mut self, err: IndexError) -> ScanError {
        warn!("scan of index {} failed: {}", self.index.name(), err);
        self.failed = true;
        err.into()
    }
}

impl RowCursor for SledIndexCursor {
    fn open(&mut self) -> Result<(), ScanError> {
        if self.traversal.is_some() {
            return Err(ScanError::AlreadyOpen);
        }
        let plan = plan_scan(&self.scan)?;
        let interval = range_to_interval(&plan.range);
        debug!("open scan of index {}: order={:?} leaf={:?} interval={:02x?}", self.index.name(), plan.order, plan.leaf, interval);
        let traversal = if interval.is_empty() {
            Traversal::Exhausted
        } else {
            match plan.order {
                ScanOrder::Unidirectional(direction) => Traversal::Unidirectional(SledIndexIter::new(self.index.tree(), &interval, direction)),
                ScanOrder::Mixed(directions) => Traversal::Mixed(MixedOrderScan::new(self.index.tree().clone(), interval, directions)),
            }
        };
        self.traversal = Some(traversal);
        self.leaf = plan.leaf;
        self.failed = false;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>, ScanError> {
        if self.failed {
            return Err(ScanError::Failed);
        }
        loop {
            let traversal = self.traversal.as_mut().ok_or(ScanError::NotOpen)?;
            let key = match traversal.next_key() {
                Ok(Some(key)) => key,
                Ok(None) => {
                    *traversal = Traversal::Exhausted;
                    return Ok(None);
                }
                Err(e) => return Err(self.fail(e)),
            };
            let row = match self.index.decode_row(&key) {
                Ok(row) => row,
                Err(e) => return Err(self.fail(e)),
            };
            if let Some(leaf) = self.leaf {
                if !row.hkey().reaches(leaf.ordinal()) {
                    trace!("skip {} above leaf row type {:?}", row.hkey(), leaf);
                    continue;
                }
            }
            return Ok(Some(row));
        }
    }

    fn close(&mut self) {
        if self.traversal.take().is_some() {
            debug!("close scan of index {}", self.index.name());
        }
        self.failed = false;
    }

    fn state(&self) -> CursorState {
        if self.traversal.is_some() {
            CursorState::Open
        } else {
            CursorState::Closed
        }
    }
}

use std::str::FromStr;
use std::sync::Arc;

use arbor_core::{Column, Group, HKey, Row, TableId, Value, ValueType};
use arbor_storage_common::{IndexBound, IndexKeyRange, IndexScan, RowCursor};
use arbor_storage_sled::{SledIndex, SledStorageEngine};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

pub const CUSTOMERS: [(i64, &str); 3] = [(1, "alice"), (2, "bob"), (3, "carol")];
pub const ORDERS: [(i64, i64); 4] = [(1, 11), (1, 12), (2, 21), (2, 22)];
pub const ITEMS: [i64; 8] = [111, 112, 121, 122, 211, 212, 221, 222];

/// customer -> order -> item, with two orders per customer 1 and 2, two items per order, and customer 3
/// without orders
#[allow(unused)]
pub struct Coi {
    pub engine: SledStorageEngine,
    pub group: Arc<Group>,
    pub customer: TableId,
    pub order: TableId,
    pub item: TableId,
}

#[allow(unused)]
impl Coi {
    pub fn new() -> Result<Self, anyhow::Error> { Self::with_engine(SledStorageEngine::new_test()?) }

    pub fn with_engine(engine: SledStorageEngine) -> Result<Self, anyhow::Error> {
        let mut group = Group::new("coi");
        let customer = group.add_root("customer", vec![Column::new("cid", ValueType::I64), Column::new("name", ValueType::String)])?;
        let order = group.add_child("order", customer, vec![Column::new("oid", ValueType::I64), Column::new("cid", ValueType::I64)])?;
        let item = group.add_child("item", order, vec![Column::new("iid", ValueType::I64), Column::new("oid", ValueType::I64)])?;
        let group = engine.register_group(group)?;
        Ok(Self { engine, group, customer, order, item })
    }

    pub fn customer_hkey(&self, cid: i64) -> HKey { HKey::root(self.customer.ordinal(), cid) }

    pub fn order_hkey(&self, oid: i64) -> HKey { self.customer_hkey(oid / 10).child(self.order.ordinal(), oid) }

    pub fn item_hkey(&self, iid: i64) -> HKey { self.order_hkey(iid / 10).child(self.item.ordinal(), iid) }

    /// itemIid: item(iid)
    pub fn item_iid(&self) -> Result<SledIndex, anyhow::Error> {
        let index = self.engine.create_index("coi", "itemIid", self.item, &[(self.item, "iid")])?;
        for iid in ITEMS {
            index.insert(&[iid.into()], &self.item_hkey(iid))?;
        }
        Ok(index)
    }

    /// itemOidIid: item(oid, iid)
    pub fn item_oid_iid(&self) -> Result<SledIndex, anyhow::Error> {
        let index = self.engine.create_index("coi", "itemOidIid", self.item, &[(self.item, "oid"), (self.item, "iid")])?;
        for iid in ITEMS {
            index.insert(&[(iid / 10).into(), iid.into()], &self.item_hkey(iid))?;
        }
        Ok(index)
    }

    /// customerNameOid: group index over customer.name and order.oid. Customers without orders get an
    /// entry with a NULL oid.
    pub fn customer_name_oid(&self) -> Result<SledIndex, anyhow::Error> {
        let index = self.engine.create_index("coi", "customerNameOid", self.order, &[(self.customer, "name"), (self.order, "oid")])?;
        for (cid, name) in CUSTOMERS {
            let orders: Vec<i64> = ORDERS.iter().filter(|(c, _)| *c == cid).map(|(_, oid)| *oid).collect();
            if orders.is_empty() {
                index.insert(&[name.into(), Value::Null], &self.customer_hkey(cid))?;
            }
            for oid in orders {
                index.insert(&[name.into(), oid.into()], &self.order_hkey(oid))?;
            }
        }
        Ok(index)
    }

    /// coiHKey: one entry per customer, order and item row, keyed by (cid, oid, iid). Columns below the
    /// row's own table are NULL, so every row sorts right before its descendants.
    pub fn coi_hkey(&self) -> Result<SledIndex, anyhow::Error> {
        let index =
            self.engine.create_index("coi", "coiHKey", self.item, &[(self.customer, "cid"), (self.order, "oid"), (self.item, "iid")])?;
        for (cid, _) in CUSTOMERS {
            index.insert(&[cid.into(), Value::Null, Value::Null], &self.customer_hkey(cid))?;
        }
        for (cid, oid) in ORDERS {
            index.insert(&[cid.into(), oid.into(), Value::Null], &self.order_hkey(oid))?;
        }
        for iid in ITEMS {
            index.insert(&[(iid / 100).into(), (iid / 10).into(), iid.into()], &self.item_hkey(iid))?;
        }
        Ok(index)
    }
}

/// Bounded range on the leading columns given
#[allow(unused)]
pub fn range<V: Into<Value> + Clone>(index: &SledIndex, lo: &[V], lo_inclusive: bool, hi: &[V], hi_inclusive: bool) -> IndexKeyRange {
    IndexKeyRange::bounded(
        index.def(),
        Some(IndexBound::prefix(lo.iter().cloned())),
        lo_inclusive,
        Some(IndexBound::prefix(hi.iter().cloned())),
        hi_inclusive,
    )
    .unwrap()
}

#[allow(unused)]
pub fn scan_rows(index: &SledIndex, scan: IndexScan) -> Result<Vec<Row>, anyhow::Error> { Ok(index.scan(scan)?.collect_rows()?) }

/// Value of the last column of every row, as integers
#[allow(unused)]
pub fn last_ints(rows: &[Row]) -> Vec<i64> {
    rows.iter().map(|row| row.values().last().and_then(Value::as_i64).unwrap()).collect()
}

#[allow(unused)]
pub fn hkeys(rows: &[Row]) -> Vec<String> { rows.iter().map(|row| row.hkey().to_string()).collect() }

#[allow(unused)]
pub fn scan_ints(index: &SledIndex, scan: IndexScan) -> Result<Vec<i64>, anyhow::Error> { Ok(last_ints(&scan_rows(index, scan)?)) }

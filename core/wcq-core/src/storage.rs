//! Physical rows as returned by the storage layer.
//!
//! The storage layer executes the bounds produced by a compiled statement and
//! hands back one [`Row`] per partition key. Cells inside a row arrive in
//! binary-name order.

/// Liveness/encoding of a stored cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Live,
    /// Value is a counter context; readers see its total.
    Counter,
    /// Logically deleted, still physically present.
    Tombstone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
    pub timestamp: i64,
    pub kind: CellKind,
}

impl Cell {
    pub fn live(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp,
            kind: CellKind::Live,
        }
    }

    pub fn counter(name: impl Into<Vec<u8>>, context: impl Into<Vec<u8>>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: context.into(),
            timestamp,
            kind: CellKind::Counter,
        }
    }

    pub fn tombstone(name: impl Into<Vec<u8>>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: Vec::new(),
            timestamp,
            kind: CellKind::Tombstone,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.kind == CellKind::Tombstone
    }
}

/// One partition as fetched from storage.
///
/// `cells` is `None` when the partition had no cell container at all, which
/// is different from an empty slice result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: Vec<u8>,
    pub cells: Option<Vec<Cell>>,
}

impl Row {
    pub fn new(key: impl Into<Vec<u8>>, cells: Vec<Cell>) -> Self {
        Self {
            key: key.into(),
            cells: Some(cells),
        }
    }

    pub fn without_cells(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            cells: None,
        }
    }

    /// Live cell with exactly this name.
    pub fn live_cell(&self, name: &[u8]) -> Option<&Cell> {
        let cells = self.cells.as_deref()?;
        cells
            .binary_search_by(|c| c.name.as_slice().cmp(name))
            .ok()
            .map(|idx| &cells[idx])
            .filter(|c| !c.is_deleted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_cell_skips_tombstones() {
        let row = Row::new(
            "k",
            vec![
                Cell::live("a", "1", 10),
                Cell::tombstone("b", 11),
                Cell::live("c", "3", 12),
            ],
        );
        assert_eq!(row.live_cell(b"a").map(|c| c.value.as_slice()), Some(b"1".as_slice()));
        assert!(row.live_cell(b"b").is_none());
        assert!(row.live_cell(b"z").is_none());
        assert!(Row::without_cells("k").live_cell(b"a").is_none());
    }
}

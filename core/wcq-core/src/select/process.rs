//! Row reconstruction: physical cells back into logical rows.

use crate::codec::{Composite, counter, split};
use crate::error::{WcqError, WcqResult};
use crate::schema::{FieldDef, FieldRole, Kind};
use crate::select::result::{
    ColumnSpec, NO_TIMESTAMP, ResultColumn, ResultMetadata, ResultRow, ResultSet,
};
use crate::select::statement::{SelectStatement, Selected};
use crate::storage::{Cell, CellKind, Row};
use ahash::AHashMap;
use tracing::{debug, trace, warn};

impl SelectStatement {
    /// Folds the rows fetched for this statement into logical rows.
    ///
    /// Output follows the selection order, is reversed when requested and is
    /// cut to [`limit`](Self::limit). In count mode the input is only counted.
    pub fn process(&self, rows: &[Row]) -> WcqResult<ResultSet> {
        if self.is_count() {
            debug!(target: "wcq", table = self.table(), count = rows.len(), "count");
            return Ok(ResultSet::count(&self.count_column, rows.len()));
        }

        let selection = self.expanded_selection();
        let mut out = Vec::new();
        for row in rows {
            match self.layout.kind() {
                Kind::Static => out.push(self.static_row(row, &selection)?),
                Kind::Sparse => self.sparse_rows(row, &selection, &mut out)?,
                Kind::Dynamic | Kind::Dense => self.compact_rows(row, &selection, &mut out)?,
            }
        }

        let produced = out.len();
        if self.is_reversed() {
            out.reverse();
        }
        out.truncate(self.limit);
        debug!(
            target: "wcq",
            table = self.table(),
            physical = rows.len(),
            produced,
            returned = out.len(),
            "reconstructed rows"
        );

        Ok(ResultSet {
            metadata: self.result_metadata(&selection),
            rows: out,
        })
    }

    fn result_metadata(&self, selection: &[Selected]) -> ResultMetadata {
        ResultMetadata {
            comparator: self.layout.comparator_name(),
            default_validator: self.layout.default_validator_name(),
            columns: selection
                .iter()
                .map(|s| ColumnSpec {
                    name: s.display.clone(),
                    value_type: self.layout.field(s.field).field_type().short_name(),
                })
                .collect(),
        }
    }

    fn static_row(&self, row: &Row, selection: &[Selected]) -> WcqResult<ResultRow> {
        let mut columns = Vec::with_capacity(selection.len());
        for selected in selection {
            let def = self.layout.field(selected.field);
            match def.role() {
                FieldRole::PartitionKey => columns.push(ResultColumn::set(
                    &selected.display,
                    row.key.clone(),
                    NO_TIMESTAMP,
                )),
                FieldRole::Metadata => {
                    if row.cells.is_none() {
                        continue;
                    }
                    columns.push(match row.live_cell(def.key()) {
                        Some(cell) => cell_column(selected, def, cell),
                        None => ResultColumn::unset(&selected.display),
                    });
                }
                role => return Err(unexpected_role(def, role, Kind::Static)),
            }
        }
        Ok(ResultRow {
            key: row.key.clone(),
            columns,
        })
    }

    fn sparse_rows(
        &self,
        row: &Row,
        selection: &[Selected],
        out: &mut Vec<ResultRow>,
    ) -> WcqResult<()> {
        let Some(cells) = row.cells.as_deref() else {
            return Ok(());
        };
        let arity = self.layout.composite_arity();

        let mut prefix: Option<Vec<Vec<u8>>> = None;
        let mut group: AHashMap<Vec<u8>, &Cell> = AHashMap::new();
        for cell in cells.iter().filter(|c| !c.is_deleted()) {
            let components = split_name(cell)?;
            if components.len() != arity {
                return Err(WcqError::assertion(format!(
                    "cell name has {} components, the table expects {arity}",
                    components.len()
                )));
            }

            let current = components.prefix();
            if prefix.as_deref() != Some(current) {
                if let Some(done) = prefix.take() {
                    out.push(self.sparse_row(row, &done, &group, selection)?);
                    group.clear();
                }
                prefix = Some(current.to_vec());
            }
            if let Some(name) = components.last() {
                group.insert(name.to_vec(), cell);
            }
        }
        if let Some(done) = prefix {
            out.push(self.sparse_row(row, &done, &group, selection)?);
        }
        Ok(())
    }

    fn sparse_row(
        &self,
        row: &Row,
        prefix: &[Vec<u8>],
        group: &AHashMap<Vec<u8>, &Cell>,
        selection: &[Selected],
    ) -> WcqResult<ResultRow> {
        trace!(target: "wcq", cells = group.len(), "sparse group");
        let mut columns = Vec::with_capacity(selection.len());
        for selected in selection {
            let def = self.layout.field(selected.field);
            let column = match def.role() {
                FieldRole::PartitionKey => {
                    ResultColumn::set(&selected.display, row.key.clone(), NO_TIMESTAMP)
                }
                FieldRole::Clustering(position) => {
                    let stored = prefix.get(position).map(Vec::as_slice).unwrap_or_default();
                    let value = def.field_type().from_comparable(stored);
                    ResultColumn::set(&selected.display, value, NO_TIMESTAMP)
                }
                FieldRole::Metadata => match group.get(def.key()) {
                    Some(cell) => cell_column(selected, def, cell),
                    None => ResultColumn::unset(&selected.display),
                },
                role => return Err(unexpected_role(def, role, Kind::Sparse)),
            };
            columns.push(column);
        }
        Ok(ResultRow {
            key: row.key.clone(),
            columns,
        })
    }

    /// One logical row per live cell.
    fn compact_rows(
        &self,
        row: &Row,
        selection: &[Selected],
        out: &mut Vec<ResultRow>,
    ) -> WcqResult<()> {
        let Some(cells) = row.cells.as_deref() else {
            return Ok(());
        };
        let kind = self.layout.kind();

        for cell in cells.iter().filter(|c| !c.is_deleted()) {
            let components = if kind == Kind::Dense {
                Some(split_name(cell)?)
            } else {
                None
            };

            let mut columns = Vec::with_capacity(selection.len());
            for selected in selection {
                let def = self.layout.field(selected.field);
                let column = match def.role() {
                    FieldRole::PartitionKey => {
                        ResultColumn::set(&selected.display, row.key.clone(), NO_TIMESTAMP)
                    }
                    FieldRole::Clustering(position) => {
                        let stored = match &components {
                            Some(components) => components.get_or_empty(position),
                            None => cell.name.as_slice(),
                        };
                        let value = def.field_type().from_comparable(stored);
                        ResultColumn::set(&selected.display, value, cell.timestamp)
                    }
                    FieldRole::Value => cell_column(selected, def, cell),
                    role => return Err(unexpected_role(def, role, kind)),
                };
                columns.push(column);
            }
            out.push(ResultRow {
                key: row.key.clone(),
                columns,
            });
        }
        Ok(())
    }
}

fn split_name(cell: &Cell) -> WcqResult<Composite> {
    split(&cell.name).map_err(|e| WcqError::assertion(format!("unreadable cell name: {e}")))
}

/// Stored value as readers see it; counters read as their total.
///
/// A counter context that cannot be read leaves the column unset.
fn cell_column(selected: &Selected, def: &FieldDef, cell: &Cell) -> ResultColumn {
    if cell.kind != CellKind::Counter && !def.field_type().is_counter() {
        return ResultColumn::set(&selected.display, cell.value.clone(), cell.timestamp);
    }
    match counter::total(&cell.value) {
        Ok(total) => {
            ResultColumn::set(&selected.display, total.to_be_bytes().to_vec(), cell.timestamp)
        }
        Err(e) => {
            warn!(target: "wcq", field = def.name(), error = %e, "unreadable counter");
            ResultColumn::unset(&selected.display)
        }
    }
}

fn unexpected_role(def: &FieldDef, role: FieldRole, kind: Kind) -> WcqError {
    WcqError::assertion(format!(
        "field '{}' has role {role:?}, which a {kind:?} table cannot hold",
        def.name()
    ))
}

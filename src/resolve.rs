//! Cascading selector resolution.
//!
//! One selector per attribute family. Stages are evaluated strictly left to
//! right; choosing at stage *i* recomputes every stage after it (reset to
//! its first candidate, index stages to unset) and the terminal result.
//! Candidates come from one representative cell's navigation index: the only
//! selected cell, or the first one once structural compatibility is
//! established.

use crate::parse_numeric;
use crate::project::{
    ArcIndex, PowerArc, PowerKey, ProjectedCell, Scoped, Table, TableExtent, TimingArc, TimingKey,
};
use crate::types::{GroupName, PinName, ScopeChoice, TableKind};
use itertools::Itertools;
use log::warn;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Terminal result of a drill-down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Resolved {
    /// No matching arc or table at the current choices.
    Empty,
    /// Full table, both indices unset (single-cell surface view).
    Table(Table),
    /// 1-D slice with one index pinned.
    Curve(Curve),
    /// Both indices pinned.
    Scalar(f64),
    /// One scalar row per selected cell, in selection order (compare mode).
    Compare(Vec<CompareRow>),
}

/// Which index axis a curve runs along.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum IndexAxis {
    #[serde(rename = "index_1")]
    Index1,
    #[serde(rename = "index_2")]
    Index2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub axis: IndexAxis,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareRow {
    pub lib: String,
    pub cell: String,
    pub index_1: String,
    pub index_2: String,
    pub value: f64,
}

/// Numeric view of a full 2-D table, for the 3-D surface view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Surface {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<f64>>,
}

/// Timing drill-down state:
/// scope -> pin -> related_pin -> related_pg_pin -> timing_sense ->
/// timing_type -> when -> table kind -> index_1 -> index_2.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingSelector {
    pub scope: ScopeChoice,
    pub pin: Option<PinName>,
    pub related_pin: Option<String>,
    pub related_pg_pin: Option<String>,
    pub timing_sense: Option<String>,
    pub timing_type: Option<String>,
    pub when: Option<String>,
    pub table_kind: Option<TableKind>,
    pub index_1: Option<usize>,
    pub index_2: Option<usize>,
}

impl TimingSelector {
    /// Reset to the direct-pin scope and the first candidate of every stage.
    pub fn rebuild(&mut self, index: &Scoped<ArcIndex<TimingKey>>) {
        self.scope = ScopeChoice::DirectPin;
        self.cascade_pin(index);
    }

    pub fn bundle_candidates(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<GroupName> {
        name_list(index.bundles.keys())
    }

    pub fn bus_candidates(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<GroupName> {
        name_list(index.buses.keys())
    }

    pub fn pin_candidates(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<PinName> {
        index
            .pin_map(&self.scope)
            .map(|pins| name_list(pins.keys()))
            .unwrap_or_default()
    }

    fn pin_index<'a>(&self, index: &'a Scoped<ArcIndex<TimingKey>>) -> Option<&'a ArcIndex<TimingKey>> {
        index.pin_map(&self.scope)?.get(self.pin.as_ref()?)
    }

    pub fn related_pin_candidates(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<String> {
        let Some(idx) = self.pin_index(index) else {
            return Vec::new();
        };
        distinct(idx.entries.keys().map(|k| k.related_pin.as_str()))
    }

    pub fn related_pg_pin_candidates(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<String> {
        let (Some(idx), Some(related_pin)) = (self.pin_index(index), self.related_pin.as_ref()) else {
            return Vec::new();
        };
        distinct(
            idx.entries
                .keys()
                .filter(|k| k.related_pin == *related_pin)
                .map(|k| k.related_pg_pin.as_str()),
        )
    }

    pub fn timing_sense_candidates(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<String> {
        let (Some(idx), Some(related_pin), Some(related_pg_pin)) = (
            self.pin_index(index),
            self.related_pin.as_ref(),
            self.related_pg_pin.as_ref(),
        ) else {
            return Vec::new();
        };
        distinct(
            idx.entries
                .keys()
                .filter(|k| k.related_pin == *related_pin && k.related_pg_pin == *related_pg_pin)
                .map(|k| k.timing_sense.as_str()),
        )
    }

    pub fn timing_type_candidates(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<String> {
        let (Some(idx), Some(related_pin), Some(related_pg_pin), Some(sense)) = (
            self.pin_index(index),
            self.related_pin.as_ref(),
            self.related_pg_pin.as_ref(),
            self.timing_sense.as_ref(),
        ) else {
            return Vec::new();
        };
        distinct(
            idx.entries
                .keys()
                .filter(|k| {
                    k.related_pin == *related_pin
                        && k.related_pg_pin == *related_pg_pin
                        && k.timing_sense == *sense
                })
                .map(|k| k.timing_type.as_str()),
        )
    }

    pub fn when_candidates(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<String> {
        let (Some(idx), Some(related_pin), Some(related_pg_pin), Some(sense), Some(ttype)) = (
            self.pin_index(index),
            self.related_pin.as_ref(),
            self.related_pg_pin.as_ref(),
            self.timing_sense.as_ref(),
            self.timing_type.as_ref(),
        ) else {
            return Vec::new();
        };
        distinct(
            idx.entries
                .keys()
                .filter(|k| {
                    k.related_pin == *related_pin
                        && k.related_pg_pin == *related_pg_pin
                        && k.timing_sense == *sense
                        && k.timing_type == *ttype
                })
                .map(|k| k.when.as_str()),
        )
    }

    fn full_key(&self) -> Option<TimingKey> {
        Some(TimingKey {
            related_pin: self.related_pin.clone()?,
            related_pg_pin: self.related_pg_pin.clone()?,
            timing_sense: self.timing_sense.clone()?,
            timing_type: self.timing_type.clone()?,
            when: self.when.clone()?,
        })
    }

    pub fn table_candidates(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<TableKind> {
        let (Some(idx), Some(key)) = (self.pin_index(index), self.full_key()) else {
            return Vec::new();
        };
        idx.entries
            .get(&key)
            .map(|kinds| kinds.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn extent(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Option<TableExtent> {
        let idx = self.pin_index(index)?;
        idx.entries.get(&self.full_key()?)?.get(&self.table_kind?).copied()
    }

    pub fn index_1_positions(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<usize> {
        self.extent(index).map(|e| (0..e.rows).collect()).unwrap_or_default()
    }

    pub fn index_2_positions(&self, index: &Scoped<ArcIndex<TimingKey>>) -> Vec<usize> {
        self.extent(index).map(|e| (0..e.cols).collect()).unwrap_or_default()
    }

    pub fn choose_scope(&mut self, index: &Scoped<ArcIndex<TimingKey>>, scope: ScopeChoice) {
        self.scope = scope;
        self.cascade_pin(index);
    }

    pub fn choose_pin(&mut self, index: &Scoped<ArcIndex<TimingKey>>, pin: PinName) {
        self.pin = Some(pin);
        self.cascade_related_pin(index);
    }

    pub fn choose_related_pin(&mut self, index: &Scoped<ArcIndex<TimingKey>>, value: String) {
        self.related_pin = Some(value);
        self.cascade_related_pg_pin(index);
    }

    pub fn choose_related_pg_pin(&mut self, index: &Scoped<ArcIndex<TimingKey>>, value: String) {
        self.related_pg_pin = Some(value);
        self.cascade_timing_sense(index);
    }

    pub fn choose_timing_sense(&mut self, index: &Scoped<ArcIndex<TimingKey>>, value: String) {
        self.timing_sense = Some(value);
        self.cascade_timing_type(index);
    }

    pub fn choose_timing_type(&mut self, index: &Scoped<ArcIndex<TimingKey>>, value: String) {
        self.timing_type = Some(value);
        self.cascade_when(index);
    }

    pub fn choose_when(&mut self, index: &Scoped<ArcIndex<TimingKey>>, value: String) {
        self.when = Some(value);
        self.cascade_table(index);
    }

    pub fn choose_table(&mut self, kind: TableKind) {
        self.table_kind = Some(kind);
        self.cascade_indices();
    }

    pub fn choose_index_1(&mut self, position: Option<usize>) {
        self.index_1 = position;
    }

    pub fn choose_index_2(&mut self, position: Option<usize>) {
        self.index_2 = position;
    }

    fn cascade_pin(&mut self, index: &Scoped<ArcIndex<TimingKey>>) {
        self.pin = self.pin_candidates(index).into_iter().next();
        self.cascade_related_pin(index);
    }

    fn cascade_related_pin(&mut self, index: &Scoped<ArcIndex<TimingKey>>) {
        self.related_pin = self.related_pin_candidates(index).into_iter().next();
        self.cascade_related_pg_pin(index);
    }

    fn cascade_related_pg_pin(&mut self, index: &Scoped<ArcIndex<TimingKey>>) {
        self.related_pg_pin = self.related_pg_pin_candidates(index).into_iter().next();
        self.cascade_timing_sense(index);
    }

    fn cascade_timing_sense(&mut self, index: &Scoped<ArcIndex<TimingKey>>) {
        self.timing_sense = self.timing_sense_candidates(index).into_iter().next();
        self.cascade_timing_type(index);
    }

    fn cascade_timing_type(&mut self, index: &Scoped<ArcIndex<TimingKey>>) {
        self.timing_type = self.timing_type_candidates(index).into_iter().next();
        self.cascade_when(index);
    }

    fn cascade_when(&mut self, index: &Scoped<ArcIndex<TimingKey>>) {
        self.when = self.when_candidates(index).into_iter().next();
        self.cascade_table(index);
    }

    fn cascade_table(&mut self, index: &Scoped<ArcIndex<TimingKey>>) {
        self.table_kind = self.table_candidates(index).into_iter().next();
        self.cascade_indices();
    }

    fn cascade_indices(&mut self) {
        self.index_1 = None;
        self.index_2 = None;
    }

    fn find_arc<'a>(&self, cell: &'a ProjectedCell) -> Option<&'a TimingArc> {
        let arcs = cell.timing.pin_map(&self.scope)?.get(self.pin.as_ref()?)?;
        let related_pin = self.related_pin.as_ref()?;
        let related_pg_pin = self.related_pg_pin.as_ref()?;
        let sense = self.timing_sense.as_ref()?;
        let ttype = self.timing_type.as_ref()?;
        let when = self.when.as_ref()?;
        arcs.iter().find(|arc| {
            arc.related_pin == *related_pin
                && arc.related_pg_pin == *related_pg_pin
                && arc.timing_sense == *sense
                && arc.timing_type == *ttype
                && arc.when == *when
        })
    }

    fn table<'a>(&self, cell: &'a ProjectedCell) -> Option<&'a Table> {
        self.find_arc(cell)?.tables.get(&self.table_kind?)
    }

    /// Single-cell terminal result at the current choices.
    pub fn resolve_single(&self, cell: &ProjectedCell) -> Resolved {
        match self.table(cell) {
            Some(table) => resolve_table(table, self.index_1, self.index_2),
            None => Resolved::Empty,
        }
    }

    /// Compare-mode terminal result: one scalar per cell, unset indices
    /// defaulting to position 0. Cells with no matching arc yield no row.
    pub fn resolve_compare(&self, cells: &[ProjectedCell]) -> Resolved {
        let rows = cells
            .iter()
            .filter_map(|cell| scalar_row(cell, self.table(cell)?, self.index_1, self.index_2))
            .collect();
        Resolved::Compare(rows)
    }
}

/// Internal-power drill-down state: the timing chain without
/// `timing_sense`/`timing_type`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerSelector {
    pub scope: ScopeChoice,
    pub pin: Option<PinName>,
    pub related_pin: Option<String>,
    pub related_pg_pin: Option<String>,
    pub when: Option<String>,
    pub table_kind: Option<TableKind>,
    pub index_1: Option<usize>,
    pub index_2: Option<usize>,
}

impl PowerSelector {
    pub fn rebuild(&mut self, index: &Scoped<ArcIndex<PowerKey>>) {
        self.scope = ScopeChoice::DirectPin;
        self.cascade_pin(index);
    }

    pub fn bundle_candidates(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Vec<GroupName> {
        name_list(index.bundles.keys())
    }

    pub fn bus_candidates(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Vec<GroupName> {
        name_list(index.buses.keys())
    }

    pub fn pin_candidates(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Vec<PinName> {
        index
            .pin_map(&self.scope)
            .map(|pins| name_list(pins.keys()))
            .unwrap_or_default()
    }

    fn pin_index<'a>(&self, index: &'a Scoped<ArcIndex<PowerKey>>) -> Option<&'a ArcIndex<PowerKey>> {
        index.pin_map(&self.scope)?.get(self.pin.as_ref()?)
    }

    pub fn related_pin_candidates(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Vec<String> {
        let Some(idx) = self.pin_index(index) else {
            return Vec::new();
        };
        distinct(idx.entries.keys().map(|k| k.related_pin.as_str()))
    }

    pub fn related_pg_pin_candidates(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Vec<String> {
        let (Some(idx), Some(related_pin)) = (self.pin_index(index), self.related_pin.as_ref()) else {
            return Vec::new();
        };
        distinct(
            idx.entries
                .keys()
                .filter(|k| k.related_pin == *related_pin)
                .map(|k| k.related_pg_pin.as_str()),
        )
    }

    pub fn when_candidates(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Vec<String> {
        let (Some(idx), Some(related_pin), Some(related_pg_pin)) = (
            self.pin_index(index),
            self.related_pin.as_ref(),
            self.related_pg_pin.as_ref(),
        ) else {
            return Vec::new();
        };
        distinct(
            idx.entries
                .keys()
                .filter(|k| k.related_pin == *related_pin && k.related_pg_pin == *related_pg_pin)
                .map(|k| k.when.as_str()),
        )
    }

    fn full_key(&self) -> Option<PowerKey> {
        Some(PowerKey {
            related_pin: self.related_pin.clone()?,
            related_pg_pin: self.related_pg_pin.clone()?,
            when: self.when.clone()?,
        })
    }

    pub fn table_candidates(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Vec<TableKind> {
        let (Some(idx), Some(key)) = (self.pin_index(index), self.full_key()) else {
            return Vec::new();
        };
        idx.entries
            .get(&key)
            .map(|kinds| kinds.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn extent(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Option<TableExtent> {
        let idx = self.pin_index(index)?;
        idx.entries.get(&self.full_key()?)?.get(&self.table_kind?).copied()
    }

    pub fn index_1_positions(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Vec<usize> {
        self.extent(index).map(|e| (0..e.rows).collect()).unwrap_or_default()
    }

    pub fn index_2_positions(&self, index: &Scoped<ArcIndex<PowerKey>>) -> Vec<usize> {
        self.extent(index).map(|e| (0..e.cols).collect()).unwrap_or_default()
    }

    pub fn choose_scope(&mut self, index: &Scoped<ArcIndex<PowerKey>>, scope: ScopeChoice) {
        self.scope = scope;
        self.cascade_pin(index);
    }

    pub fn choose_pin(&mut self, index: &Scoped<ArcIndex<PowerKey>>, pin: PinName) {
        self.pin = Some(pin);
        self.cascade_related_pin(index);
    }

    pub fn choose_related_pin(&mut self, index: &Scoped<ArcIndex<PowerKey>>, value: String) {
        self.related_pin = Some(value);
        self.cascade_related_pg_pin(index);
    }

    pub fn choose_related_pg_pin(&mut self, index: &Scoped<ArcIndex<PowerKey>>, value: String) {
        self.related_pg_pin = Some(value);
        self.cascade_when(index);
    }

    pub fn choose_when(&mut self, index: &Scoped<ArcIndex<PowerKey>>, value: String) {
        self.when = Some(value);
        self.cascade_table(index);
    }

    pub fn choose_table(&mut self, kind: TableKind) {
        self.table_kind = Some(kind);
        self.cascade_indices();
    }

    pub fn choose_index_1(&mut self, position: Option<usize>) {
        self.index_1 = position;
    }

    pub fn choose_index_2(&mut self, position: Option<usize>) {
        self.index_2 = position;
    }

    fn cascade_pin(&mut self, index: &Scoped<ArcIndex<PowerKey>>) {
        self.pin = self.pin_candidates(index).into_iter().next();
        self.cascade_related_pin(index);
    }

    fn cascade_related_pin(&mut self, index: &Scoped<ArcIndex<PowerKey>>) {
        self.related_pin = self.related_pin_candidates(index).into_iter().next();
        self.cascade_related_pg_pin(index);
    }

    fn cascade_related_pg_pin(&mut self, index: &Scoped<ArcIndex<PowerKey>>) {
        self.related_pg_pin = self.related_pg_pin_candidates(index).into_iter().next();
        self.cascade_when(index);
    }

    fn cascade_when(&mut self, index: &Scoped<ArcIndex<PowerKey>>) {
        self.when = self.when_candidates(index).into_iter().next();
        self.cascade_table(index);
    }

    fn cascade_table(&mut self, index: &Scoped<ArcIndex<PowerKey>>) {
        self.table_kind = self.table_candidates(index).into_iter().next();
        self.cascade_indices();
    }

    fn cascade_indices(&mut self) {
        self.index_1 = None;
        self.index_2 = None;
    }

    fn find_arc<'a>(&self, cell: &'a ProjectedCell) -> Option<&'a PowerArc> {
        let arcs = cell.internal_power.pin_map(&self.scope)?.get(self.pin.as_ref()?)?;
        let related_pin = self.related_pin.as_ref()?;
        let related_pg_pin = self.related_pg_pin.as_ref()?;
        let when = self.when.as_ref()?;
        arcs.iter().find(|arc| {
            arc.related_pin == *related_pin
                && arc.related_pg_pin == *related_pg_pin
                && arc.when == *when
        })
    }

    fn table<'a>(&self, cell: &'a ProjectedCell) -> Option<&'a Table> {
        self.find_arc(cell)?.tables.get(&self.table_kind?)
    }

    pub fn resolve_single(&self, cell: &ProjectedCell) -> Resolved {
        match self.table(cell) {
            Some(table) => resolve_table(table, self.index_1, self.index_2),
            None => Resolved::Empty,
        }
    }

    pub fn resolve_compare(&self, cells: &[ProjectedCell]) -> Resolved {
        let rows = cells
            .iter()
            .filter_map(|cell| scalar_row(cell, self.table(cell)?, self.index_1, self.index_2))
            .collect();
        Resolved::Compare(rows)
    }
}

/// Leakage-power drill-down: `when` -> `related_pg_pin`, no pin scoping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeakageSelector {
    pub when: Option<String>,
    pub related_pg_pin: Option<String>,
}

impl LeakageSelector {
    pub fn rebuild(&mut self, index: &BTreeMap<String, BTreeSet<String>>) {
        self.when = self.when_candidates(index).into_iter().next();
        self.cascade_pg_pin(index);
    }

    pub fn when_candidates(&self, index: &BTreeMap<String, BTreeSet<String>>) -> Vec<String> {
        distinct(index.keys().map(String::as_str))
    }

    pub fn pg_pin_candidates(&self, index: &BTreeMap<String, BTreeSet<String>>) -> Vec<String> {
        self.when
            .as_ref()
            .and_then(|when| index.get(when))
            .map(|pins| distinct(pins.iter().map(String::as_str)))
            .unwrap_or_default()
    }

    pub fn choose_when(&mut self, index: &BTreeMap<String, BTreeSet<String>>, value: String) {
        self.when = Some(value);
        self.cascade_pg_pin(index);
    }

    pub fn choose_pg_pin(&mut self, value: String) {
        self.related_pg_pin = Some(value);
    }

    fn cascade_pg_pin(&mut self, index: &BTreeMap<String, BTreeSet<String>>) {
        self.related_pg_pin = self.pg_pin_candidates(index).into_iter().next();
    }
}

/// Slice a table at the chosen index positions.
pub fn resolve_table(table: &Table, index_1: Option<usize>, index_2: Option<usize>) -> Resolved {
    match (index_1, index_2) {
        (None, None) => Resolved::Table(table.clone()),
        (Some(row), None) => {
            if table.index_2.is_empty() {
                // 1-D table: fixing index_1 pins a single value
                scalar(table, 0, row)
            } else {
                let Some(values) = table.values.get(row) else {
                    return Resolved::Empty;
                };
                curve(IndexAxis::Index2, table.index_2.iter().zip(values.iter()))
            }
        }
        (None, Some(col)) => curve(
            IndexAxis::Index1,
            table
                .index_1
                .iter()
                .zip(table.values.iter())
                .filter_map(|(x, row)| Some((x, row.get(col)?))),
        ),
        (Some(row), Some(col)) => {
            if table.index_2.is_empty() {
                scalar(table, 0, row)
            } else {
                scalar(table, row, col)
            }
        }
    }
}

/// Numeric view of a full table for the 3-D surface rendering. Any
/// unparsable cell voids the surface.
pub fn table_surface(table: &Table) -> Option<Surface> {
    let parse_all = |values: &[String]| -> Option<Vec<f64>> {
        values
            .iter()
            .map(|v| match parse_numeric(v) {
                Ok(v) => Some(v),
                Err(err) => {
                    warn!("{err}, dropping surface view");
                    None
                }
            })
            .collect()
    };
    Some(Surface {
        x: parse_all(&table.index_1)?,
        y: parse_all(&table.index_2)?,
        z: table
            .values
            .iter()
            .map(|row| parse_all(row))
            .collect::<Option<Vec<_>>>()?,
    })
}

/// Axis limits the way the original viewer pads them: lone points and flat
/// series get a 1.0 margin, everything else 10% overshoot on each side.
pub fn plot_bounds(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().map(OrderedFloat).min()?.into_inner();
    let max = values.iter().copied().map(OrderedFloat).max()?.into_inner();
    if values.len() == 1 || min == max {
        Some((min - 1.0, max + 1.0))
    } else {
        Some((1.1 * min - 0.1 * max, 1.1 * max - 0.1 * min))
    }
}

fn scalar(table: &Table, row: usize, col: usize) -> Resolved {
    let Some(raw) = table.values.get(row).and_then(|r| r.get(col)) else {
        return Resolved::Empty;
    };
    match parse_numeric(raw) {
        Ok(value) => Resolved::Scalar(value),
        Err(err) => {
            warn!("{err}, dropping resolved value");
            Resolved::Empty
        }
    }
}

fn curve<'a>(axis: IndexAxis, points: impl Iterator<Item = (&'a String, &'a String)>) -> Resolved {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (raw_x, raw_y) in points {
        match (parse_numeric(raw_x), parse_numeric(raw_y)) {
            (Ok(a), Ok(b)) => {
                x.push(a);
                y.push(b);
            }
            (Err(err), _) | (_, Err(err)) => warn!("{err}, dropping curve point"),
        }
    }
    if x.is_empty() {
        return Resolved::Empty;
    }
    Resolved::Curve(Curve { axis, x, y })
}

/// Compare-mode row: unset indices default to position 0; 1-D tables read
/// `values[0][index_1]`.
fn scalar_row(
    cell: &ProjectedCell,
    table: &Table,
    index_1: Option<usize>,
    index_2: Option<usize>,
) -> Option<CompareRow> {
    let row = index_1.unwrap_or(0);
    let col = index_2.unwrap_or(0);
    let (raw, label_2) = if table.index_2.is_empty() {
        (table.values.first()?.get(row)?, String::new())
    } else {
        (
            table.values.get(row)?.get(col)?,
            table.index_2.get(col).cloned().unwrap_or_default(),
        )
    };
    let value = match parse_numeric(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!("{err} for cell \"{}\", dropping compare row", cell.cell);
            return None;
        }
    };
    Some(CompareRow {
        lib: cell.lib.to_string(),
        cell: cell.cell.to_string(),
        index_1: table.index_1.get(row).cloned().unwrap_or_default(),
        index_2: label_2,
        value,
    })
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .map(str::to_string)
        .sorted_by(|a, b| numeric_sort::cmp(a, b))
        .dedup()
        .collect()
}

fn name_list<'a, N>(names: impl Iterator<Item = &'a N>) -> Vec<N>
where
    N: Clone + AsRef<str> + 'a,
{
    names
        .cloned()
        .sorted_by(|a, b| numeric_sort::cmp(a.as_ref(), b.as_ref()))
        .collect()
}

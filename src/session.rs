//! The viewer session: all mutable state behind the presentation layer.
//!
//! Owns the catalog and the selection, and holds the state derived from
//! them: projected cells, compare gates and the three selector chains.
//! Every selection mutation runs a full synchronous recompute before
//! returning; nothing is patched incrementally.

use crate::catalog::{Catalog, CatalogError, LibraryId, Units};
use crate::project::{project_selection, ArcIndex, PowerKey, ProjectedCell, Scoped, TimingKey};
use crate::resolve::{LeakageSelector, PowerSelector, Resolved, TimingSelector};
use crate::selection::Selection;
use crate::series::sort_cell_series;
use crate::shape::{check_compatibility, CompareGates};
use crate::source::LibertySource;
use crate::types::{CellName, GroupName, LibName, PinName, ScopeChoice, TableKind};
use log::warn;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaRow {
    pub lib: String,
    pub cell: String,
    pub area: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeakageRow {
    pub lib: String,
    pub cell: String,
    pub when: String,
    pub related_pg_pin: String,
    pub value: String,
}

/// One point of a per-cell comparison curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellValue {
    pub lib: String,
    pub cell: String,
    pub value: f64,
}

#[derive(Debug, Default)]
pub struct Session {
    catalog: Catalog,
    selection: Selection,
    cells: Vec<ProjectedCell>,
    gates: CompareGates,
    timing_sel: TimingSelector,
    power_sel: PowerSelector,
    leakage_sel: LeakageSelector,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn units(&self) -> &Units {
        self.catalog.units()
    }

    /// Load a parsed library file into the catalog. A duplicate base file
    /// name is rejected and leaves everything unchanged.
    pub fn load_library(
        &mut self,
        path: &str,
        source: &dyn LibertySource,
    ) -> Result<LibraryId, CatalogError> {
        self.catalog.load_library(path, source)
    }

    /// (library, series-sorted cells) pairs for the selectable tree.
    pub fn display_tree(&self) -> Vec<(LibName, Vec<CellName>)> {
        self.catalog
            .iter()
            .map(|(_, lib)| (lib.name.clone(), sort_cell_series(&lib.cells)))
            .collect()
    }

    /// Check or uncheck one cell; any change triggers the full recompute.
    pub fn toggle_cell(&mut self, lib: &str, cell: &str, checked: bool) {
        if self.selection.toggle(lib, cell, checked) {
            self.recompute();
        }
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.recompute();
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Projected records of the current selection, in selection order.
    pub fn cells(&self) -> &[ProjectedCell] {
        &self.cells
    }

    pub fn compare_gates(&self) -> CompareGates {
        self.gates
    }

    fn recompute(&mut self) {
        self.cells = project_selection(&self.catalog, &self.selection);
        self.gates = check_compatibility(&self.cells);

        match timing_rep(&self.cells, &self.gates) {
            Some(index) => {
                let mut sel = std::mem::take(&mut self.timing_sel);
                sel.rebuild(index);
                self.timing_sel = sel;
            }
            None => self.timing_sel = TimingSelector::default(),
        }
        match power_rep(&self.cells, &self.gates) {
            Some(index) => {
                let mut sel = std::mem::take(&mut self.power_sel);
                sel.rebuild(index);
                self.power_sel = sel;
            }
            None => self.power_sel = PowerSelector::default(),
        }
        match leakage_rep(&self.cells, &self.gates) {
            Some(index) => {
                let mut sel = std::mem::take(&mut self.leakage_sel);
                sel.rebuild(index);
                self.leakage_sel = sel;
            }
            None => self.leakage_sel = LeakageSelector::default(),
        }
    }

    // ---- area ----

    pub fn area_rows(&self) -> Vec<AreaRow> {
        self.cells
            .iter()
            .map(|cell| AreaRow {
                lib: cell.lib.to_string(),
                cell: cell.cell.to_string(),
                area: cell.area.clone(),
            })
            .collect()
    }

    /// Parsed per-cell area values for the comparison curve; cells with an
    /// unparsable area are dropped.
    pub fn area_series(&self) -> Vec<CellValue> {
        self.cells
            .iter()
            .filter_map(|cell| match crate::parse_numeric(&cell.area) {
                Ok(value) => Some(CellValue {
                    lib: cell.lib.to_string(),
                    cell: cell.cell.to_string(),
                    value,
                }),
                Err(err) => {
                    warn!("{err} for cell \"{}\", dropping area point", cell.cell);
                    None
                }
            })
            .collect()
    }

    // ---- leakage power ----

    pub fn leakage_selector(&self) -> &LeakageSelector {
        &self.leakage_sel
    }

    pub fn leakage_when_candidates(&self) -> Vec<String> {
        leakage_rep(&self.cells, &self.gates)
            .map(|index| self.leakage_sel.when_candidates(index))
            .unwrap_or_default()
    }

    pub fn leakage_pg_pin_candidates(&self) -> Vec<String> {
        leakage_rep(&self.cells, &self.gates)
            .map(|index| self.leakage_sel.pg_pin_candidates(index))
            .unwrap_or_default()
    }

    pub fn choose_leakage_when(&mut self, value: String) {
        if let Some(index) = leakage_rep(&self.cells, &self.gates) {
            self.leakage_sel.choose_when(index, value);
        }
    }

    pub fn choose_leakage_pg_pin(&mut self, value: String) {
        self.leakage_sel.choose_pg_pin(value);
    }

    /// Compare mode: one row per cell at the chosen (when, related_pg_pin),
    /// cells without a matching entry omitted. Otherwise: every entry of
    /// every selected cell.
    pub fn leakage_rows(&self) -> Vec<LeakageRow> {
        if self.leakage_compare() {
            let (Some(when), Some(pg_pin)) = (
                self.leakage_sel.when.as_ref(),
                self.leakage_sel.related_pg_pin.as_ref(),
            ) else {
                return Vec::new();
            };
            self.cells
                .iter()
                .filter_map(|cell| {
                    let entry = cell
                        .leakage
                        .iter()
                        .find(|e| e.when == *when && e.related_pg_pin == *pg_pin)?;
                    Some(LeakageRow {
                        lib: cell.lib.to_string(),
                        cell: cell.cell.to_string(),
                        when: entry.when.clone(),
                        related_pg_pin: entry.related_pg_pin.clone(),
                        value: entry.value.clone(),
                    })
                })
                .collect()
        } else {
            self.cells
                .iter()
                .flat_map(|cell| {
                    cell.leakage.iter().map(move |entry| LeakageRow {
                        lib: cell.lib.to_string(),
                        cell: cell.cell.to_string(),
                        when: entry.when.clone(),
                        related_pg_pin: entry.related_pg_pin.clone(),
                        value: entry.value.clone(),
                    })
                })
                .collect()
        }
    }

    /// Parsed compare-mode leakage values, empty outside compare mode.
    pub fn leakage_series(&self) -> Vec<CellValue> {
        if !self.leakage_compare() {
            return Vec::new();
        }
        self.leakage_rows()
            .into_iter()
            .filter_map(|row| match crate::parse_numeric(&row.value) {
                Ok(value) => Some(CellValue {
                    lib: row.lib,
                    cell: row.cell,
                    value,
                }),
                Err(err) => {
                    warn!("{err} for cell \"{}\", dropping leakage point", row.cell);
                    None
                }
            })
            .collect()
    }

    fn leakage_compare(&self) -> bool {
        self.cells.len() >= 2 && self.gates.leakage_power
    }

    // ---- timing ----

    pub fn timing_selector(&self) -> &TimingSelector {
        &self.timing_sel
    }

    pub fn timing_bundle_candidates(&self) -> Vec<GroupName> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.bundle_candidates(index))
            .unwrap_or_default()
    }

    pub fn timing_bus_candidates(&self) -> Vec<GroupName> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.bus_candidates(index))
            .unwrap_or_default()
    }

    pub fn timing_pin_candidates(&self) -> Vec<PinName> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.pin_candidates(index))
            .unwrap_or_default()
    }

    pub fn timing_related_pin_candidates(&self) -> Vec<String> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.related_pin_candidates(index))
            .unwrap_or_default()
    }

    pub fn timing_related_pg_pin_candidates(&self) -> Vec<String> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.related_pg_pin_candidates(index))
            .unwrap_or_default()
    }

    pub fn timing_sense_candidates(&self) -> Vec<String> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.timing_sense_candidates(index))
            .unwrap_or_default()
    }

    pub fn timing_type_candidates(&self) -> Vec<String> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.timing_type_candidates(index))
            .unwrap_or_default()
    }

    pub fn timing_when_candidates(&self) -> Vec<String> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.when_candidates(index))
            .unwrap_or_default()
    }

    pub fn timing_table_candidates(&self) -> Vec<TableKind> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.table_candidates(index))
            .unwrap_or_default()
    }

    pub fn timing_index_1_positions(&self) -> Vec<usize> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.index_1_positions(index))
            .unwrap_or_default()
    }

    pub fn timing_index_2_positions(&self) -> Vec<usize> {
        timing_rep(&self.cells, &self.gates)
            .map(|index| self.timing_sel.index_2_positions(index))
            .unwrap_or_default()
    }

    pub fn choose_timing_scope(&mut self, scope: ScopeChoice) {
        if let Some(index) = timing_rep(&self.cells, &self.gates) {
            self.timing_sel.choose_scope(index, scope);
        }
    }

    pub fn choose_timing_pin(&mut self, pin: PinName) {
        if let Some(index) = timing_rep(&self.cells, &self.gates) {
            self.timing_sel.choose_pin(index, pin);
        }
    }

    pub fn choose_timing_related_pin(&mut self, value: String) {
        if let Some(index) = timing_rep(&self.cells, &self.gates) {
            self.timing_sel.choose_related_pin(index, value);
        }
    }

    pub fn choose_timing_related_pg_pin(&mut self, value: String) {
        if let Some(index) = timing_rep(&self.cells, &self.gates) {
            self.timing_sel.choose_related_pg_pin(index, value);
        }
    }

    pub fn choose_timing_sense(&mut self, value: String) {
        if let Some(index) = timing_rep(&self.cells, &self.gates) {
            self.timing_sel.choose_timing_sense(index, value);
        }
    }

    pub fn choose_timing_type(&mut self, value: String) {
        if let Some(index) = timing_rep(&self.cells, &self.gates) {
            self.timing_sel.choose_timing_type(index, value);
        }
    }

    pub fn choose_timing_when(&mut self, value: String) {
        if let Some(index) = timing_rep(&self.cells, &self.gates) {
            self.timing_sel.choose_when(index, value);
        }
    }

    pub fn choose_timing_table(&mut self, kind: TableKind) {
        self.timing_sel.choose_table(kind);
    }

    pub fn choose_timing_index_1(&mut self, position: Option<usize>) {
        self.timing_sel.choose_index_1(position);
    }

    pub fn choose_timing_index_2(&mut self, position: Option<usize>) {
        self.timing_sel.choose_index_2(position);
    }

    pub fn timing_resolved(&self) -> Resolved {
        match self.cells.len() {
            0 => Resolved::Empty,
            1 => self.timing_sel.resolve_single(&self.cells[0]),
            _ if self.gates.timing => self.timing_sel.resolve_compare(&self.cells),
            _ => Resolved::Empty,
        }
    }

    // ---- internal power ----

    pub fn power_selector(&self) -> &PowerSelector {
        &self.power_sel
    }

    pub fn power_bundle_candidates(&self) -> Vec<GroupName> {
        power_rep(&self.cells, &self.gates)
            .map(|index| self.power_sel.bundle_candidates(index))
            .unwrap_or_default()
    }

    pub fn power_bus_candidates(&self) -> Vec<GroupName> {
        power_rep(&self.cells, &self.gates)
            .map(|index| self.power_sel.bus_candidates(index))
            .unwrap_or_default()
    }

    pub fn power_pin_candidates(&self) -> Vec<PinName> {
        power_rep(&self.cells, &self.gates)
            .map(|index| self.power_sel.pin_candidates(index))
            .unwrap_or_default()
    }

    pub fn power_related_pin_candidates(&self) -> Vec<String> {
        power_rep(&self.cells, &self.gates)
            .map(|index| self.power_sel.related_pin_candidates(index))
            .unwrap_or_default()
    }

    pub fn power_related_pg_pin_candidates(&self) -> Vec<String> {
        power_rep(&self.cells, &self.gates)
            .map(|index| self.power_sel.related_pg_pin_candidates(index))
            .unwrap_or_default()
    }

    pub fn power_when_candidates(&self) -> Vec<String> {
        power_rep(&self.cells, &self.gates)
            .map(|index| self.power_sel.when_candidates(index))
            .unwrap_or_default()
    }

    pub fn power_table_candidates(&self) -> Vec<TableKind> {
        power_rep(&self.cells, &self.gates)
            .map(|index| self.power_sel.table_candidates(index))
            .unwrap_or_default()
    }

    pub fn power_index_1_positions(&self) -> Vec<usize> {
        power_rep(&self.cells, &self.gates)
            .map(|index| self.power_sel.index_1_positions(index))
            .unwrap_or_default()
    }

    pub fn power_index_2_positions(&self) -> Vec<usize> {
        power_rep(&self.cells, &self.gates)
            .map(|index| self.power_sel.index_2_positions(index))
            .unwrap_or_default()
    }

    pub fn choose_power_scope(&mut self, scope: ScopeChoice) {
        if let Some(index) = power_rep(&self.cells, &self.gates) {
            self.power_sel.choose_scope(index, scope);
        }
    }

    pub fn choose_power_pin(&mut self, pin: PinName) {
        if let Some(index) = power_rep(&self.cells, &self.gates) {
            self.power_sel.choose_pin(index, pin);
        }
    }

    pub fn choose_power_related_pin(&mut self, value: String) {
        if let Some(index) = power_rep(&self.cells, &self.gates) {
            self.power_sel.choose_related_pin(index, value);
        }
    }

    pub fn choose_power_related_pg_pin(&mut self, value: String) {
        if let Some(index) = power_rep(&self.cells, &self.gates) {
            self.power_sel.choose_related_pg_pin(index, value);
        }
    }

    pub fn choose_power_when(&mut self, value: String) {
        if let Some(index) = power_rep(&self.cells, &self.gates) {
            self.power_sel.choose_when(index, value);
        }
    }

    pub fn choose_power_table(&mut self, kind: TableKind) {
        self.power_sel.choose_table(kind);
    }

    pub fn choose_power_index_1(&mut self, position: Option<usize>) {
        self.power_sel.choose_index_1(position);
    }

    pub fn choose_power_index_2(&mut self, position: Option<usize>) {
        self.power_sel.choose_index_2(position);
    }

    pub fn power_resolved(&self) -> Resolved {
        match self.cells.len() {
            0 => Resolved::Empty,
            1 => self.power_sel.resolve_single(&self.cells[0]),
            _ if self.gates.internal_power => self.power_sel.resolve_compare(&self.cells),
            _ => Resolved::Empty,
        }
    }
}

/// The cell whose index drives the timing selector: the only selected cell,
/// or the first one once the timing shapes are known to be identical.
fn timing_rep<'a>(
    cells: &'a [ProjectedCell],
    gates: &CompareGates,
) -> Option<&'a Scoped<ArcIndex<TimingKey>>> {
    match cells.len() {
        0 => None,
        1 => Some(&cells[0].timing_index),
        _ if gates.timing => Some(&cells[0].timing_index),
        _ => None,
    }
}

fn power_rep<'a>(
    cells: &'a [ProjectedCell],
    gates: &CompareGates,
) -> Option<&'a Scoped<ArcIndex<PowerKey>>> {
    match cells.len() {
        0 => None,
        1 => Some(&cells[0].power_index),
        _ if gates.internal_power => Some(&cells[0].power_index),
        _ => None,
    }
}

/// Leakage drill-down only exists in compare mode; single-cell leakage shows
/// the full flat list instead.
fn leakage_rep<'a>(
    cells: &'a [ProjectedCell],
    gates: &CompareGates,
) -> Option<&'a BTreeMap<String, BTreeSet<String>>> {
    (cells.len() >= 2 && gates.leakage_power).then(|| &cells[0].leakage_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{RawLeakage, StaticLibrary};
    use indexmap::IndexMap;

    fn library(cells: &[&str]) -> StaticLibrary {
        StaticLibrary {
            cells: cells.iter().map(|c| CellName::from(*c)).collect(),
            units: IndexMap::from([("time_unit".to_string(), "\"1ns\"".to_string())]),
            area: cells
                .iter()
                .enumerate()
                .map(|(i, c)| (CellName::from(*c), format!("{}.0", i + 1)))
                .collect(),
            leakage_power: cells
                .iter()
                .map(|c| {
                    (
                        CellName::from(*c),
                        vec![RawLeakage {
                            value: Some("0.5".to_string()),
                            when: Some("!A".to_string()),
                            related_pg_pin: Some("VDD".to_string()),
                        }],
                    )
                })
                .collect(),
            pins: IndexMap::new(),
        }
    }

    #[test]
    fn empty_selection_yields_empty_everything() {
        let mut session = Session::new();
        session.load_library("a.lib", &library(&["INVD1BWP"])).unwrap();

        assert!(session.area_rows().is_empty());
        assert!(session.leakage_rows().is_empty());
        assert!(session.timing_pin_candidates().is_empty());
        assert!(session.power_pin_candidates().is_empty());
        assert_eq!(session.timing_resolved(), Resolved::Empty);
        assert_eq!(session.power_resolved(), Resolved::Empty);
    }

    #[test]
    fn toggle_recomputes_rows() {
        let mut session = Session::new();
        session
            .load_library("a.lib", &library(&["INVD1BWP", "INVD2BWP"]))
            .unwrap();

        session.toggle_cell("a.lib", "INVD1BWP", true);
        assert_eq!(session.area_rows().len(), 1);
        assert_eq!(session.area_rows()[0].area, "1.0");
        // single cell: plain leakage listing, no drill-down candidates
        assert_eq!(session.leakage_rows().len(), 1);
        assert!(session.leakage_when_candidates().is_empty());

        session.toggle_cell("a.lib", "INVD2BWP", true);
        assert!(session.compare_gates().leakage_power);
        assert_eq!(session.leakage_when_candidates(), ["!A"]);
        assert_eq!(session.leakage_rows().len(), 2);
        assert_eq!(session.leakage_series().len(), 2);

        session.toggle_cell("a.lib", "INVD2BWP", false);
        // no stale membership after unchecking
        assert_eq!(session.area_rows().len(), 1);
        assert!(!session.compare_gates().leakage_power);
    }

    #[test]
    fn display_tree_is_series_sorted() {
        let mut session = Session::new();
        session
            .load_library("a.lib", &library(&["INVD2BWP", "INVD1BWP", "BUFD4BWP"]))
            .unwrap();
        let tree = session.display_tree();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].0, "a.lib");
        assert_eq!(tree[0].1, ["INVD1BWP", "INVD2BWP", "BUFD4BWP"]);
    }

    #[test]
    fn area_series_parses_values() {
        let mut session = Session::new();
        session
            .load_library("a.lib", &library(&["INVD1BWP", "INVD2BWP"]))
            .unwrap();
        session.toggle_cell("a.lib", "INVD1BWP", true);
        session.toggle_cell("a.lib", "INVD2BWP", true);
        let series = session.area_series();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].value, 1.0);
        assert_eq!(series[1].value, 2.0);
    }
}

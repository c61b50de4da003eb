//! Attribute projection.
//!
//! For every selected cell the raw parser tree is normalized into two
//! complementary views: a flat record list carrying the actual table values,
//! and a discriminator-keyed navigation index carrying key sets and index
//! extents only. Both are rebuilt wholesale on every selection change.

use crate::catalog::{Catalog, Library};
use crate::selection::Selection;
use crate::source::{RawArc, RawLeakage, RawPinGroup, RawTable};
use crate::types::{CellName, Family, GroupName, LibName, PinName, ScopeChoice, TableKind, NOT_AVAILABLE};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet};

/// One `leakage_power` entry after quote stripping, source order preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakageEntry {
    pub value: String,
    pub when: String,
    pub related_pg_pin: String,
}

/// A parsed lookup table. Cells keep the source's string spelling; numeric
/// conversion happens at plot/compare time (see [`crate::parse_numeric`]).
///
/// With `index_2` empty the table is 1-D: `values` holds a single row
/// indexed by `index_1` positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Table {
    pub index_1: Vec<String>,
    pub index_2: Vec<String>,
    pub values: Vec<Vec<String>>,
}

/// Flat timing arc: quote-stripped discriminators plus every recognized
/// table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingArc {
    pub related_pin: String,
    pub related_pg_pin: String,
    pub timing_sense: String,
    pub timing_type: String,
    pub when: String,
    pub tables: BTreeMap<TableKind, Table>,
}

/// Flat internal-power arc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerArc {
    pub related_pin: String,
    pub related_pg_pin: String,
    pub when: String,
    pub tables: BTreeMap<TableKind, Table>,
}

/// Discriminator tuple of a timing arc, in selector-stage order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimingKey {
    pub related_pin: String,
    pub related_pg_pin: String,
    pub timing_sense: String,
    pub timing_type: String,
    pub when: String,
}

/// Discriminator tuple of an internal-power arc.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PowerKey {
    pub related_pin: String,
    pub related_pg_pin: String,
    pub when: String,
}

/// Positional extent of one table: how many `index_1`/`index_2` entries it
/// has. The navigation index never stores the values themselves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TableExtent {
    pub rows: usize,
    pub cols: usize,
}

/// Navigation index for one pin: a key path exists iff at least one arc in
/// the flat list carries exactly that discriminator tuple. For duplicate
/// tuples the first arc's extents win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcIndex<K: Ord> {
    pub entries: BTreeMap<K, BTreeMap<TableKind, TableExtent>>,
}

impl<K: Ord> Default for ArcIndex<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord> ArcIndex<K> {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-cell storage replicated across the three container scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoped<T> {
    pub pins: BTreeMap<PinName, T>,
    pub bundles: BTreeMap<GroupName, BTreeMap<PinName, T>>,
    pub buses: BTreeMap<GroupName, BTreeMap<PinName, T>>,
}

impl<T> Default for Scoped<T> {
    fn default() -> Self {
        Self {
            pins: BTreeMap::new(),
            bundles: BTreeMap::new(),
            buses: BTreeMap::new(),
        }
    }
}

impl<T> Scoped<T> {
    /// The pin map the given scope choice navigates into, if that container
    /// exists on this cell.
    pub fn pin_map(&self, scope: &ScopeChoice) -> Option<&BTreeMap<PinName, T>> {
        match scope {
            ScopeChoice::DirectPin => Some(&self.pins),
            ScopeChoice::Bundle(name) => self.bundles.get(name),
            ScopeChoice::Bus(name) => self.buses.get(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty() && self.bundles.is_empty() && self.buses.is_empty()
    }
}

/// Normalized attribute record of one selected (library, cell) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedCell {
    pub lib: LibName,
    pub cell: CellName,
    pub area: String,
    pub leakage: Vec<LeakageEntry>,
    /// `when` -> pg-pins observed under that condition. Only populated when
    /// the selection holds two or more cells (compare-mode navigation).
    pub leakage_index: BTreeMap<String, BTreeSet<String>>,
    pub timing: Scoped<Vec<TimingArc>>,
    pub timing_index: Scoped<ArcIndex<TimingKey>>,
    pub internal_power: Scoped<Vec<PowerArc>>,
    pub power_index: Scoped<ArcIndex<PowerKey>>,
}

/// Project every selected cell, in selection order. Cells whose library is
/// unknown are skipped.
pub fn project_selection(catalog: &Catalog, selection: &Selection) -> Vec<ProjectedCell> {
    let count = selection.len();
    selection
        .snapshot()
        .filter_map(|(lib, cell)| {
            let library = catalog.by_name(lib)?;
            Some(project_cell(library, cell, count))
        })
        .collect()
}

/// Project one cell out of its library's raw trees. `selection_size` gates
/// the leakage navigation index.
pub fn project_cell(library: &Library, cell: &CellName, selection_size: usize) -> ProjectedCell {
    let mut out = ProjectedCell {
        lib: library.name.clone(),
        cell: cell.clone(),
        area: library
            .area
            .get(cell)
            .cloned()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        leakage: Vec::new(),
        leakage_index: BTreeMap::new(),
        timing: Scoped::default(),
        timing_index: Scoped::default(),
        internal_power: Scoped::default(),
        power_index: Scoped::default(),
    };

    if let Some(entries) = library.leakage_power.get(cell) {
        for raw in entries {
            let entry = project_leakage(raw);
            if selection_size >= 2 {
                out.leakage_index
                    .entry(entry.when.clone())
                    .or_default()
                    .insert(entry.related_pg_pin.clone());
            }
            out.leakage.push(entry);
        }
    }

    let Some(tree) = library.pin_info.get(cell) else {
        return out;
    };

    for (pin_name, pin) in &tree.pins {
        if !pin.timing.is_empty() {
            let (arcs, index) = project_timing_arcs(pin.timing.iter());
            out.timing.pins.insert(pin_name.clone(), arcs);
            out.timing_index.pins.insert(pin_name.clone(), index);
        }
        if !pin.internal_power.is_empty() {
            let (arcs, index) = project_power_arcs(pin.internal_power.iter());
            out.internal_power.pins.insert(pin_name.clone(), arcs);
            out.power_index.pins.insert(pin_name.clone(), index);
        }
    }

    for (group_name, group) in &tree.bundles {
        project_timing_group(group_name, group, &mut out.timing.bundles, &mut out.timing_index.bundles);
        project_power_group(
            group_name,
            group,
            &mut out.internal_power.bundles,
            &mut out.power_index.bundles,
        );
    }
    for (group_name, group) in &tree.buses {
        project_timing_group(group_name, group, &mut out.timing.buses, &mut out.timing_index.buses);
        project_power_group(
            group_name,
            group,
            &mut out.internal_power.buses,
            &mut out.power_index.buses,
        );
    }

    out
}

fn project_leakage(raw: &RawLeakage) -> LeakageEntry {
    LeakageEntry {
        value: strip_quotes(raw.value.as_deref()),
        when: strip_quotes(raw.when.as_deref()),
        related_pg_pin: strip_quotes(raw.related_pg_pin.as_deref()),
    }
}

/// Bundle/bus-level arcs are inherited by every member pin, appended after
/// the pin's own arcs.
fn project_timing_group(
    name: &GroupName,
    group: &RawPinGroup,
    flat: &mut BTreeMap<GroupName, BTreeMap<PinName, Vec<TimingArc>>>,
    index: &mut BTreeMap<GroupName, BTreeMap<PinName, ArcIndex<TimingKey>>>,
) {
    for (pin_name, pin) in &group.pins {
        if pin.timing.is_empty() && group.timing.is_empty() {
            continue;
        }
        let (arcs, idx) = project_timing_arcs(pin.timing.iter().chain(group.timing.iter()));
        flat.entry(name.clone()).or_default().insert(pin_name.clone(), arcs);
        index.entry(name.clone()).or_default().insert(pin_name.clone(), idx);
    }
}

fn project_power_group(
    name: &GroupName,
    group: &RawPinGroup,
    flat: &mut BTreeMap<GroupName, BTreeMap<PinName, Vec<PowerArc>>>,
    index: &mut BTreeMap<GroupName, BTreeMap<PinName, ArcIndex<PowerKey>>>,
) {
    for (pin_name, pin) in &group.pins {
        if pin.internal_power.is_empty() && group.internal_power.is_empty() {
            continue;
        }
        let (arcs, idx) = project_power_arcs(pin.internal_power.iter().chain(group.internal_power.iter()));
        flat.entry(name.clone()).or_default().insert(pin_name.clone(), arcs);
        index.entry(name.clone()).or_default().insert(pin_name.clone(), idx);
    }
}

fn project_timing_arcs<'a>(
    raws: impl Iterator<Item = &'a RawArc>,
) -> (Vec<TimingArc>, ArcIndex<TimingKey>) {
    let mut arcs = Vec::new();
    let mut index = ArcIndex::default();
    for raw in raws {
        let arc = TimingArc {
            related_pin: strip_quotes(raw.related_pin.as_deref()),
            related_pg_pin: strip_quotes(raw.related_pg_pin.as_deref()),
            timing_sense: strip_quotes(raw.timing_sense.as_deref()),
            timing_type: strip_quotes(raw.timing_type.as_deref()),
            when: strip_quotes(raw.when.as_deref()),
            tables: project_tables(&raw.tables, Family::Timing),
        };
        let key = TimingKey {
            related_pin: arc.related_pin.clone(),
            related_pg_pin: arc.related_pg_pin.clone(),
            timing_sense: arc.timing_sense.clone(),
            timing_type: arc.timing_type.clone(),
            when: arc.when.clone(),
        };
        fold_into_index(&mut index, key, &arc.tables);
        arcs.push(arc);
    }
    (arcs, index)
}

fn project_power_arcs<'a>(
    raws: impl Iterator<Item = &'a RawArc>,
) -> (Vec<PowerArc>, ArcIndex<PowerKey>) {
    let mut arcs = Vec::new();
    let mut index = ArcIndex::default();
    for raw in raws {
        let arc = PowerArc {
            related_pin: strip_quotes(raw.related_pin.as_deref()),
            related_pg_pin: strip_quotes(raw.related_pg_pin.as_deref()),
            when: strip_quotes(raw.when.as_deref()),
            tables: project_tables(&raw.tables, Family::InternalPower),
        };
        let key = PowerKey {
            related_pin: arc.related_pin.clone(),
            related_pg_pin: arc.related_pg_pin.clone(),
            when: arc.when.clone(),
        };
        fold_into_index(&mut index, key, &arc.tables);
        arcs.push(arc);
    }
    (arcs, index)
}

fn fold_into_index<K: Ord>(
    index: &mut ArcIndex<K>,
    key: K,
    tables: &BTreeMap<TableKind, Table>,
) {
    let slot = index.entries.entry(key).or_default();
    for (kind, table) in tables {
        slot.entry(*kind).or_insert(TableExtent {
            rows: table.index_1.len(),
            cols: table.index_2.len(),
        });
    }
}

fn project_tables(raw: &IndexMap<String, RawTable>, family: Family) -> BTreeMap<TableKind, Table> {
    raw.iter()
        .filter_map(|(name, body)| {
            let kind = TableKind::parse(name)?;
            if kind.family() != family {
                return None;
            }
            Some((
                kind,
                Table {
                    index_1: parse_axis(body.index_1.as_deref()),
                    index_2: parse_axis(body.index_2.as_deref()),
                    values: parse_rows(body.values.as_deref()),
                },
            ))
        })
        .collect()
}

/// Absent discriminators become the literal `"N/A"`, present ones lose
/// every quote character.
fn strip_quotes(raw: Option<&str>) -> String {
    match raw {
        Some(s) => s.replace('"', ""),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `("0.1, 0.2")` -> `["0.1", "0.2"]`.
fn parse_axis(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let stripped: String = raw.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    tokens(&stripped)
}

/// `("10, 20", "30, 40")` -> `[["10", "20"], ["30", "40"]]`. Rows are
/// delimited by a closing quote followed by a comma.
fn parse_rows(raw: Option<&str>) -> Vec<Vec<String>> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let stripped: String = raw.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    split_quoted_rows(&stripped)
        .into_iter()
        .map(|row| tokens(&row))
        .collect()
}

fn split_quoted_rows(s: &str) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            let mut rest = chars.clone();
            while rest.peek().is_some_and(|w| w.is_whitespace()) {
                rest.next();
            }
            if rest.peek() == Some(&',') {
                rest.next();
                chars = rest;
                rows.push(std::mem::take(&mut current));
                continue;
            }
        }
        current.push(c);
    }
    rows.push(current);
    rows
}

fn tokens(s: &str) -> Vec<String> {
    s.chars()
        .map(|c| if matches!(c, '"' | ',') { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

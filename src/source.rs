//! Contract with the external library-file parser.
//!
//! Parsing `.lib` grammar is not this crate's business: a collaborator hands
//! over, per library file, the raw per-cell dictionaries described here.
//! Strings arrive exactly as spelled in the source file, quoting included;
//! normalization happens later in [`crate::project`].

use crate::types::{CellName, GroupName, PinName};
use indexmap::IndexMap;

/// Per-file getters the external parser must provide.
///
/// All maps preserve source order.
pub trait LibertySource {
    /// Cell names in file order.
    fn cell_list(&self) -> Vec<CellName>;
    /// Unit declarations, keyed by unit-kind name. Recognized keys are
    /// `leakage_power_unit` and `time_unit`; values keep their quoting.
    fn units(&self) -> IndexMap<String, String>;
    /// Raw `area` attribute string per cell.
    fn cell_area(&self) -> IndexMap<CellName, String>;
    /// Raw `leakage_power` entries per cell, in source order.
    fn cell_leakage_power(&self) -> IndexMap<CellName, Vec<RawLeakage>>;
    /// Raw pin/bundle/bus tree per cell.
    fn pin_info(&self) -> IndexMap<CellName, RawCellPins>;
}

/// One raw `leakage_power` group body.
#[derive(Debug, Clone, Default)]
pub struct RawLeakage {
    pub value: Option<String>,
    pub when: Option<String>,
    pub related_pg_pin: Option<String>,
}

/// A cell's pin containers. A pin lives either directly under the cell or
/// inside a bundle or bus.
#[derive(Debug, Clone, Default)]
pub struct RawCellPins {
    pub pins: IndexMap<PinName, RawPin>,
    pub bundles: IndexMap<GroupName, RawPinGroup>,
    pub buses: IndexMap<GroupName, RawPinGroup>,
}

/// A bundle or bus: group-level arcs apply to every member pin.
#[derive(Debug, Clone, Default)]
pub struct RawPinGroup {
    pub timing: Vec<RawArc>,
    pub internal_power: Vec<RawArc>,
    pub pins: IndexMap<PinName, RawPin>,
}

#[derive(Debug, Clone, Default)]
pub struct RawPin {
    pub timing: Vec<RawArc>,
    pub internal_power: Vec<RawArc>,
}

/// One raw `timing` or `internal_power` group body. Timing-only fields stay
/// `None` for internal-power arcs.
#[derive(Debug, Clone, Default)]
pub struct RawArc {
    pub related_pin: Option<String>,
    pub related_pg_pin: Option<String>,
    pub timing_sense: Option<String>,
    pub timing_type: Option<String>,
    pub when: Option<String>,
    /// Table group name (`cell_rise`, `fall_power`, ...) to raw body, in
    /// source order.
    pub tables: IndexMap<String, RawTable>,
}

/// Raw lookup-table body: the unparsed `index_1`/`index_2`/`values`
/// attribute strings, parentheses and quotes included.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub index_1: Option<String>,
    pub index_2: Option<String>,
    pub values: Option<String>,
}

/// An owned, pre-extracted [`LibertySource`]. Callers fill one of these from
/// whatever parser they use and hand it to the catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticLibrary {
    pub cells: Vec<CellName>,
    pub units: IndexMap<String, String>,
    pub area: IndexMap<CellName, String>,
    pub leakage_power: IndexMap<CellName, Vec<RawLeakage>>,
    pub pins: IndexMap<CellName, RawCellPins>,
}

impl LibertySource for StaticLibrary {
    fn cell_list(&self) -> Vec<CellName> {
        self.cells.clone()
    }

    fn units(&self) -> IndexMap<String, String> {
        self.units.clone()
    }

    fn cell_area(&self) -> IndexMap<CellName, String> {
        self.area.clone()
    }

    fn cell_leakage_power(&self) -> IndexMap<CellName, Vec<RawLeakage>> {
        self.leakage_power.clone()
    }

    fn pin_info(&self) -> IndexMap<CellName, RawCellPins> {
        self.pins.clone()
    }
}

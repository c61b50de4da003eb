//! Structural compatibility across the selection.
//!
//! Compare mode for a family needs every selected cell to expose the same
//! container structure: the same scopes, pins, discriminator combinations
//! and table kinds with the same index extents. Values never participate.
//! Each family is gated independently.

use crate::project::ProjectedCell;
use crate::types::Family;
use log::warn;

/// Per-family multi-compare gates.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CompareGates {
    pub leakage_power: bool,
    pub timing: bool,
    pub internal_power: bool,
}

impl CompareGates {
    pub fn get(&self, family: Family) -> bool {
        match family {
            Family::LeakagePower => self.leakage_power,
            Family::Timing => self.timing,
            Family::InternalPower => self.internal_power,
        }
    }
}

/// Shape-compare the projected selection. With fewer than two cells every
/// gate stays closed (single-cell and empty selections resolve through a
/// different path).
pub fn check_compatibility(cells: &[ProjectedCell]) -> CompareGates {
    if cells.len() < 2 {
        return CompareGates::default();
    }
    CompareGates {
        leakage_power: shape_equal(cells, Family::LeakagePower, |c| &c.leakage_index),
        timing: shape_equal(cells, Family::Timing, |c| &c.timing_index),
        internal_power: shape_equal(cells, Family::InternalPower, |c| &c.power_index),
    }
}

fn shape_equal<T: PartialEq>(
    cells: &[ProjectedCell],
    family: Family,
    index: impl Fn(&ProjectedCell) -> &T,
) -> bool {
    let first = index(&cells[0]);
    for cell in &cells[1..] {
        if index(cell) != first {
            warn!(
                "cell \"{}\" has a different {family} structure, compare mode disabled",
                cell.cell
            );
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ArcIndex, ProjectedCell, Scoped, TableExtent, TimingKey};
    use crate::types::TableKind;
    use std::collections::BTreeMap;

    fn blank_cell(name: &str) -> ProjectedCell {
        ProjectedCell {
            lib: "a.lib".into(),
            cell: name.into(),
            area: "1.0".to_string(),
            leakage: Vec::new(),
            leakage_index: BTreeMap::new(),
            timing: Scoped::default(),
            timing_index: Scoped::default(),
            internal_power: Scoped::default(),
            power_index: Scoped::default(),
        }
    }

    fn timing_key(related_pin: &str) -> TimingKey {
        TimingKey {
            related_pin: related_pin.to_string(),
            related_pg_pin: "N/A".to_string(),
            timing_sense: "positive_unate".to_string(),
            timing_type: "combinational".to_string(),
            when: "N/A".to_string(),
        }
    }

    fn cell_with_timing(name: &str, kinds: &[TableKind]) -> ProjectedCell {
        let mut cell = blank_cell(name);
        let mut index = ArcIndex::default();
        index.entries.insert(
            timing_key("A"),
            kinds
                .iter()
                .map(|k| (*k, TableExtent { rows: 2, cols: 2 }))
                .collect(),
        );
        cell.timing_index.pins.insert("Z".into(), index);
        cell
    }

    #[test]
    fn fewer_than_two_cells_never_compare() {
        assert_eq!(check_compatibility(&[]), CompareGates::default());
        let one = [cell_with_timing("INVD1", &[TableKind::CellRise])];
        assert_eq!(check_compatibility(&one), CompareGates::default());
    }

    #[test]
    fn identical_structure_enables_compare() {
        let cells = [
            cell_with_timing("INVD1", &[TableKind::CellRise]),
            cell_with_timing("INVD2", &[TableKind::CellRise]),
        ];
        let gates = check_compatibility(&cells);
        assert!(gates.timing);
        // leakage and power indexes are both empty on both cells: equal too
        assert!(gates.leakage_power);
        assert!(gates.internal_power);
    }

    #[test]
    fn extra_table_kind_disables_only_that_family() {
        let cells = [
            cell_with_timing("INVD1", &[TableKind::CellRise]),
            cell_with_timing("INVD2", &[TableKind::CellRise, TableKind::CellFall]),
        ];
        let gates = check_compatibility(&cells);
        assert!(!gates.timing);
        assert!(gates.leakage_power);
        assert!(gates.internal_power);
    }

    #[test]
    fn differing_extents_disable_compare() {
        let mut a = cell_with_timing("INVD1", &[TableKind::CellRise]);
        let b = cell_with_timing("INVD2", &[TableKind::CellRise]);
        a.timing_index
            .pins
            .get_mut("Z")
            .unwrap()
            .entries
            .get_mut(&timing_key("A"))
            .unwrap()
            .insert(TableKind::CellRise, TableExtent { rows: 3, cols: 2 });
        assert!(!check_compatibility(&[a, b]).timing);
    }

    #[test]
    fn leakage_structure_compares_when_to_pg_pins() {
        let mut a = blank_cell("INVD1");
        let mut b = blank_cell("INVD2");
        a.leakage_index
            .entry("A".to_string())
            .or_default()
            .insert("VDD".to_string());
        b.leakage_index
            .entry("A".to_string())
            .or_default()
            .insert("VBB".to_string());
        let gates = check_compatibility(&[a, b]);
        assert!(!gates.leakage_power);
        assert!(gates.timing);
    }
}

//! The set of checked (library, cell) pairs.
//!
//! Order is check order: libraries in the order one of their cells was first
//! checked, cells in check order within a library. Every mutation is
//! followed by a full downstream recomputation, there is no incremental
//! path.

use crate::types::{CellName, LibName};
use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone, Default)]
pub struct Selection {
    libs: IndexMap<LibName, IndexSet<CellName>>,
    count: usize,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check or uncheck a pair. Returns whether the selection changed;
    /// unchecking an absent pair is a no-op.
    pub fn toggle(&mut self, lib: &str, cell: &str, checked: bool) -> bool {
        if checked {
            let cells = self.libs.entry(lib.into()).or_default();
            if cells.insert(cell.into()) {
                self.count += 1;
                return true;
            }
            false
        } else {
            let Some(cells) = self.libs.get_mut(lib) else {
                return false;
            };
            if cells.shift_remove(cell) {
                self.count -= 1;
                if cells.is_empty() {
                    self.libs.shift_remove(lib);
                }
                return true;
            }
            false
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, lib: &str, cell: &str) -> bool {
        self.libs.get(lib).is_some_and(|cells| cells.contains(cell))
    }

    /// All checked pairs in check order.
    pub fn snapshot(&self) -> impl Iterator<Item = (&LibName, &CellName)> + '_ {
        self.libs
            .iter()
            .flat_map(|(lib, cells)| cells.iter().map(move |cell| (lib, cell)))
    }

    pub fn clear(&mut self) {
        self.libs.clear();
        self.count = 0;
    }
}

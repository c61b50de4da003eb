//! The catalog of loaded libraries.
//!
//! Each library is keyed by its base file name; loading the same name twice
//! is rejected. The first loaded library pins the reference units, later
//! libraries that disagree keep their values unscaled and only lose their
//! label (see `DESIGN.md`).

use crate::source::{LibertySource, RawCellPins, RawLeakage};
use crate::types::{CellName, LibName};
use indexmap::IndexMap;
use log::warn;
use thiserror::Error;

/// Handle of a loaded library, stable for the lifetime of the catalog.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryId(pub usize);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The same base file name was loaded before. The catalog is unchanged.
    #[error("library \"{0}\" has already been loaded")]
    DuplicateLibrary(LibName),
}

/// Reference unit labels, adopted from the first library that declares them.
/// `leakage_power_unit` drives both power labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Units {
    pub leakage_power: String,
    pub internal_power: String,
    pub time: String,
}

/// One loaded library: the parser's full extraction, immutable after load.
#[derive(Debug, Clone)]
pub struct Library {
    pub name: LibName,
    /// Cell names in raw file order.
    pub cells: Vec<CellName>,
    pub area: IndexMap<CellName, String>,
    pub leakage_power: IndexMap<CellName, Vec<RawLeakage>>,
    pub pin_info: IndexMap<CellName, RawCellPins>,
}

#[derive(Debug, Default)]
pub struct Catalog {
    libraries: IndexMap<LibName, Library>,
    units: Units,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the parsed contents of the library file at `path` under its
    /// base file name.
    pub fn load_library(
        &mut self,
        path: &str,
        source: &dyn LibertySource,
    ) -> Result<LibraryId, CatalogError> {
        let name: LibName = base_name(path).into();
        if self.libraries.contains_key(&name) {
            warn!("library \"{name}\" has already been loaded, skipping");
            return Err(CatalogError::DuplicateLibrary(name));
        }

        self.adopt_units(&name, &source.units());

        let library = Library {
            name: name.clone(),
            cells: source.cell_list(),
            area: source.cell_area(),
            leakage_power: source.cell_leakage_power(),
            pin_info: source.pin_info(),
        };
        let (id, _) = self.libraries.insert_full(name, library);
        Ok(LibraryId(id))
    }

    fn adopt_units(&mut self, lib: &LibName, declared: &IndexMap<String, String>) {
        if let Some(raw) = declared.get("leakage_power_unit") {
            let unit = strip_unit(raw);
            if self.units.leakage_power.is_empty() {
                self.units.internal_power = unit.clone();
                self.units.leakage_power = unit;
            } else if self.units.leakage_power != unit {
                warn!(
                    "leakage_power_unit is \"{unit}\" in library \"{lib}\", \
                     differs from the first loaded library, ignoring it"
                );
            }
        }
        if let Some(raw) = declared.get("time_unit") {
            let unit = strip_unit(raw);
            if self.units.time.is_empty() {
                self.units.time = unit;
            } else if self.units.time != unit {
                warn!(
                    "time_unit is \"{unit}\" in library \"{lib}\", \
                     differs from the first loaded library, ignoring it"
                );
            }
        }
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    pub fn get(&self, id: LibraryId) -> Option<&Library> {
        self.libraries.get_index(id.0).map(|(_, lib)| lib)
    }

    pub fn by_name(&self, name: &str) -> Option<&Library> {
        self.libraries.get(name)
    }

    /// Cell names of a library in raw parser order.
    pub fn cells_of(&self, id: LibraryId) -> &[CellName] {
        self.get(id).map(|lib| lib.cells.as_slice()).unwrap_or(&[])
    }

    /// Libraries in load order.
    pub fn iter(&self) -> impl Iterator<Item = (LibraryId, &Library)> {
        self.libraries
            .values()
            .enumerate()
            .map(|(i, lib)| (LibraryId(i), lib))
    }
}

/// `"1ns"` -> `ns`: quote characters and magnitude digits are dropped, the
/// scale factor is never applied to values.
fn strip_unit(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '"' && !c.is_ascii_digit())
        .collect()
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

use compact_str::CompactString;
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub type LibName = CompactString;
pub type CellName = CompactString;
pub type PinName = CompactString;
/// Name of a bundle or bus container.
pub type GroupName = CompactString;

/// Placeholder for discriminator fields the source file leaves out.
pub const NOT_AVAILABLE: &str = "N/A";

/// The three attribute families a cell can be inspected under.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Family {
    #[serde(rename = "leakage_power")]
    LeakagePower,
    #[serde(rename = "timing")]
    Timing,
    #[serde(rename = "internal_power")]
    InternalPower,
}

impl Display for Family {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Family::LeakagePower => write!(f, "leakage_power"),
            Family::Timing => write!(f, "timing"),
            Family::InternalPower => write!(f, "internal_power"),
        }
    }
}

/// The fixed set of lookup-table group names a library can attach to an arc.
///
/// Anything else in a `timing`/`internal_power` group body is ignored by the
/// projection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TableKind {
    #[serde(rename = "cell_rise")]
    CellRise,
    #[serde(rename = "cell_fall")]
    CellFall,
    #[serde(rename = "rise_transition")]
    RiseTransition,
    #[serde(rename = "fall_transition")]
    FallTransition,
    #[serde(rename = "rise_constraint")]
    RiseConstraint,
    #[serde(rename = "fall_constraint")]
    FallConstraint,
    #[serde(rename = "ocv_sigma_cell_rise")]
    OcvSigmaCellRise,
    #[serde(rename = "ocv_sigma_cell_fall")]
    OcvSigmaCellFall,
    #[serde(rename = "ocv_sigma_rise_transition")]
    OcvSigmaRiseTransition,
    #[serde(rename = "ocv_sigma_fall_transition")]
    OcvSigmaFallTransition,
    #[serde(rename = "ocv_sigma_rise_constraint")]
    OcvSigmaRiseConstraint,
    #[serde(rename = "ocv_sigma_fall_constraint")]
    OcvSigmaFallConstraint,
    #[serde(rename = "rise_power")]
    RisePower,
    #[serde(rename = "fall_power")]
    FallPower,
}

impl TableKind {
    pub fn parse(name: &str) -> Option<TableKind> {
        use TableKind::*;
        Some(match name {
            "cell_rise" => CellRise,
            "cell_fall" => CellFall,
            "rise_transition" => RiseTransition,
            "fall_transition" => FallTransition,
            "rise_constraint" => RiseConstraint,
            "fall_constraint" => FallConstraint,
            "ocv_sigma_cell_rise" => OcvSigmaCellRise,
            "ocv_sigma_cell_fall" => OcvSigmaCellFall,
            "ocv_sigma_rise_transition" => OcvSigmaRiseTransition,
            "ocv_sigma_fall_transition" => OcvSigmaFallTransition,
            "ocv_sigma_rise_constraint" => OcvSigmaRiseConstraint,
            "ocv_sigma_fall_constraint" => OcvSigmaFallConstraint,
            "rise_power" => RisePower,
            "fall_power" => FallPower,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        use TableKind::*;
        match self {
            CellRise => "cell_rise",
            CellFall => "cell_fall",
            RiseTransition => "rise_transition",
            FallTransition => "fall_transition",
            RiseConstraint => "rise_constraint",
            FallConstraint => "fall_constraint",
            OcvSigmaCellRise => "ocv_sigma_cell_rise",
            OcvSigmaCellFall => "ocv_sigma_cell_fall",
            OcvSigmaRiseTransition => "ocv_sigma_rise_transition",
            OcvSigmaFallTransition => "ocv_sigma_fall_transition",
            OcvSigmaRiseConstraint => "ocv_sigma_rise_constraint",
            OcvSigmaFallConstraint => "ocv_sigma_fall_constraint",
            RisePower => "rise_power",
            FallPower => "fall_power",
        }
    }

    pub fn family(&self) -> Family {
        match self {
            TableKind::RisePower | TableKind::FallPower => Family::InternalPower,
            _ => Family::Timing,
        }
    }
}

impl Display for TableKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which pin container the selector is navigating. Bundle and bus choices
/// are mutually exclusive; the default is the cell's direct pins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScopeChoice {
    #[default]
    DirectPin,
    Bundle(GroupName),
    Bus(GroupName),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_kind_round_trip() {
        for name in [
            "cell_rise",
            "fall_transition",
            "rise_constraint",
            "ocv_sigma_cell_fall",
            "ocv_sigma_fall_constraint",
            "rise_power",
        ] {
            let kind = TableKind::parse(name).unwrap();
            assert_eq!(kind.as_str(), name);
        }
        assert_eq!(TableKind::parse("cell_bounce"), None);
        // the misspelled names some generators emit are not recognized
        assert_eq!(TableKind::parse("ocv_sigma_rise_contraint"), None);
    }

    #[test]
    fn table_kind_family() {
        assert_eq!(TableKind::CellRise.family(), Family::Timing);
        assert_eq!(TableKind::FallConstraint.family(), Family::Timing);
        assert_eq!(TableKind::RisePower.family(), Family::InternalPower);
    }
}

use indexmap::IndexMap;
use libview::catalog::CatalogError;
use libview::resolve::Resolved;
use libview::session::Session;
use libview::source::{RawArc, RawCellPins, RawLeakage, RawPin, RawTable, StaticLibrary};
use libview::types::TableKind;

fn timing_arc(related_pin: &str, rise: &str, fall: &str) -> RawArc {
    RawArc {
        related_pin: Some(format!("\"{related_pin}\"")),
        timing_sense: Some("negative_unate".to_string()),
        timing_type: Some("combinational".to_string()),
        tables: IndexMap::from([
            (
                "cell_rise".to_string(),
                RawTable {
                    index_1: Some("(\"1, 2\")".to_string()),
                    index_2: Some("(\"0.1, 0.2\")".to_string()),
                    values: Some(rise.to_string()),
                },
            ),
            (
                "cell_fall".to_string(),
                RawTable {
                    index_1: Some("(\"1, 2\")".to_string()),
                    index_2: Some("(\"0.1, 0.2\")".to_string()),
                    values: Some(fall.to_string()),
                },
            ),
        ]),
        ..Default::default()
    }
}

fn power_arc(related_pin: &str, values: &str) -> RawArc {
    RawArc {
        related_pin: Some(related_pin.to_string()),
        related_pg_pin: Some("VDD".to_string()),
        tables: IndexMap::from([(
            "rise_power".to_string(),
            RawTable {
                index_1: Some("(\"0.01, 0.02\")".to_string()),
                index_2: None,
                values: Some(values.to_string()),
            },
        )]),
        ..Default::default()
    }
}

fn inverter_pins(rise: &str, fall: &str, power: &str) -> RawCellPins {
    RawCellPins {
        pins: IndexMap::from([(
            "ZN".into(),
            RawPin {
                timing: vec![timing_arc("I", rise, fall)],
                internal_power: vec![power_arc("I", power)],
            },
        )]),
        ..Default::default()
    }
}

fn leakage() -> Vec<RawLeakage> {
    vec![
        RawLeakage {
            value: Some("0.021".to_string()),
            when: Some("\"!I\"".to_string()),
            related_pg_pin: Some("VDD".to_string()),
        },
        RawLeakage {
            value: Some("0.034".to_string()),
            when: Some("\"I\"".to_string()),
            related_pg_pin: Some("VDD".to_string()),
        },
    ]
}

fn demo_library() -> StaticLibrary {
    let mut lib = StaticLibrary {
        units: IndexMap::from([
            ("leakage_power_unit".to_string(), "\"1pW\"".to_string()),
            ("time_unit".to_string(), "\"1ns\"".to_string()),
        ]),
        ..Default::default()
    };

    for (cell, rise, fall, power) in [
        (
            "INVD1BWP",
            "(\"10, 20\", \"30, 40\")",
            "(\"12, 22\", \"32, 42\")",
            "(\"0.5, 0.6\")",
        ),
        (
            "INVD2BWP",
            "(\"11, 21\", \"31, 41\")",
            "(\"13, 23\", \"33, 43\")",
            "(\"0.7, 0.8\")",
        ),
    ] {
        lib.cells.push(cell.into());
        lib.area.insert(cell.into(), "1.5".to_string());
        lib.leakage_power.insert(cell.into(), leakage());
        lib.pins.insert(cell.into(), inverter_pins(rise, fall, power));
    }

    // different arc structure: a second input pin with its own arcs
    let mut nand_pins = inverter_pins("(\"10, 20\", \"30, 40\")", "(\"12, 22\", \"32, 42\")", "(\"0.5, 0.6\")");
    nand_pins.pins.insert(
        "A2".into(),
        RawPin {
            timing: vec![timing_arc("A1", "(\"1, 2\", \"3, 4\")", "(\"5, 6\", \"7, 8\")")],
            internal_power: Vec::new(),
        },
    );
    lib.cells.push("NAND2D1BWP".into());
    lib.area.insert("NAND2D1BWP".into(), "2.1".to_string());
    lib.leakage_power.insert("NAND2D1BWP".into(), leakage());
    lib.pins.insert("NAND2D1BWP".into(), nand_pins);

    lib
}

#[test]
fn load_select_and_drill() {
    let mut session = Session::new();
    let lib = demo_library();
    session.load_library("/libs/demo.lib", &lib).unwrap();

    // duplicate base file name is rejected and changes nothing
    let err = session.load_library("elsewhere/demo.lib", &lib).unwrap_err();
    assert_eq!(err, CatalogError::DuplicateLibrary("demo.lib".into()));
    assert_eq!(session.catalog().len(), 1);

    assert_eq!(session.units().time, "ns");
    assert_eq!(session.units().leakage_power, "pW");
    assert_eq!(session.units().internal_power, "pW");

    // series sorting groups the inverters, catch-all last
    let tree = session.display_tree();
    assert_eq!(tree[0].1, ["INVD1BWP", "INVD2BWP", "NAND2D1BWP"]);

    // single-cell drill-down
    session.toggle_cell("demo.lib", "INVD1BWP", true);
    assert_eq!(session.timing_pin_candidates(), ["ZN"]);
    assert_eq!(session.timing_related_pin_candidates(), ["I"]);
    assert_eq!(session.timing_related_pg_pin_candidates(), ["N/A"]);
    assert_eq!(session.timing_sense_candidates(), ["negative_unate"]);
    assert_eq!(
        session.timing_table_candidates(),
        [TableKind::CellRise, TableKind::CellFall]
    );

    // both indices unset: the full table
    let Resolved::Table(table) = session.timing_resolved() else {
        panic!("expected the full table");
    };
    assert_eq!(table.index_1, ["1", "2"]);
    assert_eq!(table.index_2, ["0.1", "0.2"]);
    assert_eq!(table.values[1], ["30", "40"]);

    // one index set: a curve across the other axis
    session.choose_timing_index_1(Some(0));
    let Resolved::Curve(curve) = session.timing_resolved() else {
        panic!("expected a curve");
    };
    assert_eq!(curve.x, [0.1, 0.2]);
    assert_eq!(curve.y, [10.0, 20.0]);

    // both indices set: one scalar
    session.choose_timing_index_2(Some(1));
    session.choose_timing_index_1(Some(1));
    assert_eq!(session.timing_resolved(), Resolved::Scalar(40.0));

    // re-choosing the table type resets the index stages
    session.choose_timing_table(TableKind::CellFall);
    assert_eq!(session.timing_selector().index_1, None);
    let Resolved::Table(fall) = session.timing_resolved() else {
        panic!("expected the fall table");
    };
    assert_eq!(fall.values[1], ["32", "42"]);
}

#[test]
fn compare_mode_across_structurally_equal_cells() {
    let mut session = Session::new();
    session.load_library("demo.lib", &demo_library()).unwrap();

    session.toggle_cell("demo.lib", "INVD1BWP", true);
    session.toggle_cell("demo.lib", "INVD2BWP", true);

    let gates = session.compare_gates();
    assert!(gates.timing);
    assert!(gates.internal_power);
    assert!(gates.leakage_power);

    // candidates come from the first selected cell; indices default to 0
    let Resolved::Compare(rows) = session.timing_resolved() else {
        panic!("expected compare rows");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].cell, "INVD1BWP");
    assert_eq!(rows[0].value, 10.0);
    assert_eq!(rows[1].cell, "INVD2BWP");
    assert_eq!(rows[1].value, 11.0);

    // explicit positions flow into every row
    session.choose_timing_index_1(Some(1));
    session.choose_timing_index_2(Some(1));
    let Resolved::Compare(rows) = session.timing_resolved() else {
        panic!("expected compare rows");
    };
    assert_eq!(rows[0].value, 40.0);
    assert_eq!(rows[1].value, 41.0);
    assert_eq!(rows[0].index_1, "2");
    assert_eq!(rows[0].index_2, "0.2");

    // leakage drill-down across the selection
    assert_eq!(session.leakage_when_candidates(), ["!I", "I"]);
    session.choose_leakage_when("I".to_string());
    let rows = session.leakage_rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].value, "0.034");
    let series = session.leakage_series();
    assert_eq!(series[0].value, 0.034);

    // 1-D internal-power table compares through values[0][index_1]
    let Resolved::Compare(rows) = session.power_resolved() else {
        panic!("expected power compare rows");
    };
    assert_eq!(rows[0].value, 0.5);
    assert_eq!(rows[1].value, 0.7);
    session.choose_power_index_1(Some(1));
    let Resolved::Compare(rows) = session.power_resolved() else {
        panic!("expected power compare rows");
    };
    assert_eq!(rows[0].value, 0.6);
    assert_eq!(rows[1].value, 0.8);
}

#[test]
fn structural_mismatch_disables_one_family_only() {
    let mut session = Session::new();
    session.load_library("demo.lib", &demo_library()).unwrap();

    session.toggle_cell("demo.lib", "INVD1BWP", true);
    session.toggle_cell("demo.lib", "NAND2D1BWP", true);

    let gates = session.compare_gates();
    // the nand has an extra timing pin: shapes differ
    assert!(!gates.timing);
    // its internal-power tree matches the inverter's, leakage matches too
    assert!(gates.internal_power);
    assert!(gates.leakage_power);

    assert_eq!(session.timing_resolved(), Resolved::Empty);
    assert!(session.timing_pin_candidates().is_empty());
    // the other families still compare
    assert!(matches!(session.power_resolved(), Resolved::Compare(_)));

    // unchecking the odd cell restores timing compare on the next pass
    session.toggle_cell("demo.lib", "NAND2D1BWP", false);
    session.toggle_cell("demo.lib", "INVD2BWP", true);
    assert!(session.compare_gates().timing);
}

#[test]
fn empty_selection_resolves_empty_not_erroring() {
    let mut session = Session::new();
    session.load_library("demo.lib", &demo_library()).unwrap();

    assert_eq!(session.timing_resolved(), Resolved::Empty);
    assert!(session.timing_pin_candidates().is_empty());
    assert!(session.timing_index_1_positions().is_empty());
    assert!(session.area_rows().is_empty());

    session.toggle_cell("demo.lib", "INVD1BWP", true);
    session.toggle_cell("demo.lib", "INVD1BWP", false);
    assert_eq!(session.timing_resolved(), Resolved::Empty);
    assert_eq!(session.selected_count(), 0);
}

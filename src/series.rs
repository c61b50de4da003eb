//! Display ordering of a library's cell list.
//!
//! Drive-strength variants of the same base cell (`INVD1BWP`, `INVD2BWP`,
//! ...) are grouped and ordered by strength; everything else goes into a
//! trailing bucket sorted by name.

use crate::types::CellName;
use itertools::{Either, Itertools};
use rustc_hash::FxHashMap;

/// A cell name split as `<head>D<strength><tail>`, taken at the rightmost
/// `D<digits>` so the tail carries no further size marker.
#[derive(Debug, PartialEq, Eq)]
struct SeriesKey<'a> {
    head: &'a str,
    tail: &'a str,
    strength: u32,
}

fn classify(name: &str) -> Option<SeriesKey<'_>> {
    let bytes = name.as_bytes();
    // rightmost 'D' immediately followed by a digit, with a nonempty head
    let mut split = None;
    for p in (1..bytes.len().saturating_sub(1)).rev() {
        if bytes[p] == b'D' && bytes[p + 1].is_ascii_digit() {
            split = Some(p);
            break;
        }
    }
    let p = split?;
    let digits_end = p
        + 1
        + name[p + 1..]
            .bytes()
            .take_while(|b| b.is_ascii_digit())
            .count();
    let strength = name[p + 1..digits_end].parse().ok()?;
    Some(SeriesKey {
        head: &name[..p],
        tail: &name[digits_end..],
        strength,
    })
}

/// Order a raw cell-name list for display. Deterministic and stable for
/// repeated calls on the same input.
pub fn sort_cell_series(cells: &[CellName]) -> Vec<CellName> {
    let (series, rest): (Vec<_>, Vec<_>) = cells.iter().partition_map(|cell| match classify(cell) {
        Some(key) => Either::Left((format!("{}{}", key.head, key.tail), (key.strength, cell))),
        None => Either::Right(cell),
    });

    let mut groups: FxHashMap<String, Vec<(u32, &CellName)>> = FxHashMap::default();
    for (key, member) in series {
        groups.entry(key).or_default().push(member);
    }

    // a series needs at least two strength variants; loners join the rest
    let mut rest = rest;
    let mut real: Vec<(String, Vec<(u32, &CellName)>)> = Vec::new();
    for (key, members) in groups {
        if members.len() < 2 {
            rest.extend(members.into_iter().map(|(_, cell)| cell));
        } else {
            real.push((key, members));
        }
    }

    real.sort_by(|(a, _), (b, _)| a.cmp(b));
    rest.sort_by(|a, b| a.as_str().cmp(b.as_str()));

    let mut sorted = Vec::with_capacity(cells.len());
    for (_, mut members) in real {
        members.sort_by_key(|(strength, _)| *strength);
        sorted.extend(members.into_iter().map(|(_, cell)| cell.clone()));
    }
    sorted.extend(rest.into_iter().cloned());
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<CellName> {
        raw.iter().map(|s| CellName::from(*s)).collect()
    }

    #[test]
    fn classify_takes_rightmost_size_marker() {
        let key = classify("NAND2D1BWP").unwrap();
        assert_eq!((key.head, key.strength, key.tail), ("NAND2", 1, "BWP"));

        let key = classify("INVD16BWP").unwrap();
        assert_eq!((key.head, key.strength, key.tail), ("INV", 16, "BWP"));

        assert_eq!(classify("CLKBUF"), None);
        // 'D' with no digit behind it is not a size marker
        assert_eq!(classify("DEL4"), None);
    }

    #[test]
    fn two_member_series_sorts_by_strength() {
        let sorted = sort_cell_series(&names(&["INVD2BWP", "INVD1BWP", "BUFD4BWP"]));
        assert_eq!(sorted, names(&["INVD1BWP", "INVD2BWP", "BUFD4BWP"]));
    }

    #[test]
    fn single_member_groups_land_in_catch_all() {
        let sorted = sort_cell_series(&names(&["INVD1BWP", "NAND2D1BWP"]));
        // both series have one member each: alphabetical catch-all
        assert_eq!(sorted, names(&["INVD1BWP", "NAND2D1BWP"]));
    }

    #[test]
    fn groups_in_key_order_catch_all_last() {
        let sorted = sort_cell_series(&names(&[
            "XOR2D1BWP",
            "AN2D1BWP",
            "AN2D8BWP",
            "AN2D2BWP",
            "XOR2D4BWP",
            "zz_filler",
        ]));
        assert_eq!(
            sorted,
            names(&[
                "AN2D1BWP", "AN2D2BWP", "AN2D8BWP", "XOR2D1BWP", "XOR2D4BWP", "zz_filler",
            ])
        );
    }

    #[test]
    fn strength_orders_numerically_not_lexically() {
        let sorted = sort_cell_series(&names(&["INVD16BWP", "INVD2BWP", "INVD1BWP"]));
        assert_eq!(sorted, names(&["INVD1BWP", "INVD2BWP", "INVD16BWP"]));
    }

    #[test]
    fn repeated_calls_are_stable() {
        let input = names(&["BUFD4BWP", "INVD2BWP", "AOI21D1", "INVD1BWP"]);
        let once = sort_cell_series(&input);
        let twice = sort_cell_series(&input);
        assert_eq!(once, twice);
    }
}

//! Resolution of sparse, year-indexed tables.

use std::collections::BTreeMap;

/// Returns the entry for the largest year at or before `year`.
///
/// Tables only record years in which something changed, so an entry stays
/// in force until a later one supersedes it. Requests earlier than every
/// tabulated year fall back to the earliest entry. `None` only for an
/// empty table.
pub fn resolve_year<T>(
    table: &BTreeMap<i32, T>,
    year: i32,
) -> Option<(i32, &T)> {
    table
        .range(..=year)
        .next_back()
        .or_else(|| table.iter().next())
        .map(|(y, value)| (*y, value))
}

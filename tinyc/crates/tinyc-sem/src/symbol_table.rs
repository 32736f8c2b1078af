//! The symbol table.
//!
//! TINY has a single flat scope, so the table is one mapping from
//! variable name to record. The record's index doubles as the
//! variable's offset from the global-pointer register in generated
//! code, which is why indices must stay dense and stable: the first
//! insertion of a name assigns the next free index, and every later
//! insertion of the same name only appends a use location.

use std::fmt;

use indexmap::IndexMap;
use tinyc_util::TokenLocation;

/// One variable: its name, dense index, and every (line, column) where
/// it appears.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolRecord {
    pub name: String,
    pub index: i32,
    pub locations: Vec<(u32, u32)>,
}

/// Insertion-ordered mapping from variable name to record.
///
/// # Example
///
/// ```
/// use tinyc_sem::SymbolTable;
/// use tinyc_util::TokenLocation;
///
/// let mut table = SymbolTable::new();
/// table.insert("x", &TokenLocation::new("t.tiny", 1, 1));
/// table.insert("y", &TokenLocation::new("t.tiny", 1, 9));
/// table.insert("x", &TokenLocation::new("t.tiny", 2, 1));
///
/// assert_eq!(table.lookup("x"), 0);
/// assert_eq!(table.lookup("y"), 1);
/// assert_eq!(table.lookup("z"), -1);
/// ```
#[derive(Debug, Default)]
pub struct SymbolTable {
    records: IndexMap<String, SymbolRecord>,
    current_index: i32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a use of `name` at `location`. Returns true when this is
    /// the first time the name was seen (a new index was assigned).
    pub fn insert(&mut self, name: &str, location: &TokenLocation) -> bool {
        let position = (location.line(), location.column());
        match self.records.get_mut(name) {
            Some(record) => {
                record.locations.push(position);
                false
            }
            None => {
                self.records.insert(
                    name.to_string(),
                    SymbolRecord {
                        name: name.to_string(),
                        index: self.current_index,
                        locations: vec![position],
                    },
                );
                self.current_index += 1;
                true
            }
        }
    }

    /// The index of `name`, or -1 if it was never inserted.
    pub fn lookup(&self, name: &str) -> i32 {
        self.records.get(name).map_or(-1, |record| record.index)
    }

    /// Number of distinct variables.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion (= index) order.
    pub fn records(&self) -> impl Iterator<Item = &SymbolRecord> {
        self.records.values()
    }
}

impl fmt::Display for SymbolTable {
    /// Renders the debug dump: one row per variable with its index and
    /// every use location.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Symbol Table:")?;
        writeln!(f, "Variable Name    Index    Locations")?;
        for record in self.records.values() {
            write!(f, "{}\t{}\t", record.name, record.index)?;
            for (line, column) in &record.locations {
                write!(f, "{}:{}  ", line, column)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: u32, column: u32) -> TokenLocation {
        TokenLocation::new("test.tiny", line, column)
    }

    #[test]
    fn test_first_insert_assigns_dense_indices() {
        let mut table = SymbolTable::new();
        assert!(table.insert("a", &loc(1, 1)));
        assert!(table.insert("b", &loc(1, 5)));
        assert!(table.insert("c", &loc(2, 1)));
        assert_eq!(table.lookup("a"), 0);
        assert_eq!(table.lookup("b"), 1);
        assert_eq!(table.lookup("c"), 2);
    }

    #[test]
    fn test_reinsert_keeps_index_and_appends_location() {
        let mut table = SymbolTable::new();
        table.insert("x", &loc(1, 1));
        table.insert("y", &loc(1, 5));
        assert!(!table.insert("x", &loc(3, 2)));

        assert_eq!(table.lookup("x"), 0);
        let record = table.records().next().unwrap();
        assert_eq!(record.locations, vec![(1, 1), (3, 2)]);
    }

    #[test]
    fn test_lookup_missing_is_negative_one() {
        let table = SymbolTable::new();
        assert_eq!(table.lookup("ghost"), -1);
    }

    #[test]
    fn test_indices_cover_zero_to_n() {
        let mut table = SymbolTable::new();
        for name in ["n", "f", "n", "f", "n", "x"] {
            table.insert(name, &loc(1, 1));
        }
        let mut indices: Vec<_> = table.records().map(|r| r.index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_records_iterate_in_index_order() {
        let mut table = SymbolTable::new();
        table.insert("z", &loc(1, 1));
        table.insert("a", &loc(1, 2));
        table.insert("m", &loc(1, 3));
        let names: Vec<_> = table.records().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_display_dump_lists_every_location() {
        let mut table = SymbolTable::new();
        table.insert("x", &loc(1, 1));
        table.insert("x", &loc(2, 7));
        let dump = table.to_string();
        assert!(dump.contains("Symbol Table:"));
        assert!(dump.contains("x\t0\t1:1  2:7"));
    }
}

//! Column identifiers and table descriptors shared by the sort and condition helpers.

use std::fmt::Debug;

/// A logical sort/filter key bound to the storage field it reads from.
///
/// Implemented by small per-resource enums so the generic helpers in this module
/// never branch on the resource they operate on.
pub trait Column: Copy + Eq + Debug + Send + Sync + 'static {
    /// Storage field (column name) this identifier binds to.
    fn field(&self) -> &'static str;
}

/// One physical column: name, DDL type, and the type used to cast bound parameters.
#[derive(Debug)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ddl: &'static str,
    pub cast: &'static str,
}

/// `column` references `target` on `table`.
#[derive(Debug)]
pub struct ForeignKey {
    pub column: &'static str,
    pub table: &'static str,
    pub target: &'static str,
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [ColumnDef],
    /// Column sets that must be unique across rows.
    pub unique: &'static [&'static [&'static str]],
    pub foreign_keys: &'static [ForeignKey],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }
}

//! Store-agnostic statements built by the services and executed by a `Store`.

pub mod column;
pub mod condition;
pub mod sort;

pub use column::{Column, ColumnDef, ForeignKey, Table};
pub use condition::{escape_for_like, true_if_empty, true_if_none, Condition};
pub use sort::SortSpec;

use crate::error::AppError;
use serde_json::Value;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: &'static str,
    pub ascending: bool,
}

impl OrderTerm {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

/// Offset/limit window. Construction rejects a limit outside `1..=MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    offset: u32,
    limit: u32,
}

impl Page {
    pub fn new(offset: u32, limit: u32) -> Result<Self, AppError> {
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        Ok(Self { offset, limit })
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Select {
    pub table: &'static Table,
    pub condition: Condition,
    pub order: Vec<OrderTerm>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl Select {
    /// All rows of `table` in primary key order.
    pub fn all(table: &'static Table) -> Self {
        Self {
            table,
            condition: Condition::True,
            order: vec![OrderTerm::asc(table.primary_key)],
            limit: None,
            offset: 0,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    pub fn order_by(mut self, order: Vec<OrderTerm>) -> Self {
        self.order = order;
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.limit = Some(page.limit());
        self.offset = page.offset();
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// INSERT ... RETURNING all columns. The primary key may be supplied or left to the store.
#[derive(Debug, Clone)]
pub struct Insert {
    pub table: &'static Table,
    pub values: Vec<(&'static str, Value)>,
}

/// UPDATE ... SET values WHERE condition; reports affected row count.
#[derive(Debug, Clone)]
pub struct Update {
    pub table: &'static Table,
    pub values: Vec<(&'static str, Value)>,
    pub condition: Condition,
}

//! Sort string parsing: `"-id,title"` -> `[(Id, desc), (Title, asc)]`.

use super::column::Column;
use super::OrderTerm;

/// Ordered (column, ascending) pairs taken from a request's sort string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec<C: Column> {
    terms: Vec<(C, bool)>,
}

impl<C: Column> SortSpec<C> {
    /// Parse a comma-separated sort string against the accepted tokens.
    ///
    /// A leading `-` marks the segment descending. Blank segments and tokens not
    /// in `accepted` are dropped without error. Input order is kept and repeated
    /// columns are not collapsed.
    pub fn parse(raw: &str, accepted: &[(&str, C)]) -> Self {
        let terms = raw
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| {
                let (token, ascending) = match segment.strip_prefix('-') {
                    Some(rest) => (rest, false),
                    None => (segment, true),
                };
                accepted
                    .iter()
                    .find(|(name, _)| *name == token)
                    .map(|(_, column)| (*column, ascending))
            })
            .collect();
        Self { terms }
    }

    pub fn from_terms(terms: &[(C, bool)]) -> Self {
        Self {
            terms: terms.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[(C, bool)] {
        &self.terms
    }

    /// Substitute `default` when nothing usable was parsed.
    pub fn or_default(self, default: &[(C, bool)]) -> Self {
        if self.terms.is_empty() {
            Self::from_terms(default)
        } else {
            self
        }
    }

    /// Storage-level ORDER BY terms, ending with `primary_key` ascending unless the
    /// key is already part of the order, so pages never overlap on ties.
    pub fn to_order_terms(&self, primary_key: &'static str) -> Vec<OrderTerm> {
        let mut order: Vec<OrderTerm> = self
            .terms
            .iter()
            .map(|(column, ascending)| OrderTerm {
                column: column.field(),
                ascending: *ascending,
            })
            .collect();
        if !order.iter().any(|t| t.column == primary_key) {
            order.push(OrderTerm::asc(primary_key));
        }
        order
    }
}

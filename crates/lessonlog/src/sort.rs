//! Display ordering for strategy rows.
//!
//! Sorting never touches the stored order; it produces a view over it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::StrategyUsage;

/// A sortable counter column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    /// Traditional counter.
    Traditional,
    /// Active counter.
    Active,
    /// Research counter.
    Research,
}

impl SortColumn {
    fn key(self, row: &StrategyUsage) -> u32 {
        match self {
            Self::Traditional => row.traditional,
            Self::Active => row.active,
            Self::Research => row.research,
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Traditional => write!(f, "traditional"),
            Self::Active => write!(f, "active"),
            Self::Research => write!(f, "research"),
        }
    }
}

impl FromStr for SortColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "traditional" => Ok(Self::Traditional),
            "active" => Ok(Self::Active),
            "research" => Ok(Self::Research),
            other => Err(Error::UnknownField(other.to_string())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// Current sort selection of the strategy grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    /// Active column, if any.
    pub column: Option<SortColumn>,
    /// Direction for the active column.
    pub direction: SortDirection,
}

impl SortState {
    /// Unsorted: rows appear in stored order.
    #[must_use]
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// A header click on `column`.
    ///
    /// Clicking the ascending active column flips it to descending; any
    /// other click selects the column ascending.
    #[must_use]
    pub fn request(self, column: SortColumn) -> Self {
        let direction = if self.column == Some(column) && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        Self {
            column: Some(column),
            direction,
        }
    }

    /// Apply a sequence of header clicks starting from unsorted.
    #[must_use]
    pub fn from_clicks(clicks: &[SortColumn]) -> Self {
        clicks
            .iter()
            .fold(Self::unsorted(), |state, &column| state.request(column))
    }

    /// Header marker for `column`: `▲`, `▼` or nothing.
    #[must_use]
    pub fn indicator(&self, column: SortColumn) -> &'static str {
        match (self.column, self.direction) {
            (Some(c), SortDirection::Ascending) if c == column => "▲",
            (Some(c), SortDirection::Descending) if c == column => "▼",
            _ => "",
        }
    }
}

/// Rows in display order for the given sort state.
///
/// The sort is stable, so rows with equal keys keep their stored order.
#[must_use]
pub fn sorted<'a>(rows: &'a [StrategyUsage], state: &SortState) -> Vec<&'a StrategyUsage> {
    let mut view: Vec<&StrategyUsage> = rows.iter().collect();
    if let Some(column) = state.column {
        view.sort_by(|a, b| {
            let ord: Ordering = column.key(a).cmp(&column.key(b));
            match state.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }
    view
}

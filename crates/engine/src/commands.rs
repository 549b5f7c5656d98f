//! Command structs for engine operations.
//!
//! These types group the fields of expense writes and list filters, keeping
//! call sites readable and avoiding long argument lists. Fields arrive
//! unvalidated; the engine checks them before touching the store.

use crate::{Category, ResultEngine, listing::YearMonth};

/// Candidate fields for a new expense.
///
/// There is no owner field: the owner is always the caller.
#[derive(Clone, Debug, Default)]
pub struct NewExpenseCmd {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`; defaults to now.
    pub date: Option<String>,
}

impl NewExpenseCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, category: Category, amount: f64) -> Self {
        Self {
            name: Some(name.into()),
            category: Some(category.as_str().to_string()),
            amount: Some(amount),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// Field-level replacement for an existing expense. `None` leaves the field
/// untouched; a blank description clears it.
#[derive(Clone, Debug, Default)]
pub struct UpdateExpenseCmd {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
}

/// Criteria for [`Engine::filter_expenses`](crate::Engine::filter_expenses).
/// Absent criteria are not constraints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub category: Option<Category>,
    pub month: Option<YearMonth>,
}

impl ExpenseFilter {
    /// Builds a filter from raw query-string values. Empty strings count as
    /// absent.
    pub fn parse(category: Option<&str>, month: Option<&str>) -> ResultEngine<Self> {
        let category = category
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(Category::try_from)
            .transpose()?;
        let month = month
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::parse::<YearMonth>)
            .transpose()?;
        Ok(Self { category, month })
    }
}

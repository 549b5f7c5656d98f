use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use sea_orm::{QuerySelect, prelude::*};

use crate::{Amount, Caller, Category, ResultEngine, expenses};

use super::Engine;

/// Total and count of one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Amount,
    pub count: u64,
}

/// Per-category totals plus grand totals. Categories without expenses are
/// omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Sorted by total, largest first.
    pub categories: Vec<CategoryTotal>,
    pub total_amount: Amount,
    pub expense_count: u64,
}

impl Summary {
    fn from_totals(mut categories: Vec<CategoryTotal>) -> ResultEngine<Self> {
        categories.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        });
        let mut total_amount = Amount::ZERO;
        let mut expense_count = 0;
        for row in &categories {
            total_amount = total_amount.checked_add(row.total)?;
            expense_count += row.count;
        }
        Ok(Self {
            categories,
            total_amount,
            expense_count,
        })
    }
}

/// One `(year, month, category)` bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyStatistic {
    pub year: i32,
    pub month: u32,
    pub category: Category,
    pub total: Amount,
    pub count: u64,
}

impl Engine {
    /// Groups the caller's expenses by category.
    ///
    /// Ordered by total descending, then category label. Totals are summed
    /// with overflow checks; a total outside the cent range is
    /// [`EngineError::Internal`].
    ///
    /// [`EngineError::Internal`]: crate::EngineError::Internal
    pub async fn summary(&self, caller: &Caller) -> ResultEngine<Summary> {
        let rows: Vec<(String, i64)> = Self::owned_expenses(caller)
            .select_only()
            .column(expenses::Column::Category)
            .column(expenses::Column::AmountMinor)
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut buckets: BTreeMap<Category, (Amount, u64)> = BTreeMap::new();
        for (category, amount_minor) in rows {
            let category = Category::try_from(category.as_str())?;
            let bucket = buckets.entry(category).or_insert((Amount::ZERO, 0));
            bucket.0 = bucket.0.checked_add(Amount::new(amount_minor))?;
            bucket.1 += 1;
        }

        let categories = buckets
            .into_iter()
            .map(|(category, (total, count))| CategoryTotal {
                category,
                total,
                count,
            })
            .collect();
        Summary::from_totals(categories)
    }

    /// Groups the caller's expenses by calendar month (in the engine time
    /// zone) and category.
    ///
    /// Ordered newest month first, then by total descending. Months without
    /// expenses produce no rows. Overflowing totals fail like [`Engine::summary`].
    pub async fn statistics(&self, caller: &Caller) -> ResultEngine<Vec<MonthlyStatistic>> {
        let rows: Vec<(DateTime<Utc>, String, i64)> = Self::owned_expenses(caller)
            .select_only()
            .column(expenses::Column::Date)
            .column(expenses::Column::Category)
            .column(expenses::Column::AmountMinor)
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut buckets: BTreeMap<(i32, u32, Category), (Amount, u64)> = BTreeMap::new();
        for (date, category, amount_minor) in rows {
            let local = date.with_timezone(&self.timezone);
            let category = Category::try_from(category.as_str())?;
            let bucket = buckets
                .entry((local.year(), local.month(), category))
                .or_insert((Amount::ZERO, 0));
            bucket.0 = bucket.0.checked_add(Amount::new(amount_minor))?;
            bucket.1 += 1;
        }

        let mut stats: Vec<MonthlyStatistic> = buckets
            .into_iter()
            .map(|((year, month, category), (total, count))| MonthlyStatistic {
                year,
                month,
                category,
                total,
                count,
            })
            .collect();
        stats.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then_with(|| b.month.cmp(&a.month))
                .then_with(|| b.total.cmp(&a.total))
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        });
        Ok(stats)
    }
}

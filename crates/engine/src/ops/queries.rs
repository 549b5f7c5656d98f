use sea_orm::{
    Condition, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
    sea_query::{Expr, LikeExpr, SimpleExpr},
};

use crate::{
    Caller, EngineError, Expense, ExpenseFilter, ResultEngine, SortKey, expenses,
    listing::{LIST_LIMIT, SEARCH_LIMIT, like_contains_pattern},
};

use super::{Engine, expenses::into_expenses};

/// Literal substring match on a case-folded column.
fn folded_contains(column: expenses::Column, pattern: &str) -> SimpleExpr {
    Expr::col(column).like(LikeExpr::new(pattern).escape('\\'))
}

impl Engine {
    /// Expenses whose name or description contains `keyword`, ignoring case.
    ///
    /// The keyword is matched literally. A blank keyword is
    /// [`EngineError::InvalidRequest`]; no match is an empty list.
    pub async fn search_expenses(
        &self,
        caller: &Caller,
        keyword: Option<&str>,
    ) -> ResultEngine<Vec<Expense>> {
        let keyword = keyword
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| EngineError::InvalidRequest("Keyword required".to_string()))?;
        let pattern = like_contains_pattern(keyword);

        let models = Self::owned_expenses(caller)
            .filter(
                Condition::any()
                    .add(folded_contains(expenses::Column::NameFolded, &pattern))
                    .add(folded_contains(expenses::Column::DescriptionFolded, &pattern)),
            )
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::Id)
            .limit(SEARCH_LIMIT)
            .all(&self.database)
            .await?;
        into_expenses(models)
    }

    /// Expenses matching every criterion present in `filter`, newest first.
    pub async fn filter_expenses(
        &self,
        caller: &Caller,
        filter: &ExpenseFilter,
    ) -> ResultEngine<Vec<Expense>> {
        let mut query = Self::owned_expenses(caller);
        if let Some(category) = filter.category {
            query = query.filter(expenses::Column::Category.eq(category.as_str()));
        }
        if let Some(month) = filter.month {
            let (start, end) = month.range(self.timezone)?;
            query = query
                .filter(expenses::Column::Date.gte(start))
                .filter(expenses::Column::Date.lt(end));
        }

        let models = query
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::Id)
            .limit(LIST_LIMIT)
            .all(&self.database)
            .await?;
        into_expenses(models)
    }

    /// All of the caller's expenses in the requested order, capped.
    pub async fn sort_expenses(&self, caller: &Caller, key: SortKey) -> ResultEngine<Vec<Expense>> {
        let query = Self::owned_expenses(caller);
        let query = match key {
            SortKey::Amount => query
                .order_by_desc(expenses::Column::AmountMinor)
                .order_by_desc(expenses::Column::Date),
            SortKey::Date => query.order_by_desc(expenses::Column::Date),
            SortKey::Name => query
                .order_by_asc(expenses::Column::Name)
                .order_by_desc(expenses::Column::Date),
            SortKey::Category => query
                .order_by_asc(expenses::Column::Category)
                .order_by_desc(expenses::Column::Date),
        };

        let models = query
            .order_by_desc(expenses::Column::Id)
            .limit(LIST_LIMIT)
            .all(&self.database)
            .await?;
        into_expenses(models)
    }
}

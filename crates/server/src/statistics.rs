//! Statistics API edpoints

use api_types::stats::{CategorySummary, MonthlyStatistic, Summary};
use axum::{Extension, Json, extract::State};
use engine::Caller;

use crate::{ServerError, server::ServerState};

/// Per-category totals of the caller's expenses
pub async fn summary(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<Summary>, ServerError> {
    let summary = state.engine.summary(&caller).await?;

    Ok(Json(Summary {
        categories: summary
            .categories
            .into_iter()
            .map(|row| CategorySummary {
                category: row.category.to_string(),
                total: row.total.as_decimal(),
                count: row.count,
            })
            .collect(),
        total_amount: summary.total_amount.as_decimal(),
        expense_count: summary.expense_count,
    }))
}

/// Monthly totals per category
pub async fn statistics(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<MonthlyStatistic>>, ServerError> {
    let stats = state.engine.statistics(&caller).await?;

    Ok(Json(
        stats
            .into_iter()
            .map(|row| MonthlyStatistic {
                year: row.year,
                month: row.month,
                category: row.category.to_string(),
                total: row.total.as_decimal(),
                count: row.count,
            })
            .collect(),
    ))
}

//! Search, filter and sort endpoints

use api_types::expense::{ExpenseView, FilterQuery, SearchQuery, SortQuery};
use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use engine::{Caller, ExpenseFilter, SortKey};

use crate::{ServerError, expenses::expense_views, server::ServerState};

pub async fn search(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let Query(query) = query?;
    let expenses = state
        .engine
        .search_expenses(&caller, query.keyword.as_deref())
        .await?;
    Ok(expense_views(expenses))
}

pub async fn filter(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let Query(query) = query?;
    let filter = ExpenseFilter::parse(query.category.as_deref(), query.month.as_deref())?;
    let expenses = state.engine.filter_expenses(&caller, &filter).await?;
    Ok(expense_views(expenses))
}

pub async fn sort(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    query: Result<Query<SortQuery>, QueryRejection>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let Query(query) = query?;
    let key = SortKey::parse_or_default(query.by.as_deref());
    let expenses = state.engine.sort_expenses(&caller, key).await?;
    Ok(expense_views(expenses))
}

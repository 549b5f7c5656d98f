//! Expense CRUD endpoints

use api_types::expense::{ExpenseDeleted, ExpenseNew, ExpenseUpdate, ExpenseView, ExpensesDeleted};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{Caller, Expense, NewExpenseCmd, UpdateExpenseCmd};

use crate::{ServerError, server::ServerState};

pub(crate) fn expense_view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        user_id: expense.user_id,
        name: expense.name,
        description: expense.description,
        category: expense.category.to_string(),
        amount: expense.amount.as_decimal(),
        date: expense.date,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

pub(crate) fn expense_views(expenses: Vec<Expense>) -> Json<Vec<ExpenseView>> {
    Json(expenses.into_iter().map(expense_view).collect())
}

/// The newest expenses of the caller.
pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_expenses(&caller).await?;
    Ok(expense_views(expenses))
}

pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseNew>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let Json(payload) = payload?;
    let cmd = NewExpenseCmd {
        name: payload.name,
        description: payload.description,
        category: payload.category,
        amount: payload.amount,
        date: payload.date,
    };
    let expense = state.engine.create_expense(&caller, cmd).await?;

    Ok((StatusCode::CREATED, Json(expense_view(expense))))
}

pub async fn get(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(&caller, &id).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn update(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<ExpenseUpdate>, JsonRejection>,
) -> Result<Json<ExpenseView>, ServerError> {
    let Json(payload) = payload?;
    let cmd = UpdateExpenseCmd {
        name: payload.name,
        description: payload.description,
        category: payload.category,
        amount: payload.amount,
        date: payload.date,
    };
    let expense = state.engine.update_expense(&caller, &id, cmd).await?;
    Ok(Json(expense_view(expense)))
}

pub async fn delete(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseDeleted>, ServerError> {
    state.engine.delete_expense(&caller, &id).await?;
    Ok(Json(ExpenseDeleted {
        message: "Expense deleted".to_string(),
    }))
}

pub async fn delete_all(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<ExpensesDeleted>, ServerError> {
    let deleted_count = state.engine.delete_all_expenses(&caller).await?;
    tracing::info!("user {} deleted {deleted_count} expenses", caller.id());

    Ok(Json(ExpensesDeleted {
        message: "All expenses deleted".to_string(),
        deleted_count,
    }))
}

/// Every expense of `user_id`, which must be the caller.
pub async fn list_for_user(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ExpenseView>>, ServerError> {
    let expenses = state.engine.list_user_expenses(&caller, &user_id).await?;
    Ok(expense_views(expenses))
}

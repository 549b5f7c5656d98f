use chrono::Utc;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Amount, Caller, Category, EngineError, Expense, NewExpenseCmd, ResultEngine, UpdateExpenseCmd,
    expenses,
    listing::LIST_LIMIT,
    util::{
        fold_case, normalize_optional_text, normalize_required_text, parse_expense_date,
        parse_expense_id, parse_uuid,
    },
};

use super::{Engine, with_tx};

fn not_found() -> EngineError {
    EngineError::KeyNotFound("Expense not found".to_string())
}

fn required_category(value: Option<&str>) -> ResultEngine<Category> {
    value
        .map(Category::try_from)
        .unwrap_or_else(|| Err(EngineError::InvalidRequest("category is required".to_string())))
}

fn required_amount(value: Option<f64>) -> ResultEngine<Amount> {
    value
        .map(Amount::from_decimal)
        .unwrap_or_else(|| Err(EngineError::InvalidRequest("amount is required".to_string())))
}

pub(super) fn into_expenses(models: Vec<expenses::Model>) -> ResultEngine<Vec<Expense>> {
    models.into_iter().map(Expense::try_from).collect()
}

impl Engine {
    /// Rows owned by `caller`. Every expense query starts here.
    pub(super) fn owned_expenses(caller: &Caller) -> Select<expenses::Entity> {
        expenses::Entity::find().filter(expenses::Column::UserId.eq(caller.owner_key()))
    }

    /// Validates and stores a new expense owned by `caller`.
    pub async fn create_expense(&self, caller: &Caller, cmd: NewExpenseCmd) -> ResultEngine<Expense> {
        let name = normalize_required_text(cmd.name.as_deref(), "name")?;
        let category = required_category(cmd.category.as_deref())?;
        let amount = required_amount(cmd.amount)?;
        let now = Utc::now();
        let date = match cmd.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => parse_expense_date(raw, self.timezone)?,
            None => now,
        };

        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: caller.id(),
            name,
            description: normalize_optional_text(cmd.description.as_deref()),
            category,
            amount,
            date,
            created_at: now,
            updated_at: now,
        };
        expenses::ActiveModel::from(&expense)
            .insert(&self.database)
            .await?;

        Ok(expense)
    }

    /// Fetches one expense. Absent and foreign records are both
    /// [`EngineError::KeyNotFound`].
    pub async fn expense(&self, caller: &Caller, id: &str) -> ResultEngine<Expense> {
        let id = parse_expense_id(id)?;
        let model = Self::owned_expenses(caller)
            .filter(expenses::Column::Id.eq(id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(not_found)?;
        Expense::try_from(model)
    }

    /// Applies the provided fields to an owned expense and returns the result.
    pub async fn update_expense(
        &self,
        caller: &Caller,
        id: &str,
        cmd: UpdateExpenseCmd,
    ) -> ResultEngine<Expense> {
        let id = parse_expense_id(id)?;

        let mut changes = expenses::ActiveModel {
            id: ActiveValue::Unchanged(id.to_string()),
            ..Default::default()
        };
        if let Some(name) = cmd.name.as_deref() {
            let name = normalize_required_text(Some(name), "name")?;
            changes.name_folded = ActiveValue::Set(fold_case(&name));
            changes.name = ActiveValue::Set(name);
        }
        if let Some(description) = cmd.description.as_deref() {
            let description = normalize_optional_text(Some(description));
            changes.description_folded = ActiveValue::Set(description.as_deref().map(fold_case));
            changes.description = ActiveValue::Set(description);
        }
        if let Some(category) = cmd.category.as_deref() {
            changes.category = ActiveValue::Set(Category::try_from(category)?.as_str().to_string());
        }
        if let Some(amount) = cmd.amount {
            changes.amount_minor = ActiveValue::Set(Amount::from_decimal(amount)?.cents());
        }
        if let Some(date) = cmd.date.as_deref() {
            changes.date = ActiveValue::Set(parse_expense_date(date, self.timezone)?);
        }
        changes.updated_at = ActiveValue::Set(Utc::now());

        let model = with_tx!(self, |db_tx| {
            let owned = Self::owned_expenses(caller)
                .filter(expenses::Column::Id.eq(id.to_string()))
                .one(&db_tx)
                .await?;
            match owned {
                Some(_) => changes.update(&db_tx).await.map_err(EngineError::from),
                None => Err(not_found()),
            }
        })?;

        Expense::try_from(model)
    }

    /// Deletes one owned expense.
    pub async fn delete_expense(&self, caller: &Caller, id: &str) -> ResultEngine<()> {
        let id = parse_expense_id(id)?;
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::UserId.eq(caller.owner_key()))
            .filter(expenses::Column::Id.eq(id.to_string()))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found());
        }
        Ok(())
    }

    /// Deletes every expense owned by `caller` in one statement and returns
    /// how many were removed.
    pub async fn delete_all_expenses(&self, caller: &Caller) -> ResultEngine<u64> {
        let result = expenses::Entity::delete_many()
            .filter(expenses::Column::UserId.eq(caller.owner_key()))
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected)
    }

    /// Default view: the newest expenses, capped.
    pub async fn list_expenses(&self, caller: &Caller) -> ResultEngine<Vec<Expense>> {
        let models = Self::owned_expenses(caller)
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::Id)
            .limit(LIST_LIMIT)
            .all(&self.database)
            .await?;
        into_expenses(models)
    }

    /// Every expense of `user_id`, newest first and uncapped.
    ///
    /// `user_id` must be the caller's own id; anything else is
    /// [`EngineError::Forbidden`].
    pub async fn list_user_expenses(
        &self,
        caller: &Caller,
        user_id: &str,
    ) -> ResultEngine<Vec<Expense>> {
        let user_id = parse_uuid(user_id.trim(), "user")?;
        if user_id != caller.id() {
            return Err(EngineError::Forbidden("Access denied".to_string()));
        }
        let models = Self::owned_expenses(caller)
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?;
        into_expenses(models)
    }
}

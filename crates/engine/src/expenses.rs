//! Expense records.
//!
//! An `Expense` always belongs to exactly one user; the owner is stamped by
//! the engine at creation and never changes afterwards.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{
    Amount, Category, EngineError, ResultEngine,
    util::{fold_case, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub amount: Amount,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    /// `name` case-folded for search.
    pub name_folded: String,
    pub description: Option<String>,
    pub description_folded: Option<String>,
    pub category: String,
    pub amount_minor: i64,
    pub date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            name: model.name,
            description: model.description,
            category: Category::try_from(model.category.as_str())?,
            amount: Amount::new(model.amount_minor),
            date: model.date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        use sea_orm::ActiveValue;

        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            user_id: ActiveValue::Set(expense.user_id.to_string()),
            name: ActiveValue::Set(expense.name.clone()),
            name_folded: ActiveValue::Set(fold_case(&expense.name)),
            description: ActiveValue::Set(expense.description.clone()),
            description_folded: ActiveValue::Set(expense.description.as_deref().map(fold_case)),
            category: ActiveValue::Set(expense.category.as_str().to_string()),
            amount_minor: ActiveValue::Set(expense.amount.cents()),
            date: ActiveValue::Set(expense.date),
            created_at: ActiveValue::Set(expense.created_at),
            updated_at: ActiveValue::Set(expense.updated_at),
        }
    }
}

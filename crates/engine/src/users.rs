//! Users table and the caller identity handed to every expense operation.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Public view of a registered user. The password hash never leaves the
/// engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Model> for User {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            email: model.email,
            name: model.name,
            created_at: model.created_at,
        })
    }
}

/// Authenticated identity on whose behalf an operation runs.
///
/// Only the engine can mint a `Caller` (signup, login, or
/// [`Engine::caller`](crate::Engine::caller)), and every expense operation
/// takes one as its first argument, so a query can never be built without an
/// owner filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    user: User,
}

impl Caller {
    pub(crate) fn new(user: User) -> Self {
        Self { user }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Owner column value used to scope every expense query.
    pub(crate) fn owner_key(&self) -> String {
        self.user.id.to_string()
    }
}

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, SqlErr, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Caller, EngineError, ResultEngine, User, credentials, users,
    util::{normalize_email, normalize_required_text},
};

use super::{Engine, with_tx};

fn user_exists() -> EngineError {
    EngineError::ExistingKey("User already exists".to_string())
}

/// Inserts a user row. A unique index hit (an email registered concurrently)
/// is [`EngineError::ExistingKey`] like the explicit check.
async fn insert_user<C: ConnectionTrait>(
    db: &C,
    model: users::ActiveModel,
) -> ResultEngine<users::Model> {
    model.insert(db).await.map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => user_exists(),
        _ => EngineError::from(err),
    })
}

impl Engine {
    /// Registers a new user and returns it as an authenticated caller.
    ///
    /// Emails are compared after trimming and lower-casing; a duplicate is
    /// [`EngineError::ExistingKey`].
    pub async fn signup(
        &self,
        email: Option<&str>,
        password: Option<&str>,
        name: Option<&str>,
    ) -> ResultEngine<Caller> {
        let email = normalize_email(email)?;
        let password = password
            .filter(|value| !value.is_empty())
            .ok_or_else(|| EngineError::InvalidRequest("password is required".to_string()))?;
        let name = normalize_required_text(name, "name")?;
        let password_hash =
            credentials::hash_password(password.to_string(), self.password_params.clone()).await?;

        let model = with_tx!(self, |db_tx| {
            let existing = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                Err(user_exists())
            } else {
                let model = users::ActiveModel {
                    id: ActiveValue::Set(Uuid::new_v4().to_string()),
                    email: ActiveValue::Set(email),
                    password_hash: ActiveValue::Set(password_hash),
                    name: ActiveValue::Set(name),
                    created_at: ActiveValue::Set(Utc::now()),
                };
                insert_user(&db_tx, model).await
            }
        })?;

        Ok(Caller::new(User::try_from(model)?))
    }

    /// Checks an email/password pair.
    ///
    /// Unknown email and wrong password both yield
    /// [`EngineError::InvalidCredentials`], after the same hashing work.
    pub async fn login(&self, email: Option<&str>, password: Option<&str>) -> ResultEngine<Caller> {
        let (Some(email), Some(password)) = (email, password) else {
            return Err(EngineError::InvalidCredentials);
        };
        let email = email.trim().to_lowercase();

        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?;
        let Some(model) = model else {
            credentials::verify_password(password.to_string(), self.dummy_hash.clone()).await?;
            return Err(EngineError::InvalidCredentials);
        };

        if !credentials::verify_password(password.to_string(), model.password_hash.clone()).await? {
            return Err(EngineError::InvalidCredentials);
        }

        Ok(Caller::new(User::try_from(model)?))
    }

    /// Resolves a user id carried by a verified token into a caller.
    ///
    /// A user that no longer exists is [`EngineError::KeyNotFound`].
    pub async fn caller(&self, user_id: Uuid) -> ResultEngine<Caller> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not found".to_string()))?;
        Ok(Caller::new(User::try_from(model)?))
    }
}

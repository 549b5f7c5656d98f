use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        pub timestamp: DateTime<Utc>,
    }
}

pub mod user {
    use super::*;

    /// Request body for `POST /api/auth/signup`.
    ///
    /// Every field is optional at the JSON level so that a missing field is
    /// reported as a validation error instead of a decoding failure.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Signup {
        pub email: Option<String>,
        pub password: Option<String>,
        pub name: Option<String>,
    }

    /// Request body for `POST /api/auth/login`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct Login {
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        /// Bearer token for the `Authorization` header.
        pub token: String,
        pub user: UserView,
    }
}

pub mod expense {
    use super::*;

    /// Request body for `POST /api/expenses`.
    ///
    /// Unknown fields (an owner id in particular) are ignored.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub name: Option<String>,
        pub description: Option<String>,
        pub category: Option<String>,
        /// Decimal amount, e.g. `12.5`.
        pub amount: Option<f64>,
        /// RFC3339 timestamp or `YYYY-MM-DD`.
        pub date: Option<String>,
    }

    /// Request body for `PUT /api/expenses/{id}`. Absent fields are kept.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub category: Option<String>,
        pub amount: Option<f64>,
        pub date: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        pub category: String,
        pub amount: f64,
        pub date: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SearchQuery {
        pub keyword: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct FilterQuery {
        pub category: Option<String>,
        /// `YYYY-MM`.
        pub month: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SortQuery {
        /// One of `amount`, `date`, `name`, `category`. Anything else sorts
        /// by date.
        pub by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseDeleted {
        pub message: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpensesDeleted {
        pub message: String,
        pub deleted_count: u64,
    }
}

pub mod stats {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategorySummary {
        pub category: String,
        pub total: f64,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Summary {
        pub categories: Vec<CategorySummary>,
        pub total_amount: f64,
        pub expense_count: u64,
    }

    /// One `(year, month, category)` bucket.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthlyStatistic {
        pub year: i32,
        pub month: u32,
        pub category: String,
        pub total: f64,
        pub count: u64,
    }
}

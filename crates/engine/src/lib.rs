//! Expense tracking engine.
//!
//! Owns the credential and expense stores and every query over them. All
//! expense operations take a [`Caller`] first, so results are always scoped
//! to the authenticated user.

pub use amount::Amount;
pub use category::Category;
pub use commands::{ExpenseFilter, NewExpenseCmd, UpdateExpenseCmd};
pub use error::EngineError;
pub use expenses::Expense;
pub use listing::{LIST_LIMIT, SEARCH_LIMIT, SortKey, YearMonth};
pub use ops::{CategoryTotal, Engine, EngineBuilder, MonthlyStatistic, Summary};
pub use users::{Caller, User};

mod amount;
mod category;
mod commands;
mod credentials;
mod error;
mod expenses;
mod listing;
mod ops;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

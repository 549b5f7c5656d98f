use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Closed set of expense classifications.
///
/// The same type is used when writing an expense and when filtering, so an
/// unknown label is rejected identically everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Bills,
    Salary,
    Investment,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Bills,
        Category::Salary,
        Category::Investment,
        Category::Other,
    ];

    /// Canonical label, as stored in the database and sent over the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Bills => "Bills",
            Category::Salary => "Salary",
            Category::Investment => "Investment",
            Category::Other => "Other",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| {
                EngineError::InvalidRequest(format!(
                    "`{value}` is not a valid category; expected one of: {}",
                    Category::ALL.map(Category::as_str).join(", ")
                ))
            })
    }
}

impl FromStr for Category {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::try_from(s)
    }
}

use std::fmt;
use std::str::FromStr;

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};

use crate::errors::ReviewError;

/// What kind of external fact a review item re-tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// A wrong answer recorded by quiz grading
    WrongNote,
    /// A generated flashcard
    Flashcard,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::WrongNote => "wrong_note",
            SourceType::Flashcard => "flashcard",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "wrong_note" => Ok(SourceType::WrongNote),
            "flashcard" => Ok(SourceType::Flashcard),
            other => Err(ReviewError::InvalidSourceType(other.to_string())),
        }
    }
}

impl FromSql<Text, Sqlite> for SourceType {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse::<SourceType>()?)
    }
}

impl ToSql<Text, Sqlite> for SourceType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

/// Whether a review item takes part in queues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Active,
    /// Hidden from every queue, history kept
    Suspended,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(ItemStatus::Active),
            "suspended" => Ok(ItemStatus::Suspended),
            other => Err(ReviewError::InvalidStatus(other.to_string())),
        }
    }
}

impl FromSql<Text, Sqlite> for ItemStatus {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse::<ItemStatus>()?)
    }
}

impl ToSql<Text, Sqlite> for ItemStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

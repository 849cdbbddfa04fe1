use std::fmt;

use chrono::NaiveDate;

/// Sentinel used when a statement row carries no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Statement convention: any positive cleaned amount is money spent,
    /// zero (blank or unparseable) counts as income.
    pub fn from_amount(amount: f64) -> Self {
        if amount > 0.0 {
            Self::Expense
        } else {
            Self::Income
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.write_str("Income"),
            Self::Expense => f.write_str("Expense"),
        }
    }
}

/// One cleaned statement row, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTransaction {
    pub kind: TransactionType,
    pub amount: f64,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub category_name: String,
}

impl NormalizedTransaction {
    /// ISO `YYYY-MM-DD`, or `None` when the source date was unparseable.
    pub fn iso_date(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CategoryId(pub i64);

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub i64);

#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub category_type: String,
}

/// A stored transaction joined with its category name.
#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub id: i64,
    pub kind: TransactionType,
    pub amount: f64,
    pub description: String,
    pub date: Option<String>,
    pub category: Option<String>,
    pub owner: Option<String>,
}

//! Bank-statement data models.
//!
//! These types are the authoritative contract for a well-formed extraction
//! result. Instances are treated as immutable once constructed: the
//! pipeline either accepts a fully validated statement or rejects the
//! response, it never patches one up after the fact.

use serde::{Deserialize, Serialize};

/// The account owner as printed on the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountHolder {
    /// Full name as shown on the statement.
    pub name: String,

    /// Complete account number; may include formatting characters.
    pub account_number: String,
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Inbound funds (deposits).
    Credit,
    /// Outbound funds (withdrawals).
    Debit,
}

impl TransactionType {
    /// Parse a transaction type, accepting any casing.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CREDIT" => Some(Self::Credit),
            "DEBIT" => Some(Self::Debit),
            _ => None,
        }
    }

    /// Canonical uppercase spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
        }
    }
}

/// Currency codes the pipeline recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Inr,
    Usd,
}

impl Currency {
    /// Parse a currency code, accepting any casing.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INR" => Some(Self::Inr),
            "USD" => Some(Self::Usd),
            _ => None,
        }
    }

    /// Canonical uppercase code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inr => "INR",
            Self::Usd => "USD",
        }
    }
}

/// A single statement line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date, normalized to `DD-MM-YYYY`.
    pub date: String,

    /// Magnitude of the transaction. Always non-negative; direction is
    /// carried by `transaction_type`.
    pub amount: f64,

    /// Currency of the amount.
    pub currency: Currency,

    /// Direction of the transaction.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Cleaned description: merchant, counterparty, or purpose, with
    /// reference numbers stripped.
    pub description: String,

    /// Running account balance immediately after this transaction.
    pub balance: f64,
}

impl Transaction {
    /// Amount with its direction applied: positive for credits, negative
    /// for debits.
    pub fn signed_amount(&self) -> f64 {
        match self.transaction_type {
            TransactionType::Credit => self.amount,
            TransactionType::Debit => -self.amount,
        }
    }
}

/// One account holder plus their ordered transaction history.
///
/// The transaction sequence preserves source-document order; nothing in the
/// pipeline reorders it. An empty sequence is a valid, degenerate statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankStatement {
    /// Holder of the account the statement belongs to.
    pub account_holder: AccountHolder,

    /// Transactions in the order they appeared in the document.
    pub transactions: Vec<Transaction>,
}

impl BankStatement {
    /// Whether the statement contains no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Net balance movement over the statement: credits minus debits.
    pub fn net_change(&self) -> f64 {
        self.transactions.iter().map(Transaction::signed_amount).sum()
    }

    /// Number of credit transactions.
    pub fn credit_count(&self) -> usize {
        self.transactions
            .iter()
            .filter(|t| t.transaction_type == TransactionType::Credit)
            .count()
    }

    /// Number of debit transactions.
    pub fn debit_count(&self) -> usize {
        self.transactions.len() - self.credit_count()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn salary_credit() -> Transaction {
        Transaction {
            date: "01-05-2024".to_string(),
            amount: 500.0,
            currency: Currency::Inr,
            transaction_type: TransactionType::Credit,
            description: "Salary".to_string(),
            balance: 1500.0,
        }
    }

    #[test]
    fn transaction_serializes_with_wire_spellings() {
        let value = serde_json::to_value(salary_credit()).unwrap();
        assert_eq!(
            value,
            json!({
                "date": "01-05-2024",
                "amount": 500.0,
                "currency": "INR",
                "type": "CREDIT",
                "description": "Salary",
                "balance": 1500.0,
            })
        );
    }

    #[test]
    fn statement_round_trips_through_json() {
        let statement = BankStatement {
            account_holder: AccountHolder {
                name: "Jane Doe".to_string(),
                account_number: "1234567890".to_string(),
            },
            transactions: vec![salary_credit()],
        };

        let value = serde_json::to_value(&statement).unwrap();
        let back: BankStatement = serde_json::from_value(value).unwrap();
        assert_eq!(back, statement);
        assert_eq!(back.transactions.len(), 1);
        assert_eq!(back.transactions[0].balance, 1500.0);
    }

    #[test]
    fn enum_parsing_accepts_any_casing() {
        assert_eq!(TransactionType::from_str("credit"), Some(TransactionType::Credit));
        assert_eq!(TransactionType::from_str(" DEBIT "), Some(TransactionType::Debit));
        assert_eq!(TransactionType::from_str("transfer"), None);
        assert_eq!(Currency::from_str("inr"), Some(Currency::Inr));
        assert_eq!(Currency::from_str("EUR"), None);
    }

    #[test]
    fn signed_amount_follows_direction() {
        let credit = salary_credit();
        let mut debit = salary_credit();
        debit.transaction_type = TransactionType::Debit;
        debit.amount = 200.0;

        assert_eq!(credit.signed_amount(), 500.0);
        assert_eq!(debit.signed_amount(), -200.0);

        let statement = BankStatement {
            account_holder: AccountHolder {
                name: "Jane Doe".to_string(),
                account_number: "1234567890".to_string(),
            },
            transactions: vec![credit, debit],
        };
        assert_eq!(statement.net_change(), 300.0);
        assert_eq!(statement.credit_count(), 1);
        assert_eq!(statement.debit_count(), 1);
        assert!(!statement.is_empty());
    }
}

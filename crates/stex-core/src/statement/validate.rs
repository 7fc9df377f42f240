//! Model-response validation against the statement schema.
//!
//! Validation is strict where the contract matters (required fields, enum
//! membership, non-negative amounts) and tolerant where model output
//! drifts harmlessly: numeric strings are coerced, enum casing is
//! normalized, and both the documented envelope and a bare statement
//! object are accepted. Errors carry a dotted path to the offending field
//! so a bad response can be diagnosed without rereading the whole payload.

use serde_json::{Map, Value};
use tracing::warn;

use super::Result;
use crate::error::ValidationError;
use crate::models::statement::{
    AccountHolder, BankStatement, Currency, Transaction, TransactionType,
};

/// Parse and validate raw model content into a [`BankStatement`].
///
/// A statement with zero transactions validates successfully; only parse
/// failures and schema violations are errors.
pub fn validate_content(content: &str) -> Result<BankStatement> {
    let json_slice = first_json_object(content).unwrap_or(content);
    let root: Value =
        serde_json::from_str(json_slice).map_err(|e| ValidationError::Parse(e.to_string()))?;

    validate_statement(unwrap_envelope(&root)?)
}

/// Locate the first balanced JSON object in `content`.
///
/// Model output sometimes wraps the JSON in markdown fences or prose;
/// everything outside the outermost braces is discarded.
fn first_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in content.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Accept both the documented envelope (`{"transactions": {...}}`) and a
/// bare statement object; constrained model output drifts between the two.
fn unwrap_envelope(root: &Value) -> Result<&Map<String, Value>> {
    let object = root
        .as_object()
        .ok_or_else(|| ValidationError::invalid("$", "expected a JSON object"))?;

    match object.get("transactions") {
        Some(Value::Object(inner)) => Ok(inner),
        _ => Ok(object),
    }
}

fn validate_statement(statement: &Map<String, Value>) -> Result<BankStatement> {
    let holder = statement
        .get("account_holder")
        .ok_or_else(|| ValidationError::MissingField("account_holder".to_string()))?;
    let account_holder = validate_account_holder(holder)?;

    let items = statement
        .get("transactions")
        .ok_or_else(|| ValidationError::MissingField("transactions".to_string()))?
        .as_array()
        .ok_or_else(|| ValidationError::invalid("transactions", "expected an array"))?;

    let mut transactions = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        transactions.push(validate_transaction(item, index)?);
    }

    Ok(BankStatement {
        account_holder,
        transactions,
    })
}

fn validate_account_holder(value: &Value) -> Result<AccountHolder> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::invalid("account_holder", "expected an object"))?;

    Ok(AccountHolder {
        name: string_field(object, "name", "account_holder.name")?,
        account_number: stringish_field(
            object,
            "account_number",
            "account_holder.account_number",
        )?,
    })
}

fn validate_transaction(value: &Value, index: usize) -> Result<Transaction> {
    let path = |field: &str| format!("transactions[{index}].{field}");

    let object = value.as_object().ok_or_else(|| {
        ValidationError::invalid(format!("transactions[{index}]"), "expected an object")
    })?;

    let date = string_field(object, "date", &path("date"))?;
    if chrono::NaiveDate::parse_from_str(&date, "%d-%m-%Y").is_err() {
        // Date drift is logged but kept verbatim; it does not fail validation.
        warn!("{} is not in DD-MM-YYYY format: {:?}", path("date"), date);
    }

    let amount = numeric_field(object, "amount", &path("amount"))?;
    if amount < 0.0 {
        return Err(ValidationError::invalid(
            path("amount"),
            "amount must be non-negative; direction belongs in type",
        ));
    }

    let currency_raw = string_field(object, "currency", &path("currency"))?;
    let currency = Currency::from_str(&currency_raw).ok_or_else(|| {
        ValidationError::invalid(
            path("currency"),
            format!("unrecognized currency {currency_raw:?}"),
        )
    })?;

    let type_raw = string_field(object, "type", &path("type"))?;
    let transaction_type = TransactionType::from_str(&type_raw).ok_or_else(|| {
        ValidationError::invalid(
            path("type"),
            format!("expected CREDIT or DEBIT, got {type_raw:?}"),
        )
    })?;

    let description = string_field(object, "description", &path("description"))?;
    let balance = numeric_field(object, "balance", &path("balance"))?;

    Ok(Transaction {
        date,
        amount,
        currency,
        transaction_type,
        description,
        balance,
    })
}

fn require<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value> {
    match object.get(key) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(path.to_string())),
        Some(value) => Ok(value),
    }
}

/// A field that must be textual.
fn string_field(object: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    match require(object, key, path)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(ValidationError::invalid(
            path,
            format!("expected a string, got {}", type_name(other)),
        )),
    }
}

/// A textual field that tolerates numeric values; account numbers often
/// arrive as bare digits.
fn stringish_field(object: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    match require(object, key, path)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ValidationError::invalid(
            path,
            format!("expected a string, got {}", type_name(other)),
        )),
    }
}

/// A numeric field that tolerates numeric strings like `"250.00"`.
fn numeric_field(object: &Map<String, Value>, key: &str, path: &str) -> Result<f64> {
    let value = require(object, key, path)?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ValidationError::invalid(
            path,
            format!("expected a number, got {}", compact(value)),
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Short rendering of an offending value for error messages.
fn compact(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() > 40 {
        let head: String = rendered.chars().take(37).collect();
        format!("{head}...")
    } else {
        rendered
    }
}

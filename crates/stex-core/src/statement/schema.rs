//! The response-schema descriptor attached to every chat request.

use serde_json::{Value, json};

/// JSON schema for the content the model must return.
///
/// Describes the full envelope: an object with a `transactions` key
/// holding the account holder and the transaction list. The same
/// descriptor shape is what the validator enforces, so request constraint
/// and response check cannot drift apart.
pub fn response_format() -> Value {
    json!({
        "type": "object",
        "properties": {
            "transactions": {
                "type": "object",
                "properties": {
                    "account_holder": account_holder_schema(),
                    "transactions": {
                        "type": "array",
                        "items": transaction_schema(),
                    },
                },
                "required": ["account_holder", "transactions"],
            },
        },
        "required": ["transactions"],
    })
}

fn account_holder_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "account_number": { "type": "string" },
        },
        "required": ["name", "account_number"],
    })
}

fn transaction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "date": { "type": "string", "description": "DD-MM-YYYY" },
            "amount": { "type": "number" },
            "currency": { "type": "string", "enum": ["INR", "USD"] },
            "type": { "type": "string", "enum": ["CREDIT", "DEBIT"] },
            "description": { "type": "string" },
            "balance": { "type": "number" },
        },
        "required": ["date", "amount", "currency", "type", "description", "balance"],
    })
}

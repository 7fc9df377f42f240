//! Prompt construction for statement extraction.
//!
//! The instruction text is fixed, so the payload for a given document text
//! is byte-identical across invocations; nothing here is random or
//! session-dependent.

use stex_inference::ChatMessage;

/// Fixed system instructions sent with every submission.
///
/// The rules spell out the full field contract: date normalization,
/// amount/sign conventions, currency detection, description cleaning, and
/// the exact nesting of the expected JSON output.
pub const SYSTEM_PROMPT: &str = r#"You are an advanced financial document parser specializing in extracting structured data from bank statements. Your task is to analyze the provided bank statement and convert the unstructured transaction data into a structured JSON format.

Key Requirements:
1. Extract account holder details
2. Parse all transactions accurately
3. Standardize date formats
4. Identify transaction types
5. Clean and simplify transaction descriptions
6. Handle multiple currencies
7. Maintain accurate balance tracking

Analyze the following bank statement and extract the required information:

Output Format:
Provide the extracted data in the following JSON structure:

{
    "transactions": {
        "account_holder": {
            "name": "Full Name",
            "account_number": "Complete Account Number"
        },
        "transactions": [
            {
                "date": "DD-MM-YYYY",
                "amount": float,
                "currency": "Currency Code",
                "type": "CREDIT or DEBIT",
                "description": "Cleaned Description",
                "balance": float
            },
            // ... more transactions
        ]
    }
}

Parsing Rules:
1. Account Holder:
   - Extract the full name as shown on the statement
   - Capture the complete account number

2. Transactions:
   - Date: Convert all dates to DD-MM-YYYY format
   - Amount:
     - Remove currency symbols and commas
     - Convert to float
   - Currency: Detect the currency types INR or USD
   - Type:
     - CREDIT for deposits or positive amounts
     - DEBIT for withdrawals or negative amounts
   - Description:
     - Remove reference numbers, UPI IDs, and unnecessary banking terms
     - Keep relevant information like merchant names, payment purposes, or recipient names
   - Balance: Extract the closing balance for each transaction

3. Special Considerations:
   - Ignore any lines that are not actual transactions (e.g., headers, footers)
   - Ensure all numerical values are properly converted to floats
   - Maintain the chronological order of transactions

Parse the statement meticulously, ensuring all transactions are captured accurately. The output should strictly adhere to the provided JSON structure and parsing rules.
"#;

/// Build the two-message conversation for one submission: the fixed rules
/// first, then the raw document text.
///
/// Empty document text still yields a well-formed payload; the model is
/// expected to answer with an empty-or-minimal statement in that case.
pub fn build_messages(document_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(document_text),
    ]
}

use crate::models::category::Category;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// Largest amount a single transaction may carry (1e15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Whether `amount` is a valid transaction magnitude: positive and at most
/// [`MAX_AMOUNT`].
pub fn amount_in_range(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= MAX_AMOUNT
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    pub fn parse(input: &str) -> Option<TransactionType> {
        match input.trim().to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            TransactionType::Income => TransactionType::Expense,
            TransactionType::Expense => TransactionType::Income,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded transaction. `amount` is always a positive magnitude; whether it
/// adds to or subtracts from the balance comes from `transaction_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Category,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
}

/// The fields of a transaction the caller controls, i.e. everything but the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Category,
    pub transaction_type: TransactionType,
}

impl Transaction {
    pub fn from_new(id: String, fields: NewTransaction) -> Self {
        Self {
            id,
            description: fields.description,
            amount: fields.amount,
            date: fields.date,
            category: fields.category,
            transaction_type: fields.transaction_type,
        }
    }

    /// Replaces every field except the id.
    pub fn replace_fields(&mut self, fields: NewTransaction) {
        self.description = fields.description;
        self.amount = fields.amount;
        self.date = fields.date;
        self.category = fields.category;
        self.transaction_type = fields.transaction_type;
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
    if amount_in_range(amount) {
        Ok(amount)
    } else {
        Err(de::Error::custom(format!(
            "amount {} is outside 0 < amount <= {}",
            amount, MAX_AMOUNT
        )))
    }
}

impl From<&Transaction> for NewTransaction {
    fn from(value: &Transaction) -> Self {
        Self {
            description: value.description.clone(),
            amount: value.amount,
            date: value.date,
            category: value.category.clone(),
            transaction_type: value.transaction_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn coffee() -> Transaction {
        Transaction {
            id: "abc".to_string(),
            description: "Coffee".to_string(),
            amount: Decimal::from(150),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            category: Category::Food,
            transaction_type: TransactionType::Expense,
        }
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(coffee()).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["amount"], "150");
        assert_eq!(json["date"], "2024-01-05");
        assert_eq!(json["category"], "food");
        assert_eq!(json["type"], "expense");
    }

    #[test]
    fn test_deserialize_numeric_amount() {
        let json = r#"{"id":"1","description":"Salary","amount":50000.5,"date":"2024-01-01","category":"salary","type":"income"}"#;
        let transaction: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(transaction.amount, Decimal::from_str("50000.5").unwrap());
        assert_eq!(transaction.category, Category::Salary);
        assert_eq!(transaction.transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_deserialize_rejects_out_of_range_amount() {
        for amount in ["\"-150\"", "0", "\"1000000000000001\""] {
            let json = format!(
                r#"{{"id":"1","description":"Coffee","amount":{},"date":"2024-01-05","category":"food","type":"expense"}}"#,
                amount
            );
            assert!(serde_json::from_str::<Transaction>(&json).is_err(), "amount {}", amount);
        }
    }

    #[test]
    fn test_max_amount() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000_000i64));
        assert!(amount_in_range(MAX_AMOUNT));
        assert!(!amount_in_range(MAX_AMOUNT + Decimal::new(1, 2)));
        assert!(!amount_in_range(Decimal::ZERO));
    }

    #[test]
    fn test_replace_fields_keeps_id() {
        let mut transaction = coffee();
        let mut fields = NewTransaction::from(&transaction);
        fields.category = Category::Shopping;
        fields.description = "Mug".to_string();

        transaction.replace_fields(fields);

        assert_eq!(transaction.id, "abc");
        assert_eq!(transaction.category, Category::Shopping);
        assert_eq!(transaction.description, "Mug");
    }

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!(TransactionType::parse("Income"), Some(TransactionType::Income));
        assert_eq!(TransactionType::parse(" expense "), Some(TransactionType::Expense));
        assert_eq!(TransactionType::parse("transfer"), None);
    }
}

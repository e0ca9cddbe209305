use crate::models::category::Category;
use crate::models::transaction::{MAX_AMOUNT, NewTransaction, Transaction, TransactionType};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Description,
    Amount,
    Date,
    Category,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::Description => "description",
            FormField::Amount => "amount",
            FormField::Date => "date",
            FormField::Category => "category",
        }
    }
}

/// Field name to error message. Empty means the draft is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FormField, &'static str>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn clear(&mut self, field: FormField) {
        self.0.remove(&field);
    }

    fn insert(&mut self, field: FormField, message: &'static str) {
        self.0.insert(field, message);
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.name(), message)?;
            first = false;
        }
        Ok(())
    }
}

/// Raw, unvalidated input for a transaction, as typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: String,
    pub date: String,
    pub category: String,
    pub transaction_type: TransactionType,
}

impl Default for TransactionDraft {
    fn default() -> Self {
        Self {
            description: String::new(),
            amount: String::new(),
            date: Local::now().date_naive().format("%Y-%m-%d").to_string(),
            category: String::new(),
            transaction_type: TransactionType::Expense,
        }
    }
}

impl TransactionDraft {
    /// Prefills a draft from an existing transaction for editing.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            description: transaction.description.clone(),
            amount: transaction.amount.normalize().to_string(),
            date: transaction.date.format("%Y-%m-%d").to_string(),
            category: transaction.category.key().to_string(),
            transaction_type: transaction.transaction_type,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Description => &self.description,
            FormField::Amount => &self.amount,
            FormField::Date => &self.date,
            FormField::Category => &self.category,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Description => &mut self.description,
            FormField::Amount => &mut self.amount,
            FormField::Date => &mut self.date,
            FormField::Category => &mut self.category,
        }
    }

    /// Checks every field and collects one message per failing field.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::default();

        if self.description.trim().is_empty() {
            errors.insert(FormField::Description, "Description is required");
        }

        if self.amount.trim().is_empty() {
            errors.insert(FormField::Amount, "Amount is required");
        } else {
            match parse_amount(&self.amount) {
                Some(amount) if amount > MAX_AMOUNT => {
                    errors.insert(FormField::Amount, "Amount is too large")
                }
                Some(amount) if amount > Decimal::ZERO => {}
                _ => errors.insert(FormField::Amount, "Amount must be a positive number"),
            }
        }

        if self.date.trim().is_empty() {
            errors.insert(FormField::Date, "Date is required");
        } else if parse_date(&self.date).is_none() {
            errors.insert(FormField::Date, "Date must be in YYYY-MM-DD format");
        }

        if Category::parse(&self.category).is_none() {
            errors.insert(FormField::Category, "Category is required");
        }

        errors
    }

    pub fn to_new_transaction(&self) -> Result<NewTransaction, FieldErrors> {
        let errors = self.validate();
        match (
            parse_amount(&self.amount),
            parse_date(&self.date),
            Category::parse(&self.category),
        ) {
            (Some(amount), Some(date), Some(category)) if errors.is_empty() => Ok(NewTransaction {
                description: self.description.clone(),
                amount,
                date,
                category,
                transaction_type: self.transaction_type,
            }),
            _ => Err(errors),
        }
    }
}

/// Optional field values supplied on the command line. Set values replace the
/// corresponding draft fields.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DraftInput {
    /// Free text describing the transaction.
    #[arg(long)]
    pub description: Option<String>,

    /// Positive amount, e.g. 150 or 12.50.
    #[arg(long)]
    pub amount: Option<String>,

    /// Date as YYYY-MM-DD.
    #[arg(long)]
    pub date: Option<String>,

    /// Category key, e.g. food or salary.
    #[arg(long)]
    pub category: Option<String>,

    /// income or expense.
    #[arg(long = "type", value_parser = parse_transaction_type)]
    pub transaction_type: Option<TransactionType>,
}

impl DraftInput {
    pub fn apply_to(self, draft: &mut TransactionDraft) {
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(amount) = self.amount {
            draft.amount = amount;
        }
        if let Some(date) = self.date {
            draft.date = date;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(transaction_type) = self.transaction_type {
            draft.transaction_type = transaction_type;
        }
    }
}

fn parse_transaction_type(input: &str) -> Result<TransactionType, String> {
    TransactionType::parse(input)
        .ok_or_else(|| format!("Invalid transaction type '{}'. Use 'income' or 'expense'.", input))
}

fn parse_amount(input: &str) -> Option<Decimal> {
    let input = input.trim();
    Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .ok()
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> TransactionDraft {
        TransactionDraft {
            description: "Coffee".to_string(),
            amount: "150".to_string(),
            date: "2024-01-05".to_string(),
            category: "food".to_string(),
            transaction_type: TransactionType::Expense,
        }
    }

    #[test]
    fn test_valid_draft_has_no_errors() {
        assert!(valid_draft().validate().is_empty());
    }

    #[test]
    fn test_empty_draft_reports_every_field() {
        let draft = TransactionDraft {
            description: "   ".to_string(),
            amount: String::new(),
            date: String::new(),
            category: String::new(),
            transaction_type: TransactionType::Income,
        };

        let errors = draft.validate();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(FormField::Description), Some("Description is required"));
        assert_eq!(errors.get(FormField::Amount), Some("Amount is required"));
        assert_eq!(errors.get(FormField::Date), Some("Date is required"));
        assert_eq!(errors.get(FormField::Category), Some("Category is required"));
    }

    #[test]
    fn test_amount_must_be_positive_number() {
        for amount in ["abc", "0", "-5", "0.00"] {
            let mut draft = valid_draft();
            draft.amount = amount.to_string();
            let errors = draft.validate();
            assert_eq!(
                errors.get(FormField::Amount),
                Some("Amount must be a positive number"),
                "amount {:?}",
                amount
            );
        }
    }

    #[test]
    fn test_amount_above_cap_is_too_large() {
        let mut draft = valid_draft();
        draft.amount = "50000000000000000000000000000".to_string();
        assert_eq!(draft.validate().get(FormField::Amount), Some("Amount is too large"));

        draft.amount = "1e16".to_string();
        assert_eq!(draft.validate().get(FormField::Amount), Some("Amount is too large"));

        draft.amount = MAX_AMOUNT.to_string();
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn test_amount_accepts_decimal_and_scientific() {
        let mut draft = valid_draft();
        draft.amount = "12.50".to_string();
        assert!(draft.validate().is_empty());

        draft.amount = "1e3".to_string();
        let new = draft.to_new_transaction().unwrap();
        assert_eq!(new.amount, Decimal::from(1000));
    }

    #[test]
    fn test_malformed_date() {
        let mut draft = valid_draft();
        draft.date = "05/01/2024".to_string();
        assert_eq!(
            draft.validate().get(FormField::Date),
            Some("Date must be in YYYY-MM-DD format")
        );
    }

    #[test]
    fn test_to_new_transaction() {
        let new = valid_draft().to_new_transaction().unwrap();
        assert_eq!(new.description, "Coffee");
        assert_eq!(new.amount, Decimal::from(150));
        assert_eq!(new.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(new.category, Category::Food);
        assert_eq!(new.transaction_type, TransactionType::Expense);
    }

    #[test]
    fn test_to_new_transaction_returns_errors() {
        let mut draft = valid_draft();
        draft.description.clear();
        let errors = draft.to_new_transaction().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.to_string(), "description: Description is required");
    }

    #[test]
    fn test_clear_single_field_error() {
        let mut errors = TransactionDraft {
            description: String::new(),
            amount: String::new(),
            ..valid_draft()
        }
        .validate();
        errors.clear(FormField::Amount);
        assert_eq!(errors.len(), 1);
        assert!(errors.get(FormField::Amount).is_none());
    }

    #[test]
    fn test_draft_input_overrides_only_set_fields() {
        let mut draft = valid_draft();
        DraftInput {
            amount: Some("99".to_string()),
            transaction_type: Some(TransactionType::Income),
            ..DraftInput::default()
        }
        .apply_to(&mut draft);

        assert_eq!(draft.amount, "99");
        assert_eq!(draft.transaction_type, TransactionType::Income);
        assert_eq!(draft.description, "Coffee");
        assert_eq!(draft.category, "food");
    }

    #[test]
    fn test_parse_transaction_type_error() {
        assert!(parse_transaction_type("transfer").unwrap_err().contains("Invalid transaction type"));
    }

    #[test]
    fn test_default_draft_is_expense_dated_today() {
        let draft = TransactionDraft::default();
        assert_eq!(draft.transaction_type, TransactionType::Expense);
        assert!(parse_date(&draft.date).is_some());
        assert!(draft.category.is_empty());
    }
}

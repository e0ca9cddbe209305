use crate::format::{format_currency, format_date};
use crate::models::transaction::{Transaction, TransactionType};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TypeFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl TypeFilter {
    fn matches(self, transaction_type: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Income => transaction_type == TransactionType::Income,
            TypeFilter::Expense => transaction_type == TransactionType::Expense,
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            TypeFilter::All => TypeFilter::Income,
            TypeFilter::Income => TypeFilter::Expense,
            TypeFilter::Expense => TypeFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TypeFilter::All => "All",
            TypeFilter::Income => "Income",
            TypeFilter::Expense => "Expense",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortField {
    #[default]
    Date,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    fn toggle(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

/// Filter and sort settings for displaying the transaction list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListView {
    pub type_filter: TypeFilter,
    pub category: Option<String>,
    pub sort_field: SortField,
    pub direction: SortDirection,
}

impl ListView {
    /// Flips the direction when `field` is already the sort field, otherwise
    /// switches to `field` sorted descending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.direction = self.direction.toggle();
        } else {
            self.sort_field = field;
            self.direction = SortDirection::Desc;
        }
    }

    pub fn sort_label(&self) -> String {
        let field = match self.sort_field {
            SortField::Date => "date",
            SortField::Amount => "amount",
        };
        format!("{} {}", field, self.direction.arrow())
    }

    fn matches(&self, transaction: &Transaction) -> bool {
        if !self.type_filter.matches(transaction.transaction_type) {
            return false;
        }
        if let Some(ref category) = self.category {
            if transaction.category.key().to_lowercase() != category.trim().to_lowercase() {
                return false;
            }
        }
        true
    }

    /// Filtered and sorted view. The sort is stable, so equal keys keep
    /// collection order.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let mut rows: Vec<&Transaction> = transactions.iter().filter(|t| self.matches(t)).collect();

        rows.sort_by(|a, b| {
            let ordering = match self.sort_field {
                SortField::Date => a.date.cmp(&b.date),
                SortField::Amount => a.amount.cmp(&b.amount),
            };
            match self.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        rows
    }
}

/// Signed amount as shown in lists, e.g. `+₹50,000` or `-₹150`.
pub fn signed_amount(transaction: &Transaction) -> String {
    let sign = match transaction.transaction_type {
        TransactionType::Income => '+',
        TransactionType::Expense => '-',
    };
    format!("{}{}", sign, format_currency(transaction.amount.abs(), 0))
}

/// Renders the rows as a plain text table for the `list` command.
pub fn render_list(rows: &[&Transaction]) -> String {
    if rows.is_empty() {
        return "No transactions found\nAdd some transactions to get started\n".to_string();
    }

    let mut out = format!(
        "{:<36}  {:<12}  {:<30}  {:<16}  {:>14}\n",
        "Id", "Date", "Description", "Category", "Amount"
    );
    for tx in rows {
        let mut description = tx.description.clone();
        if description.chars().count() > 30 {
            description = description.chars().take(27).collect();
            description.push_str("...");
        }
        out.push_str(&format!(
            "{:<36}  {:<12}  {:<30}  {:<16}  {:>14}\n",
            tx.id,
            format_date(tx.date),
            description,
            format!("{} {}", tx.category.icon(), tx.category.key()),
            signed_amount(tx)
        ));
    }
    out
}

use crate::format::format_currency;
use crate::models::category::Category;
use crate::models::transaction::{Transaction, TransactionType};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Chart palette, assigned to categories by rank and cycled.
pub const PALETTE: [(u8, u8, u8); 12] = [
    (0xEF, 0x44, 0x44),
    (0x3B, 0x82, 0xF6),
    (0x10, 0xB9, 0x81),
    (0xF5, 0x9E, 0x0B),
    (0x8B, 0x5C, 0xF6),
    (0xEC, 0x48, 0x99),
    (0x63, 0x66, 0xF1),
    (0x14, 0xB8, 0xA6),
    (0xFB, 0x92, 0x3C),
    (0x06, 0xB6, 0xD4),
    (0x84, 0xCC, 0x16),
    (0x34, 0xD3, 0x99),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

impl Totals {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let income = sum_by_type(transactions, TransactionType::Income);
        let expense = sum_by_type(transactions, TransactionType::Expense);
        Self {
            income,
            expense,
            balance: income.saturating_sub(expense),
        }
    }
}

fn sum_by_type(transactions: &[Transaction], transaction_type: TransactionType) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.transaction_type == transaction_type)
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: Decimal,
}

/// Sums expense amounts per category, largest first.
///
/// Categories with equal totals keep the order in which they first appear in
/// `transactions`. Labels that differ only in case form one group, shown
/// under the first spelling seen. Income is ignored.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for transaction in transactions.iter().filter(|t| t.is_expense()) {
        match totals
            .iter_mut()
            .find(|entry| entry.category.same_group(&transaction.category))
        {
            Some(entry) => entry.amount = entry.amount.saturating_add(transaction.amount),
            None => totals.push(CategoryTotal {
                category: transaction.category.clone(),
                amount: transaction.amount,
            }),
        }
    }

    totals.sort_by(|a, b| b.amount.cmp(&a.amount));
    totals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartMode {
    #[default]
    Pie,
    Bar,
}

impl ChartMode {
    pub fn toggle(self) -> Self {
        match self {
            ChartMode::Pie => ChartMode::Bar,
            ChartMode::Bar => ChartMode::Pie,
        }
    }
}

/// One row of the expense breakdown, ready for either chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub category: Category,
    pub amount: Decimal,
    /// Percentage of total expense, 0..=100.
    pub share: f64,
    pub color: (u8, u8, u8),
}

pub fn summary_rows(transactions: &[Transaction]) -> Vec<SummaryRow> {
    let totals = expenses_by_category(transactions);
    let total = totals
        .iter()
        .fold(Decimal::ZERO, |acc, entry| acc.saturating_add(entry.amount))
        .to_f64()
        .unwrap_or(0.0);

    totals
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            let amount = entry.amount.to_f64().unwrap_or(0.0);
            SummaryRow {
                share: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
                color: PALETTE[idx % PALETTE.len()],
                category: entry.category,
                amount: entry.amount,
            }
        })
        .collect()
}

const TEXT_BAR_WIDTH: usize = 30;

/// Renders totals and the category breakdown as plain text for the `summary` command.
pub fn render_summary(transactions: &[Transaction], mode: ChartMode) -> String {
    let totals = Totals::from_transactions(transactions);
    let rows = summary_rows(transactions);

    let mut out = String::new();
    out.push_str(&format!("Total Income:   {}\n", format_currency(totals.income, 2)));
    out.push_str(&format!("Total Expenses: {}\n", format_currency(totals.expense, 2)));
    out.push_str(&format!("Net Balance:    {}\n", format_currency(totals.balance, 2)));
    out.push('\n');
    out.push_str("Expense Summary\n");

    if rows.is_empty() {
        out.push_str("No expense data to display\n");
        out.push_str("Add some expenses to see the summary\n");
        return out;
    }

    let max_amount = rows[0].amount.to_f64().unwrap_or(0.0);
    for row in &rows {
        let label = format!("{} {}", row.category.icon(), row.category.key());
        let detail = match mode {
            ChartMode::Pie => format!("{:5.1}%", row.share),
            ChartMode::Bar => {
                let amount = row.amount.to_f64().unwrap_or(0.0);
                let width = if max_amount > 0.0 {
                    (amount / max_amount * TEXT_BAR_WIDTH as f64).round() as usize
                } else {
                    0
                };
                format!("{:<width$}", "█".repeat(width.max(1)), width = TEXT_BAR_WIDTH)
            }
        };
        out.push_str(&format!(
            "{:<20} {:>16}  {}\n",
            label,
            format_currency(row.amount, 2),
            detail
        ));
    }

    out
}

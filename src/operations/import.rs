use crate::db::repository::TransactionRepository;
use crate::error::AppError;
use crate::models::transaction::{NewTransaction, TransactionType};
use crate::operations::form::TransactionDraft;
use crate::store::TransactionStore;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const COLUMNS: usize = 5;

/// Imports `date,description,amount,type,category` rows from a CSV file
/// without a header. Either every row is added or none is.
pub fn import_csv_file<R: TransactionRepository>(
    store: &mut TransactionStore<R>,
    path: &Path,
) -> Result<usize, AppError> {
    let file = File::open(path)?;
    let transactions = parse_csv(file)?;
    let count = transactions.len();
    store.add_all(transactions)?;
    tracing::info!(path = %path.display(), count, "imported transactions");
    Ok(count)
}

fn parse_csv<T: Read>(input: T) -> Result<Vec<NewTransaction>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut transactions = Vec::new();

    for (line_index, result) in reader.records().enumerate() {
        let line = line_index + 1;
        let record = result?;

        if record.len() != COLUMNS {
            return Err(AppError::Import {
                line,
                message: format!("expected {} columns, got {}", COLUMNS, record.len()),
            });
        }

        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        let transaction_type = TransactionType::parse(&field(3)).ok_or_else(|| AppError::Import {
            line,
            message: format!("invalid type '{}', use 'income' or 'expense'", field(3)),
        })?;

        let draft = TransactionDraft {
            date: field(0),
            description: field(1),
            amount: field(2),
            transaction_type,
            category: field(4),
        };

        let transaction = draft.to_new_transaction().map_err(|errors| AppError::Import {
            line,
            message: errors.to_string(),
        })?;
        transactions.push(transaction);
    }

    Ok(transactions)
}

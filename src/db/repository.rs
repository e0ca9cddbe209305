use crate::error::AppError;
use crate::models::transaction::Transaction;
use rusqlite::{Connection, OptionalExtension};

/// Key under which the whole transaction list is stored.
pub const TRANSACTIONS_KEY: &str = "transactions";

/// Where the transaction list lives between runs.
///
/// The list is always read and written as a whole.
pub trait TransactionRepository {
    fn get_all(&self) -> Result<Vec<Transaction>, AppError>;

    fn save_all(&mut self, transactions: &[Transaction]) -> Result<(), AppError>;
}

/// Stores the list as a JSON document in a single row of a SQLite key-value table.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn get_value(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = self
            .conn
            .query_row("SELECT value FROM key_value WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_value(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.conn.execute(
            "INSERT INTO key_value (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }
}

impl TransactionRepository for SqliteRepository {
    fn get_all(&self) -> Result<Vec<Transaction>, AppError> {
        match self.get_value(TRANSACTIONS_KEY)? {
            Some(json) => {
                let transactions: Vec<Transaction> = serde_json::from_str(&json)?;
                tracing::debug!(count = transactions.len(), "loaded transactions");
                Ok(transactions)
            }
            None => {
                tracing::debug!("no stored transactions, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn save_all(&mut self, transactions: &[Transaction]) -> Result<(), AppError> {
        let json = serde_json::to_string(transactions)?;
        self.set_value(TRANSACTIONS_KEY, &json)?;
        tracing::debug!(count = transactions.len(), bytes = json.len(), "saved transactions");
        Ok(())
    }
}

/// Keeps the list in memory. Counts writes so tests can check persistence calls.
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryRepository {
    pub transactions: Vec<Transaction>,
    pub save_count: usize,
    /// When set, every `save_all` fails without storing anything.
    pub fail_writes: bool,
}

#[cfg(test)]
impl InMemoryRepository {
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl TransactionRepository for InMemoryRepository {
    fn get_all(&self) -> Result<Vec<Transaction>, AppError> {
        Ok(self.transactions.clone())
    }

    fn save_all(&mut self, transactions: &[Transaction]) -> Result<(), AppError> {
        if self.fail_writes {
            return Err(std::io::Error::other("write refused").into());
        }
        self.transactions = transactions.to_vec();
        self.save_count += 1;
        Ok(())
    }
}

use crate::db::repository::TransactionRepository;
use crate::error::AppError;
use crate::models::transaction::{NewTransaction, Transaction};
use crate::operations::summary::Totals;
use uuid::Uuid;

/// The ordered transaction collection plus its derived totals, as of one read.
#[derive(Debug, Clone, Copy)]
pub struct StoreView<'a> {
    pub transactions: &'a [Transaction],
    pub totals: Totals,
}

/// Owns the in-memory transaction list and writes the whole list back to the
/// repository after every change. A change whose write fails is undone, so
/// memory never runs ahead of storage.
pub struct TransactionStore<R: TransactionRepository> {
    repository: R,
    transactions: Vec<Transaction>,
}

impl<R: TransactionRepository> TransactionStore<R> {
    /// Loads the current list from `repository`.
    pub fn open(repository: R) -> Result<Self, AppError> {
        let transactions = repository.get_all()?;
        tracing::info!(count = transactions.len(), "opened transaction store");
        Ok(Self {
            repository,
            transactions,
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Totals are recomputed on every call.
    pub fn totals(&self) -> Totals {
        Totals::from_transactions(&self.transactions)
    }

    pub fn read(&self) -> StoreView<'_> {
        StoreView {
            transactions: &self.transactions,
            totals: self.totals(),
        }
    }

    /// Appends a transaction under a fresh id and returns that id.
    pub fn add(&mut self, fields: NewTransaction) -> Result<String, AppError> {
        let id = self.fresh_id();
        self.transactions.push(Transaction::from_new(id.clone(), fields));
        if let Err(e) = self.persist() {
            self.transactions.pop();
            return Err(e);
        }
        tracing::info!(%id, "added transaction");
        Ok(id)
    }

    /// Adds several transactions with a single write.
    pub fn add_all(&mut self, batch: Vec<NewTransaction>) -> Result<Vec<String>, AppError> {
        let before = self.transactions.len();
        let mut ids = Vec::with_capacity(batch.len());
        for fields in batch {
            let id = self.fresh_id();
            self.transactions.push(Transaction::from_new(id.clone(), fields));
            ids.push(id);
        }
        if !ids.is_empty() {
            if let Err(e) = self.persist() {
                self.transactions.truncate(before);
                return Err(e);
            }
        }
        tracing::info!(count = ids.len(), "added transactions");
        Ok(ids)
    }

    /// Replaces all fields of the transaction with `id`, keeping its id and
    /// position. Returns `false` without writing if no transaction matches.
    pub fn update(&mut self, id: &str, fields: NewTransaction) -> Result<bool, AppError> {
        let Some(index) = self.transactions.iter().position(|t| t.id == id) else {
            tracing::warn!(%id, "update ignored, no transaction with this id");
            return Ok(false);
        };
        let previous = NewTransaction::from(&self.transactions[index]);
        self.transactions[index].replace_fields(fields);
        if let Err(e) = self.persist() {
            self.transactions[index].replace_fields(previous);
            return Err(e);
        }
        tracing::info!(%id, "updated transaction");
        Ok(true)
    }

    /// Removes the transaction with `id`. Returns `false` without writing if
    /// no transaction matches.
    pub fn delete(&mut self, id: &str) -> Result<bool, AppError> {
        let Some(index) = self.transactions.iter().position(|t| t.id == id) else {
            tracing::warn!(%id, "delete ignored, no transaction with this id");
            return Ok(false);
        };
        let removed = self.transactions.remove(index);
        if let Err(e) = self.persist() {
            self.transactions.insert(index, removed);
            return Err(e);
        }
        tracing::info!(%id, "deleted transaction");
        Ok(true)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) -> Result<(), AppError> {
        self.repository.save_all(&self.transactions)
    }

    #[cfg(test)]
    pub fn repository(&self) -> &R {
        &self.repository
    }
}

use crate::db::repository::TransactionRepository;
use crate::error::AppError;
use crate::store::TransactionStore;

/// Deletes by id. Returns whether anything was removed; an unknown id is not an error.
pub fn remove_transaction<R: TransactionRepository>(
    store: &mut TransactionStore<R>,
    id: &str,
) -> Result<bool, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Ok(false);
    }
    store.delete(id)
}

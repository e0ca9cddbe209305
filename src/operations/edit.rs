use crate::db::repository::TransactionRepository;
use crate::error::AppError;
use crate::operations::form::{DraftInput, TransactionDraft};
use crate::store::TransactionStore;

/// Merges `input` over the stored transaction, re-validates and updates it.
///
/// Unlike [`TransactionStore::update`], a missing id is an error here: there
/// are no current values to merge the input into.
pub fn edit_transaction<R: TransactionRepository>(
    store: &mut TransactionStore<R>,
    id: &str,
    input: DraftInput,
) -> Result<(), AppError> {
    let id = id.trim();
    let existing = store
        .get(id)
        .ok_or_else(|| AppError::NotFound(id.to_string()))?;

    let mut draft = TransactionDraft::from_transaction(existing);
    input.apply_to(&mut draft);

    let fields = draft.to_new_transaction().map_err(AppError::Validation)?;
    store.update(id, fields)?;
    Ok(())
}

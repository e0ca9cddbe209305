use crate::db::repository::TransactionRepository;
use crate::error::AppError;
use crate::operations::form::{DraftInput, TransactionDraft};
use crate::store::TransactionStore;

/// Validates the command line input and adds it to the store. Unset fields
/// take the form defaults: today's date and type expense.
pub fn add_transaction<R: TransactionRepository>(
    store: &mut TransactionStore<R>,
    input: DraftInput,
) -> Result<String, AppError> {
    let mut draft = TransactionDraft::default();
    input.apply_to(&mut draft);

    let fields = draft.to_new_transaction().map_err(AppError::Validation)?;
    store.add(fields)
}

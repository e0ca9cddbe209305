use crate::db::repository::TransactionRepository;
use crate::error::AppError;
use crate::models::category::Category;
use crate::models::transaction::Transaction;
use crate::operations::form::{FieldErrors, FormField, TransactionDraft};
use crate::operations::list::{ListView, SortField};
use crate::operations::summary::ChartMode;
use crate::store::TransactionStore;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::widgets::TableState;
use std::cmp::max;

/// Form rows in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Type,
    Field(FormField),
}

impl FormFocus {
    const ORDER: [FormFocus; 5] = [
        FormFocus::Type,
        FormFocus::Field(FormField::Description),
        FormFocus::Field(FormField::Amount),
        FormFocus::Field(FormField::Date),
        FormFocus::Field(FormField::Category),
    ];

    fn step(self, delta: isize) -> Self {
        let len = Self::ORDER.len() as isize;
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(idx + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub draft: TransactionDraft,
    pub errors: FieldErrors,
    pub focus: FormFocus,
    /// Id of the transaction being edited; `None` when adding.
    pub editing: Option<String>,
}

impl FormState {
    fn new_transaction() -> Self {
        Self {
            draft: TransactionDraft::default(),
            errors: FieldErrors::default(),
            focus: FormFocus::Field(FormField::Description),
            editing: None,
        }
    }

    fn edit(transaction: &Transaction) -> Self {
        Self {
            draft: TransactionDraft::from_transaction(transaction),
            errors: FieldErrors::default(),
            focus: FormFocus::Field(FormField::Description),
            editing: Some(transaction.id.clone()),
        }
    }

    pub fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Transaction"
        } else {
            "Add Transaction"
        }
    }

    /// Steps through the category picker. A blank or unrecognized category
    /// starts from the first entry.
    fn cycle_category(&mut self, delta: isize) {
        let len = Category::ALL.len() as isize;
        let current = Category::parse(&self.draft.category)
            .and_then(|c| Category::ALL.iter().position(|known| *known == c));
        let next = match current {
            Some(idx) => (idx as isize + delta).rem_euclid(len) as usize,
            None => 0,
        };
        self.draft.category = Category::ALL[next].key().to_string();
        self.errors.clear(FormField::Category);
    }

    fn edit_text(&mut self, field: FormField, key: KeyCode) {
        let value = self.draft.field_mut(field);
        match key {
            KeyCode::Char(ch) => value.push(ch),
            KeyCode::Backspace => {
                value.pop();
            }
            _ => return,
        }
        self.errors.clear(field);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    List,
    Form(FormState),
    ConfirmDelete(String),
}

pub struct DashboardState {
    pub mode: Mode,
    pub view: ListView,
    pub chart: ChartMode,
    pub table_state: TableState,
    pub status: Option<String>,
    /// Visible table rows as of the last draw.
    pub last_page_size: usize,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            mode: Mode::List,
            view: ListView::default(),
            chart: ChartMode::default(),
            table_state: TableState::default(),
            status: None,
            last_page_size: 10,
        }
    }
}

impl DashboardState {
    pub fn visible_rows<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        self.view.apply(transactions)
    }

    pub fn selected_id(&self, transactions: &[Transaction]) -> Option<String> {
        let selected = self.table_state.selected()?;
        self.visible_rows(transactions)
            .get(selected)
            .map(|t| t.id.clone())
    }

    /// Keeps the selection inside the visible rows after the list changed.
    pub fn clamp_selection(&mut self, row_count: usize) {
        if row_count == 0 {
            self.table_state.select(None);
        } else {
            let selected = self.table_state.selected().unwrap_or(0);
            self.table_state.select(Some(selected.min(row_count - 1)));
        }
    }

    fn move_selection(&mut self, delta: isize, row_count: usize) {
        if row_count == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, row_count as isize - 1) as usize;
        self.table_state.select(Some(next));
    }

    /// Applies one key press. Returns `true` when the dashboard should close.
    pub fn handle_key<R: TransactionRepository>(
        &mut self,
        store: &mut TransactionStore<R>,
        key: KeyEvent,
    ) -> Result<bool, AppError> {
        // Many terminals emit both a Press and a Release event.
        if key.kind == KeyEventKind::Release {
            return Ok(false);
        }

        let mode = std::mem::replace(&mut self.mode, Mode::List);
        self.mode = match mode {
            Mode::List => return self.handle_list_key(store, key),
            Mode::Form(form) => self.handle_form_key(store, form, key)?,
            Mode::ConfirmDelete(id) => self.handle_confirm_key(store, id, key)?,
        };
        Ok(false)
    }

    fn handle_list_key<R: TransactionRepository>(
        &mut self,
        store: &mut TransactionStore<R>,
        key: KeyEvent,
    ) -> Result<bool, AppError> {
        let row_count = self.visible_rows(store.transactions()).len();
        let page = max(1, self.last_page_size) as isize;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => self.move_selection(-1, row_count),
            KeyCode::Down => self.move_selection(1, row_count),
            KeyCode::PageUp => self.move_selection(-page, row_count),
            KeyCode::PageDown => self.move_selection(page, row_count),
            KeyCode::Home => self.move_selection(isize::MIN / 2, row_count),
            KeyCode::End => self.move_selection(isize::MAX / 2, row_count),
            KeyCode::Char('a') => {
                self.status = None;
                self.mode = Mode::Form(FormState::new_transaction());
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(transaction) = self
                    .selected_id(store.transactions())
                    .and_then(|id| store.get(&id))
                {
                    self.mode = Mode::Form(FormState::edit(transaction));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_id(store.transactions()) {
                    self.mode = Mode::ConfirmDelete(id);
                }
            }
            KeyCode::Char('t') => {
                self.view.type_filter = self.view.type_filter.cycle();
                self.clamp_selection(self.visible_rows(store.transactions()).len());
            }
            KeyCode::Char('s') => self.view.toggle_sort(SortField::Date),
            KeyCode::Char('m') => self.view.toggle_sort(SortField::Amount),
            KeyCode::Char('c') => self.chart = self.chart.toggle(),
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key<R: TransactionRepository>(
        &mut self,
        store: &mut TransactionStore<R>,
        mut form: FormState,
        key: KeyEvent,
    ) -> Result<Mode, AppError> {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            return Ok(Mode::List);
        }
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            && matches!(key.code, KeyCode::Char(_))
        {
            return Ok(Mode::Form(form));
        }

        match (key.code, form.focus) {
            (KeyCode::Esc, _) => return Ok(Mode::List),
            (KeyCode::Enter, _) => return self.submit_form(store, form),
            (KeyCode::Tab | KeyCode::Down, _) => form.focus = form.focus.step(1),
            (KeyCode::BackTab | KeyCode::Up, _) => form.focus = form.focus.step(-1),
            (KeyCode::Left | KeyCode::Right | KeyCode::Char(' '), FormFocus::Type) => {
                form.draft.transaction_type = form.draft.transaction_type.toggle();
            }
            (KeyCode::Left, FormFocus::Field(FormField::Category)) => form.cycle_category(-1),
            (KeyCode::Right | KeyCode::Char(' '), FormFocus::Field(FormField::Category)) => {
                form.cycle_category(1)
            }
            (KeyCode::Char(_) | KeyCode::Backspace, FormFocus::Field(field))
                if field != FormField::Category =>
            {
                form.edit_text(field, key.code)
            }
            _ => {}
        }
        Ok(Mode::Form(form))
    }

    fn submit_form<R: TransactionRepository>(
        &mut self,
        store: &mut TransactionStore<R>,
        mut form: FormState,
    ) -> Result<Mode, AppError> {
        let fields = match form.draft.to_new_transaction() {
            Ok(fields) => fields,
            Err(errors) => {
                tracing::debug!(count = errors.len(), %errors, "form submission rejected");
                form.errors = errors;
                return Ok(Mode::Form(form));
            }
        };

        match form.editing {
            Some(id) => {
                store.update(&id, fields)?;
                self.status = Some("Transaction updated".to_string());
            }
            None => {
                store.add(fields)?;
                self.status = Some("Transaction added".to_string());
            }
        }
        self.clamp_selection(self.visible_rows(store.transactions()).len());
        Ok(Mode::List)
    }

    fn handle_confirm_key<R: TransactionRepository>(
        &mut self,
        store: &mut TransactionStore<R>,
        id: String,
        key: KeyEvent,
    ) -> Result<Mode, AppError> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                store.delete(&id)?;
                self.status = Some("Transaction deleted".to_string());
                self.clamp_selection(self.visible_rows(store.transactions()).len());
                Ok(Mode::List)
            }
            KeyCode::Char('n') | KeyCode::Esc => Ok(Mode::List),
            _ => Ok(Mode::ConfirmDelete(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::InMemoryRepository;
    use crate::models::transaction::{NewTransaction, TransactionType};
    use crate::operations::list::TypeFilter;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(
        state: &mut DashboardState,
        store: &mut TransactionStore<InMemoryRepository>,
        text: &str,
    ) {
        for ch in text.chars() {
            state.handle_key(store, press(KeyCode::Char(ch))).unwrap();
        }
    }

    fn seeded_store() -> TransactionStore<InMemoryRepository> {
        let mut store = TransactionStore::open(InMemoryRepository::default()).unwrap();
        store
            .add(NewTransaction {
                description: "Coffee".to_string(),
                amount: Decimal::from(150),
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                category: Category::Food,
                transaction_type: TransactionType::Expense,
            })
            .unwrap();
        store
            .add(NewTransaction {
                description: "Salary".to_string(),
                amount: Decimal::from(50000),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                category: Category::Salary,
                transaction_type: TransactionType::Income,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_quit_from_list() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();
        assert!(state.handle_key(&mut store, press(KeyCode::Char('q'))).unwrap());
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        assert!(!state.handle_key(&mut store, key).unwrap());
    }

    #[test]
    fn test_add_through_form() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();

        state.handle_key(&mut store, press(KeyCode::Char('a'))).unwrap();
        assert!(matches!(state.mode, Mode::Form(_)));

        type_text(&mut state, &mut store, "Bus");
        state.handle_key(&mut store, press(KeyCode::Tab)).unwrap();
        type_text(&mut state, &mut store, "40");
        state.handle_key(&mut store, press(KeyCode::Tab)).unwrap();
        state.handle_key(&mut store, press(KeyCode::Tab)).unwrap();
        // Category picker: first entry is food, next is transportation.
        state.handle_key(&mut store, press(KeyCode::Right)).unwrap();
        state.handle_key(&mut store, press(KeyCode::Right)).unwrap();
        state.handle_key(&mut store, press(KeyCode::Enter)).unwrap();

        assert_eq!(state.mode, Mode::List);
        assert_eq!(store.transactions().len(), 3);
        let added = store.transactions().last().unwrap();
        assert_eq!(added.description, "Bus");
        assert_eq!(added.amount, Decimal::from(40));
        assert_eq!(added.category, Category::Transportation);
        assert_eq!(added.transaction_type, TransactionType::Expense);
        assert_eq!(state.status.as_deref(), Some("Transaction added"));
    }

    #[test]
    fn test_invalid_form_shows_errors_and_typing_clears_them() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();

        state.handle_key(&mut store, press(KeyCode::Char('a'))).unwrap();
        state.handle_key(&mut store, press(KeyCode::Enter)).unwrap();

        let Mode::Form(ref form) = state.mode else {
            panic!("form should stay open");
        };
        assert_eq!(form.errors.get(FormField::Description), Some("Description is required"));
        assert_eq!(form.errors.get(FormField::Category), Some("Category is required"));
        assert_eq!(store.transactions().len(), 2);

        type_text(&mut state, &mut store, "x");
        let Mode::Form(ref form) = state.mode else {
            panic!("form should stay open");
        };
        assert!(form.errors.get(FormField::Description).is_none());
        assert!(form.errors.get(FormField::Amount).is_some());
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();

        state.handle_key(&mut store, press(KeyCode::Char('a'))).unwrap();
        state
            .handle_key(&mut store, KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL))
            .unwrap();
        state
            .handle_key(&mut store, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT))
            .unwrap();
        type_text(&mut state, &mut store, "ok");

        let Mode::Form(ref form) = state.mode else {
            panic!("form should stay open");
        };
        assert_eq!(form.draft.description, "ok");
    }

    #[test]
    fn test_type_toggle_in_form() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();

        state.handle_key(&mut store, press(KeyCode::Char('a'))).unwrap();
        state.handle_key(&mut store, press(KeyCode::BackTab)).unwrap();
        state.handle_key(&mut store, press(KeyCode::Right)).unwrap();

        let Mode::Form(ref form) = state.mode else {
            panic!("form should stay open");
        };
        assert_eq!(form.focus, FormFocus::Type);
        assert_eq!(form.draft.transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_edit_selected_transaction() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();
        state.clamp_selection(2);

        // Date descending puts Coffee first.
        state.handle_key(&mut store, press(KeyCode::Char('e'))).unwrap();
        let Mode::Form(ref form) = state.mode else {
            panic!("edit form should open");
        };
        assert_eq!(form.draft.description, "Coffee");
        assert_eq!(form.title(), "Edit Transaction");

        for _ in 0.."Coffee".len() {
            state.handle_key(&mut store, press(KeyCode::Backspace)).unwrap();
        }
        type_text(&mut state, &mut store, "Tea");
        state.handle_key(&mut store, press(KeyCode::Enter)).unwrap();

        assert_eq!(store.transactions().len(), 2);
        assert_eq!(store.transactions()[0].description, "Tea");
        assert_eq!(state.status.as_deref(), Some("Transaction updated"));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();
        state.clamp_selection(2);

        state.handle_key(&mut store, press(KeyCode::Char('d'))).unwrap();
        assert!(matches!(state.mode, Mode::ConfirmDelete(_)));
        state.handle_key(&mut store, press(KeyCode::Char('n'))).unwrap();
        assert_eq!(store.transactions().len(), 2);

        state.handle_key(&mut store, press(KeyCode::Char('d'))).unwrap();
        state.handle_key(&mut store, press(KeyCode::Char('y'))).unwrap();
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(store.transactions()[0].description, "Salary");
        assert_eq!(state.table_state.selected(), Some(0));
    }

    #[test]
    fn test_filter_sort_and_chart_keys() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();
        state.clamp_selection(2);

        state.handle_key(&mut store, press(KeyCode::Char('t'))).unwrap();
        assert_eq!(state.view.type_filter, TypeFilter::Income);
        assert_eq!(state.visible_rows(store.transactions()).len(), 1);

        state.handle_key(&mut store, press(KeyCode::Char('m'))).unwrap();
        assert_eq!(state.view.sort_field, SortField::Amount);

        state.handle_key(&mut store, press(KeyCode::Char('c'))).unwrap();
        assert_eq!(state.chart, ChartMode::Bar);
    }

    #[test]
    fn test_selection_moves_within_bounds() {
        let mut store = seeded_store();
        let mut state = DashboardState::default();
        state.clamp_selection(2);

        state.handle_key(&mut store, press(KeyCode::Down)).unwrap();
        state.handle_key(&mut store, press(KeyCode::Down)).unwrap();
        assert_eq!(state.table_state.selected(), Some(1));

        state.handle_key(&mut store, press(KeyCode::Home)).unwrap();
        assert_eq!(state.table_state.selected(), Some(0));
        state.handle_key(&mut store, press(KeyCode::End)).unwrap();
        assert_eq!(state.table_state.selected(), Some(1));
    }
}

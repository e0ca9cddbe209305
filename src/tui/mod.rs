//! Interactive terminal dashboard: balance cards, the transaction list with
//! its add/edit/delete form, and the expense summary charts.

mod render;
mod state;

use crate::db::repository::TransactionRepository;
use crate::error::AppError;
use crate::store::TransactionStore;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use state::DashboardState;
use std::io;
use std::time::Duration;

pub fn run_dashboard<R: TransactionRepository>(store: &mut TransactionStore<R>) -> Result<(), AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    tracing::debug!("dashboard started");

    let result = event_loop(store);

    // Restore the terminal even when the loop failed.
    let restored = disable_raw_mode().and_then(|_| execute!(io::stdout(), LeaveAlternateScreen));
    tracing::debug!("dashboard closed");

    result?;
    restored?;
    Ok(())
}

fn event_loop<R: TransactionRepository>(store: &mut TransactionStore<R>) -> Result<(), AppError> {
    let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
    let mut terminal = ratatui::Terminal::new(backend)?;
    let mut state = DashboardState::default();

    loop {
        terminal.draw(|frame| render::draw(frame, &mut state, store.read()))?;

        if event::poll(Duration::from_millis(200))? {
            match event::read()? {
                Event::Key(key) => {
                    if state.handle_key(store, key)? {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    Ok(())
}

use crate::format::{format_currency, format_date};
use crate::models::category::Category;
use crate::models::transaction::TransactionType;
use crate::operations::form::FormField;
use crate::operations::list::signed_amount;
use crate::operations::summary::{ChartMode, SummaryRow, Totals, summary_rows};
use crate::store::StoreView;
use crate::tui::state::{DashboardState, FormFocus, FormState, Mode};
use ratatui::prelude::{Alignment, Color, Constraint, Direction, Layout, Rect, Style};
use ratatui::style::Stylize;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

pub fn draw(frame: &mut ratatui::Frame, state: &mut DashboardState, view: StoreView<'_>) {
    let size = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(size);

    render_header(frame, layout[0]);
    render_balance(frame, layout[1], view.totals);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(layout[2]);
    render_table(frame, body[0], state, view);
    render_summary(frame, body[1], state.chart, &summary_rows(view.transactions));
    render_footer(frame, layout[3], state);

    match state.mode {
        Mode::Form(ref form) => render_form_modal(frame, size, form),
        Mode::ConfirmDelete(ref id) => render_confirm_modal(frame, size, view, id),
        Mode::List => {}
    }
}

fn render_header(frame: &mut ratatui::Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Expense Tracker",
        Style::default().fg(Color::Indexed(63)).bold(),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_balance(frame: &mut ratatui::Frame, area: Rect, totals: Totals) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let balance_color = if totals.balance >= Decimal::ZERO {
        Color::Green
    } else {
        Color::Red
    };

    let entries = [
        ("Total Income ↑", totals.income, Color::Green),
        ("Total Expenses ↓", totals.expense, Color::Red),
        ("Net Balance ₹", totals.balance, balance_color),
    ];

    for (area, (title, amount, color)) in cards.iter().zip(entries) {
        let card = Paragraph::new(Line::from(Span::styled(
            format_currency(amount, 2),
            Style::default().fg(color).bold(),
        )))
        .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(card, *area);
    }
}

fn type_color(transaction_type: TransactionType) -> Color {
    match transaction_type {
        TransactionType::Income => Color::Green,
        TransactionType::Expense => Color::Red,
    }
}

fn render_table(frame: &mut ratatui::Frame, area: Rect, state: &mut DashboardState, view: StoreView<'_>) {
    let title = format!(
        "Recent Transactions  [Type: {}  Sort: {}]",
        state.view.type_filter.label(),
        state.view.sort_label()
    );
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = state.visible_rows(view.transactions);
    state.clamp_selection(visible.len());

    let header = Row::new([
        Cell::from("").style(Style::default().bold()),
        Cell::from("Description").style(Style::default().bold()),
        Cell::from("Date").style(Style::default().bold()),
        Cell::from("Category").style(Style::default().bold()),
        Cell::from("Amount").style(Style::default().bold()),
    ])
    .style(Style::default().fg(Color::White));

    let rows = visible.iter().map(|tx| {
        let mut desc = tx.description.clone();
        if desc.chars().count() > 32 {
            desc = desc.chars().take(29).collect();
            desc.push_str("...");
        }
        let color = type_color(tx.transaction_type);

        Row::new([
            Cell::from(tx.category.icon()).style(Style::default().fg(color)),
            Cell::from(desc),
            Cell::from(format_date(tx.date)),
            Cell::from(tx.category.key().to_string()),
            Cell::from(signed_amount(tx)).style(Style::default().fg(color).bold()),
        ])
    });

    // Leave room for the header row.
    state.last_page_size = (inner.height.saturating_sub(2) as usize).max(1);

    let widths = [
        Constraint::Length(2),
        Constraint::Percentage(40),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .row_highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White).bold())
        .highlight_symbol("➤ ")
        .column_spacing(1);

    frame.render_stateful_widget(table, inner, &mut state.table_state);

    if visible.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from("No transactions found"),
            Line::from(Span::styled(
                "Add some transactions to get started",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

fn render_summary(frame: &mut ratatui::Frame, area: Rect, chart: ChartMode, rows: &[SummaryRow]) {
    let mode = match chart {
        ChartMode::Pie => "pie",
        ChartMode::Bar => "bar",
    };
    let block = Block::default()
        .title(format!("Expense Summary ({})", mode))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if rows.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from("No expense data to display"),
            Line::from(Span::styled(
                "Add some expenses to see the summary",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(empty, inner);
        return;
    }

    match chart {
        ChartMode::Pie => {
            let split = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(inner);
            render_pie_chart(frame, split[0], rows);
            render_legend(frame, split[1], rows);
        }
        ChartMode::Bar => render_bar_chart(frame, inner, rows),
    }
}

fn render_pie_chart(frame: &mut ratatui::Frame, area: Rect, rows: &[SummaryRow]) {
    let mut slices = Vec::new();
    let mut start_angle = 0.0_f64;
    for row in rows {
        let sweep = row.share / 100.0 * std::f64::consts::TAU;
        slices.push((start_angle, start_angle + sweep, rgb(row.color)));
        start_angle += sweep;
    }

    let canvas = Canvas::default()
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            let step = 0.04;
            for (start, end, color) in &slices {
                let mut points = Vec::new();
                let mut r = 0.0;
                while r <= 1.0 {
                    let mut angle = *start;
                    while angle <= *end {
                        points.push((r * angle.cos(), r * angle.sin()));
                        angle += 0.05;
                    }
                    r += step;
                }
                if !points.is_empty() {
                    ctx.draw(&Points {
                        coords: &points,
                        color: *color,
                    });
                }
            }
        });

    frame.render_widget(canvas, area);
}

fn render_legend(frame: &mut ratatui::Frame, area: Rect, rows: &[SummaryRow]) {
    let lines: Vec<Line> = rows
        .iter()
        .map(|row| {
            let style = Style::default().fg(rgb(row.color));
            Line::from(vec![
                Span::styled("■ ", style),
                Span::styled(format!("{:14}", row.category.key()), style),
                Span::raw(format!("{:>5.1}%  ", row.share)),
                Span::raw(format_currency(row.amount, 0)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_bar_chart(frame: &mut ratatui::Frame, area: Rect, rows: &[SummaryRow]) {
    let bars: Vec<Bar> = rows
        .iter()
        .map(|row| {
            let value = row.amount.round().to_u64().unwrap_or(0);
            Bar::default()
                .value(value)
                .label(Line::from(row.category.key().to_string()))
                .text_value(format_currency(row.amount, 0))
                .style(Style::default().fg(rgb(row.color)))
        })
        .collect();

    let chart = BarChart::default()
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn render_footer(frame: &mut ratatui::Frame, area: Rect, state: &DashboardState) {
    let hint = match state.mode {
        Mode::List => "↑/↓ move  a add  e/Enter edit  d delete  t type  s date sort  m amount sort  c chart  q/Esc exit",
        Mode::Form(_) => "Tab/↑/↓ field  ←/→ toggle type or pick category  Enter save  Esc cancel",
        Mode::ConfirmDelete(_) => "y/Enter delete  n/Esc keep",
    };

    let mut spans = vec![Span::raw(hint)];
    if let Some(ref status) = state.status {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(status.clone(), Style::default().fg(Color::Yellow)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn field_label(field: FormField) -> &'static str {
    match field {
        FormField::Description => "Description",
        FormField::Amount => "Amount",
        FormField::Date => "Date",
        FormField::Category => "Category",
    }
}

fn render_form_modal(frame: &mut ratatui::Frame, area: Rect, form: &FormState) {
    let popup_area = centered_rect(70, 60, area);
    frame.render_widget(Clear, popup_area);

    let focused = |focus: FormFocus| {
        if form.focus == focus {
            Style::default().fg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::White)
        }
    };

    let (expense_style, income_style) = match form.draft.transaction_type {
        TransactionType::Expense => (
            Style::default().bg(Color::Red).fg(Color::White),
            Style::default().fg(Color::Gray),
        ),
        TransactionType::Income => (
            Style::default().fg(Color::Gray),
            Style::default().bg(Color::Green).fg(Color::White),
        ),
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<13}", "Type"), focused(FormFocus::Type)),
            Span::styled(" Expense ", expense_style),
            Span::raw(" "),
            Span::styled(" Income ", income_style),
        ]),
        Line::from(""),
    ];

    for field in [
        FormField::Description,
        FormField::Amount,
        FormField::Date,
        FormField::Category,
    ] {
        let value = match field {
            FormField::Category => match Category::parse(&form.draft.category) {
                Some(category) => format!("{} {}", category.icon(), category.label()),
                None => "Select a category".to_string(),
            },
            _ => form.draft.field(field).to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<13}", field_label(field)), focused(FormFocus::Field(field))),
            Span::styled(format!("> {}", value), Style::default().fg(Color::Cyan)),
        ]));
        if let Some(error) = form.errors.get(field) {
            lines.push(Line::from(Span::styled(
                format!("{:13}{}", "", error),
                Style::default().fg(Color::Red),
            )));
        }
    }

    let block = Block::default().borders(Borders::ALL).title(form.title());
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        popup_area,
    );
}

fn render_confirm_modal(frame: &mut ratatui::Frame, area: Rect, view: StoreView<'_>, id: &str) {
    let popup_area = centered_rect(50, 25, area);
    frame.render_widget(Clear, popup_area);

    let description = view
        .transactions
        .iter()
        .find(|t| t.id == id)
        .map(|t| t.description.as_str())
        .unwrap_or("(missing)");

    let lines = vec![
        Line::from(format!("Delete \"{}\"?", description)),
        Line::from(""),
        Line::from(Span::styled("y to delete, n to keep", Style::default().fg(Color::DarkGray))),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Delete Transaction"))
            .alignment(Alignment::Center),
        popup_area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::InMemoryRepository;
    use crate::models::transaction::NewTransaction;
    use crate::store::TransactionStore;
    use chrono::NaiveDate;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn draw_once(store: &TransactionStore<InMemoryRepository>, state: &mut DashboardState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| draw(frame, state, store.read())).unwrap();
        screen_text(&terminal)
    }

    #[test]
    fn test_draw_empty_dashboard() {
        let store = TransactionStore::open(InMemoryRepository::default()).unwrap();
        let mut state = DashboardState::default();

        let text = draw_once(&store, &mut state);
        assert!(text.contains("Expense Tracker"));
        assert!(text.contains("No transactions found"));
        assert!(text.contains("No expense data to display"));
        assert_eq!(state.table_state.selected(), None);
    }

    #[test]
    fn test_draw_with_transactions_and_form() {
        let mut store = TransactionStore::open(InMemoryRepository::default()).unwrap();
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
            .add(NewTransaction {
                description: "Coffee".to_string(),
                amount: Decimal::from(150),
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                category: Category::Food,
                transaction_type: TransactionType::Expense,
            })
            .unwrap();

        let mut state = DashboardState::default();
        let text = draw_once(&store, &mut state);
        assert!(text.contains("Coffee"));
        assert!(text.contains("Salary"));
        assert!(text.contains("Expense Summary (pie)"));
        assert_eq!(state.table_state.selected(), Some(0));

        state.chart = ChartMode::Bar;
        let text = draw_once(&store, &mut state);
        assert!(text.contains("Expense Summary (bar)"));

        state.mode = Mode::Form(FormState {
            draft: Default::default(),
            errors: Default::default(),
            focus: FormFocus::Type,
            editing: None,
        });
        let text = draw_once(&store, &mut state);
        assert!(text.contains("Add Transaction"));
        assert!(text.contains("Select a category"));
    }
}

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use erp_finance::{format_brl, render, ChartPoint, ReportKind, ReportOutput, Tabular};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

/// What the content pane currently shows.
pub enum Content {
    Report {
        output: ReportOutput,
        table: Tabular,
    },
    Failed(String),
}

pub struct App {
    pub db_path: PathBuf,
    pub today: NaiveDate,
    pub menu_state: ListState,
    pub table_state: TableState,
    pub content: Content,
}

impl App {
    pub fn new(db_path: PathBuf, today: NaiveDate) -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));

        let mut app = Self {
            db_path,
            today,
            menu_state,
            table_state: TableState::default(),
            content: Content::Failed(String::new()),
        };
        app.refresh();
        app
    }

    pub fn selected_kind(&self) -> ReportKind {
        let i = self.menu_state.selected().unwrap_or(0);
        ReportKind::ALL[i % ReportKind::ALL.len()]
    }

    /// Re-run the selected report against a fresh store handle.
    pub fn refresh(&mut self) {
        let kind = self.selected_kind();

        self.content = match render(&self.db_path, kind, self.today) {
            Ok(output) => {
                let table = Tabular::from(&output);
                Content::Report { output, table }
            }
            Err(err) => Content::Failed(err.to_string()),
        };

        let has_rows = matches!(&self.content, Content::Report { table, .. } if !table.is_empty());
        self.table_state.select(if has_rows { Some(0) } else { None });
    }

    pub fn next(&mut self) {
        let len = ReportKind::ALL.len();
        let i = match self.menu_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.menu_state.select(Some(i));
        self.refresh();
    }

    pub fn previous(&mut self) {
        let len = ReportKind::ALL.len();
        let i = match self.menu_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.menu_state.select(Some(i));
        self.refresh();
    }

    fn row_count(&self) -> usize {
        match &self.content {
            Content::Report { table, .. } => table.rows.len(),
            Content::Failed(_) => 0,
        }
    }

    pub fn scroll_down(&mut self, step: usize) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = self.table_state.selected().map_or(0, |i| (i + step).min(len - 1));
        self.table_state.select(Some(i));
    }

    pub fn scroll_up(&mut self, step: usize) {
        if self.row_count() == 0 {
            return;
        }
        let i = self.table_state.selected().map_or(0, |i| i.saturating_sub(step));
        self.table_state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Char('r') => app.refresh(),
                KeyCode::PageDown => app.scroll_down(20),
                KeyCode::PageUp => app.scroll_up(20),
                KeyCode::Char('n') => app.scroll_down(1),
                KeyCode::Char('p') => app.scroll_up(1),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Menu + content
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app.selected_kind());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(0)])
        .split(chunks[1]);

    render_menu(f, body[0], &mut app.menu_state);

    let App { content, table_state, .. } = &mut *app;
    match content {
        Content::Report { output, table } => match output.chart() {
            Some(points) => {
                let split = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                    .split(body[1]);
                render_report_table(f, split[0], table, table_state);
                render_chart(f, split[1], output, &points);
            }
            None => render_report_table(f, body[1], table, table_state),
        },
        Content::Failed(message) => render_error(f, body[1], message),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, kind: ReportKind) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "ERP Financeiro",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        Span::styled(kind.heading(), Style::default().fg(Color::Yellow)),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_menu(f: &mut Frame, area: Rect, state: &mut ListState) {
    let items: Vec<ListItem> = ReportKind::ALL
        .iter()
        .enumerate()
        .map(|(i, kind)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}", i + 1), Style::default().fg(Color::Yellow)),
                Span::raw(". "),
                Span::raw(kind.title()),
            ]))
        })
        .collect();

    let menu = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Selecione uma opção "))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    f.render_stateful_widget(menu, area, state);
}

fn render_report_table(f: &mut Frame, area: Rect, table: &Tabular, state: &mut TableState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} registros ", table.rows.len()));

    if table.is_empty() {
        let empty = Paragraph::new("Nenhum registro encontrado.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header_cells = table.headers.iter().map(|h| {
        Cell::from(h.as_str()).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = table
        .rows
        .iter()
        .map(|row| Row::new(row.iter().map(|cell| Cell::from(cell.as_str()))));

    let widths: Vec<Constraint> = table
        .column_widths()
        .into_iter()
        .map(|w| Constraint::Length(w.min(40) as u16))
        .collect();

    let widget = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(2)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

    f.render_stateful_widget(widget, area, state);
}

fn render_chart(f: &mut Frame, area: Rect, output: &ReportOutput, points: &[ChartPoint]) {
    let block = Block::default().borders(Borders::ALL).title(chart_title(output));

    if points.is_empty() {
        f.render_widget(block, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2);
    let slots = points.len() as u16;
    let bar_width = (inner_width / slots).saturating_sub(1).clamp(3, 24);

    let bars: Vec<Bar> = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            Bar::default()
                .value(point.value.max(0.0).round() as u64)
                .text_value(format_brl(point.value))
                .label(Line::from(truncate(&point.label, bar_width as usize)))
                .style(Style::default().fg(bar_color(output, i)))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn chart_title(output: &ReportOutput) -> &'static str {
    match output {
        ReportOutput::TopClients(_) => " Top 5 Clientes com Maior Receita ",
        ReportOutput::StatusComparison { .. } => " Total de Contas Pendentes vs Pagas/Recebidas ",
        ReportOutput::RevenueVsExpense(_) => " Comparação Receita vs Despesa - Mês Atual ",
        ReportOutput::Listing(_) | ReportOutput::CashFlow { .. } => "",
    }
}

fn bar_color(output: &ReportOutput, index: usize) -> Color {
    const PALETTE: [Color; 5] = [Color::Cyan, Color::Blue, Color::Magenta, Color::Yellow, Color::Green];
    match output {
        ReportOutput::RevenueVsExpense(_) if index == 0 => Color::Green,
        ReportOutput::RevenueVsExpense(_) => Color::Red,
        _ => PALETTE[index % PALETTE.len()],
    }
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let text = vec![
        Line::from(Span::styled(
            "Não foi possível gerar o relatório",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
    ];
    let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(" Erro "));
    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let status = Line::from(vec![
        Span::styled("↑↓", Style::default().fg(Color::Yellow)),
        Span::raw(" report  "),
        Span::styled("n/p PgUp/PgDn", Style::default().fg(Color::Yellow)),
        Span::raw(" rows  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" reload  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" quit  │  "),
        Span::raw(format!("hoje: {}  │  {}", app.today, app.db_path.display())),
    ]);

    let bar = Paragraph::new(status).block(Block::default().borders(Borders::ALL));
    f.render_widget(bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len.saturating_sub(1)).chain(std::iter::once('…')).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_db_app() -> App {
        let path = std::env::temp_dir().join("erp-finance-missing/none.db");
        App::new(path, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
    }

    #[test]
    fn test_menu_wraps_both_ways() {
        let mut app = missing_db_app();
        assert_eq!(app.selected_kind(), ReportKind::Clients);

        app.previous();
        assert_eq!(app.selected_kind(), ReportKind::RevenueVsExpense);

        app.next();
        app.next();
        assert_eq!(app.selected_kind(), ReportKind::Payables);
    }

    #[test]
    fn test_store_failure_is_shown_not_raised() {
        let mut app = missing_db_app();
        assert!(matches!(app.content, Content::Failed(ref msg) if msg.starts_with("storage unavailable")));

        app.scroll_down(5);
        assert_eq!(app.table_state.selected(), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Ana", 5), "Ana");
        assert_eq!(truncate("Fernanda Lima", 6), "Ferna…");
    }
}

// Terminal preview of the rendered sheets (no file is written)

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use statement_report::grid::{Fill, Role};
use statement_report::render::{RenderedSheet, FIRST_SECTION_ROW, HEADER_ROW};
use std::io;

pub struct App {
    pub sheets: Vec<RenderedSheet>,
    pub current: usize,
    pub state: TableState,
}

impl App {
    pub fn new(sheets: Vec<RenderedSheet>) -> Self {
        let mut state = TableState::default();
        state.select(Some(0));
        App {
            sheets,
            current: 0,
            state,
        }
    }

    pub fn sheet(&self) -> Option<&RenderedSheet> {
        self.sheets.get(self.current)
    }

    /// Data rows below the header
    pub fn body_rows(&self) -> usize {
        self.sheet()
            .map(|s| s.grid.max_row().saturating_sub(HEADER_ROW) as usize)
            .unwrap_or(0)
    }

    pub fn next_sheet(&mut self) {
        if !self.sheets.is_empty() {
            self.current = (self.current + 1) % self.sheets.len();
            self.state.select(Some(0));
        }
    }

    pub fn previous_sheet(&mut self) {
        if !self.sheets.is_empty() {
            self.current = (self.current + self.sheets.len() - 1) % self.sheets.len();
            self.state.select(Some(0));
        }
    }

    pub fn next(&mut self) {
        let rows = self.body_rows();
        if rows == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 1).min(rows - 1));
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(1));
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        for _ in 0..10 {
            self.next();
        }
    }

    pub fn page_up(&mut self) {
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(10));
        self.state.select(Some(i));
    }
}

pub fn run_preview(app: &mut App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

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
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_sheet();
                    } else {
                        app.next_sheet();
                    }
                }
                KeyCode::BackTab => app.previous_sheet(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => {
                    let rows = app.body_rows();
                    if rows > 0 {
                        app.state.select(Some(rows - 1));
                    }
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Sheet tabs
            Constraint::Min(0),    // Grid
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_tabs(f, chunks[0], app);
    render_grid(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_tabs(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, sheet) in app.sheets.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if i == app.current {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(sheet.name.clone(), style));
    }

    let tabs = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(tabs, area);
}

fn cell_style(role: Role, fill: Fill) -> Style {
    let style = match role {
        Role::Title | Role::Header => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        Role::Units => Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        Role::Banner => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        Role::Label | Role::Value => Style::default(),
    };
    match fill {
        Fill::Banner => style.bg(Color::Blue),
        Fill::Band => style.bg(Color::Rgb(0x30, 0x30, 0x30)),
        Fill::None => style,
    }
}

fn render_grid(f: &mut Frame, area: Rect, app: &mut App) {
    let Some(sheet) = app.sheets.get(app.current) else {
        f.render_widget(Paragraph::new("No sheets"), area);
        return;
    };

    let columns = sheet.grid.max_column().max(1);
    let row_cells = |row: u32| -> Vec<Cell<'static>> {
        (1..=columns)
            .map(|col| match sheet.grid.get(row, col) {
                Some(cell) => {
                    let text = cell.value.display();
                    let text = if col > 1 { format!("{:>14}", text) } else { text };
                    Cell::from(text).style(cell_style(cell.style.role, cell.style.fill))
                }
                None => Cell::from(""),
            })
            .collect()
    };

    let header = Row::new(row_cells(HEADER_ROW))
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = (FIRST_SECTION_ROW..=sheet.grid.max_row())
        .map(|r| Row::new(row_cells(r)).height(1))
        .collect();

    let mut widths = vec![Constraint::Length(42)];
    widths.extend((2..=columns).map(|_| Constraint::Length(16)));

    let title = sheet
        .grid
        .get(1, 1)
        .and_then(|c| c.value.as_text())
        .unwrap_or(sheet.name.as_str())
        .to_string();
    let units = sheet
        .grid
        .get(1, columns)
        .and_then(|c| c.value.as_text())
        .unwrap_or("")
        .to_string();

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", title))
                .title(Title::from(format!(" {} ", units)).alignment(Alignment::Right)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let position = format!(
        "Sheet {}/{}  Row {}/{}",
        app.current + 1,
        app.sheets.len(),
        app.state.selected().map_or(0, |i| i + 1),
        app.body_rows()
    );
    let status = Paragraph::new(Line::from(vec![
        Span::styled(position, Style::default().fg(Color::White)),
        Span::raw("  |  "),
        Span::styled(
            "Tab: next sheet  j/k: scroll  PgUp/PgDn  q: quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

//! Ratatui-based terminal dashboard.
//!
//! Left: product list. Right: timeframe selector, trend and anomaly panels,
//! and the forecast chart. Fetches run on background threads; the session
//! decides which responses still matter.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use crate::app::fetch::FetchWorker;
use crate::app::pipeline::DashboardView;
use crate::app::session::{Panels, Session, Ticket};
use crate::data::ProductStore;
use crate::engine::TimeframeTable;
use crate::error::AppError;
use crate::report::{display_name, fallback_note, format_anomaly_count, format_trend, format_units};

mod plotters_chart;

use plotters_chart::ForecastChart;

/// Start the TUI.
pub fn run(store: Arc<dyn ProductStore>, table: TimeframeTable) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(store, table);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Theme {
    Dark,
    Light,
}

/// Colors for one theme. `plot_*` are RGB triples for Plotters.
#[derive(Debug, Clone, Copy)]
struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    accent: Color,
    up: Color,
    down: Color,
    plot_text: (u8, u8, u8),
    plot_predicted: (u8, u8, u8),
    plot_actual: (u8, u8, u8),
    plot_anomaly: (u8, u8, u8),
}

impl Theme {
    fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                bg: Color::Black,
                fg: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                up: Color::Green,
                down: Color::Red,
                plot_text: (255, 255, 255),
                plot_predicted: (0, 255, 255),
                plot_actual: (255, 255, 255),
                plot_anomaly: (255, 64, 64),
            },
            Theme::Light => Palette {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                up: Color::Green,
                down: Color::Red,
                plot_text: (0, 0, 0),
                plot_predicted: (0, 90, 200),
                plot_actual: (60, 60, 60),
                plot_anomaly: (200, 0, 0),
            },
        }
    }
}

struct App {
    session: Session,
    worker: FetchWorker,
    theme: Theme,
}

impl App {
    fn new(store: Arc<dyn ProductStore>, table: TimeframeTable) -> Self {
        let mut app = Self {
            session: Session::new(table),
            worker: FetchWorker::new(store),
            theme: Theme::Dark,
        };
        let ticket = app.session.start();
        app.worker.submit(ticket);
        app
    }

    fn submit(&self, ticket: Option<Ticket>) {
        if let Some(ticket) = ticket {
            self.worker.submit(ticket);
        }
    }

    /// Apply any finished fetches. Returns true if something changed.
    fn drain_responses(&mut self) -> bool {
        let mut changed = false;
        while let Some((id, response)) = self.worker.try_recv() {
            let follow_up = self.session.apply(id, response);
            self.submit(follow_up);
            changed = true;
        }
        changed
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.drain_responses() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                let ticket = self.session.select_prev();
                self.submit(ticket);
            }
            KeyCode::Down => {
                let ticket = self.session.select_next();
                self.submit(ticket);
            }
            KeyCode::Left => self.session.prev_timeframe(),
            KeyCode::Right => self.session.next_timeframe(),
            // Presentation only; the cached view is re-rendered as is.
            KeyCode::Char('t') => self.theme = self.theme.toggled(),
            KeyCode::Char('r') => {
                let ticket = self.session.reload();
                self.worker.submit(ticket);
            }
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let palette = self.theme.palette();
        let size = frame.area();
        frame.render_widget(
            Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
            size,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0], &palette);
        self.draw_body(frame, chunks[1], &palette);
        self.draw_footer(frame, chunks[2], &palette);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect, palette: &Palette) {
        let table = self.session.table();
        let titles: Vec<String> = table.entries().iter().map(|e| e.label.clone()).collect();
        let selected = table
            .entries()
            .iter()
            .position(|e| e.token == self.session.token())
            .unwrap_or(0);

        let tabs = Tabs::new(titles)
            .select(selected)
            .style(Style::default().fg(palette.muted))
            .highlight_style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Line::from(vec![
                        Span::styled(" sf ", Style::default().fg(palette.accent)),
                        Span::raw("Sales Forecast Dashboard "),
                    ])),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect, palette: &Palette) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(0)])
            .split(area);

        self.draw_products(frame, columns[0], palette);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(columns[1]);
        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        // All three panels always come from the same state.
        match self.session.panels() {
            Panels::Ready(view) => {
                self.draw_trend(frame, panels[0], view, palette);
                self.draw_anomalies(frame, panels[1], view, palette);
                self.draw_chart(frame, rows[1], view, palette);
            }
            Panels::Loading => {
                let style = Style::default().fg(palette.muted);
                draw_message(frame, panels[0], "Forecast Trend", "Loading...", style);
                draw_message(frame, panels[1], "Anomalies", "Loading...", style);
                draw_message(frame, rows[1], "Forecast", "Loading...", style);
            }
            Panels::Error(msg) => {
                let style = Style::default().fg(palette.down);
                draw_message(frame, panels[0], "Forecast Trend", msg, style);
                draw_message(frame, panels[1], "Anomalies", msg, style);
                draw_message(frame, rows[1], "Forecast", msg, style);
            }
        }
    }

    fn draw_products(&self, frame: &mut ratatui::Frame<'_>, area: Rect, palette: &Palette) {
        let items: Vec<ListItem> = self
            .session
            .products()
            .iter()
            .map(|p| ListItem::new(display_name(p)))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Products").borders(Borders::ALL))
            .highlight_style(Style::default().fg(palette.bg).bg(palette.fg))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(self.session.selected_index());
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_trend(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView, palette: &Palette) {
        let trend_color = if view.trend.is_up() { palette.up } else { palette.down };
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{} Units", format_units(view.trend.latest)),
                Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format_trend(&view.trend), Style::default().fg(trend_color))),
        ];
        if let Some(note) = fallback_note(view) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(note, Style::default().fg(palette.muted))));
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Forecast Trend").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_anomalies(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView, palette: &Palette) {
        let mut lines = vec![Line::from(Span::styled(
            format_anomaly_count(&view.anomalies),
            Style::default().fg(palette.fg).add_modifier(Modifier::BOLD),
        ))];
        for d in &view.anomalies {
            lines.push(Line::from(Span::styled(d.to_string(), Style::default().fg(palette.down))));
        }

        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Anomalies").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView, palette: &Palette) {
        let title = format!("{} ({})", display_name(&view.product), view.timeframe_label);
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let widget = ForecastChart::new(&view.chart, *palette);
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect, palette: &Palette) {
        let help = "↑/↓ product  ←/→ timeframe  t theme  r reload  q quit";
        let status = match self.session.panels() {
            Panels::Loading => "loading".to_string(),
            Panels::Error(_) => "error".to_string(),
            Panels::Ready(view) => format!("{} days", view.chart.len()),
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(palette.muted)),
            Span::raw(" | "),
            Span::styled(
                format!("source: {} | {status}", self.worker.store_name()),
                Style::default().fg(palette.accent),
            ),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_message(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str, msg: &str, style: Style) {
    let p = Paragraph::new(msg.to_string())
        .style(style)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleConfig, SampleStore};
    use crate::domain::TimeframeToken;
    use ratatui::backend::TestBackend;

    fn sample_app() -> App {
        App::new(Arc::new(SampleStore::new(SampleConfig::default())), TimeframeTable::default())
    }

    fn wait_until_ready(app: &mut App) {
        for _ in 0..50 {
            if let Some((id, response)) = app.worker.recv_timeout(Duration::from_millis(100)) {
                let follow_up = app.session.apply(id, response);
                app.submit(follow_up);
            }
            if matches!(app.session.panels(), Panels::Ready(_)) {
                return;
            }
        }
        panic!("dashboard never became ready");
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn loads_first_product_and_renders_panels() {
        let mut app = sample_app();
        assert!(screen_text(&app).contains("Loading..."));

        wait_until_ready(&mut app);
        let text = screen_text(&app);
        assert!(text.contains("Iphone 16 Stock"));
        assert!(text.contains("Forecast Trend"));
        assert!(text.contains("from previous"));
        assert!(!text.contains("Loading..."));
    }

    #[test]
    fn keys_change_timeframe_theme_and_quit() {
        let mut app = sample_app();
        wait_until_ready(&mut app);

        assert!(!app.handle_key(KeyCode::Right));
        assert_eq!(app.session.token(), TimeframeToken::Short);
        assert!(!app.handle_key(KeyCode::Left));
        assert!(!app.handle_key(KeyCode::Left));
        assert_eq!(app.session.token(), TimeframeToken::All);

        let before = app.session.panels().clone();
        app.handle_key(KeyCode::Char('t'));
        assert_eq!(app.theme, Theme::Light);
        assert_eq!(app.session.panels(), &before);

        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn product_change_shows_loading_then_new_product() {
        let mut app = sample_app();
        wait_until_ready(&mut app);

        app.handle_key(KeyCode::Down);
        assert_eq!(app.session.panels(), &Panels::Loading);
        wait_until_ready(&mut app);
        match app.session.panels() {
            Panels::Ready(view) => assert_eq!(view.product, "macbook_air_stock"),
            other => panic!("expected ready panels, got {other:?}"),
        }
    }
}

//! Terminal chart viewer using ratatui.

use crate::figure::Figure;
use crate::series::{to_datetime, to_epoch_secs};
use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
];

/// Position on the time axis, stepping between tick marks
#[derive(Debug)]
pub struct Cursor {
    stops: Vec<DateTime<Utc>>,
    index: usize,
}

impl Cursor {
    /// Cursor over the figure's major and minor ticks, starting mid-axis
    pub fn new(figure: &Figure) -> Self {
        let mut stops = Vec::new();
        if let Some((lo, hi)) = figure.x_view() {
            stops.extend(figure.axis().major_ticks(lo, hi));
            stops.extend(figure.axis().minor_ticks(lo, hi));
            stops.sort();
            stops.dedup();
            if stops.is_empty() {
                stops = vec![lo, hi];
            }
        }
        let index = stops.len() / 2;
        Self { stops, index }
    }

    pub fn current(&self) -> Option<DateTime<Utc>> {
        self.stops.get(self.index).copied()
    }

    pub fn left(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.index + 1 < self.stops.len() {
            self.index += 1;
        }
    }

    pub fn first(&mut self) {
        self.index = 0;
    }

    pub fn last(&mut self) {
        self.index = self.stops.len().saturating_sub(1);
    }
}

/// Evenly spaced x-axis labels: view start, middle, end
fn time_labels(figure: &Figure, lo: f64, hi: f64) -> Vec<Span<'static>> {
    [lo, (lo + hi) / 2.0, hi]
        .iter()
        .filter_map(|x| to_datetime(*x))
        .map(|time| Span::raw(figure.axis().format_major(&time)))
        .collect()
}

fn value_labels(lo: f64, hi: f64) -> Vec<Span<'static>> {
    [lo, (lo + hi) / 2.0, hi]
        .iter()
        .map(|y| Span::raw(format!("{:.1}", y)))
        .collect()
}

/// Render the figure as a ratatui chart, with an optional cursor line
pub fn render_chart(f: &mut Frame, area: Rect, figure: &Figure, cursor: Option<DateTime<Utc>>) {
    let block = Block::default()
        .title(format!(" {} ", figure.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (figure.x_view(), figure.y_view()) else {
        f.render_widget(Paragraph::new("Nothing to plot").block(block), area);
        return;
    };
    let (x_lo, x_hi) = (to_epoch_secs(x_lo), to_epoch_secs(x_hi));

    let points: Vec<Vec<(f64, f64)>> = figure
        .series()
        .iter()
        .map(|series| {
            series
                .points
                .iter()
                .map(|(time, value)| (to_epoch_secs(*time), *value))
                .collect()
        })
        .collect();
    let cursor_line: Vec<(f64, f64)> = cursor
        .map(|time| {
            let x = to_epoch_secs(time);
            vec![(x, y_lo), (x, y_hi)]
        })
        .unwrap_or_default();

    let mut datasets: Vec<Dataset> = points
        .iter()
        .enumerate()
        .map(|(idx, data)| {
            let name = figure
                .legend_labels()
                .get(idx)
                .cloned()
                .unwrap_or_default();
            Dataset::default()
                .name(name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[idx % SERIES_COLORS.len()]))
                .data(data)
        })
        .collect();
    if !cursor_line.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::DarkGray))
                .data(&cursor_line),
        );
    }

    let label_style = Style::default().fg(Color::Gray);
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(figure.x_label().to_string())
                .style(label_style)
                .bounds([x_lo, x_hi])
                .labels(time_labels(figure, x_lo, x_hi)),
        )
        .y_axis(
            Axis::default()
                .title(figure.y_label().to_string())
                .style(label_style)
                .bounds([y_lo, y_hi])
                .labels(value_labels(y_lo, y_hi)),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));

    f.render_widget(chart, area);
}

/// Render key help and the date under the cursor
pub fn render_help_bar(f: &mut Frame, area: Rect, figure: &Figure, cursor: Option<DateTime<Utc>>) {
    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let mut spans = vec![
        Span::styled(" q", key_style),
        Span::raw(" quit  "),
        Span::styled("←/→", key_style),
        Span::raw(" move cursor  "),
    ];
    if let Some(time) = cursor {
        spans.push(Span::styled(
            figure.inspect(&time),
            Style::default().fg(Color::Cyan),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, figure: &Figure, cursor: &Cursor) -> Result<()> {
    terminal.draw(|f| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(1)])
            .split(f.area());
        render_chart(f, chunks[0], figure, cursor.current());
        render_help_bar(f, chunks[1], figure, cursor.current());
    })?;
    Ok(())
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, figure: &Figure) -> Result<()> {
    let mut cursor = Cursor::new(figure);

    loop {
        draw(terminal, figure, &cursor)?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Left => cursor.left(),
                        KeyCode::Right => cursor.right(),
                        KeyCode::Home => cursor.first(),
                        KeyCode::End => cursor.last(),
                        _ => {}
                    }
                }
            }
        }
    }
    Ok(())
}

/// Show the figure in the terminal until the user quits
pub fn run_viewer(figure: &Figure) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, figure);

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

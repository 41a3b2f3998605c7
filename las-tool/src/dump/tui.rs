use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    prelude::{Backend, Constraint},
    style::{Color, Style},
    widgets::{Block, Borders, Row, Table, TableState},
    Frame, Terminal,
};
use std::{
    fmt, io,
    ops::ControlFlow,
    time::{Duration, Instant},
};

#[derive(Debug, Clone)]
pub struct Record(pub Vec<Value>);

#[derive(Debug, Clone)]
pub enum Value {
    I(i64),
    F(f64),
    S(String),
}

macro_rules! derive_from_trait_for_integer {
    ($ty:ty) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::I(value as i64)
            }
        }
    };
}

derive_from_trait_for_integer!(i8);
derive_from_trait_for_integer!(i32);
derive_from_trait_for_integer!(u8);
derive_from_trait_for_integer!(u16);
derive_from_trait_for_integer!(u64);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::F(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I(val) => write!(f, "{val}"),
            Value::F(val) => write!(f, "{val}"),
            Value::S(val) => write!(f, "{val}"),
        }
    }
}

/// Shows `data` in a scrollable table until the user presses 'q'.
pub fn run_tui(title: String, header: Vec<String>, data: Vec<Record>) -> Result<(), io::Error> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.clear()?;

    let mut tui = Tui::new(10, title, header, data);
    let result = tui.run_loop(&mut terminal);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Display width of every column: the widest cell or the title.
fn column_widths(header: &[String], rows: &[Vec<String>]) -> Vec<u16> {
    header
        .iter()
        .enumerate()
        .map(|(idx, title)| {
            let max_len = rows
                .iter()
                .filter_map(|row| row.get(idx))
                .map(|cell| cell.len())
                .max()
                .unwrap_or(0)
                .max(title.len());
            max_len.min(u16::MAX as usize) as u16
        })
        .collect()
}

struct Tui {
    tick_dur: Duration,
    title: String,
    table_height: usize,
    table_state: TableState,
    n_records: usize,
    header: Row<'static>,
    rows: Vec<Row<'static>>,
    widths: Vec<Constraint>,
}

impl Tui {
    fn new(refresh_rate: u32, title: String, header: Vec<String>, data: Vec<Record>) -> Self {
        let tick_dur = Duration::from_secs(1) / refresh_rate;

        let n_records = data.len();
        let cells: Vec<Vec<String>> = data
            .iter()
            .map(|record| record.0.iter().map(|val| val.to_string()).collect())
            .collect();

        let widths = column_widths(&header, &cells)
            .into_iter()
            .map(Constraint::Min)
            .collect();

        let header = Row::new(header).style(Style::default().fg(Color::Black).bg(Color::Green));
        let rows: Vec<_> = cells.into_iter().map(Row::new).collect();

        let mut table_state = TableState::default();
        if n_records > 0 {
            table_state.select(Some(0));
        }

        Tui {
            tick_dur,
            title,
            table_height: 1,
            table_state,
            n_records,
            header,
            rows,
            widths,
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let Self {
            ref title,
            ref mut table_height,
            ref mut table_state,
            ref header,
            ref rows,
            ref widths,
            ..
        } = *self;

        let area = frame.area();
        // two border lines plus the header row
        *table_height = (area.height as usize).saturating_sub(3).max(1);

        let table = Table::new(rows.clone(), widths.clone())
            .header(header.clone())
            .block(Block::default().borders(Borders::ALL).title(title.clone()))
            .column_spacing(2)
            .row_highlight_style(Style::default().fg(Color::Black).bg(Color::White));

        frame.render_stateful_widget(table, area, table_state);
    }

    fn run_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let mut last_tick = Instant::now();

        loop {
            let timeout = self
                .tick_dur
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));

            if let ControlFlow::Break(_) = self.process_events(timeout)? {
                break;
            }

            if last_tick.elapsed() >= self.tick_dur {
                terminal.draw(|frame| self.render(frame))?;
                last_tick = Instant::now();
            }
        }

        Ok(())
    }

    fn process_events(&mut self, timeout: Duration) -> io::Result<ControlFlow<()>> {
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                use KeyCode as C;

                match key.code {
                    C::Char('q') | C::Esc => return Ok(ControlFlow::Break(())),
                    C::Up | C::Char('k') => self.move_by(-1),
                    C::Down | C::Char('j') => self.move_by(1),
                    C::PageUp => self.move_by(-(self.table_height as isize)),
                    C::PageDown => self.move_by(self.table_height as isize),
                    C::Home | C::Char('g') => self.move_to(0),
                    C::End | C::Char('G') => self.move_to(self.n_records.saturating_sub(1)),
                    _ => {}
                }
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn move_by(&mut self, delta: isize) {
        let orig_idx = self.table_state.selected().unwrap_or(0);
        self.move_to(orig_idx.saturating_add_signed(delta));
    }

    fn move_to(&mut self, idx: usize) {
        if let Some(last_idx) = self.n_records.checked_sub(1) {
            self.table_state.select(Some(idx.min(last_idx)));
        }
    }
}

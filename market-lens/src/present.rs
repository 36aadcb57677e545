//! Presenting (displaying) finished figures.
//!
//! A [`Presenter`] is the output sink for self-created figures. Figures drawn onto a caller-owned
//! surface are never presented by this crate.

use crate::{chart::Figure, error::LensError};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{self, Stdout, Write};
use tracing::{debug, info};

/// Output sink for finished figures.
pub trait Presenter {
    fn present(&mut self, figure: &Figure) -> Result<(), LensError>;
}

impl<P> Presenter for &mut P
where
    P: Presenter + ?Sized,
{
    fn present(&mut self, figure: &Figure) -> Result<(), LensError> {
        (**self).present(figure)
    }
}

impl<P> Presenter for Box<P>
where
    P: Presenter + ?Sized,
{
    fn present(&mut self, figure: &Figure) -> Result<(), LensError> {
        (**self).present(figure)
    }
}

/// Draws each figure full screen in the terminal's alternate screen and blocks until a key is
/// pressed, like an interactive plot window.
#[derive(Debug, Copy, Clone, Default)]
pub struct TerminalPresenter;

impl TerminalPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, figure: &Figure) -> Result<(), LensError> {
        info!("Presenting figure, press any key to close");

        // Nothing may log while the session holds the terminal, output would land on the figure
        let key = {
            let mut session = TerminalSession::enter()?;
            show(&mut session.terminal, figure, event::read)?
        };

        debug!(?key, "figure closed");
        Ok(())
    }
}

/// Draw `figure` and block until a key press, returning the key.
fn show<B>(
    terminal: &mut Terminal<B>,
    figure: &Figure,
    mut next_event: impl FnMut() -> io::Result<Event>,
) -> Result<KeyCode, LensError>
where
    B: Backend,
{
    terminal.draw(|f| f.render_widget(figure, f.area()))?;

    loop {
        if let Event::Key(key) = next_event()? {
            if key.kind == KeyEventKind::Press {
                return Ok(key.code);
            }
        }
    }
}

/// Raw mode + alternate screen, restored on drop (including early returns on error).
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn enter() -> Result<Self, LensError> {
        enable_raw_mode()?;

        let setup = || -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            Terminal::new(CrosstermBackend::new(stdout))
        };

        match setup() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(error) => {
                let _ = disable_raw_mode();
                Err(error.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Writes each figure as plain text to an [`io::Write`] sink, for inline output such as logs,
/// pipes or notebooks.
#[derive(Debug)]
pub struct TextPresenter<W> {
    writer: W,
}

impl TextPresenter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> TextPresenter<W>
where
    W: Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> Presenter for TextPresenter<W>
where
    W: Write,
{
    fn present(&mut self, figure: &Figure) -> Result<(), LensError> {
        let lines = figure.to_lines();
        debug!(rows = lines.len(), "writing figure as text");

        for line in lines {
            writeln!(self.writer, "{line}")?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps a copy of every presented figure, for headless use and inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    figures: Vec<Figure>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Figures in presentation order.
    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    /// Number of presentations so far.
    pub fn presentations(&self) -> usize {
        self.figures.len()
    }

    pub fn into_figures(self) -> Vec<Figure> {
        self.figures
    }
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, figure: &Figure) -> Result<(), LensError> {
        self.figures.push(figure.clone());
        Ok(())
    }
}

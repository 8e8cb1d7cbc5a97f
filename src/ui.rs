use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::cache::ItemCache;
use crate::keymap;
use crate::nav::{self, Flow, Navigator, Viewport};
use crate::render::Highlighter;

pub struct Options {
    pub cache: Arc<ItemCache>,
    pub highlighter: Highlighter,
}

pub struct Model {
    navigator: Navigator,
}

impl Model {
    pub fn new(opts: Options, viewport: Viewport) -> Result<Self> {
        let navigator = Navigator::new(opts.cache, viewport, opts.highlighter)
            .context("open root post list")?;
        Ok(Self { navigator })
    }

    pub fn handle_event(&mut self, event: Event) -> Flow {
        let nav_event = match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match keymap::action_for(key) {
                Some(action) => nav::Event::Action(action),
                None => return Flow::Continue,
            },
            Event::Resize(width, height) => nav::Event::Resize { width, height },
            _ => return Flow::Continue,
        };
        self.navigator.handle(nav_event)
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.navigator.draw(frame))?;

            // Fetches happen inside `handle_event`, so a cache miss holds the
            // loop until the item arrives.
            if self.handle_event(event::read()?) == Flow::Quit {
                break;
            }
        }
        Ok(())
    }
}

pub fn run(opts: Options) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = terminal
        .size()
        .map_err(anyhow::Error::from)
        .and_then(|size| Model::new(opts, Viewport::from(size)))
        .and_then(|mut model| model.event_loop(&mut terminal));

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

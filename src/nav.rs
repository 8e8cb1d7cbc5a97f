//! Navigation between the root post list and a single post's comments.
//!
//! Frames live on an explicit stack owned by [`Navigator`]. Drilling into a
//! post pushes a [`PostFrame`]; going back pops it and the [`ListFrame`]
//! underneath is shown exactly as it was left.

use std::sync::Arc;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::cache::{CacheError, ItemCache};
use crate::hackernews;
use crate::item::{Comment, ItemId, Post};
use crate::keymap::{self, Action};
use crate::render::{Highlighter, Renderer};
use crate::theme;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("nothing to show: {0}")]
    EmptyCollection(String),
    #[error(transparent)]
    Item(#[from] CacheError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl From<Rect> for Viewport {
    fn from(rect: Rect) -> Self {
        Self::new(rect.width, rect.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Action(Action),
    Resize { width: u16, height: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Selection over a non-empty sequence. Moving past either end wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    pub fn new(len: usize) -> Option<Self> {
        Self::at(0, len)
    }

    pub fn at(index: usize, len: usize) -> Option<Self> {
        (index < len).then_some(Self { index, len })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.len;
    }

    pub fn previous(&mut self) {
        self.index = if self.index == 0 {
            self.len - 1
        } else {
            self.index - 1
        };
    }

    /// "3 / 12" style position label.
    pub fn label(&self) -> String {
        format!("{} / {}", self.index + 1, self.len)
    }
}

/// Content shown for the selected id: the loaded value, or why it could not
/// be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    Loaded(T),
    Unavailable { id: ItemId, reason: String },
}

impl<T> Slot<T> {
    fn from_result(id: ItemId, result: Result<T, CacheError>) -> Self {
        match result {
            Ok(value) => Slot::Loaded(value),
            Err(err) => Slot::Unavailable {
                id,
                reason: err.to_string(),
            },
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Slot::Loaded(value) => Some(value),
            Slot::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    List,
    Post,
}

pub enum Transition {
    Stay,
    Push(Frame),
    Pop,
}

/// What a frame needs from its surroundings to handle an action.
pub struct Context<'a> {
    pub cache: &'a ItemCache,
    pub viewport: Viewport,
    pub highlighter: &'a Highlighter,
}

pub enum Frame {
    List(ListFrame),
    Post(PostFrame),
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::List(_) => FrameKind::List,
            Frame::Post(_) => FrameKind::Post,
        }
    }

    pub fn handle(&mut self, action: Action, ctx: &Context<'_>) -> Result<Transition, NavError> {
        match self {
            Frame::List(frame) => frame.handle(action, ctx),
            Frame::Post(frame) => frame.handle(action, ctx),
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        match self {
            Frame::List(_) => {}
            Frame::Post(frame) => frame.resize(viewport),
        }
    }

    pub fn draw(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        match self {
            Frame::List(list) => list.draw(frame, area),
            Frame::Post(post) => post.draw(frame, area),
        }
    }
}

/// Root list of posts, one shown at a time.
pub struct ListFrame {
    ids: Vec<ItemId>,
    cursor: Cursor,
    current: Slot<Arc<Post>>,
}

impl ListFrame {
    pub fn new(cache: &ItemCache) -> Result<Self, NavError> {
        let ids = cache.list_root_posts();
        let cursor = Cursor::new(ids.len())
            .ok_or_else(|| NavError::EmptyCollection("no root posts".to_string()))?;
        let mut frame = Self {
            current: Slot::Unavailable {
                id: ids[0],
                reason: "not loaded".to_string(),
            },
            ids,
            cursor,
        };
        frame.load_current(cache);
        Ok(frame)
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn selection(&self) -> usize {
        self.cursor.index()
    }

    pub fn selected_id(&self) -> ItemId {
        self.ids[self.cursor.index()]
    }

    pub fn current(&self) -> &Slot<Arc<Post>> {
        &self.current
    }

    fn load_current(&mut self, cache: &ItemCache) {
        let id = self.selected_id();
        self.current = Slot::from_result(id, cache.post(id));
    }

    pub fn handle(&mut self, action: Action, ctx: &Context<'_>) -> Result<Transition, NavError> {
        match action {
            Action::MoveLeft => {
                self.cursor.previous();
                self.load_current(ctx.cache);
            }
            Action::MoveRight => {
                self.cursor.next();
                self.load_current(ctx.cache);
            }
            Action::Select => {
                let id = self.selected_id();
                match PostFrame::new(id, ctx.cache, ctx.viewport, ctx.highlighter.clone()) {
                    Ok(post) => {
                        log::info!("opening post {id} with {} comments", post.child_ids.len());
                        self.current = Slot::Loaded(post.post.clone());
                        return Ok(Transition::Push(Frame::Post(post)));
                    }
                    Err(NavError::Item(err)) => {
                        // Keep what we show in step with the failure being reported.
                        self.current = Slot::Unavailable {
                            id: err.id(),
                            reason: err.to_string(),
                        };
                        return Err(NavError::Item(err));
                    }
                    Err(err) => return Err(err),
                }
            }
            Action::MoveUp
            | Action::MoveDown
            | Action::Back
            | Action::ToggleRead
            | Action::Quit
            | Action::ToggleHelp => {}
        }
        Ok(Transition::Stay)
    }

    pub fn draw(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
            .split(area);

        let id = self.selected_id();
        let mut lines = Vec::new();
        match &self.current {
            Slot::Loaded(post) => {
                lines.push(Line::from(Span::styled(post.title.clone(), theme::title_style())));
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    format!("{} comments · {}", post.child_ids.len(), hackernews::item_url(id)),
                    theme::secondary_style(),
                )));
            }
            Slot::Unavailable { id, reason } => {
                lines.push(Line::from(Span::styled(
                    format!("Could not find post {id}, it may have been [deleted]"),
                    theme::placeholder_style(),
                )));
                lines.push(Line::from(Span::styled(reason.clone(), theme::secondary_style())));
            }
        }
        let body = Paragraph::new(Text::from(lines))
            .block(theme::panel().title(Line::from(Span::styled(" Posts ", theme::title_style()))))
            .wrap(Wrap { trim: true });
        frame.render_widget(body, chunks[0]);

        let footer = Paragraph::new(self.cursor.label())
            .style(theme::secondary_style())
            .block(theme::panel());
        frame.render_widget(footer, chunks[1]);
    }
}

/// One post with its direct comments, walked one comment at a time.
pub struct PostFrame {
    post: Arc<Post>,
    child_ids: Vec<ItemId>,
    cursor: Cursor,
    comment: Slot<Comment>,
    renderer: Renderer,
    viewport: Viewport,
    content: Vec<Line<'static>>,
    scroll: u16,
}

impl PostFrame {
    pub fn new(
        post_id: ItemId,
        cache: &ItemCache,
        viewport: Viewport,
        highlighter: Highlighter,
    ) -> Result<Self, NavError> {
        let post = cache.post(post_id)?;
        let child_ids = cache.list_children(post_id)?;
        let cursor = Cursor::new(child_ids.len())
            .ok_or_else(|| NavError::EmptyCollection(format!("post {post_id} has no comments")))?;

        let mut frame = Self {
            comment: Slot::Unavailable {
                id: child_ids[0],
                reason: "not loaded".to_string(),
            },
            post,
            child_ids,
            cursor,
            renderer: Renderer::new(content_width(viewport), highlighter),
            viewport,
            content: Vec::new(),
            scroll: 0,
        };
        frame.load_current(cache);
        Ok(frame)
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn child_ids(&self) -> &[ItemId] {
        &self.child_ids
    }

    pub fn selection(&self) -> usize {
        self.cursor.index()
    }

    pub fn selected_id(&self) -> ItemId {
        self.child_ids[self.cursor.index()]
    }

    pub fn comment(&self) -> &Slot<Comment> {
        &self.comment
    }

    pub fn content(&self) -> &[Line<'static>] {
        &self.content
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn renderer_width(&self) -> usize {
        self.renderer.width()
    }

    /// "3 / 12" for the selected comment.
    pub fn position(&self) -> String {
        self.cursor.label()
    }

    pub fn handle(&mut self, action: Action, ctx: &Context<'_>) -> Result<Transition, NavError> {
        match action {
            Action::MoveLeft => {
                self.cursor.previous();
                self.load_current(ctx.cache);
            }
            Action::MoveRight => {
                self.cursor.next();
                self.load_current(ctx.cache);
            }
            Action::MoveUp => self.scroll = self.scroll.saturating_sub(1),
            Action::MoveDown => self.scroll = self.scroll.saturating_add(1).min(self.max_scroll()),
            Action::Select | Action::ToggleRead => self.toggle_read(ctx.cache)?,
            Action::Back => return Ok(Transition::Pop),
            Action::Quit | Action::ToggleHelp => {}
        }
        Ok(Transition::Stay)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.renderer.set_width(content_width(viewport));
        self.refresh_content();
    }

    fn load_current(&mut self, cache: &ItemCache) {
        let id = self.selected_id();
        self.comment = Slot::from_result(id, cache.comment(id));
        self.scroll = 0;
        self.refresh_content();
    }

    fn toggle_read(&mut self, cache: &ItemCache) -> Result<(), NavError> {
        if self.comment.loaded().is_none() {
            self.load_current(cache);
        }
        let updated = cache.toggle_read(self.selected_id())?;
        self.comment = Slot::Loaded(updated);
        Ok(())
    }

    fn refresh_content(&mut self) {
        self.content = match &self.comment {
            Slot::Loaded(comment) => self
                .renderer
                .render(&comment.body)
                .unwrap_or_else(|| vec![placeholder(format!("Comment {} was [deleted]", comment.id))]),
            Slot::Unavailable { id, reason } => vec![
                placeholder(format!("Comment {id} is unavailable")),
                Line::default(),
                Line::from(Span::styled(reason.clone(), theme::secondary_style())),
            ],
        };
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn content_height(&self) -> u16 {
        self.viewport
            .height
            .saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT)
    }

    fn max_scroll(&self) -> u16 {
        let lines = u16::try_from(self.content.len()).unwrap_or(u16::MAX);
        lines.saturating_sub(self.content_height())
    }

    fn at_bottom(&self) -> bool {
        self.scroll >= self.max_scroll()
    }

    pub fn draw(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        let (author, read) = match &self.comment {
            Slot::Loaded(comment) if !comment.author.is_empty() => {
                (hackernews::user_url(&comment.author), comment.read)
            }
            Slot::Loaded(comment) => ("?".to_string(), comment.read),
            Slot::Unavailable { .. } => ("?".to_string(), false),
        };
        let marker = if read {
            theme::MARKER_READ
        } else {
            theme::MARKER_UNREAD
        };
        let inner_width = chunks[0].width.saturating_sub(2) as usize;
        let header = Paragraph::new(spread(
            Span::styled(author, theme::secondary_style()),
            Span::styled(marker, theme::read_marker_style(read)),
            inner_width,
        ))
        .block(
            theme::panel().title(Line::from(Span::styled(
                format!(" {} ", self.post.title),
                theme::title_style(),
            ))),
        );
        frame.render_widget(header, chunks[0]);

        let body = Paragraph::new(Text::from(self.content.clone())).scroll((self.scroll, 0));
        frame.render_widget(body, chunks[1]);

        let more = if self.at_bottom() {
            theme::MARKER_AT_BOTTOM
        } else {
            theme::MARKER_MORE_BELOW
        };
        let footer = Paragraph::new(spread(
            Span::styled(self.position(), theme::secondary_style()),
            Span::styled(more, theme::secondary_style()),
            chunks[2].width.saturating_sub(2) as usize,
        ))
        .block(theme::panel())
        .alignment(Alignment::Left);
        frame.render_widget(footer, chunks[2]);
    }
}

fn content_width(viewport: Viewport) -> usize {
    usize::from(viewport.width.saturating_sub(1)).max(1)
}

fn placeholder(text: String) -> Line<'static> {
    Line::from(Span::styled(text, theme::placeholder_style()))
}

/// Puts `left` and `right` at opposite ends of a line `width` columns wide.
fn spread(left: Span<'static>, right: Span<'static>, width: usize) -> Line<'static> {
    let used = UnicodeWidthStr::width(left.content.as_ref())
        + UnicodeWidthStr::width(right.content.as_ref());
    let gap = " ".repeat(width.saturating_sub(used).max(1));
    Line::from(vec![left, Span::raw(gap), right])
}

/// Owns the frame stack and routes shell events to the frame on top.
pub struct Navigator {
    cache: Arc<ItemCache>,
    highlighter: Highlighter,
    stack: Vec<Frame>,
    viewport: Viewport,
    show_help: bool,
    status: Option<String>,
}

impl Navigator {
    pub fn new(
        cache: Arc<ItemCache>,
        viewport: Viewport,
        highlighter: Highlighter,
    ) -> Result<Self, NavError> {
        let root = ListFrame::new(&cache)?;
        Ok(Self {
            cache,
            highlighter,
            stack: vec![Frame::List(root)],
            viewport,
            show_help: false,
            status: None,
        })
    }

    pub fn current(&self) -> &Frame {
        self.stack
            .last()
            .expect("navigation stack always holds the root list")
    }

    fn current_mut(&mut self) -> &mut Frame {
        self.stack
            .last_mut()
            .expect("navigation stack always holds the root list")
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn handle(&mut self, event: Event) -> Flow {
        match event {
            Event::Resize { width, height } => {
                self.viewport = Viewport::new(width, height);
                let viewport = self.frame_viewport();
                self.current_mut().resize(viewport);
            }
            Event::Action(Action::Quit) => return Flow::Quit,
            Event::Action(Action::ToggleHelp) => {
                self.show_help = !self.show_help;
                let viewport = self.frame_viewport();
                self.current_mut().resize(viewport);
            }
            Event::Action(action) => self.dispatch(action),
        }
        Flow::Continue
    }

    fn dispatch(&mut self, action: Action) {
        let ctx = Context {
            cache: &self.cache,
            viewport: self.frame_viewport(),
            highlighter: &self.highlighter,
        };
        let top = self
            .stack
            .last_mut()
            .expect("navigation stack always holds the root list");

        match top.handle(action, &ctx) {
            Ok(Transition::Stay) => self.status = None,
            Ok(Transition::Push(frame)) => {
                self.status = None;
                self.stack.push(frame);
                // Help rows differ per frame kind.
                let viewport = self.frame_viewport();
                self.current_mut().resize(viewport);
                log::debug!("pushed frame, depth {}", self.stack.len());
            }
            Ok(Transition::Pop) => {
                self.status = None;
                if self.stack.len() > 1 {
                    self.stack.pop();
                    let viewport = self.frame_viewport();
                    self.current_mut().resize(viewport);
                    log::debug!("popped frame, depth {}", self.stack.len());
                }
            }
            Err(err) => {
                log::warn!("{action:?} failed: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    fn help_lines(&self) -> Vec<String> {
        keymap::help_lines(self.current().kind(), self.show_help)
    }

    fn help_height(&self) -> u16 {
        u16::try_from(self.help_lines().len()).unwrap_or(u16::MAX)
    }

    /// Space left for the frame once the status and help rows are taken.
    fn frame_viewport(&self) -> Viewport {
        Viewport::new(
            self.viewport.width,
            self.viewport
                .height
                .saturating_sub(STATUS_HEIGHT + self.help_height()),
        )
    }

    pub fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(STATUS_HEIGHT),
                Constraint::Length(self.help_height()),
            ])
            .split(frame.size());

        self.current().draw(frame, chunks[0]);

        if let Some(status) = &self.status {
            let status = Paragraph::new(status.clone()).style(theme::status_style());
            frame.render_widget(status, chunks[1]);
        }

        let help: Vec<Line> = self
            .help_lines()
            .into_iter()
            .map(|line| Line::from(Span::styled(line, theme::secondary_style())))
            .collect();
        frame.render_widget(Paragraph::new(Text::from(help)), chunks[2]);
    }
}

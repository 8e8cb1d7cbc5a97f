use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use regex::Regex;
use textwrap::{wrap, Options as WrapOptions, WordSeparator, WordSplitter};

/// A phrase to color wherever it appears as whole words, ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub phrase: String,
    pub color: Color,
}

impl Keyword {
    pub fn new(phrase: impl Into<String>, color: Color) -> Self {
        Self {
            phrase: phrase.into(),
            color,
        }
    }
}

/// Built-in table. Order matters: later entries repaint earlier matches, so
/// "remote only" wins over "remote".
pub fn default_keywords() -> Vec<Keyword> {
    vec![
        Keyword::new("remote", Color::Green),
        Keyword::new("onsite", Color::Yellow),
        Keyword::new("on-site", Color::Yellow),
        Keyword::new("hybrid", Color::Magenta),
        Keyword::new("visa", Color::Cyan),
        Keyword::new("full-time", Color::LightBlue),
        Keyword::new("full time", Color::LightBlue),
        Keyword::new("part-time", Color::LightBlue),
        Keyword::new("part time", Color::LightBlue),
        Keyword::new("contract", Color::LightBlue),
        Keyword::new("remote only", Color::LightGreen),
    ]
}

#[derive(Debug, Clone)]
pub struct Highlighter {
    patterns: Vec<(Regex, Color)>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(&default_keywords()).expect("valid default keyword patterns")
    }
}

impl Highlighter {
    pub fn new(keywords: &[Keyword]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let words: Vec<String> = keyword
                .phrase
                .split_whitespace()
                .map(regex::escape)
                .collect();
            if words.is_empty() {
                continue;
            }
            let phrase = keyword.phrase.trim();
            // `\b` only matches next to a word character, so "c++" gets no
            // trailing boundary.
            let lead = if phrase.starts_with(is_word_char) { r"\b" } else { "" };
            let trail = if phrase.ends_with(is_word_char) { r"\b" } else { "" };
            let pattern = format!(r"(?i){lead}{}{trail}", words.join(r"\s+"));
            let regex = Regex::new(&pattern)
                .with_context(|| format!("compile keyword {:?}", keyword.phrase))?;
            patterns.push((regex, keyword.color));
        }
        Ok(Self { patterns })
    }

    /// Defaults followed by `extra`.
    pub fn with_extra(extra: &[Keyword]) -> Result<Self> {
        let mut keywords = default_keywords();
        keywords.extend(extra.iter().cloned());
        Self::new(&keywords)
    }

    /// Per-byte color of `text`, applying patterns in table order.
    pub fn mask(&self, text: &str) -> Vec<Option<Color>> {
        let mut mask = vec![None; text.len()];
        for (regex, color) in &self.patterns {
            for found in regex.find_iter(text) {
                for slot in &mut mask[found.range()] {
                    *slot = Some(*color);
                }
            }
        }
        mask
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Turns a comment's HTML body into wrapped, highlighted lines. Holds only the
/// target width, which is updated in place when the terminal is resized.
#[derive(Debug, Clone)]
pub struct Renderer {
    width: usize,
    highlighter: Highlighter,
}

impl Renderer {
    pub fn new(width: usize, highlighter: Highlighter) -> Self {
        Self {
            width: width.max(1),
            highlighter,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn set_width(&mut self, width: usize) {
        self.width = width.max(1);
    }

    /// `None` when the body has no visible text.
    pub fn render(&self, raw: &str) -> Option<Vec<Line<'static>>> {
        let plain = strip_markup(raw)?;
        let mask = self.highlighter.mask(&plain);
        Some(wrap_highlighted(&plain, &mask, self.width))
    }
}

/// Converts an HN comment body to plain text. `None` when nothing but
/// whitespace is left.
pub fn strip_markup(raw: &str) -> Option<String> {
    static PARAGRAPH_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)<\s*/?\s*p\s*/?\s*>").expect("valid paragraph regex"));
    static BREAK_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)<\s*br\s*/?\s*>").expect("valid break regex"));
    static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = PARAGRAPH_RE.replace_all(&text, "\n\n");
    let text = BREAK_RE.replace_all(&text, "\n");
    let text = TAG_RE.replace_all(&text, "");
    let text = html_escape::decode_html_entities(&text).replace('\u{a0}', " ");

    let mut lines: Vec<&str> = Vec::new();
    for line in text.split('\n').map(str::trim_end) {
        let blank = line.trim().is_empty();
        if blank && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(if blank { "" } else { line });
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Wraps each hard line of `text` at whitespace. `mask` holds one color slot per
/// byte of `text`.
pub fn wrap_highlighted(text: &str, mask: &[Option<Color>], width: usize) -> Vec<Line<'static>> {
    let options = WrapOptions::new(width.max(1))
        .break_words(false)
        .word_separator(WordSeparator::AsciiSpace)
        .word_splitter(WordSplitter::NoHyphenation);

    let mut lines = Vec::new();
    let mut offset = 0;
    for hard in text.split('\n') {
        let start = offset;
        offset += hard.len() + 1;
        if hard.trim().is_empty() {
            lines.push(Line::default());
            continue;
        }

        let mut cursor = 0;
        for piece in wrap(hard, &options) {
            let piece = piece.as_ref();
            match hard[cursor..].find(piece) {
                Some(found) => {
                    let at = cursor + found;
                    let end = at + piece.len();
                    lines.push(styled_line(
                        &text[start + at..start + end],
                        &mask[start + at..start + end],
                    ));
                    cursor = end;
                }
                None => lines.push(Line::from(piece.to_string())),
            }
        }
    }
    lines
}

fn styled_line(text: &str, mask: &[Option<Color>]) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run_start = 0;
    let mut run_color = mask.first().copied().flatten();
    for (idx, _) in text.char_indices().skip(1) {
        let color = mask[idx];
        if color != run_color {
            spans.push(color_span(&text[run_start..idx], run_color));
            run_start = idx;
            run_color = color;
        }
    }
    if run_start < text.len() {
        spans.push(color_span(&text[run_start..], run_color));
    }
    Line::from(spans)
}

fn color_span(text: &str, color: Option<Color>) -> Span<'static> {
    match color {
        Some(color) => Span::styled(text.to_string(), Style::default().fg(color)),
        None => Span::raw(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn words(lines: &[Line<'_>]) -> Vec<String> {
        plain(lines)
            .iter()
            .flat_map(|line| {
                line.split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn colored(lines: &[Line<'_>]) -> Vec<(String, Color)> {
        lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter_map(|span| span.style.fg.map(|fg| (span.content.to_string(), fg)))
            .collect()
    }

    #[test]
    fn strips_tags_and_decodes_entities() {
        let raw = "Acme Corp | Rust engineer<p>We&#x27;re hiring &amp; <i>growing</i>: \
                   <a href=\"https://acme.example/jobs\" rel=\"nofollow\">https://acme.example/jobs</a>";
        assert_eq!(
            strip_markup(raw).unwrap(),
            "Acme Corp | Rust engineer\n\nWe're hiring & growing: https://acme.example/jobs"
        );
    }

    #[test]
    fn escaped_markup_is_kept_as_text() {
        assert_eq!(strip_markup("use &lt;p&gt; tags").unwrap(), "use <p> tags");
    }

    #[test]
    fn blank_bodies_have_no_content() {
        assert_eq!(strip_markup(""), None);
        assert_eq!(strip_markup("   \n\t"), None);
        assert_eq!(strip_markup("<p><p> <i></i>"), None);
        assert!(Renderer::new(40, Highlighter::default()).render("<p>").is_none());
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(strip_markup("a<p><p><p>b<br>c").unwrap(), "a\n\nb\nc");
    }

    #[test]
    fn wraps_at_whitespace_and_keeps_hard_breaks() {
        let renderer = Renderer::new(10, Highlighter::new(&[]).unwrap());
        let lines = renderer.render("alpha beta gamma<br>delta").unwrap();
        assert_eq!(plain(&lines), vec!["alpha beta", "gamma", "delta"]);
    }

    #[test]
    fn long_words_are_not_split() {
        let renderer = Renderer::new(5, Highlighter::new(&[]).unwrap());
        let lines = renderer.render("a extraordinarily b").unwrap();
        assert_eq!(plain(&lines), vec!["a", "extraordinarily", "b"]);
    }

    #[test]
    fn highlights_whole_words_only_ignoring_case() {
        let renderer = Renderer::new(80, Highlighter::default());
        let lines = renderer.render("REMOTE friendly, remoteness aside").unwrap();
        assert_eq!(colored(&lines), vec![("REMOTE".to_string(), Color::Green)]);
        assert_eq!(plain(&lines), vec!["REMOTE friendly, remoteness aside"]);
    }

    #[test]
    fn later_patterns_repaint_earlier_matches() {
        let renderer = Renderer::new(80, Highlighter::default());
        let lines = renderer.render("Remote only; remote ok").unwrap();
        assert_eq!(
            colored(&lines),
            vec![
                ("Remote only".to_string(), Color::LightGreen),
                ("remote".to_string(), Color::Green),
            ]
        );

        let reversed = Highlighter::new(&[
            Keyword::new("remote only", Color::LightGreen),
            Keyword::new("remote", Color::Green),
        ])
        .unwrap();
        let lines = Renderer::new(80, reversed).render("Remote only").unwrap();
        assert_eq!(
            colored(&lines),
            vec![
                ("Remote".to_string(), Color::Green),
                (" only".to_string(), Color::LightGreen),
            ]
        );
    }

    #[test]
    fn phrases_are_highlighted_before_wrapping() {
        let renderer = Renderer::new(6, Highlighter::default());
        let lines = renderer.render("x full time").unwrap();
        assert_eq!(plain(&lines), vec!["x full", "time"]);
        assert_eq!(
            colored(&lines),
            vec![
                ("full".to_string(), Color::LightBlue),
                ("time".to_string(), Color::LightBlue),
            ]
        );
    }

    #[test]
    fn extra_keywords_follow_defaults() {
        let highlighter =
            Highlighter::with_extra(&[Keyword::new("rust", Color::Rgb(255, 102, 0))]).unwrap();
        let lines = Renderer::new(80, highlighter)
            .render("Rust, remote")
            .unwrap();
        assert_eq!(
            colored(&lines),
            vec![
                ("Rust".to_string(), Color::Rgb(255, 102, 0)),
                ("remote".to_string(), Color::Green),
            ]
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let body = "Initech | Onsite or Hybrid | VISA sponsorship<p>Full-time and contract roles.";
        let renderer = Renderer::new(24, Highlighter::default());
        assert_eq!(renderer.render(body), renderer.render(body));
    }

    #[test]
    fn narrower_width_only_moves_breaks() {
        let body = "Acme | Senior Backend Engineer | Remote (US) | Full-time<p>\
                    We build tools for hiring threads &amp; love small, focused teams.";
        let mut renderer = Renderer::new(80, Highlighter::default());
        let wide = renderer.render(body).unwrap();
        renderer.set_width(12);
        let narrow = renderer.render(body).unwrap();
        assert!(narrow.len() > wide.len());
        assert_eq!(words(&wide), words(&narrow));
    }

    #[test]
    fn urls_are_never_split() {
        let body = "see https://acme.example/jobs/rust now";
        let mut renderer = Renderer::new(80, Highlighter::default());
        let wide = renderer.render(body).unwrap();
        renderer.set_width(12);
        let narrow = renderer.render(body).unwrap();
        assert_eq!(
            plain(&narrow),
            vec!["see", "https://acme.example/jobs/rust", "now"]
        );
        assert_eq!(words(&wide), words(&narrow));
    }

    #[test]
    fn keywords_ending_in_symbols_are_highlighted() {
        let highlighter = Highlighter::with_extra(&[
            Keyword::new("c++", Color::Red),
            Keyword::new("c#", Color::Magenta),
            Keyword::new(".net", Color::Blue),
        ])
        .unwrap();
        let lines = Renderer::new(80, highlighter)
            .render("C++ and C# devs, ASP.NET welcome, abc++ not")
            .unwrap();
        assert_eq!(
            colored(&lines),
            vec![
                ("C++".to_string(), Color::Red),
                ("C#".to_string(), Color::Magenta),
                (".NET".to_string(), Color::Blue),
            ]
        );
    }

    #[test]
    fn width_never_drops_below_one() {
        let mut renderer = Renderer::new(0, Highlighter::default());
        assert_eq!(renderer.width(), 1);
        renderer.set_width(0);
        assert_eq!(renderer.width(), 1);
        assert_eq!(
            plain(&renderer.render("a b").unwrap()),
            vec!["a", "b"]
        );
    }
}

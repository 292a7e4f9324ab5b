/*!
format.rs

Terminal formatting for the human output paths of `nfc-info`.

  - Color / emoji decisions are centralized in `StyleOptions` (NO_COLOR,
    NO_EMOJI, COLUMNS).
  - Everything here returns strings; nothing prints or logs.
  - JSON output paths do not use these helpers.

Public API Summary:
  - StyleOptions::detect() / StyleOptions::plain(width)
  - color(role, text, &StyleOptions) -> String
  - emoji(tag, &StyleOptions) -> &'static str
  - box_header(title, subtitle_opt, &StyleOptions) -> String
  - panel(title, lines, &StyleOptions) -> String
  - table(headers, rows, TableOpts, &StyleOptions) -> String
  - hyperlink(url, text, &StyleOptions) -> String
  - inline_markdown(text, &StyleOptions) -> String
  - wrap_text(s, max_width) -> Vec<String>
  - truncate_ellipsis(s, max_chars) -> String
*/

use std::borrow::Cow;

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub use_emoji: bool,
    pub term_width: usize,
    pub box_style: BoxStyle,
    pub padding: usize,
}

#[derive(Debug, Clone, Copy)]
pub enum BoxStyle {
    Light,   // ─ │ ┌ ┐ └ ┘
    Rounded, // ╭ ╮ ╰ ╯
}

impl BoxStyle {
    fn glyphs(self) -> (char, char, char, char, char, char) {
        match self {
            BoxStyle::Light => ('─', '│', '┌', '┐', '└', '┘'),
            BoxStyle::Rounded => ('─', '│', '╭', '╮', '╰', '╯'),
        }
    }
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let use_color = std::env::var_os("NO_COLOR").is_none();
        let use_emoji = std::env::var_os("NO_EMOJI").is_none();

        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color,
            use_emoji,
            term_width: width,
            box_style: BoxStyle::Rounded,
            padding: 1,
        }
    }

    /// No color, no emoji, fixed width. Used for deterministic output.
    pub fn plain(width: usize) -> Self {
        StyleOptions {
            use_color: false,
            use_emoji: false,
            term_width: width.max(20),
            box_style: BoxStyle::Light,
            padding: 1,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color / Emoji                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Success,
    Warning,
    Dim,
    Bold,
    Italic,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",    // cyan-ish
        Role::Secondary => "38;5;250", // gray
        Role::Accent => "38;5;213",    // magenta/pink
        Role::Success => "38;5;82",    // green
        Role::Warning => "38;5;214",   // orange
        Role::Dim => "2",              // faint
        Role::Bold => "1",
        Role::Italic => "3",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

pub fn emoji(tag: &str, style: &StyleOptions) -> &'static str {
    if !style.use_emoji {
        return "";
    }
    match tag {
        "success" => "✔",
        "error" => "✖",
        "warn" => "⚠",
        "info" => "ℹ",
        "tool" => "🛠",
        "list" => "📜",
        "clock" => "⏱",
        "globe" => "🌐",
        "wrench" => "🔧",
        "book" => "📖",
        "inbox" => "📥",
        "outbox" => "📤",
        "computer" => "💻",
        _ => "",
    }
}

/// `emoji` followed by a space, or nothing when emoji are disabled.
pub fn emoji_prefix(tag: &str, style: &StyleOptions) -> String {
    match emoji(tag, style) {
        "" => String::new(),
        e => format!("{e} "),
    }
}

/* -------------------------------------------------------------------------- */
/* Links / Inline Markdown                                                    */
/* -------------------------------------------------------------------------- */

/// OSC 8 terminal hyperlink; plain `text` when color is off.
pub fn hyperlink(url: &str, text: &str, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.to_string();
    }
    format!("\x1b]8;;{url}\x1b\\{text}\x1b]8;;\x1b\\")
}

/// Inline markdown for descriptions: `**bold**`, `*italic*` / `_italic_`,
/// `` `code` `` and `[text](url)`. Markers are dropped when color is off;
/// unmatched markers are kept verbatim.
pub fn inline_markdown(text: &str, style: &StyleOptions) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(['*', '_', '`', '[']) {
        let (before, tail) = rest.split_at(start);
        out.push_str(before);
        // snake_case identifiers are not emphasis
        let word_inner = tail.starts_with('_')
            && out.chars().last().is_some_and(|c| c.is_alphanumeric());
        match inline_span(tail, style).filter(|_| !word_inner) {
            Some((rendered, used)) => {
                out.push_str(&rendered);
                rest = &tail[used..];
            }
            None => {
                let step = tail.chars().next().map(char::len_utf8).unwrap_or(1);
                out.push_str(&tail[..step]);
                rest = &tail[step..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render the span opening at the start of `tail`; returns the styled text
/// and the number of bytes consumed.
fn inline_span(tail: &str, style: &StyleOptions) -> Option<(String, usize)> {
    if let Some(inner) = tail.strip_prefix("**") {
        let end = inner.find("**").filter(|e| *e > 0)?;
        return Some((color(Role::Bold, &inner[..end], style), end + 4));
    }
    if let Some(inner) = tail.strip_prefix('`') {
        let end = inner.find('`').filter(|e| *e > 0)?;
        return Some((color(Role::Accent, &inner[..end], style), end + 2));
    }
    if let Some(inner) = tail.strip_prefix('[') {
        let close = inner.find("](")?;
        let target = &inner[close + 2..];
        let end = target.find(')')?;
        let rendered = hyperlink(&target[..end], &inner[..close], style);
        return Some((rendered, 1 + close + 2 + end + 1));
    }
    let marker = tail.chars().next()?;
    let inner = &tail[1..];
    if inner.starts_with(char::is_whitespace) {
        return None;
    }
    let end = inner.find(marker).filter(|e| *e > 0)?;
    Some((color(Role::Italic, &inner[..end], style), end + 2))
}

/* -------------------------------------------------------------------------- */
/* Box Header / Panel                                                         */
/* -------------------------------------------------------------------------- */

pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let title_styled = color(Role::Primary, title.as_ref(), style);
    let inner = match subtitle {
        Some(s) => format!("{title_styled}  {}", color(Role::Secondary, s.as_ref(), style)),
        None => title_styled,
    };
    boxed(None, &[inner], style)
}

/// Box with `title` embedded in the top border and `lines` as the body.
/// Long lines wrap to the terminal width.
pub fn panel(title: &str, lines: &[String], style: &StyleOptions) -> String {
    boxed(Some(title), lines, style)
}

fn boxed(title: Option<&str>, lines: &[String], style: &StyleOptions) -> String {
    let (h, v, tl, tr, bl, br) = style.box_style.glyphs();
    let padding = style.padding;
    let max_inner = style.term_width.clamp(20, 200) - 2 - padding * 2;

    let mut body: Vec<String> = Vec::new();
    for line in lines {
        if display_width(line) <= max_inner {
            body.push(line.clone());
        } else {
            body.extend(wrap_ansi(line, max_inner, style));
        }
    }

    let title_width = title.map(|t| display_width(t) + 4).unwrap_or(0);
    let content = body
        .iter()
        .map(|l| display_width(l))
        .max()
        .unwrap_or(0)
        .max(title_width.saturating_sub(padding * 2))
        .min(max_inner);
    let total_inner = content + padding * 2;

    let mut out: Vec<String> = Vec::with_capacity(body.len() + 2);
    match title {
        Some(t) => {
            let label = format!(" {} ", color(Role::Bold, t, style));
            let used = display_width(&label) + 1;
            let fill = total_inner.saturating_sub(used);
            out.push(format!("{tl}{h}{label}{}{tr}", h.to_string().repeat(fill)));
        }
        None => out.push(format!("{tl}{}{tr}", h.to_string().repeat(total_inner))),
    }
    let pad = " ".repeat(padding);
    for line in &body {
        let spaces = content.saturating_sub(display_width(line));
        out.push(format!("{v}{pad}{line}{}{pad}{v}", " ".repeat(spaces)));
    }
    out.push(format!("{bl}{}{br}", h.to_string().repeat(total_inner)));
    out.join("\n")
}

/* -------------------------------------------------------------------------- */
/* Table Rendering                                                            */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct TableOpts {
    pub max_width: usize,
    /// Wrap long cells onto several lines instead of truncating them.
    pub wrap: bool,
    pub header_sep: bool,
    pub row_sep: bool,
    pub min_col_width: usize,
    /// Per-column alignment; missing entries are left-aligned.
    pub align: Vec<Align>,
}

impl Default for TableOpts {
    fn default() -> Self {
        Self {
            max_width: 0, // 0 -> auto style.term_width
            wrap: false,
            header_sep: true,
            row_sep: false,
            min_col_width: 4,
            align: Vec::new(),
        }
    }
}

pub fn table(
    headers: &[&str],
    rows: &[Vec<String>],
    opts: TableOpts,
    style: &StyleOptions,
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let col_count = headers.len();
    let width_limit = if opts.max_width == 0 {
        style.term_width
    } else {
        opts.max_width.min(style.term_width)
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    // Greedy shrink from the widest columns.
    let total_raw: usize = widths.iter().sum::<usize>() + (col_count - 1) * 2;
    if total_raw > width_limit {
        let mut overflow = total_raw - width_limit;
        let mut ordered: Vec<(usize, usize)> = widths.iter().copied().enumerate().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        for (idx, _) in ordered {
            if overflow == 0 {
                break;
            }
            let floor = opts.min_col_width.max(display_width(headers[idx]));
            if widths[idx] > floor {
                let shrink = (widths[idx] - floor).min(overflow);
                widths[idx] -= shrink;
                overflow -= shrink;
            }
        }
    }
    let align_of = |i: usize| opts.align.get(i).copied().unwrap_or_default();

    let mut out: Vec<String> = Vec::new();
    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, h)| color(Role::Accent, fit(h, widths[i], align_of(i)), style))
        .collect::<Vec<_>>()
        .join("  ");
    out.push(header_line);

    let separator = |ch: &str| {
        let line = widths
            .iter()
            .map(|w| ch.repeat(*w))
            .collect::<Vec<_>>()
            .join("  ");
        color(Role::Dim, line, style)
    };
    if opts.header_sep {
        out.push(separator("-"));
    }

    for (r_idx, row) in rows.iter().enumerate() {
        if opts.row_sep && r_idx > 0 {
            out.push(separator("┈"));
        }
        let cells: Vec<Vec<String>> = (0..col_count)
            .map(|c| {
                let raw = row.get(c).map(|s| s.as_str()).unwrap_or("");
                if opts.wrap && display_width(raw) > widths[c] {
                    wrap_ansi(raw, widths[c], style)
                } else {
                    vec![raw.to_string()]
                }
            })
            .collect();
        let height = cells.iter().map(Vec::len).max().unwrap_or(1);
        for line_idx in 0..height {
            let line = cells
                .iter()
                .enumerate()
                .map(|(c, lines)| {
                    let text = lines.get(line_idx).map(|s| s.as_str()).unwrap_or("");
                    fit(text, widths[c], align_of(c))
                })
                .collect::<Vec<_>>()
                .join("  ");
            out.push(line.trim_end().to_string());
        }
    }

    out.join("\n")
}

/// Pad to `width` honoring `align`, truncating with an ellipsis when longer.
fn fit(s: &str, width: usize, align: Align) -> String {
    let len = display_width(s);
    if len > width {
        let cut = truncate_ellipsis(&strip_ansi(s), width);
        let pad = width.saturating_sub(cut.chars().count());
        return format!("{cut}{}", " ".repeat(pad));
    }
    let pad = " ".repeat(width - len);
    match align {
        Align::Left => format!("{s}{pad}"),
        Align::Right => format!("{pad}{s}"),
    }
}

/* -------------------------------------------------------------------------- */
/* Text Helpers                                                               */
/* -------------------------------------------------------------------------- */

/// Word wrap on visible width. Words longer than `max_width` are broken
/// across lines instead of overflowing.
pub fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![s.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in s.split_whitespace() {
        for piece in break_word(word, max_width) {
            if !current.is_empty() && display_width(&current) + display_width(&piece) + 1 > max_width
            {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split `word` into chunks of at most `width` visible characters; escape
/// sequences stay whole and stick to the chunk they follow.
fn break_word(word: &str, width: usize) -> Vec<String> {
    if display_width(word) <= width {
        return vec![word.to_string()];
    }
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_width = 0;
    for unit in ansi_units(word) {
        let visible = !unit.starts_with('\x1b');
        if visible && chunk_width == width {
            chunks.push(std::mem::take(&mut chunk));
            chunk_width = 0;
        }
        chunk.push_str(unit);
        if visible {
            chunk_width += 1;
        }
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    chunks
}

const OSC8_CLOSE: &str = "\x1b]8;;\x1b\\";

/// `wrap_text` for styled strings. Every line is self-contained: styles and
/// hyperlinks still open at a break are closed at the end of the line and
/// reopened at the start of the next one.
fn wrap_ansi(s: &str, max_width: usize, style: &StyleOptions) -> Vec<String> {
    let lines = wrap_text(s, max_width);
    if !style.use_color {
        return lines;
    }
    let mut sgr = String::new();
    let mut link: Option<String> = None;
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let mut rendered = sgr.clone();
        if let Some(open) = &link {
            rendered.push_str(open);
        }
        for unit in ansi_units(&line).filter(|u| u.starts_with('\x1b')) {
            if unit.starts_with("\x1b]8;") {
                link = (!is_link_close(unit)).then(|| unit.to_string());
            } else if unit == "\x1b[0m" || unit == "\x1b[m" {
                sgr.clear();
            } else if unit.starts_with("\x1b[") && unit.ends_with('m') {
                sgr.push_str(unit);
            }
        }
        rendered.push_str(&line);
        if link.is_some() {
            rendered.push_str(OSC8_CLOSE);
        }
        if rendered.contains('\x1b') {
            rendered.push_str("\x1b[0m");
        }
        out.push(rendered);
    }
    out
}

/// `ESC ] 8 ; params ; ESC \` with an empty URI ends a hyperlink.
fn is_link_close(osc: &str) -> bool {
    let body = osc
        .trim_start_matches("\x1b]8;")
        .trim_end_matches("\x1b\\")
        .trim_end_matches('\x07');
    body.split_once(';').is_none_or(|(_, uri)| uri.is_empty())
}

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".into();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/* -------------------------------------------------------------------------- */
/* ANSI / Width Utilities                                                     */
/* -------------------------------------------------------------------------- */

/// Split into units: one escape sequence (CSI `ESC [ ... letter`, OSC
/// `ESC ] ... ESC \` or BEL) or one visible character each.
fn ansi_units(s: &str) -> impl Iterator<Item = &str> {
    let mut rest = s;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let len = if first != '\x1b' {
            first.len_utf8()
        } else if let Some(body) = rest.strip_prefix("\x1b[") {
            body.find(|c: char| c.is_ascii_alphabetic())
                .map_or(rest.len(), |i| i + 3)
        } else if let Some(body) = rest.strip_prefix("\x1b]") {
            match body.find(['\x07', '\x1b']) {
                Some(i) if body[i..].starts_with("\x1b\\") => i + 4,
                Some(i) => i + 3,
                None => rest.len(),
            }
        } else {
            1
        };
        let (unit, tail) = rest.split_at(len);
        rest = tail;
        Some(unit)
    })
}

/// Remove CSI and OSC sequences.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(ansi_units(s).filter(|u| !u.starts_with('\x1b')).collect())
}

pub fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */

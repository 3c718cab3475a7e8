use crate::codec;
use crate::types::{CodeRecord, SearchResult};
use crossterm::style::{ContentStyle, Stylize};
use crossterm::{cursor, execute, terminal};
use std::io::{self, IsTerminal, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const DEFAULT_WIDTH: usize = 100;
const MIN_WIDTH: usize = 20;
const TAB: &str = "    ";

pub struct Renderer<W: Write> {
    out: W,
    width: usize,
    color: bool,
    interactive: bool,
}

impl Renderer<io::Stdout> {
    /// Renderer on stdout, sized to the terminal when there is one
    pub fn stdout() -> Self {
        let out = io::stdout();
        let interactive = out.is_terminal();
        let width = terminal::size()
            .map(|(cols, _)| cols as usize)
            .unwrap_or(DEFAULT_WIDTH);

        Self {
            out,
            width: width.max(MIN_WIDTH),
            color: interactive,
            interactive,
        }
    }
}

impl<W: Write> Renderer<W> {
    /// Plain renderer (no colour, no terminal control)
    pub fn new(out: W) -> Self {
        Self {
            out,
            width: DEFAULT_WIDTH,
            color: false,
            interactive: false,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(MIN_WIDTH);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Set the terminal window title. No-op when not on a terminal.
    pub fn set_title(&mut self, text: &str) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        let title = format!("Searchcode v{} - {}", env!("CARGO_PKG_VERSION"), text);
        execute!(self.out, terminal::SetTitle(title))
    }

    /// Clear the screen and scrollback. No-op when not on a terminal.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        if !self.interactive {
            return Ok(());
        }
        execute!(
            self.out,
            terminal::Clear(terminal::ClearType::All),
            terminal::Clear(terminal::ClearType::Purge),
            cursor::MoveTo(0, 0)
        )
    }

    /// One panel per result: header line, divider, matched lines with numbers.
    pub fn print_results(&mut self, results: &[SearchResult]) -> io::Result<()> {
        for result in results {
            let filename = result.filename().unwrap_or("Unknown");
            let repo = result.repo().unwrap_or("Unknown");
            let language = result.language().unwrap_or("text");
            let lines_count = result
                .lines_count()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "??".to_string());

            let header = [
                (filename.to_string(), ContentStyle::new().bold()),
                (" (".to_string(), ContentStyle::new()),
                (repo.to_string(), ContentStyle::new().blue()),
                (format!(") {language} · "), ContentStyle::new()),
                (lines_count, ContentStyle::new().cyan()),
                (" lines".to_string(), ContentStyle::new()),
            ];

            let body: Vec<(String, String)> = result
                .lines()
                .into_iter()
                .map(|(number, text)| (format!("{number:>4}"), text.trim_end().to_string()))
                .collect();

            self.panel(Some(&header[..]), &body)?;
        }
        Ok(())
    }

    /// Full file with line numbers, or a notice when the record is empty
    pub fn print_code(&mut self, record: &CodeRecord, id: u64) -> io::Result<()> {
        let Some(code) = record.code.as_deref() else {
            let mark = self.paint("✘", ContentStyle::new().yellow().bold());
            let notice = self.paint(&format!("No matching file found: {id}."), ContentStyle::new().yellow());
            return writeln!(self.out, "{mark} {notice}");
        };

        let language = record.language.as_deref().unwrap_or("text");
        let header = [
            (format!("{id}"), ContentStyle::new().bold()),
            (format!(" {language}"), ContentStyle::new().cyan()),
        ];
        self.panel(Some(&header[..]), &numbered(code))
    }

    /// Raw JSONP payload with line numbers
    pub fn print_jsonp(&mut self, jsonp: &str) -> io::Result<()> {
        self.panel(None, &numbered(jsonp))
    }

    /// Results re-encoded to JSON and pretty-printed
    pub fn print_pretty(&mut self, results: &[SearchResult]) -> io::Result<()> {
        let value = serde_json::Value::Array(
            results.iter().map(|result| codec::encode(result.as_tree())).collect(),
        );
        let text = serde_json::to_string_pretty(&value).map_err(io::Error::other)?;
        writeln!(self.out, "{text}")
    }

    pub fn print_summary(&mut self, shown: usize, total: u64, query: &str) -> io::Result<()> {
        let shown = self.paint(&shown.to_string(), ContentStyle::new().cyan());
        let total = self.paint(&total.to_string(), ContentStyle::new().cyan());
        writeln!(self.out, "Showing {shown} of {total} results for '{query}'")
    }

    pub fn print_no_results(&mut self, query: &str) -> io::Result<()> {
        let mark = self.paint("✘", ContentStyle::new().yellow().bold());
        let query = self.paint(query, ContentStyle::new().yellow().bold());
        writeln!(self.out, "{mark} No results found for {query}.")
    }

    /// Centred block of text (license notices)
    pub fn print_centered(&mut self, text: &str) -> io::Result<()> {
        for line in text.lines() {
            let line = line.trim();
            let pad = self.width.saturating_sub(line.width()) / 2;
            writeln!(self.out, "{}{}", " ".repeat(pad), line)?;
        }
        Ok(())
    }

    fn panel(&mut self, header: Option<&[(String, ContentStyle)]>, body: &[(String, String)]) -> io::Result<()> {
        let inner = self.width - 4;
        let border = ContentStyle::new().dark_grey();
        let rule = "─".repeat(inner + 2);
        let bar = self.paint("│", border);

        let top = self.paint(&format!("╭{rule}╮"), border);
        writeln!(self.out, "{top}")?;

        if let Some(parts) = header {
            let plain: String = parts.iter().map(|(text, _)| text.as_str()).collect();
            let (styled, shown) = if plain.width() <= inner {
                let styled: String = parts.iter().map(|(text, style)| self.paint(text, *style)).collect();
                (styled, plain.width())
            } else {
                let cut = fit(&plain, inner);
                let shown = cut.width();
                (cut, shown)
            };
            let pad = " ".repeat(inner - shown);
            let divider = self.paint(&format!("├{rule}┤"), border);
            writeln!(self.out, "{bar} {styled}{pad} {bar}")?;
            writeln!(self.out, "{divider}")?;
        }

        for (gutter, text) in body {
            let text = text.replace('\t', TAB);
            let room = inner.saturating_sub(gutter.width() + 1);
            let text = fit(&text, room);
            let pad = " ".repeat(room.saturating_sub(text.width()));
            let gutter = self.paint(gutter, ContentStyle::new().dark_grey());
            writeln!(self.out, "{bar} {gutter} {text}{pad} {bar}")?;
        }

        let bottom = self.paint(&format!("╰{rule}╯"), border);
        writeln!(self.out, "{bottom}")
    }

    fn paint(&self, text: &str, style: ContentStyle) -> String {
        if self.color {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Number every line of `text` starting at 1
fn numbered(text: &str) -> Vec<(String, String)> {
    let digits = text.lines().count().max(1).to_string().len().max(4);
    text.lines()
        .enumerate()
        .map(|(idx, line)| (format!("{:>digits$}", idx + 1), line.trim_end().to_string()))
        .collect()
}

/// Cut `text` to at most `width` display columns, marking the cut with `…`
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

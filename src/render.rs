use std::fmt::Write;

use colored::{ColoredString, Colorize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Theme {
    pub color: bool,
}

impl Theme {
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Colour is forced on: the caller has already checked the terminal.
    pub fn colored() -> Self {
        colored::control::set_override(true);
        Self { color: true }
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        if self.color {
            tone.apply(text).to_string()
        } else {
            text.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Green,
    Blue,
    Orange,
    Muted,
}

impl Tone {
    fn apply(self, text: &str) -> ColoredString {
        match self {
            Tone::Red => text.red(),
            Tone::Green => text.green(),
            Tone::Blue => text.blue(),
            Tone::Orange => text.yellow(),
            Tone::Muted => text.dimmed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

impl Badge {
    pub fn new(label: impl Into<String>, tone: Tone) -> Self {
        Self {
            label: label.into(),
            tone,
        }
    }

    pub fn render(&self, theme: Theme) -> String {
        theme.paint(self.tone, &format!("[{}]", self.label))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub title: &'static str,
    pub value: String,
    pub caption: &'static str,
}

pub fn heading(out: &mut String, level: usize, title: &str) {
    let _ = writeln!(out, "{} {}", "#".repeat(level.max(1)), title);
}

pub fn caption(out: &mut String, theme: Theme, text: &str) {
    let _ = writeln!(out, "{}", theme.paint(Tone::Muted, text));
}

pub fn tiles(out: &mut String, theme: Theme, tiles: &[Tile]) {
    for tile in tiles {
        let _ = writeln!(
            out,
            "- {}: {} {}",
            tile.title,
            tile.value,
            theme.paint(Tone::Muted, &format!("({})", tile.caption))
        );
    }
}

/// Inline notice such as an error card or an empty-state line.
pub fn notice(out: &mut String, theme: Theme, tone: Tone, text: &str) {
    let marker = match tone {
        Tone::Red | Tone::Orange => "!",
        _ => ">",
    };
    let _ = writeln!(out, "{}", theme.paint(tone, &format!("{marker} {text}")));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Cells(Vec<String>),
    /// A single cell spanning every column.
    Span(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(Row::Cells(cells));
    }

    pub fn span(&mut self, text: impl Into<String>) {
        self.rows.push(Row::Span(text.into()));
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn render(&self, out: &mut String) {
        let headers: Vec<String> = self.headers.iter().map(|h| escape(h)).collect();
        let mut widths: Vec<usize> = headers.iter().map(|h| visible_width(h).max(3)).collect();
        let bodies: Vec<Option<Vec<String>>> = self
            .rows
            .iter()
            .map(|row| match row {
                Row::Cells(cells) => Some(cells.iter().map(|c| escape(c)).collect()),
                Row::Span(_) => None,
            })
            .collect();

        for cells in bodies.iter().flatten() {
            for (idx, cell) in cells.iter().enumerate() {
                if let Some(width) = widths.get_mut(idx) {
                    *width = (*width).max(visible_width(cell));
                }
            }
        }
        // Inner width of a row: cells plus the " | " separators between them.
        let inner = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);

        write_cells(out, &headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_cells(out, &rule, &widths);

        for (row, body) in self.rows.iter().zip(bodies) {
            match (row, body) {
                (_, Some(cells)) => write_cells(out, &cells, &widths),
                (Row::Span(text), None) => {
                    let _ = writeln!(out, "| {:^inner$} |", escape(text));
                }
                (Row::Cells(_), None) => {}
            }
        }
    }
}

fn write_cells(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (idx, width) in widths.iter().enumerate() {
        let cell = cells.get(idx).map(String::as_str).unwrap_or("");
        let pad = width.saturating_sub(visible_width(cell));
        let _ = write!(out, " {cell}{} |", " ".repeat(pad));
    }
    out.push('\n');
}

/// Printed width of `text`, ignoring ANSI colour sequences.
fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for ch in text.chars() {
        match (in_escape, ch) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => width += 1,
        }
    }
    width
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns() {
        let mut table = Table::new(["Column", "Type"]);
        table.row(vec!["GPA".into(), "float64".into()]);
        let mut out = String::new();
        table.render(&mut out);

        assert_eq!(
            out,
            "| Column | Type    |\n\
             | ------ | ------- |\n\
             | GPA    | float64 |\n"
        );
    }

    #[test]
    fn span_row_covers_all_columns() {
        let mut table = Table::new(["A", "B"]);
        table.span("none");
        let mut out = String::new();
        table.render(&mut out);

        let last = out.lines().last().unwrap();
        let header = out.lines().next().unwrap();
        assert_eq!(last.chars().count(), header.chars().count());
        assert!(last.contains("none"));
    }

    #[test]
    fn pipes_inside_cells_are_escaped() {
        let mut table = Table::new(["Note"]);
        table.row(vec!["a|b".into()]);
        let mut out = String::new();
        table.render(&mut out);
        assert!(out.contains("a\\|b"));
    }

    #[test]
    fn badges_only_colour_when_asked() {
        let badge = Badge::new("At Risk", Tone::Red);
        assert_eq!(badge.render(Theme::plain()), "[At Risk]");
        assert_eq!(badge.render(Theme::colored()), "\x1b[31m[At Risk]\x1b[0m");
    }

    #[test]
    fn tones_map_to_terminal_colours() {
        let theme = Theme::colored();
        assert!(Badge::new("ok", Tone::Green).render(theme).starts_with("\x1b[32m"));
        assert!(Badge::new("info", Tone::Blue).render(theme).starts_with("\x1b[34m"));
        assert!(Badge::new("warn", Tone::Orange).render(theme).starts_with("\x1b[33m"));
        assert!(Badge::new("note", Tone::Muted).render(theme).starts_with("\x1b[2m"));
    }

    #[test]
    fn plain_theme_stays_plain_after_colour_was_forced() {
        let _ = Theme::colored();
        let mut out = String::new();
        caption(&mut out, Theme::plain(), "Hours per week");
        notice(&mut out, Theme::plain(), Tone::Orange, "No data");
        assert_eq!(out, "Hours per week\n! No data\n");
    }

    #[test]
    fn coloured_cells_keep_alignment() {
        let mut table = Table::new(["Risk Level"]);
        table.row(vec![Badge::new("At Risk", Tone::Red).render(Theme::colored())]);
        let mut out = String::new();
        table.render(&mut out);

        let last = out.lines().last().unwrap();
        assert_eq!(visible_width(last), visible_width(out.lines().next().unwrap()));
    }

    #[test]
    fn notices_mark_errors() {
        let mut out = String::new();
        notice(&mut out, Theme::plain(), Tone::Red, "Error: boom");
        assert_eq!(out, "! Error: boom\n");
    }
}

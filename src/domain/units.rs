//! Heading-aligned segmentation of a Markdown document.
//!
//! A [`Unit`] is the smallest slice of the source the paginator will ever cut
//! at. Units begin at a heading line and run up to the next heading line that
//! follows body text; a heading directly under another heading (a title and
//! its subtitle, say) stays in the unit that is still open. The split is
//! purely lexical: joining every unit with `\n` yields the input unchanged.

use std::ops::Range;

/// Character that marks a line as a section heading.
pub const HEADING_MARKER: char = '#';

/// Separator used both between lines of a unit and between units of a span.
pub const LINE_SEPARATOR: &str = "\n";

/// Contiguous run of source lines starting at a heading (or the preamble).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    lines: Vec<String>,
}

impl Unit {
    fn open(line: &str) -> Self {
        Self {
            lines: vec![line.to_string()],
        }
    }

    fn push(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    /// Whether the last non-blank line accumulated so far is itself a heading.
    fn ends_with_heading(&self) -> bool {
        self.lines
            .iter()
            .rev()
            .find(|line| !line.is_empty())
            .is_some_and(|line| is_heading(line))
    }

    /// First source line of the unit, used to label progress output.
    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or_default()
    }

    pub fn text(&self) -> String {
        self.lines.join(LINE_SEPARATOR)
    }
}

/// Ordered, contiguous range of units considered together for one probe.
#[derive(Debug, Clone, Copy)]
pub struct Span<'a> {
    units: &'a [Unit],
    start: usize,
}

impl<'a> Span<'a> {
    /// Build the span covering `units[start..end]`.
    ///
    /// # Panics
    ///
    /// Panics if the range is empty or out of bounds; the paginator only ever
    /// builds spans from indices it has already validated.
    pub fn new(units: &'a [Unit], start: usize, end: usize) -> Self {
        assert!(start < end, "span must cover at least one unit");
        Self {
            units: &units[start..end],
            start,
        }
    }

    /// Unit indices covered by the span, end exclusive.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.units.len()
    }

    pub fn units(&self) -> &'a [Unit] {
        self.units
    }

    /// First source line of the span's opening unit.
    pub fn first_line(&self) -> &'a str {
        self.units[0].first_line()
    }

    pub fn text(&self) -> String {
        join(self.units)
    }
}

pub fn is_heading(line: &str) -> bool {
    line.starts_with(HEADING_MARKER)
}

/// Split `document` into heading-aligned units in source order.
///
/// Never fails and never drops content. An empty document produces a single
/// empty unit so that downstream stages always have something to typeset.
pub fn segment(document: &str) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();

    for line in document.split(LINE_SEPARATOR) {
        match units.last_mut() {
            Some(current) if !is_heading(line) || current.ends_with_heading() => {
                current.push(line);
            }
            _ => units.push(Unit::open(line)),
        }
    }

    units
}

/// Join units back into document text.
pub fn join(units: &[Unit]) -> String {
    units
        .iter()
        .map(Unit::text)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

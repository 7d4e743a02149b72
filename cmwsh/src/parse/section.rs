//! Splitting multi-entity output into per-entity sections.

use regex::Regex;

use crate::error::FormatError;

/// One entity's block of output: its header line and everything up to the
/// next header (or the end of the input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    pub header: &'a str,
    pub body: &'a str,
}

impl<'a> Section<'a> {
    /// Header and body as they appeared in the source.
    ///
    /// Both are adjacent slices of the same input, so this is just the
    /// concatenation.
    pub fn text(&self) -> String {
        format!("{}{}", self.header, self.body)
    }
}

/// How to find the header line that starts each section.
///
/// `pattern` must match the whole header line (use `(?m)^...$`). Lines
/// matching it that begin with one of the `exclude` prefixes are treated as
/// body text, e.g. `Line protocol current state: UP` inside an interface
/// block that itself starts with `GigabitEthernet1/0/1 current state: UP`.
#[derive(Debug, Clone)]
pub struct SectionBoundary {
    pattern: Regex,
    exclude: Vec<String>,
}

impl SectionBoundary {
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            exclude: Vec::new(),
        }
    }

    /// Reject header candidates starting with `prefix`.
    pub fn excluding(mut self, prefix: impl Into<String>) -> Self {
        self.exclude.push(prefix.into());
        self
    }

    fn accepts(&self, line: &str) -> bool {
        let line = line.trim_start();
        !self.exclude.iter().any(|prefix| line.starts_with(prefix.as_str()))
    }

    /// Split `text` into sections, dropping the preamble before the first
    /// header.
    ///
    /// Empty input has no sections and is not an error. Any other input
    /// where no header matches, whitespace included, is a
    /// [`FormatError::NoSections`].
    pub fn split<'a>(&self, text: &'a str) -> Result<Vec<Section<'a>>, FormatError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let headers: Vec<(usize, usize)> = self
            .pattern
            .find_iter(text)
            .filter(|m| self.accepts(m.as_str()))
            .map(|m| (m.start(), m.end()))
            .collect();

        if headers.is_empty() {
            return Err(FormatError::NoSections {
                pattern: self.pattern.as_str().to_string(),
                output: text.to_string(),
            });
        }

        // preamble, then alternating header/body fragments
        let mut fragments = Vec::with_capacity(headers.len() * 2 + 1);
        fragments.push(&text[..headers[0].0]);
        for (i, &(start, end)) in headers.iter().enumerate() {
            let next = headers.get(i + 1).map_or(text.len(), |&(s, _)| s);
            fragments.push(&text[start..end]);
            fragments.push(&text[end..next]);
        }

        let pairs = &fragments[1..];
        if pairs.len() % 2 != 0 || pairs.chunks(2).any(|pair| pair[0].is_empty()) {
            return Err(FormatError::UnpairedSections {
                count: pairs.len(),
                output: text.to_string(),
            });
        }

        Ok(pairs
            .chunks(2)
            .map(|pair| Section {
                header: pair[0],
                body: pair[1],
            })
            .collect())
    }
}

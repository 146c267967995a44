//! The outer line format shared by header and data lines.
//!
//! Fields are delimited by a single separator character and may be wrapped in
//! quote characters, which are stripped on read. Quoting does not protect an
//! embedded separator.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat {
    pub separator: char,
    pub quote: char,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self { separator: ',', quote: '"' }
    }
}

impl LineFormat {
    pub fn new(separator: char, quote: char) -> Self {
        Self { separator, quote }
    }
    /// Splits one line into its fields with surrounding quotes removed.
    pub fn split<'l>(&self, line: &'l str) -> Vec<&'l str> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        line.split(self.separator)
            .map(|field| field.trim_matches(self.quote))
            .collect()
    }
    pub fn join<S: AsRef<str>>(&self, fields: &[S]) -> String {
        let mut separator = [0u8; 4];
        let separator: &str = self.separator.encode_utf8(&mut separator);
        fields
            .iter()
            .map(|field| field.as_ref())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// A row whose first field is empty is a blank or trailing line.
pub fn is_blank(fields: &[&str]) -> bool {
    fields.first().is_none_or(|first| first.is_empty())
}

use std::collections::BTreeSet;

/// Product identifiers currently believed to be unavailable.
///
/// Backed by a `BTreeSet` so an identifier is never stored twice and the
/// serialized form is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnavailableSet {
    ids: BTreeSet<String>,
}

impl UnavailableSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the identifier was not already present.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Returns `true` if the identifier was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Parse the newline-delimited on-disk form. Lines are trimmed and blank
    /// lines skipped.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Render the on-disk form: one identifier per line, trailing newline
    /// when non-empty.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for id in &self.ids {
            out.push_str(id);
            out.push('\n');
        }
        out
    }
}

impl<S: Into<String>> FromIterator<S> for UnavailableSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for UnavailableSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.ids.extend(iter.into_iter().map(Into::into));
    }
}

//! Ordered literal replacement table.

/// Literal replacements applied in registration order.
///
/// Order matters: later patterns see the output of earlier ones.
///
/// ```
/// use repro_renderer::Replacements;
///
/// let mut text = r"50\% of \$x".to_owned();
/// let mut replacements = Replacements::new();
/// replacements.add(r"\%", "%");
/// replacements.add(r"\$", "$");
/// replacements.apply(&mut text);
///
/// assert_eq!(text, "50% of $x");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Replacements {
    items: Vec<(String, String)>,
}

impl Replacements {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(from, to)` pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            items: pairs
                .iter()
                .map(|(from, to)| ((*from).to_owned(), (*to).to_owned()))
                .collect(),
        }
    }

    /// Register a replacement of every occurrence of `from` with `to`.
    pub fn add(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.items.push((from.into(), to.into()));
    }

    /// Apply all replacements in order.
    ///
    /// Returns how many patterns matched at least once.
    pub fn apply(&self, text: &mut String) -> usize {
        let mut fired = 0;
        for (from, to) in &self.items {
            if from.is_empty() || !text.contains(from.as_str()) {
                continue;
            }
            let count = text.matches(from.as_str()).count();
            *text = text.replace(from.as_str(), to);
            fired += 1;
            tracing::debug!(pattern = %from, count, "Applied replacement");
        }
        fired
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_leaves_text() {
        let mut text = "unchanged".to_owned();
        assert_eq!(Replacements::new().apply(&mut text), 0);
        assert_eq!(text, "unchanged");
    }

    #[test]
    fn test_counts_fired_patterns() {
        let mut text = "a b a".to_owned();
        let table = Replacements::from_pairs(&[("a", "x"), ("c", "y"), ("b", "z")]);
        assert_eq!(table.apply(&mut text), 2);
        assert_eq!(text, "x z x");
    }

    #[test]
    fn test_order_is_significant() {
        let mut text = "aaa".to_owned();
        let mut table = Replacements::new();
        table.add("a", "bb");
        table.add("bb", "c");
        table.apply(&mut text);
        assert_eq!(text, "ccc");
    }

    #[test]
    fn test_empty_pattern_skipped() {
        let mut text = "abc".to_owned();
        let table = Replacements::from_pairs(&[("", "x")]);
        assert_eq!(table.apply(&mut text), 0);
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_len() {
        let table = Replacements::from_pairs(&[("a", "b"), ("c", "d")]);
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
    }
}

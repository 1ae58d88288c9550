use rustc_hash::FxHashSet;

/// Samples longer than this many characters are flagged by default.
pub const DEFAULT_MAX_SAMPLE_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Options {
    /// Attribute names accepted without an `unknown-attribute` warning.
    ///
    /// The vocabulary grows by experiment; listing a name here marks it as
    /// sanctioned without teaching the parser what it means.
    pub extra_attributes: FxHashSet<String>,
    /// Character limit for one sample. `None` disables the check.
    pub max_sample_chars: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            extra_attributes: FxHashSet::default(),
            max_sample_chars: Some(DEFAULT_MAX_SAMPLE_CHARS),
        }
    }
}

impl Options {
    /// Create a new `OptionsBuilder` for fluent configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use citemark_parser::Options;
    ///
    /// let options = Options::builder()
    ///     .with_extra_attribute("confidence")
    ///     .with_max_sample_chars(4000)
    ///     .build();
    /// assert!(options.allows_attribute("confidence"));
    /// ```
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Create a new `Options` with default settings.
    ///
    /// Equivalent to `Options::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an attribute outside the core vocabulary is sanctioned.
    #[must_use]
    pub fn allows_attribute(&self, name: &str) -> bool {
        self.extra_attributes.contains(name)
    }
}

/// Builder for `Options`.
///
/// Create an `OptionsBuilder` using `Options::builder()`.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OptionsBuilder {
    extra_attributes: FxHashSet<String>,
    max_sample_chars: Option<usize>,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        let Options {
            extra_attributes,
            max_sample_chars,
        } = Options::default();
        Self {
            extra_attributes,
            max_sample_chars,
        }
    }
}

impl OptionsBuilder {
    /// Accept an extra attribute name without warning.
    #[must_use]
    pub fn with_extra_attribute(mut self, name: impl Into<String>) -> Self {
        self.extra_attributes.insert(name.into());
        self
    }

    /// Accept several extra attribute names without warning.
    ///
    /// # Example
    ///
    /// ```
    /// use citemark_parser::Options;
    ///
    /// let options = Options::builder()
    ///     .with_extra_attributes(["confidence", "note"])
    ///     .build();
    /// assert!(options.allows_attribute("note"));
    /// assert!(!options.allows_attribute("colour"));
    /// ```
    #[must_use]
    pub fn with_extra_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_attributes
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Flag samples longer than `limit` characters.
    #[must_use]
    pub fn with_max_sample_chars(mut self, limit: usize) -> Self {
        self.max_sample_chars = Some(limit);
        self
    }

    /// Never flag a sample for its length.
    #[must_use]
    pub fn without_sample_limit(mut self) -> Self {
        self.max_sample_chars = None;
        self
    }

    #[must_use]
    pub fn build(self) -> Options {
        Options {
            extra_attributes: self.extra_attributes,
            max_sample_chars: self.max_sample_chars,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_builder_defaults() {
        let options = Options::builder().build();
        assert_eq!(options, Options::default());
        assert_eq!(options.max_sample_chars, Some(DEFAULT_MAX_SAMPLE_CHARS));
        assert!(options.extra_attributes.is_empty());
    }

    #[test]
    fn test_builder_sample_limit() {
        let options = Options::builder().with_max_sample_chars(10).build();
        assert_eq!(options.max_sample_chars, Some(10));

        let options = Options::builder()
            .with_max_sample_chars(10)
            .without_sample_limit()
            .build();
        assert_eq!(options.max_sample_chars, None);
    }

    #[test]
    fn test_builder_extra_attributes() {
        let options = Options::builder()
            .with_extra_attribute("confidence")
            .with_extra_attributes(vec!["note".to_string()])
            .build();
        assert!(options.allows_attribute("confidence"));
        assert!(options.allows_attribute("note"));
        assert!(!options.allows_attribute("id2"));
    }
}

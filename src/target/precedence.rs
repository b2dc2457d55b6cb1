// ABOUTME: Per-field precedence tracking for values that several sources may supply
// ABOUTME: Explicit input beats ssh config, and within ssh config the first value wins

/// Who supplied a value, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Source {
    /// Built-in default or the value parsed from the connection string as a placeholder.
    Default,
    /// A matching directive in an ssh config file.
    Config,
    /// Typed explicitly by the user.
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    value: T,
    source: Source,
}

impl<T> Resolved<T> {
    pub fn fallback(value: T) -> Self {
        Self {
            value,
            source: Source::Default,
        }
    }

    pub fn explicit(value: T) -> Self {
        Self {
            value,
            source: Source::Explicit,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Offers a value from `source`. It is taken only if `source` strictly
    /// outranks the current one, so a second offer from the same source is
    /// ignored. `make` runs only when the offer is taken, which lets callers
    /// skip validating values that would be discarded anyway.
    pub fn offer<E>(
        &mut self,
        source: Source,
        make: impl FnOnce() -> Result<T, E>,
    ) -> Result<bool, E> {
        if source <= self.source {
            return Ok(false);
        }
        self.value = make()?;
        self.source = source;
        Ok(true)
    }
}

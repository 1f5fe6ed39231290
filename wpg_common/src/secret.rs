use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A wrapper around gateway keys and passwords that redacts the value in `Debug` and `Display` output.
///
/// Callers must use [`Secret::reveal`] to get at the inner value, which makes accidental logging of a
/// shared secret a deliberate act rather than an easy mistake.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl Secret<String> {
    /// True if no secret has been configured. An empty string is what the config loader stores when the
    /// corresponding environment variable is absent.
    pub fn is_unset(&self) -> bool {
        self.value.is_empty()
    }
}

impl<T: Clone + Default> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T: Clone + Default> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

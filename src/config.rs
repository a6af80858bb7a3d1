use serde::Deserialize;

/// Knobs for how failures render the input they point at.
///
/// Only diagnostics are affected; parse results never depend on settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Characters shown when quoting character input.
    pub char_snippet_width: usize,
    /// Bytes or tokens shown when quoting byte or token input.
    pub element_snippet_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            char_snippet_width: 10,
            element_snippet_width: 8,
        }
    }
}

//! Rendering options configuration.

/// Options for rendering documents.
///
/// The defaults produce ATX headings (`#`) up to level 6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Character repeated once per heading level
    pub heading_marker: char,

    /// Maximum heading level (1-6); deeper headings are capped to it
    pub max_heading_level: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            heading_marker: '#',
            max_heading_level: 6,
        }
    }
}

impl RenderOptions {
    /// Create new render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set the heading marker character.
    pub fn with_heading_marker(mut self, marker: char) -> Self {
        self.heading_marker = marker;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = RenderOptions::default();
        assert_eq!(opts.heading_marker, '#');
        assert_eq!(opts.max_heading_level, 6);
    }

    #[test]
    fn test_builder_pattern() {
        let opts = RenderOptions::new().with_max_heading(3).with_heading_marker('=');
        assert_eq!(opts.max_heading_level, 3);
        assert_eq!(opts.heading_marker, '=');
    }

    #[test]
    fn test_max_heading_clamp() {
        let opts = RenderOptions::new().with_max_heading(10);
        assert_eq!(opts.max_heading_level, 6);

        let opts = RenderOptions::new().with_max_heading(0);
        assert_eq!(opts.max_heading_level, 1);
    }
}

//! Markup preprocessing
//!
//! Normalizes markup before it reaches the rendering engine:
//!
//! - currency glyphs are replaced with named HTML entities so engines that
//!   do not assume UTF-8 input render them correctly
//! - Arabic script runs are rewritten into contextual presentation forms,
//!   in visual order, for engines without their own shaping pass
//!
//! Both passes are purely textual: the markup is never parsed or validated,
//! and malformed HTML goes through the same way well-formed HTML does.
//! Preprocessing never fails; input without matching text passes through
//! unchanged.

mod entities;
mod shaping;

pub use entities::substitute_entities;
pub use shaping::reshape;

use crate::config::Config;

/// Markup preprocessor applied by `Document::load_html`
#[derive(Debug, Clone)]
pub struct Preprocessor {
    substitute_entities: bool,
}

impl Preprocessor {
    pub fn new(substitute_entities: bool) -> Self {
        Self {
            substitute_entities,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.render.substitute_entities)
    }

    pub fn substitutes_entities(&self) -> bool {
        self.substitute_entities
    }

    /// Transform a full markup document
    ///
    /// Entity substitution runs before every other transform.
    pub fn process(&self, markup: &str) -> String {
        let markup = if self.substitute_entities {
            substitute_entities(markup)
        } else {
            markup.to_string()
        };
        reshape(&markup)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution_enabled() {
        let pre = Preprocessor::new(true);
        assert_eq!(
            pre.process("Price: €5, £3"),
            "Price: &euro;5, &pound;3"
        );
    }

    #[test]
    fn test_substitution_disabled_is_byte_identical() {
        let pre = Preprocessor::new(false);
        let input = "Price: €5, £3";
        assert_eq!(pre.process(input).as_bytes(), input.as_bytes());
    }

    #[test]
    fn test_plain_markup_passes_through() {
        let pre = Preprocessor::default();
        let input = "<html><body><p>hello</p></body></html>";
        assert_eq!(pre.process(input), input);
    }

    #[test]
    fn test_entities_run_before_reshaping() {
        // The euro sign sits between two Arabic runs; substitution must not
        // disturb the runs and reshaping must not disturb the entity.
        let pre = Preprocessor::new(true);
        let out = pre.process("د€د");
        assert_eq!(out, "\u{FEA9}&euro;\u{FEA9}");
    }
}

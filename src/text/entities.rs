//! Currency entity substitution
//!
//! An ordered list of literal-to-entity replacements. The list is applied
//! in order, each replacement over the whole document.

const SUBSTITUTIONS: &[(&str, &str)] = &[("€", "&euro;"), ("£", "&pound;")];

/// Replace literal currency glyphs with their named HTML entities
pub fn substitute_entities(markup: &str) -> String {
    let mut out = markup.to_string();
    for (literal, entity) in SUBSTITUTIONS {
        if out.contains(literal) {
            out = out.replace(literal, entity);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euro_and_pound() {
        assert_eq!(
            substitute_entities("Price: €5, £3"),
            "Price: &euro;5, &pound;3"
        );
    }

    #[test]
    fn test_no_currency_is_untouched() {
        let input = "<p>plain $5 text</p>";
        assert_eq!(substitute_entities(input), input);
    }

    #[test]
    fn test_repeated_glyphs() {
        assert_eq!(substitute_entities("€€"), "&euro;&euro;");
    }
}

//! Completion output parsing
//!
//! Models are asked for numbered lists, one item per line. The parser keeps
//! every line (blank ones included) and strips the leading list marker.

/// Strategy for turning a raw completion into list items
pub type ListParser = fn(&str) -> Vec<String>;

/// Split a completion into lines and strip each line's leading marker
///
/// `"1. Alpha\n2. Beta\n\n3.Gamma"` becomes `["Alpha", "Beta", "", "Gamma"]`.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split('\n').map(|line| strip_list_marker(line).to_string()).collect()
}

/// Remove leading ASCII digits, dots and spaces
pub fn strip_list_marker(line: &str) -> &str {
    line.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == ' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_numbered_list_keeps_blank_lines() {
        assert_eq!(
            parse_list("1. Alpha\n2. Beta\n\n3.Gamma"),
            vec!["Alpha", "Beta", "", "Gamma"]
        );
    }

    #[test]
    fn test_parse_line_without_marker_unchanged() {
        assert_eq!(parse_list("No marker line"), vec!["No marker line"]);
    }

    #[test]
    fn test_trailing_newline_yields_empty_item() {
        assert_eq!(
            parse_list("1. Practice vocabulary\n2. Watch subtitled shows\n"),
            vec!["Practice vocabulary", "Watch subtitled shows", ""]
        );
    }

    #[test]
    fn test_only_leading_characters_are_stripped() {
        assert_eq!(strip_list_marker("10. Read 2 books."), "Read 2 books.");
        assert_eq!(strip_list_marker("  3 . spaced"), "spaced");
    }

    #[test]
    fn test_other_bullets_are_kept() {
        assert_eq!(strip_list_marker("- dash item"), "- dash item");
        assert_eq!(strip_list_marker("a) lettered"), "a) lettered");
        assert_eq!(strip_list_marker("\t1. tabbed"), "\t1. tabbed");
    }

    #[test]
    fn test_carriage_return_is_kept() {
        assert_eq!(parse_list("1. One\r\n2. Two"), vec!["One\r", "Two"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_list(""), vec![""]);
    }

    #[test]
    fn test_usable_as_list_parser() {
        let parser: ListParser = parse_list;
        assert_eq!(parser("1. x"), vec!["x"]);
    }

    proptest! {
        #[test]
        fn prop_one_item_per_line(raw in "[0-9a-z. \n]{0,200}") {
            let items = parse_list(&raw);
            prop_assert_eq!(items.len(), raw.split('\n').count());
        }

        #[test]
        fn prop_items_never_start_with_marker(raw in "[0-9a-zA-Z. \n-]{0,200}") {
            for item in parse_list(&raw) {
                let first = item.chars().next();
                prop_assert!(!matches!(first, Some(c) if c.is_ascii_digit() || c == '.' || c == ' '));
            }
        }

        #[test]
        fn prop_items_are_line_suffixes(raw in "[0-9a-z. \n]{0,200}") {
            for (line, item) in raw.split('\n').zip(parse_list(&raw)) {
                prop_assert!(line.ends_with(item.as_str()));
            }
        }
    }
}

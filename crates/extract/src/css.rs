//! Canonicalization of style declarations.

/// Normalizes a block of CSS so that declaration order does not matter.
///
/// The input is split on `;`, every fragment is trimmed, empty fragments are
/// dropped, and the remainder is sorted lexicographically and re-joined with
/// `;`. The operation is idempotent.
///
/// No CSS parsing happens: a stylesheet with rule blocks is treated as a flat
/// list of `;`-separated fragments, which is enough for similarity purposes.
///
/// ```rust
/// use extract::normalize_css;
///
/// assert_eq!(normalize_css(" margin: 0 ; color:red;; "), "color:red;margin: 0");
/// ```
pub fn normalize_css(css: &str) -> String {
    let mut rules: Vec<&str> = css
        .split(';')
        .map(str::trim)
        .filter(|rule| !rule.is_empty())
        .collect();
    rules.sort_unstable();
    rules.join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_and_trims_declarations() {
        assert_eq!(
            normalize_css("padding: 4px; color: blue ;margin:0"),
            "color: blue;margin:0;padding: 4px"
        );
    }

    #[test]
    fn idempotent() {
        let once = normalize_css("b:2; a:1; c:3;");
        assert_eq!(normalize_css(&once), once);
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let a = normalize_css("color:red; margin:0; display:block");
        let b = normalize_css("display:block;color:red;   margin:0;");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_and_separator_only_inputs() {
        assert_eq!(normalize_css(""), "");
        assert_eq!(normalize_css(" ; ;; "), "");
    }

    #[test]
    fn stylesheet_rules_are_flattened() {
        let css = "body { margin: 0; }\nh1 { color: red; }";
        assert_eq!(normalize_css(css), "body { margin: 0;};}\nh1 { color: red");
    }
}

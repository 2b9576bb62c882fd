//! Template placeholder substitution.

use crate::RenderError;

/// Replace the first `placeholder` in `template` with `body`.
///
/// A template without the placeholder is an error. Further occurrences are
/// left in place and logged.
pub fn splice_body(template: &str, placeholder: &str, body: &str) -> Result<String, RenderError> {
    let count = template.matches(placeholder).count();
    if placeholder.is_empty() || count == 0 {
        return Err(RenderError::MissingPlaceholder(placeholder.to_owned()));
    }
    if count > 1 {
        tracing::warn!(
            placeholder,
            count,
            "Template contains the placeholder more than once; only the first is replaced"
        );
    }
    Ok(template.replacen(placeholder, body, 1))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const PLACEHOLDER: &str = "%%@@LOWDOWN_CONTENT@@%%";

    #[test]
    fn test_splice() {
        let template = "\\begin{document}\n%%@@LOWDOWN_CONTENT@@%%\n\\end{document}";
        assert_eq!(
            splice_body(template, PLACEHOLDER, "Body").unwrap(),
            "\\begin{document}\nBody\n\\end{document}"
        );
    }

    #[test]
    fn test_missing_placeholder() {
        let err = splice_body("no slot", PLACEHOLDER, "Body").unwrap_err();
        assert!(matches!(err, RenderError::MissingPlaceholder(ref p) if p == PLACEHOLDER));
    }

    #[test]
    fn test_only_first_replaced() {
        let template = format!("{PLACEHOLDER}|{PLACEHOLDER}");
        assert_eq!(
            splice_body(&template, PLACEHOLDER, "x").unwrap(),
            format!("x|{PLACEHOLDER}")
        );
    }

    #[test]
    fn test_body_containing_placeholder_not_rescanned() {
        assert_eq!(
            splice_body(PLACEHOLDER, PLACEHOLDER, PLACEHOLDER).unwrap(),
            PLACEHOLDER
        );
    }
}

//! Environment and home-directory expansion for configured paths.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand `${VAR}` / `${VAR:-default}` references and a leading `~` in a
/// configured path.
///
/// Unset variables without a default are an error naming the config field.
/// Strings without `${` or a leading `~` are returned unchanged, so bare `$`
/// characters in file names survive.
pub(crate) fn expand_path(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") && !value.starts_with('~') {
        return Ok(value.to_owned());
    }

    let lookup = |var: &str| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    };

    shellexpand::full_with_context(value, home_dir, lookup)
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.cause.var_name),
        })
}

/// Environment lookup failure.
struct LookupError {
    var_name: String,
}

fn home_dir() -> Option<String> {
    std::env::var("HOME").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_var_in_path() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("REPRO_TEST_DATA_DIR", "/data");
        }
        let result = expand_path("${REPRO_TEST_DATA_DIR}/dynamic.toml", "repro.files.dynamic");
        assert_eq!(result.unwrap(), "/data/dynamic.toml");
        unsafe {
            std::env::remove_var("REPRO_TEST_DATA_DIR");
        }
    }

    #[test]
    fn test_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("REPRO_TEST_MISSING");
        }
        let err = expand_path("${REPRO_TEST_MISSING}/report.md", "repro.files.input").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        let msg = err.to_string();
        assert!(msg.contains("REPRO_TEST_MISSING"));
        assert!(msg.contains("repro.files.input"));
    }

    #[test]
    fn test_literal_path_unchanged() {
        assert_eq!(
            expand_path("docs/report.md", "repro.files.input").unwrap(),
            "docs/report.md"
        );
    }

    #[test]
    fn test_bare_dollar_unchanged() {
        assert_eq!(
            expand_path("out/$draft.md", "repro.files.input").unwrap(),
            "out/$draft.md"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("REPRO_TEST_UNSET_DIR");
        }
        let result = expand_path("${REPRO_TEST_UNSET_DIR:-fallback}/report.md", "repro.files.input");
        assert_eq!(result.unwrap(), "fallback/report.md");
    }

    #[test]
    fn test_default_ignored_when_set() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("REPRO_TEST_SET_DIR", "/set");
        }
        let result = expand_path("${REPRO_TEST_SET_DIR:-fallback}/report.md", "repro.files.input");
        assert_eq!(result.unwrap(), "/set/report.md");
        unsafe {
            std::env::remove_var("REPRO_TEST_SET_DIR");
        }
    }

    #[test]
    fn test_value_containing_braces_kept() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("REPRO_TEST_BRACED", "a${b}");
        }
        let result = expand_path("${REPRO_TEST_BRACED}/x.md", "repro.files.input");
        assert_eq!(result.unwrap(), "a${b}/x.md");
        unsafe {
            std::env::remove_var("REPRO_TEST_BRACED");
        }
    }

    #[test]
    fn test_tilde_expands_to_home() {
        let previous = std::env::var_os("HOME");
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("HOME", "/home/tester");
        }
        let result = expand_path("~/template.tex", "repro.files.latex_template");
        unsafe {
            match previous {
                Some(home) => std::env::set_var("HOME", home),
                None => std::env::remove_var("HOME"),
            }
        }
        assert_eq!(result.unwrap(), "/home/tester/template.tex");
    }
}

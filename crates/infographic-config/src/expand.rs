//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.
//!
//! Bare `$VAR` is left alone so URLs and shell snippets pass through.

use std::borrow::Cow;

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// `field` names the configuration key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| std::env::var(var).map(Some))
        .map(Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_expand_set_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("INFOGRAPHIC_TEST_HOST", "render.local");
        }
        let result = expand_env("http://${INFOGRAPHIC_TEST_HOST}/render", "renderer.url").unwrap();
        assert_eq!(result, "http://render.local/render");
        unsafe {
            std::env::remove_var("INFOGRAPHIC_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_default_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("INFOGRAPHIC_TEST_UNSET");
        }
        let result = expand_env("${INFOGRAPHIC_TEST_UNSET:-node}", "renderer.command").unwrap();
        assert_eq!(result, "node");
    }

    #[test]
    fn test_expand_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("INFOGRAPHIC_TEST_MISSING");
        }
        let err = expand_env("${INFOGRAPHIC_TEST_MISSING}", "renderer.url").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert_eq!(
            err.to_string(),
            "Environment variable error in renderer.url: ${INFOGRAPHIC_TEST_MISSING} not set"
        );
    }

    #[test]
    fn test_bare_dollar_untouched() {
        let result = expand_env("echo $HOME", "renderer.command").unwrap();
        assert_eq!(result, "echo $HOME");
    }
}

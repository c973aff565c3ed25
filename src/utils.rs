use std::env::var;

/// Get the value of ENV var
///
/// Only when:
/// - It is set
/// - It is not empty
pub fn env_var(var_name: &str) -> Option<String> {
    var(var_name).ok().filter(|value| !value.is_empty())
}

/// Get the value of ENV var, or a default
///
/// Same rules as [`env_var`]
pub fn env_var_or_else<F>(var_name: &str, or_else: F) -> String
where
    F: FnOnce() -> String,
{
    env_var(var_name).unwrap_or_else(or_else)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_missing() {
        assert_eq!(None, env_var("DATEBOOK_SURELY_NOT_SET"));
        assert_eq!(
            "fallback".to_string(),
            env_var_or_else("DATEBOOK_SURELY_NOT_SET", || "fallback".to_string())
        );
    }

    #[test]
    fn test_env_var_set() {
        // PATH is set for any test runner
        assert!(env_var("PATH").is_some());
    }
}

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Provider list is not empty and has no duplicates
/// - Row limit and truncation width are positive
/// - Progress bar settings are usable
/// - Jackett URL is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let search = &config.search;
    if search.providers.is_empty() {
        return Err(ConfigError::ValidationError(
            "search.providers cannot be empty".to_string(),
        ));
    }
    for (i, provider) in search.providers.iter().enumerate() {
        if provider.as_str().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "search.providers cannot contain blank ids".to_string(),
            ));
        }
        if search.providers[..i].contains(provider) {
            return Err(ConfigError::ValidationError(format!(
                "search.providers lists \"{}\" twice",
                provider
            )));
        }
    }
    if search.rows == 0 {
        return Err(ConfigError::ValidationError(
            "search.rows must be at least 1".to_string(),
        ));
    }
    if search.truncate == 0 {
        return Err(ConfigError::ValidationError(
            "search.truncate must be at least 1".to_string(),
        ));
    }

    let progress = &config.progress;
    if progress.width == 0 {
        return Err(ConfigError::ValidationError(
            "progress.width must be at least 1".to_string(),
        ));
    }
    if progress.step == 0 {
        return Err(ConfigError::ValidationError(
            "progress.step must be at least 1".to_string(),
        ));
    }
    if progress.ceiling >= 100 {
        return Err(ConfigError::ValidationError(
            "progress.ceiling must be below 100".to_string(),
        ));
    }

    if config.jackett.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "jackett.url cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    fn assert_invalid(config: &Config) {
        let result = validate_config(config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_empty_providers_fails() {
        let mut config = Config::default();
        config.search.providers.clear();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_duplicate_providers_fails() {
        let mut config = Config::default();
        config.search.providers = vec![ProviderId::from("a"), ProviderId::from("a")];
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_rows_fails() {
        let mut config = Config::default();
        config.search.rows = 0;
        assert_invalid(&config);

        let mut config = Config::default();
        config.search.truncate = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_progress_ceiling() {
        let mut config = Config::default();
        config.progress.ceiling = 100;
        assert_invalid(&config);

        config.progress.ceiling = 99;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_jackett_url_fails() {
        let mut config = Config::default();
        config.jackett.url = " ".to_string();
        assert_invalid(&config);
    }
}

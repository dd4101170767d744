//! Configuration validation

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Task names the pipeline declares itself
pub const RESERVED_TASK_NAMES: &[&str] = &["build", "clean", "copy", "compile", "compile:assets"];

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_clean(config)?;
    validate_copy(config)?;
    validate_compile(config)?;
    validate_watch(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> crate::error::GantryError {
    ConfigError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
    .into()
}

fn validate_name(field: String, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid(field, "name cannot be empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid(field, "name cannot contain whitespace"));
    }
    Ok(())
}

fn validate_clean(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();
    for (i, group) in config.clean.iter().enumerate() {
        validate_name(format!("clean[{}].name", i), &group.name)?;
        if !seen.insert(group.name.as_str()) {
            return Err(invalid(
                format!("clean[{}].name", i),
                format!("duplicate clean group '{}'", group.name),
            ));
        }
        if group.targets.is_empty() {
            return Err(invalid(
                format!("clean[{}].targets", i),
                "at least one target is required",
            ));
        }
    }
    Ok(())
}

fn validate_copy(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();
    for (i, mapping) in config.copy.iter().enumerate() {
        validate_name(format!("copy[{}].name", i), &mapping.name)?;
        if !seen.insert(mapping.name.as_str()) {
            return Err(invalid(
                format!("copy[{}].name", i),
                format!("duplicate copy mapping '{}'", mapping.name),
            ));
        }
        if let Err(e) = globset::Glob::new(&mapping.filter) {
            return Err(invalid(format!("copy[{}].filter", i), e.to_string()));
        }
    }
    Ok(())
}

fn validate_compile(config: &Config) -> Result<()> {
    validate_name("styles.task".to_string(), &config.styles.task)?;
    validate_name("scripts.task".to_string(), &config.scripts.task)?;

    for (field, name) in [
        ("styles.task", &config.styles.task),
        ("scripts.task", &config.scripts.task),
    ] {
        if RESERVED_TASK_NAMES.contains(&name.as_str()) {
            return Err(invalid(
                field,
                format!("'{}' is reserved for the pipeline", name),
            ));
        }
    }

    if config.styles.task == config.scripts.task {
        return Err(invalid(
            "scripts.task",
            "styles and scripts tasks must have different names",
        ));
    }

    if let Err(e) = glob::Pattern::new(&config.styles.source_glob) {
        return Err(invalid("styles.source_glob", e.to_string()));
    }

    if config.scripts.entry.as_os_str().is_empty() {
        return Err(invalid("scripts.entry", "entry file is required"));
    }

    Ok(())
}

fn validate_watch(config: &Config) -> Result<()> {
    if config.watch.debounce_ms == 0 {
        return Err(invalid("watch.debounce_ms", "must be greater than zero"));
    }

    for (i, rule) in config.watch.rules.iter().enumerate() {
        if let Err(e) = globset::Glob::new(&rule.glob) {
            return Err(invalid(format!("watch.rules[{}].glob", i), e.to_string()));
        }
        if rule.task.trim().is_empty() {
            return Err(invalid(
                format!("watch.rules[{}].task", i),
                "task cannot be empty",
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{CleanGroup, CopyMapping, WatchRuleConfig};

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_duplicate_copy_mapping() {
        let mut config = Config::default();
        config.copy.push(CopyMapping::new("images", "again", "a", "b"));
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_clean_targets() {
        let mut config = Config::default();
        config
            .clean
            .push(CleanGroup::new("maps", "maps", Vec::<String>::new()));
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_reserved_task_name() {
        let mut config = Config::default();
        config.styles.task = "build".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_same_styles_and_scripts_task() {
        let mut config = Config::default();
        config.scripts.task = "sass".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_watch_glob() {
        let mut config = Config::default();
        config.watch.rules.push(WatchRuleConfig::new("app/[", "sass"));
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_copy_filter() {
        let mut config = Config::default();
        config.copy[0].filter = "{a,b".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_whitespace_in_name() {
        let mut config = Config::default();
        config.copy[0].name = "my frameworks".to_string();
        assert!(validate_config(&config).is_err());
    }
}

use crate::error::ConfigError;
use std::collections::BTreeSet;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean, public-facing API.
pub use settings::{
    default_badges, default_challenges, BadgeDefinition, BadgeVeto, ChallengeTemplate, Config,
    EvaluationSettings,
};

use core_types::ChallengeType;

/// Loads the evaluation configuration, starting from the built-in catalogs
/// and applying overrides from an optional `tradewise.toml` file.
///
/// Catalog violations are configuration bugs and must surface here, at load
/// time, never during evaluation.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name("tradewise").required(false))
        .build()?;

    // Sections absent from the file fall back to the built-in catalogs; a
    // present but malformed section is a hard error.
    let config = builder.try_deserialize::<Config>()?;

    validate(&config)?;
    Ok(config)
}

/// Checks the catalogs for structural violations.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.evaluation.window_days == 0 {
        return Err(ConfigError::ValidationError(
            "evaluation.window_days must be greater than 0".to_string(),
        ));
    }

    let mut seen_badges = BTreeSet::new();
    for badge in &config.badges {
        if !seen_badges.insert(badge.badge_type) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate badge definition for '{}'",
                badge.badge_type
            )));
        }
        if badge.threshold <= 0.0 || badge.threshold > 100.0 {
            return Err(ConfigError::ValidationError(format!(
                "badge '{}' threshold must be within (0, 100]",
                badge.badge_type
            )));
        }
        if badge.required_days == 0 || badge.required_days > config.evaluation.window_days {
            return Err(ConfigError::ValidationError(format!(
                "badge '{}' required_days must be within 1..={}",
                badge.badge_type, config.evaluation.window_days
            )));
        }
    }

    let mut seen_challenges = BTreeSet::new();
    for template in &config.challenges {
        if !seen_challenges.insert(template.challenge_type) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate challenge template for '{}'",
                template.challenge_type
            )));
        }
        if template.target_value <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "challenge '{}' target_value must be positive",
                template.challenge_type
            )));
        }
        if template.duration_days <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "challenge '{}' duration_days must be positive",
                template.challenge_type
            )));
        }
    }
    // Refresh re-seeds from the catalog, so every type must be present.
    for challenge_type in ChallengeType::ALL {
        if !seen_challenges.contains(&challenge_type) {
            return Err(ConfigError::ValidationError(format!(
                "challenge catalog is missing a template for '{challenge_type}'"
            )));
        }
    }

    Ok(())
}

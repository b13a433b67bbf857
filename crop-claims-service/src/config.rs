use std::time::Duration;

use crate::prompt::PromptTemplate;

const DEFAULT_LOCATION: &str = "12.9716, 77.5946";
const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Placeholder coordinates used until the form collects real locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationDefaults {
    pub farm_location: String,
    pub claimant_location: String,
    pub insured_area: String,
}

impl Default for LocationDefaults {
    fn default() -> Self {
        Self {
            farm_location: DEFAULT_LOCATION.to_string(),
            claimant_location: DEFAULT_LOCATION.to_string(),
            insured_area: DEFAULT_LOCATION.to_string(),
        }
    }
}

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub port: u16,
    pub openrouter_api_key: String,
    pub llm_model: String,
    pub llm_timeout: Duration,
    pub max_upload_bytes: usize,
    pub locations: LocationDefaults,
    pub prompt: PromptTemplate,
}

impl ServiceConfig {
    pub async fn from_env() -> anyhow::Result<Self> {
        let openrouter_api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENROUTER_API_KEY not set"))?;

        let prompt = match std::env::var("CLAIM_PROMPT_PATH") {
            Ok(path) => PromptTemplate::from_file(&path).await?,
            Err(_) => PromptTemplate::default(),
        };

        let defaults = LocationDefaults::default();
        let locations = LocationDefaults {
            farm_location: env_or("FARM_LOCATION", defaults.farm_location),
            claimant_location: env_or("CLAIMANT_LOCATION", defaults.claimant_location),
            insured_area: env_or("INSURED_AREA", defaults.insured_area),
        };

        Ok(Self {
            port: env_parsed("PORT", 3000),
            openrouter_api_key,
            llm_model: env_or("LLM_MODEL", DEFAULT_MODEL.to_string()),
            llm_timeout: Duration::from_secs(env_parsed("LLM_TIMEOUT_SECS", 60)),
            max_upload_bytes: env_parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
            locations,
            prompt,
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_defaults_share_placeholder() {
        let defaults = LocationDefaults::default();
        assert_eq!(defaults.farm_location, "12.9716, 77.5946");
        assert_eq!(defaults.claimant_location, defaults.insured_area);
    }

    #[test]
    fn test_unparsable_env_falls_back() {
        assert_eq!(env_parsed("CROP_CLAIMS_TEST_UNSET_PORT", 3000u16), 3000);
    }
}

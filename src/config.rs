use serde::Deserialize;
use std::path::Path;

use crate::fetcher::NewsCategory;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Timeout for feed endpoint requests, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub sources: Sources,
}

fn default_request_timeout() -> u64 {
    10
}

/// One feed-to-JSON endpoint per news section.
#[derive(Debug, Deserialize, Clone)]
pub struct Sources {
    #[serde(default = "default_health_source")]
    pub health: String,
    #[serde(default = "default_food_source")]
    pub food: String,
    #[serde(default = "default_fitness_source")]
    pub fitness: String,
    #[serde(default = "default_sports_source")]
    pub sports: String,
}

impl Sources {
    pub fn url_for(&self, category: NewsCategory) -> &str {
        match category {
            NewsCategory::Health => &self.health,
            NewsCategory::Food => &self.food,
            NewsCategory::Fitness => &self.fitness,
            NewsCategory::Sports => &self.sports,
        }
    }
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            health: default_health_source(),
            food: default_food_source(),
            fitness: default_fitness_source(),
            sports: default_sports_source(),
        }
    }
}

fn sciencedaily(feed: &str) -> String {
    format!("https://api.rss2json.com/v1/api.json?rss_url=https://www.sciencedaily.com/rss/{feed}")
}

fn default_health_source() -> String {
    sciencedaily("top/health.xml")
}

fn default_food_source() -> String {
    sciencedaily("health_medicine/nutrition.xml")
}

fn default_fitness_source() -> String {
    sciencedaily("health_medicine/fitness.xml")
}

fn default_sports_source() -> String {
    sciencedaily("health_medicine/sports_medicine.xml")
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

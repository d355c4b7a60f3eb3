use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::estimation::MultiplierBounds;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // AI Service
    pub ai_adjustment_enabled: bool,
    pub ai_service_url: String,
    pub ai_service_token: String,
    pub ai_service_timeout_ms: u64,
    pub ai_multiplier_min: f64,
    pub ai_multiplier_max: f64,

    // Estimation tables
    pub waste_buffer_percent: Option<f64>,
    pub takeoff_table_path: Option<PathBuf>,
    pub brand_catalog_path: Option<PathBuf>,
}

/// Options injected into the estimation core at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    pub waste_buffer_percent: Option<f64>,
    pub ai_adjustment_enabled: bool,
    pub ai_timeout_ms: u64,
    pub multiplier_bounds: MultiplierBounds,
}

impl EstimatorConfig {
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_millis(self.ai_timeout_ms)
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env = Environment::from_str(&var("ENV").unwrap_or_else(|| "dev".to_string()));
        let server_addr = var("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        // CORS
        let cors_allow_origins = var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // AI Service
        let ai_adjustment_enabled = match var("AI_ADJUSTMENT_ENABLED") {
            Some(raw) => parse_bool(&raw).context("AI_ADJUSTMENT_ENABLED must be true or false")?,
            None => true,
        };
        let ai_service_url =
            var("AI_SERVICE_URL").unwrap_or_else(|| "http://ai-service:8000".to_string());
        url::Url::parse(&ai_service_url).context("AI_SERVICE_URL must be a valid URL")?;
        let ai_service_token = match var("AI_SERVICE_TOKEN") {
            Some(token) => token,
            None if ai_adjustment_enabled => {
                bail!("AI_SERVICE_TOKEN must be set when AI_ADJUSTMENT_ENABLED is true")
            }
            None => String::new(),
        };
        let ai_service_timeout_ms: u64 = parse_or(&var, "AI_SERVICE_TIMEOUT_MS", 8000)?;
        let ai_multiplier_min: f64 = parse_or(&var, "AI_MULTIPLIER_MIN", 0.5)?;
        let ai_multiplier_max: f64 = parse_or(&var, "AI_MULTIPLIER_MAX", 2.0)?;

        // Estimation tables
        let waste_buffer_percent = var("WASTE_BUFFER_PERCENT")
            .map(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .context("WASTE_BUFFER_PERCENT must be a number")
            })
            .transpose()?;
        let takeoff_table_path = var("TAKEOFF_TABLE_PATH").map(PathBuf::from);
        let brand_catalog_path = var("BRAND_CATALOG_PATH").map(PathBuf::from);

        let settings = Settings {
            env,
            server_addr,
            cors_allow_origins,
            ai_adjustment_enabled,
            ai_service_url,
            ai_service_token,
            ai_service_timeout_ms,
            ai_multiplier_min,
            ai_multiplier_max,
            waste_buffer_percent,
            takeoff_table_path,
            brand_catalog_path,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.ai_service_timeout_ms == 0 {
            bail!("AI_SERVICE_TIMEOUT_MS must be greater than 0");
        }
        let (min, max) = (self.ai_multiplier_min, self.ai_multiplier_max);
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min >= max {
            bail!(
                "AI multiplier range must satisfy 0 < AI_MULTIPLIER_MIN < AI_MULTIPLIER_MAX, got {}..{}",
                min,
                max
            );
        }
        if let Some(pct) = self.waste_buffer_percent {
            if !(0.0..=50.0).contains(&pct) {
                bail!("WASTE_BUFFER_PERCENT must be between 0 and 50, got {}", pct);
            }
        }
        Ok(())
    }

    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            waste_buffer_percent: self.waste_buffer_percent,
            ai_adjustment_enabled: self.ai_adjustment_enabled,
            ai_timeout_ms: self.ai_service_timeout_ms,
            multiplier_bounds: MultiplierBounds {
                min: self.ai_multiplier_min,
                max: self.ai_multiplier_max,
            },
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("invalid boolean '{}'", other),
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}

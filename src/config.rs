use fitscan_core::lookup::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use fitscan_core::suggest::{DEFAULT_GEMINI_MODEL, GEMINI_BASE_URL};
use fitscan_core::{GeminiConfig, LookupConfig, NutritionGoals, ScanMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Barcode product database settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NutritionDbConfig {
    /// Item search endpoint (default: Nutritionix v2)
    pub endpoint: Option<String>,
    pub app_id: Option<String>,
    pub app_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl NutritionDbConfig {
    /// Returns true if both credentials are present
    pub fn is_configured(&self) -> bool {
        self.app_id.is_some() && self.app_key.is_some()
    }

    pub fn lookup_config(&self) -> Result<LookupConfig, ConfigError> {
        let (Some(app_id), Some(app_key)) = (&self.app_id, &self.app_key) else {
            return Err(ConfigError::MissingValue(
                "nutrition_db.app_id and nutrition_db.app_key (or FITSCAN_NUTRITIONIX_APP_ID / FITSCAN_NUTRITIONIX_APP_KEY)",
            ));
        };

        let mut config = LookupConfig::new(app_id.clone(), app_key.clone());
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    fn masked(&self) -> Self {
        Self {
            app_key: self.app_key.as_deref().map(mask_secret),
            ..self.clone()
        }
    }
}

/// Generative text API settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerativeConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl GenerativeConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn gemini_config(&self) -> Result<GeminiConfig, ConfigError> {
        let Some(api_key) = &self.api_key else {
            return Err(ConfigError::MissingValue(
                "generative.api_key (or FITSCAN_GEMINI_API_KEY)",
            ));
        };

        let mut config = GeminiConfig::new(api_key.clone());
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    fn masked(&self) -> Self {
        Self {
            api_key: self.api_key.as_deref().map(mask_secret),
            ..self.clone()
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Behavior after a scan result is dismissed
    pub scan_mode: ConfigValue<ScanMode>,
    /// Daily nutrition targets
    pub goals: ConfigValue<NutritionGoals>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub nutrition_db: NutritionDbConfig,
    pub generative: GenerativeConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    scan_mode: Option<ScanMode>,
    goals: Option<NutritionGoals>,
    nutrition_db: Option<NutritionDbConfig>,
    generative: Option<GenerativeConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut scan_mode = ConfigValue::new(ScanMode::default(), ConfigSource::Default);
        let mut goals = ConfigValue::new(NutritionGoals::default(), ConfigSource::Default);
        let mut config_file = None;
        let mut nutrition_db = NutritionDbConfig::default();
        let mut generative = GenerativeConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(mode) = file_config.scan_mode {
                scan_mode = ConfigValue::new(mode, ConfigSource::File);
            }
            if let Some(file_goals) = file_config.goals {
                goals = ConfigValue::new(file_goals, ConfigSource::File);
            }
            if let Some(db) = file_config.nutrition_db {
                nutrition_db = db;
            }
            if let Some(section) = file_config.generative {
                generative = section;
            }
        }

        if let Some(mode) = env("FITSCAN_SCAN_MODE") {
            let parsed = mode
                .parse::<ScanMode>()
                .map_err(|e| ConfigError::InvalidValue("FITSCAN_SCAN_MODE", e))?;
            scan_mode = ConfigValue::new(parsed, ConfigSource::Environment);
        }
        if let Some(id) = env("FITSCAN_NUTRITIONIX_APP_ID") {
            nutrition_db.app_id = Some(id);
        }
        if let Some(key) = env("FITSCAN_NUTRITIONIX_APP_KEY") {
            nutrition_db.app_key = Some(key);
        }
        if let Some(endpoint) = env("FITSCAN_NUTRITIONIX_ENDPOINT") {
            nutrition_db.endpoint = Some(endpoint);
        }
        if let Some(key) = env("FITSCAN_GEMINI_API_KEY") {
            generative.api_key = Some(key);
        }
        if let Some(model) = env("FITSCAN_GEMINI_MODEL") {
            generative.model = Some(model);
        }

        Ok(Self {
            scan_mode,
            goals,
            config_file,
            nutrition_db,
            generative,
        })
    }

    /// Copy safe to print: credentials reduced to their last characters.
    pub fn masked(&self) -> Self {
        Self {
            nutrition_db: self.nutrition_db.masked(),
            generative: self.generative.masked(),
            ..self.clone()
        }
    }

    /// Effective lookup endpoint, falling back to the built-in default
    pub fn lookup_endpoint(&self) -> &str {
        self.nutrition_db
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn lookup_timeout_secs(&self) -> u64 {
        self.nutrition_db
            .timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT.as_secs())
    }

    pub fn generative_model(&self) -> &str {
        self.generative
            .model
            .as_deref()
            .unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    pub fn generative_base_url(&self) -> &str {
        self.generative.base_url.as_deref().unwrap_or(GEMINI_BASE_URL)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/fitscan/
    /// - macOS: ~/Library/Application Support/fitscan/
    /// - Windows: %APPDATA%/fitscan/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fitscan")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
    MissingValue(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(name, e) => write!(f, "Invalid {}: {}", name, e),
            ConfigError::MissingValue(name) => write!(f, "Missing configuration: {}", name),
        }
    }
}

impl std::error::Error for ConfigError {}

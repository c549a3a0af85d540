use crate::domain::model::Brewery;
use crate::utils::error::{BeerLogError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 未設定（或設為 0）時使用的打卡半徑（公尺）
pub const DEFAULT_CHECKIN_RADIUS_METERS: f64 = 100.0;

pub const CONFIG_PATH_ENV: &str = "MYBEERLOG_CONFIG";
pub const CHECKIN_RADIUS_ENV: &str = "GPS_CHECKIN_RADIUS";
pub const RUN_MODE_ENV: &str = "RUN_MODE";

pub const RUN_MODES: [&str; 2] = ["dev", "prod"];
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub gps: GpsConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub breweries: Vec<BrewerySeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_run_mode")]
    pub run_mode: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            run_mode: default_run_mode(),
        }
    }
}

fn default_app_name() -> String {
    "mybeerlog".to_string()
}

fn default_run_mode() -> String {
    "prod".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GpsConfig {
    /// 打卡半徑（公尺）
    pub checkin_radius: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

/// 設定檔中預先載入的釀酒廠
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrewerySeed {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl BrewerySeed {
    pub fn to_brewery(&self) -> Result<Brewery> {
        Brewery::builder()
            .id(self.id)
            .name(&self.name)
            .address(&self.address)
            .description(&self.description)
            .location(self.latitude, self.longitude)
            .build()
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BeerLogError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 以環境變數建立配置（Lambda 用）。
    /// 有 `MYBEERLOG_CONFIG` 時先讀該檔，再套用個別環境變數覆蓋。
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                tracing::info!("Loading configuration from {}", path);
                Self::from_file(path)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(radius) = std::env::var(CHECKIN_RADIUS_ENV) {
            let parsed = radius.trim().parse::<f64>().map_err(|e| {
                BeerLogError::InvalidConfigValueError {
                    field: CHECKIN_RADIUS_ENV.to_string(),
                    value: radius.clone(),
                    reason: e.to_string(),
                }
            })?;
            config.gps.checkin_radius = Some(parsed);
        }
        if let Ok(mode) = std::env::var(RUN_MODE_ENV) {
            config.app.run_mode = mode;
        }

        Ok(config)
    }

    /// 替換環境變數 (例如 ${DB_HOST})；未定義的變數保留原文
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BeerLogError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 實際使用的打卡半徑：未設定或為 0 時回退為 100m
    pub fn checkin_radius_meters(&self) -> f64 {
        match self.gps.checkin_radius {
            Some(radius) if radius != 0.0 => radius,
            _ => DEFAULT_CHECKIN_RADIUS_METERS,
        }
    }

    pub fn is_dev(&self) -> bool {
        self.app.run_mode == "dev"
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    /// 未指定時，dev 模式輸出易讀格式，其餘輸出 JSON
    pub fn log_json(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.json)
            .unwrap_or(!self.is_dev())
    }

    /// 將設定檔中的釀酒廠轉為領域物件
    pub fn seed_breweries(&self) -> Result<Vec<Brewery>> {
        self.breweries.iter().map(BrewerySeed::to_brewery).collect()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("app.name", &self.app.name)?;
        validation::validate_one_of("app.run_mode", &self.app.run_mode, &RUN_MODES)?;

        if let Some(radius) = self.gps.checkin_radius {
            validation::validate_range("gps.checkin_radius", radius, 0.0, f64::MAX)?;
        }

        if let Some(level) = self.log_level() {
            validation::validate_one_of("logging.level", level, &LOG_LEVELS)?;
        }

        let ids: Vec<i64> = self.breweries.iter().map(|b| b.id).collect();
        validation::validate_unique_ids("breweries.id", &ids)?;
        for seed in &self.breweries {
            seed.to_brewery().map_err(|e| BeerLogError::InvalidConfigValueError {
                field: format!("breweries[{}]", seed.id),
                value: seed.name.clone(),
                reason: e.to_string(),
            })?;
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

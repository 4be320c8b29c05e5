use std::collections::HashMap;
use std::env;
use std::fs;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::clients::distance_matrix::DISTANCE_MATRIX_API_BASE;
use crate::clients::google_calendar::GOOGLE_CALENDAR_API_BASE;
use crate::error::ConfigError;
use crate::models::rules::SchedulingRules;

const DEFAULT_PORT: u16 = 5002;

/// `KEY=VALUE` pairs read from a config file.
#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    /// File value first, then the process environment.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).or_else(|| env::var(key).ok())
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub calendar_id: String,
    pub calendar_access_token: String,
    pub calendar_api_base: String,
    pub distance_api_key: String,
    pub distance_api_base: String,
    pub shop_address: String,
    pub port: u16,
    pub rules: SchedulingRules,
}

impl Settings {
    pub fn load(config: &AppConfig) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| config.lookup(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let mut rules = SchedulingRules::default();
        if let Some(zone) = lookup("TIMEZONE") {
            rules.timezone = Tz::from_str(&zone).map_err(|_| ConfigError::InvalidValue {
                key: "TIMEZONE",
                value: zone.clone(),
            })?;
        }
        if let Some(marker) = lookup("BLOCK_MARKER") {
            rules.block_marker = marker;
        }
        if let Some(contact) = lookup("CONTACT_LINE") {
            rules.contact_line = contact;
        }
        if let Some(price) = lookup("TUNING_PRICE") {
            rules.tuning_price = price;
        }
        if let Some(days) = parse_opt::<i64, _>(&lookup, "SEARCH_DAYS")? {
            rules.search_days = days;
        }
        if let Some(miles) = parse_opt::<f64, _>(&lookup, "MAX_SHOP_MILES")? {
            rules.shop_radius_miles = miles;
        }
        if let Some(miles) = parse_opt::<f64, _>(&lookup, "MAX_NEIGHBOR_MILES")? {
            rules.neighbor_radius_miles = miles;
        }

        Ok(Self {
            calendar_id: required("CALENDAR_ID")?,
            calendar_access_token: required("GOOGLE_CALENDAR_ACCESS_TOKEN")?,
            calendar_api_base: lookup("CALENDAR_API_BASE")
                .unwrap_or_else(|| GOOGLE_CALENDAR_API_BASE.to_string()),
            distance_api_key: required("DISTANCE_MATRIX_API_KEY")?,
            distance_api_base: lookup("DISTANCE_API_BASE")
                .unwrap_or_else(|| DISTANCE_MATRIX_API_BASE.to_string()),
            shop_address: required("SHOP_ADDRESS")?,
            port: parse_opt::<u16, _>(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT),
            rules,
        })
    }
}

fn parse_opt<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# booking service
export CALENDAR_ID="tuning@example.com"
GOOGLE_CALENDAR_ACCESS_TOKEN=token
DISTANCE_MATRIX_API_KEY='key'
SHOP_ADDRESS=53 High Street, Northchurch, HP4 3QH
PORT=8080
MAX_NEIGHBOR_MILES=12.5
"#;

    #[test]
    fn parses_file_format_with_quotes_and_exports() {
        let config = AppConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.get("CALENDAR_ID").as_deref(), Some("tuning@example.com"));
        assert_eq!(config.get("DISTANCE_MATRIX_API_KEY").as_deref(), Some("key"));
        assert_eq!(
            config.get("SHOP_ADDRESS").as_deref(),
            Some("53 High Street, Northchurch, HP4 3QH")
        );
    }

    #[test]
    fn rejects_lines_without_assignment() {
        let err = AppConfig::parse("CALENDAR_ID\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLine { line: 1, .. }));
    }

    #[test]
    fn settings_apply_defaults_and_overrides() {
        let config = AppConfig::parse(SAMPLE).unwrap();
        let settings = Settings::from_lookup(|key| config.get(key)).unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.rules.neighbor_radius_miles, 12.5);
        assert_eq!(settings.rules.shop_radius_miles, 20.0);
        assert_eq!(settings.rules.timezone, chrono_tz::Europe::London);
        assert_eq!(settings.calendar_api_base, GOOGLE_CALENDAR_API_BASE);
    }

    #[test]
    fn settings_require_shop_address() {
        let config = AppConfig::parse("CALENDAR_ID=a\nGOOGLE_CALENDAR_ACCESS_TOKEN=b\nDISTANCE_MATRIX_API_KEY=c\n").unwrap();
        let err = Settings::from_lookup(|key| config.get(key)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SHOP_ADDRESS")));
    }

    #[test]
    fn settings_reject_unknown_timezone() {
        let err = Settings::from_lookup(|key| match key {
            "TIMEZONE" => Some("Mars/Olympus".to_string()),
            _ => Some("x".to_string()),
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "TIMEZONE", .. }));
    }
}

// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials for the Telegram group the shop posts tickets to. Both
/// fields default to empty, which disables the integration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[schema(example = "123456789:AAF-abcdefghijklmnop")]
    #[serde(default)]
    pub bot_token: String,
    #[schema(example = "-1001234567890")]
    #[serde(default)]
    pub group_id: String,
}

impl TelegramConfig {
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.group_id.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    Auto,
}

/// The single settings record. Created lazily with defaults on first
/// read; only a full data wipe removes it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[schema(example = "Mihai Ionescu")]
    pub technician_name: String,
    #[serde(default)]
    pub telegram_config: TelegramConfig,
    #[serde(default)]
    pub theme: ThemePreference,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            technician_name: "Technician".to_string(),
            telegram_config: TelegramConfig::default(),
            theme: ThemePreference::Auto,
        }
    }
}

/// Partial settings update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[schema(example = "Mihai Ionescu")]
    pub technician_name: Option<String>,
    pub telegram_config: Option<TelegramConfig>,
    pub theme: Option<ThemePreference>,
}

// src/db/settings_repo.rs

use crate::{
    common::error::AppError,
    db::record_store::{RecordStore, SETTINGS_KEY},
    models::settings::{AppSettings, TelegramConfig, UpdateSettingsRequest},
};

/// The singleton settings record, with the same read-whole / merge /
/// write-whole discipline as the ticket repository. `get` never returns
/// absent: a missing or unreadable record falls back to defaults.
#[derive(Clone)]
pub struct SettingsRepository {
    store: RecordStore,
}

impl SettingsRepository {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn get(&self) -> AppSettings {
        match self.load().await {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("failed to read settings: {}", e);
                AppSettings::default()
            }
        }
    }

    /// Merges the given fields over the current (or default) settings and
    /// persists the result.
    pub async fn update(&self, input: UpdateSettingsRequest) -> Result<AppSettings, AppError> {
        let mut settings = self.get().await;

        if let Some(name) = input.technician_name {
            settings.technician_name = name;
        }
        if let Some(config) = input.telegram_config {
            settings.telegram_config = config;
        }
        if let Some(theme) = input.theme {
            settings.theme = theme;
        }

        self.persist(&settings).await?;
        Ok(settings)
    }

    pub async fn telegram_config(&self) -> TelegramConfig {
        self.get().await.telegram_config
    }

    pub async fn update_telegram_config(
        &self,
        config: TelegramConfig,
    ) -> Result<TelegramConfig, AppError> {
        let settings = self
            .update(UpdateSettingsRequest {
                telegram_config: Some(config),
                ..UpdateSettingsRequest::default()
            })
            .await?;
        Ok(settings.telegram_config)
    }

    pub async fn technician_name(&self) -> String {
        self.get().await.technician_name
    }

    pub async fn update_technician_name(&self, name: String) -> Result<String, AppError> {
        let settings = self
            .update(UpdateSettingsRequest {
                technician_name: Some(name),
                ..UpdateSettingsRequest::default()
            })
            .await?;
        Ok(settings.technician_name)
    }

    /// Drops the stored record (used by the data wipe); the next `get`
    /// recreates the defaults.
    pub async fn clear(&self) -> Result<(), AppError> {
        self.store.remove(SETTINGS_KEY).await
    }

    async fn load(&self) -> Result<AppSettings, AppError> {
        match self.store.read(SETTINGS_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(AppSettings::default()),
        }
    }

    async fn persist(&self, settings: &AppSettings) -> Result<(), AppError> {
        let raw = serde_json::to_string(settings)?;
        self.store.write(SETTINGS_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::ThemePreference;

    async fn repo() -> SettingsRepository {
        SettingsRepository::new(RecordStore::new(crate::db::test_pool().await))
    }

    #[tokio::test]
    async fn get_returns_defaults_before_first_write() {
        let settings = repo().await.get().await;
        assert_eq!(settings.technician_name, "Technician");
        assert!(!settings.telegram_config.is_configured());
        assert_eq!(settings.theme, ThemePreference::Auto);
    }

    #[tokio::test]
    async fn update_merges_partially() {
        let repo = repo().await;
        let updated = repo
            .update(UpdateSettingsRequest {
                technician_name: Some("Mihai".to_string()),
                ..UpdateSettingsRequest::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.technician_name, "Mihai");
        assert_eq!(updated.theme, ThemePreference::Auto);

        let updated = repo
            .update(UpdateSettingsRequest {
                theme: Some(ThemePreference::Dark),
                ..UpdateSettingsRequest::default()
            })
            .await
            .unwrap();
        // earlier merge survives
        assert_eq!(updated.technician_name, "Mihai");
        assert_eq!(updated.theme, ThemePreference::Dark);
    }

    #[tokio::test]
    async fn telegram_config_projection_roundtrips() {
        let repo = repo().await;
        let config = TelegramConfig {
            bot_token: "123:abc".to_string(),
            group_id: "-100123".to_string(),
        };
        repo.update_telegram_config(config.clone()).await.unwrap();
        assert_eq!(repo.telegram_config().await, config);
        assert!(repo.get().await.telegram_config.is_configured());
    }

    #[tokio::test]
    async fn technician_name_projection() {
        let repo = repo().await;
        repo.update_technician_name("Ioana".to_string())
            .await
            .unwrap();
        assert_eq!(repo.technician_name().await, "Ioana");
    }

    #[tokio::test]
    async fn clear_restores_defaults() {
        let repo = repo().await;
        repo.update_technician_name("Ioana".to_string())
            .await
            .unwrap();
        repo.clear().await.unwrap();
        assert_eq!(repo.get().await.technician_name, "Technician");
    }
}

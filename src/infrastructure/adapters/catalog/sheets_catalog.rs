//! Google Sheets Catalog - 从表格读取内部链接候选文章
//!
//! GET {base_url}/v4/spreadsheets/{id}/values/{range}?key=...
//! A 列为标题，B 列为 URL，第一行是表头

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::{
    ArticleCatalogPort, Catalog, CatalogEntry, CatalogError, CatalogSource,
};

/// Sheets 配置
#[derive(Debug, Clone)]
pub struct SheetsCatalogConfig {
    pub spreadsheet_id: String,
    pub api_key: String,
    pub range: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl SheetsCatalogConfig {
    pub fn new(spreadsheet_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
            range: "A2:B".to_string(),
            base_url: "https://sheets.googleapis.com".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// 只保留标题和 URL 都存在的行
fn parse_rows(rows: Vec<Vec<String>>) -> Vec<CatalogEntry> {
    rows.into_iter()
        .filter_map(|row| {
            let title = row.first()?.trim();
            let url = row.get(1)?.trim();
            (!title.is_empty() && !url.is_empty()).then(|| CatalogEntry::new(title, url))
        })
        .collect()
}

/// Google Sheets 目录来源
pub struct SheetsCatalogSource {
    client: Client,
    config: SheetsCatalogConfig,
}

impl SheetsCatalogSource {
    pub fn new(config: SheetsCatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn values_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.spreadsheet_id,
            self.config.range
        )
    }
}

#[async_trait]
impl ArticleCatalogPort for SheetsCatalogSource {
    async fn fetch(&self) -> Result<Catalog, CatalogError> {
        if self.config.spreadsheet_id.is_empty() || self.config.api_key.is_empty() {
            return Err(CatalogError::NotConfigured);
        }

        let response = self
            .client
            .get(self.values_url())
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Network(format!("HTTP {}: {}", status, error_text)));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidData(e.to_string()))?;

        let entries = parse_rows(range.values);
        tracing::info!(count = entries.len(), "Fetched article catalog from Google Sheets");
        Ok(Catalog::new(entries, CatalogSource::GoogleSheets))
    }
}

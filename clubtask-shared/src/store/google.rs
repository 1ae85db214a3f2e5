/// Google Sheets sheet store
///
/// Talks to the Sheets v4 REST API with a bearer access token. Each table is
/// one tab of a single spreadsheet.
///
/// # Requests
///
/// - read: `GET /v4/spreadsheets/{id}/values/{tab}`
/// - overwrite: `POST /v4/spreadsheets/{id}/values/{tab}:clear`, then
///   `PUT /v4/spreadsheets/{id}/values/{tab}!A1:Z{n}?valueInputOption=RAW`
///
/// Any 2xx response counts as success, even when the body is not the JSON
/// the API documents. A read of a tab that does not exist comes back as a 400
/// with "Unable to parse range"; that is treated as an empty table.
///
/// # Example
///
/// ```no_run
/// use clubtask_shared::store::google::{GoogleSheetsConfig, GoogleSheetsStore};
/// use clubtask_shared::store::SheetStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = GoogleSheetsStore::new(GoogleSheetsConfig::new("spreadsheet-id", "ya29.token"))?;
/// let members = store.read_all("Members", &["Name", "Role"]).await?;
/// # Ok(())
/// # }
/// ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Sheet, SheetStore, StoreError};

/// Default Sheets API endpoint
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Rightmost column written on overwrite
const LAST_COLUMN: &str = "Z";

/// Connection settings for [`GoogleSheetsStore`]
#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    /// Spreadsheet key (from the sheet URL)
    pub spreadsheet_id: String,

    /// OAuth bearer token with the spreadsheets scope
    pub access_token: String,

    /// API base URL, overridable for tests
    pub api_base: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl GoogleSheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }

    /// Overrides the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

/// Sheet store backed by a Google spreadsheet
#[derive(Debug, Clone)]
pub struct GoogleSheetsStore {
    client: Client,
    config: GoogleSheetsConfig,
}

impl GoogleSheetsStore {
    /// Creates a store
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Http` if the HTTP client cannot be built
    pub fn new(config: GoogleSheetsConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.spreadsheet_id,
            range
        )
    }

    async fn failure(table: &str, response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(table, %status, "Google Sheets request failed");
        StoreError::Backend(format!("Google Sheets returned {}: {}", status, body))
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_values(body: &Value) -> Result<Vec<Vec<String>>, StoreError> {
    let rows = match body.get("values") {
        Some(Value::Array(rows)) => rows,
        Some(_) => return Err(StoreError::Malformed("`values` is not an array".to_string())),
        None => return Ok(Vec::new()),
    };

    rows.iter()
        .map(|row| match row {
            Value::Array(cells) => Ok(cells.iter().map(cell_text).collect()),
            _ => Err(StoreError::Malformed("row is not an array".to_string())),
        })
        .collect()
}

#[async_trait]
impl SheetStore for GoogleSheetsStore {
    fn backend_name(&self) -> &str {
        "google-sheets"
    }

    async fn read_all(&self, table: &str, default_columns: &[&str]) -> Result<Sheet, StoreError> {
        let response = self
            .client
            .get(self.values_url(table))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            if body.contains("Unable to parse range") {
                debug!(table, "Sheet tab does not exist, using default schema");
                return Ok(Sheet::with_columns(default_columns));
            }
            return Err(StoreError::Backend(format!(
                "Google Sheets returned {}: {}",
                status, body
            )));
        }
        if !status.is_success() {
            return Err(Self::failure(table, response).await);
        }

        let body: Value = response.json().await?;
        Ok(Sheet::from_grid(parse_values(&body)?, default_columns))
    }

    async fn overwrite_all(&self, table: &str, sheet: &Sheet) -> Result<(), StoreError> {
        let response = self
            .client
            .post(format!("{}:clear", self.values_url(table)))
            .bearer_auth(&self.config.access_token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(table, response).await);
        }

        let grid = sheet.to_grid();
        let range = format!("{}!A1:{}{}", table, LAST_COLUMN, grid.len());
        let body = ValueRange {
            range: &range,
            major_dimension: "ROWS",
            values: grid,
        };

        let response = self
            .client
            .put(self.values_url(&range))
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::failure(table, response).await);
        }

        debug!(table, rows = sheet.len(), "Sheet tab overwritten");
        Ok(())
    }
}

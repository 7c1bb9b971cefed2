use std::sync::Arc;

use async_trait::async_trait;
use common::gateway::{GatewayError, MirrorWrite, TabularMirror};
use common::sheet::{self, RangeUpdate, SpreadsheetRow};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{GoogleApiError, ServiceAccountAuth, check};

const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Spreadsheet mirror with one row per student, keyed by register number.
pub struct SheetsMirror {
    client: reqwest::Client,
    auth: Arc<ServiceAccountAuth>,
    spreadsheet_id: String,
    sheet_name: String,
    api_base: String,
}

impl SheetsMirror {
    pub fn new(
        client: reqwest::Client,
        auth: Arc<ServiceAccountAuth>,
        spreadsheet_id: String,
        sheet_name: String,
    ) -> Self {
        Self {
            client,
            auth,
            spreadsheet_id,
            sheet_name,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// `{base}/v4/spreadsheets/{id}/{segment}` with the segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, GoogleApiError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| GoogleApiError::UnexpectedResponse(format!("bad API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| GoogleApiError::UnexpectedResponse("cannot-be-a-base URL".into()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(segments);
        Ok(url)
    }

    async fn read_rows(&self, token: &str) -> Result<Vec<Vec<String>>, GoogleApiError> {
        let range = sheet::full_range(&self.sheet_name);
        let response = self
            .client
            .get(self.url(&["values", range.as_str()])?)
            .bearer_auth(token)
            .send()
            .await?;
        let body: ValueRange = check(response).await?.json().await?;
        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append(&self, token: &str, values: Vec<String>) -> Result<(), GoogleApiError> {
        let range = sheet::full_range(&self.sheet_name);
        let response = self
            .client
            .post(self.url(&["values", format!("{range}:append").as_str()])?)
            .bearer_auth(token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [values] }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn batch_update(&self, token: &str, updates: Vec<RangeUpdate>) -> Result<(), GoogleApiError> {
        let data: Vec<serde_json::Value> = updates
            .into_iter()
            .map(|u| json!({ "range": u.range, "values": [u.values] }))
            .collect();
        let response = self
            .client
            .post(self.url(&["values:batchUpdate"])?)
            .bearer_auth(token)
            .json(&json!({ "valueInputOption": "RAW", "data": data }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn upsert(&self, row: &SpreadsheetRow) -> Result<MirrorWrite, GoogleApiError> {
        let token = self.auth.access_token(&self.client).await?;
        let mut rows = self.read_rows(&token).await?;

        if rows.is_empty() {
            let header = sheet::header();
            self.append(&token, header.clone()).await?;
            rows.push(header);
        }

        match sheet::find_row(&rows, &row.register_number) {
            Some(index) => {
                let updates = row.update_ranges(&self.sheet_name, index, &rows[index]);
                debug!(row = index + 1, ranges = updates.len(), "Updating sheet row");
                self.batch_update(&token, updates).await?;
                Ok(MirrorWrite::Updated)
            }
            None => {
                // Header counts as row 1, so the first student gets serial 1.
                self.append(&token, row.append_values(rows.len())).await?;
                Ok(MirrorWrite::Appended)
            }
        }
    }
}

#[async_trait]
impl TabularMirror for SheetsMirror {
    async fn upsert_row(&self, row: &SpreadsheetRow) -> Result<MirrorWrite, GatewayError> {
        Ok(self.upsert(row).await?)
    }
}

//! Google Sheets table store over the v4 REST API.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::config::SheetConfig;

use super::{Cell, RowColor, TableStore};

/// One tab of a hosted spreadsheet.
pub struct GoogleSheetsTable {
    client: Client,
    api_base: Url,
    spreadsheet_id: String,
    sheet_title: String,
    sheet_id: u64,
    token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ValueRange {
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorDetail {
    message: String,
}

impl GoogleSheetsTable {
    pub fn new(
        api_base: &str,
        spreadsheet_id: impl Into<String>,
        sheet_title: impl Into<String>,
        sheet_id: u64,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let api_base = Url::parse(api_base)
            .map_err(|e| StoreError::Unavailable(format!("invalid API base: {}", e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            api_base,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_title: sheet_title.into(),
            sheet_id,
            token: token.into(),
        })
    }

    /// Open the configured tab, reading the bearer token from the environment.
    pub fn from_config(config: &SheetConfig) -> Result<Self, StoreError> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(StoreError::Unavailable(
                "no spreadsheet id configured (sheet.spreadsheet_id)".to_string(),
            ));
        }

        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| StoreError::Unavailable(format!("{} is not set", config.token_env)))?;

        Self::new(
            &config.api_base,
            config.spreadsheet_id.clone(),
            config.sheet_title.clone(),
            config.sheet_id,
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// A1 range covering the whole tab.
    fn sheet_range(&self) -> String {
        format!("'{}'", self.sheet_title.replace('\'', "''"))
    }

    /// `{base}/v4/spreadsheets/{id}` followed by `segments`.
    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable("API base cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self) -> Result<Url, StoreError> {
        self.url(&[&self.spreadsheet_id, "values", &self.sheet_range()])
    }

    fn append_url(&self) -> Result<Url, StoreError> {
        let range = format!("{}:append", self.sheet_range());
        self.url(&[&self.spreadsheet_id, "values", &range])
    }

    fn batch_update_url(&self) -> Result<Url, StoreError> {
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        self.url(&[&target])
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .map(|b| b.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(body);

        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn fetch_values(&self) -> Result<Vec<Vec<Value>>, StoreError> {
        let response = self.send(self.client.get(self.values_url()?))?;
        let range: ValueRange = response
            .json()
            .map_err(|e| StoreError::Request(format!("invalid values response: {}", e)))?;
        Ok(range.values)
    }
}

fn repeat_cell_request(sheet_id: u64, start: usize, end: usize, color: RowColor) -> Value {
    json!({
        "requests": [{
            "repeatCell": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": start,
                    "endRowIndex": end,
                },
                "cell": {
                    "userEnteredFormat": {
                        "backgroundColor": color,
                    },
                },
                "fields": "userEnteredFormat.backgroundColor",
            }
        }]
    })
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl TableStore for GoogleSheetsTable {
    fn row_count(&self) -> Result<usize, StoreError> {
        let count = self.fetch_values()?.len();
        debug!("Sheet {} holds {} rows", self.sheet_title, count);
        Ok(count)
    }

    fn append_row(&self, cells: &[Cell]) -> Result<(), StoreError> {
        let request = self
            .client
            .post(self.append_url()?)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [cells] }));

        self.send(request).map_err(|e| match e {
            StoreError::Request(m) => StoreError::Append(m),
            other => other,
        })?;
        Ok(())
    }

    fn color_rows(&self, start: usize, end: usize, color: RowColor) -> Result<(), StoreError> {
        info!("Coloring rows {}..{} of sheet {}", start, end, self.sheet_id);

        let request = self
            .client
            .post(self.batch_update_url()?)
            .json(&repeat_cell_request(self.sheet_id, start, end, color));

        self.send(request)?;
        Ok(())
    }

    fn read_rows(&self, limit: usize) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self
            .fetch_values()?
            .iter()
            .take(limit)
            .map(|row| row.iter().map(value_to_string).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canned_http::{refused_base, CannedServer};
    use crate::store::PALETTE;

    fn table() -> GoogleSheetsTable {
        GoogleSheetsTable::new(
            "https://sheets.example.test",
            "abc123",
            "Livraisons",
            42,
            "token",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let table = table();

        assert_eq!(
            table.values_url().unwrap().as_str(),
            "https://sheets.example.test/v4/spreadsheets/abc123/values/'Livraisons'"
        );
        assert_eq!(
            table.append_url().unwrap().as_str(),
            "https://sheets.example.test/v4/spreadsheets/abc123/values/'Livraisons':append"
        );
        assert_eq!(
            table.batch_update_url().unwrap().as_str(),
            "https://sheets.example.test/v4/spreadsheets/abc123:batchUpdate"
        );
    }

    #[test]
    fn test_repeat_cell_body() {
        let body = repeat_cell_request(42, 10, 13, PALETTE[0]);
        let request = &body["requests"][0]["repeatCell"];

        assert_eq!(request["range"]["sheetId"], 42);
        assert_eq!(request["range"]["startRowIndex"], 10);
        assert_eq!(request["range"]["endRowIndex"], 13);
        assert_eq!(request["fields"], "userEnteredFormat.backgroundColor");
        assert!(request["cell"]["userEnteredFormat"]["backgroundColor"]["green"] == 1.0);
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("Mai")), "Mai");
        assert_eq!(value_to_string(&json!(6)), "6");
        assert_eq!(value_to_string(&Value::Null), "");
    }

    fn served_table(base: &str) -> GoogleSheetsTable {
        GoogleSheetsTable::new(base, "abc123", "Livraisons", 42, "token", Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_row_count_includes_header() {
        let server = CannedServer::start(vec![(
            200,
            r#"{"range": "Livraisons!A1:H3", "values": [["Mois", "DOIT"], ["Mai", "S2M"], ["Mai", "S2M"]]}"#,
        )]);

        assert_eq!(served_table(server.base()).row_count().unwrap(), 3);

        let requests = server.requests();
        assert!(requests[0].starts_with("GET /v4/spreadsheets/abc123/values/"));
        assert!(requests[0].to_lowercase().contains("authorization: bearer token"));
    }

    #[test]
    fn test_batch_starts_after_last_row() {
        let server = CannedServer::start(vec![
            (200, r#"{"values": [["Mois"], ["Mai"], ["Mai"]]}"#),
            (200, "{}"),
            (200, r#"{"values": [["Mois"], ["Mai"], ["Mai"], ["Juin"]]}"#),
            (200, "{}"),
        ]);
        let fields = crate::models::invoice::RecordFields {
            month: "Juin".to_string(),
            ..Default::default()
        };
        let items = vec![crate::models::invoice::LineItem::new("Chablis", 12)];

        let result = crate::store::BatchAppender::new()
            .append_batch(&served_table(server.base()), &fields, &items, "CFSTOCK", 1)
            .unwrap();

        assert_eq!(result.start_row, 4);
        assert_eq!(result.end_row, 4);
        assert!(result.colored());

        let requests = server.requests();
        assert!(requests[1].contains("valueInputOption=RAW"));
        assert!(requests[1].contains("insertDataOption=INSERT_ROWS"));
        assert!(requests[1].contains(r#""Chablis",12,"CFSTOCK""#));
        assert!(requests[3].contains(":batchUpdate"));
        assert!(requests[3].contains(r#""startRowIndex":3"#));
        assert!(requests[3].contains(r#""endRowIndex":4"#));
    }

    #[test]
    fn test_api_error_message_is_extracted() {
        let server = CannedServer::start(vec![(
            403,
            r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#,
        )]);

        let err = served_table(server.base()).row_count().unwrap_err();
        server.requests();

        match err {
            StoreError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "The caller does not have permission");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unreachable_append_is_append_error() {
        let table = served_table(&refused_base());
        let cells = vec![Cell::from("Mai"), Cell::from(6u32)];

        assert!(matches!(table.append_row(&cells), Err(StoreError::Append(_))));
        assert!(matches!(table.row_count(), Err(StoreError::Request(_))));
    }

    #[test]
    fn test_missing_spreadsheet_id_is_unavailable() {
        let config = SheetConfig::default();
        assert!(matches!(
            GoogleSheetsTable::from_config(&config),
            Err(StoreError::Unavailable(_))
        ));
    }
}

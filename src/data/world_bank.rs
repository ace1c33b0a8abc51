//! World Bank Indicators API (v2) integration.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::config::Settings;
use crate::data::IndicatorSource;
use crate::domain::{Country, FetchRequest, WideTable};
use crate::error::AppError;

const PER_PAGE: usize = 1000;
const COUNTRIES_PER_PAGE: usize = 400;

pub struct WorldBankClient {
    client: Client,
    base_url: String,
}

impl WorldBankClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self::new(settings.http_client()?, settings.wb_api_base.clone()))
    }

    /// Fetch every page of one indicator into `table` under `column`.
    fn fetch_indicator(
        &self,
        code: &str,
        request: &FetchRequest,
        table: &mut WideTable,
        column: usize,
    ) -> Result<usize, AppError> {
        let url = format!(
            "{}/country/{}/indicator/{}",
            self.base_url,
            request.countries.join(";"),
            code
        );
        let date = format!("{}:{}", request.start_year, request.end_year);

        let mut page = 1usize;
        let mut count = 0usize;
        loop {
            debug!(%url, page, "world bank request");
            let per_page = PER_PAGE.to_string();
            let page_no = page.to_string();
            let body = self.get_json(
                &url,
                &[
                    ("format", "json"),
                    ("date", date.as_str()),
                    ("per_page", per_page.as_str()),
                    ("page", page_no.as_str()),
                ],
            )?;
            let (meta, rows) = split_response(body)?;

            for row in rows {
                let row: IndicatorRow = serde_json::from_value(row)
                    .map_err(|e| AppError::data(format!("Unexpected World Bank row for {code}: {e}")))?;
                table.set(&row.country.value, &row.date, column, row.value.and_then(finite));
                count += 1;
            }

            if page >= meta.pages {
                break;
            }
            page += 1;
        }
        Ok(count)
    }

    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, AppError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| AppError::data(format!("World Bank request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::data(format!(
                "World Bank request failed with status {}.",
                resp.status()
            )));
        }

        resp.json()
            .map_err(|e| AppError::data(format!("Failed to parse World Bank response: {e}")))
    }
}

impl IndicatorSource for WorldBankClient {
    fn fetch(&self, request: &FetchRequest) -> Result<WideTable, AppError> {
        if request.countries.is_empty() {
            return Err(AppError::usage("Select at least one country."));
        }
        if request.codes.is_empty() {
            return Err(AppError::usage("No indicators requested."));
        }

        let columns = request.codes.iter().map(|c| column_label(c)).collect();
        let mut table = WideTable::with_columns(columns);
        let mut failures = 0usize;

        for (column, code) in request.codes.iter().enumerate() {
            match self.fetch_indicator(code, request, &mut table, column) {
                Ok(n) => debug!(code = %code, rows = n, "indicator fetched"),
                Err(err) => {
                    warn!(code = %code, error = %err, "indicator skipped");
                    table.warnings.push(format!("{}: {err}", column_label(code)));
                    failures += 1;
                }
            }
        }

        if failures == request.codes.len() {
            return Err(AppError::data(format!(
                "All {} indicator requests failed (first: {}).",
                failures,
                table.warnings.first().map(String::as_str).unwrap_or("unknown error")
            )));
        }

        info!(
            rows = table.rows.len(),
            values = table.value_count(),
            skipped = failures,
            "world bank fetch complete"
        );
        Ok(table)
    }

    fn countries(&self) -> Result<Vec<Country>, AppError> {
        let url = format!("{}/country", self.base_url);
        let mut out = Vec::new();
        let mut page = 1usize;
        loop {
            let per_page = COUNTRIES_PER_PAGE.to_string();
            let page_no = page.to_string();
            let body = self.get_json(
                &url,
                &[
                    ("format", "json"),
                    ("per_page", per_page.as_str()),
                    ("page", page_no.as_str()),
                ],
            )?;
            let (meta, rows) = split_response(body)?;
            for row in rows {
                let row: CountryRow = serde_json::from_value(row)
                    .map_err(|e| AppError::data(format!("Unexpected World Bank country row: {e}")))?;
                out.push(Country {
                    id: row.id,
                    name: row.name.trim().to_string(),
                });
            }
            if page >= meta.pages {
                break;
            }
            page += 1;
        }

        if out.is_empty() {
            return Err(AppError::data("World Bank returned no countries."));
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

/// Column header for a requested code: the catalog label, else the code itself.
pub fn column_label(code: &str) -> String {
    catalog::by_code(code)
        .map(|i| i.name.to_string())
        .unwrap_or_else(|| code.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageMeta {
    pages: usize,
}

#[derive(Debug, Deserialize)]
struct IndicatorRow {
    country: IdValue,
    date: String,
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct IdValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct CountryRow {
    id: String,
    name: String,
}

/// Split a `[meta, rows]` response, surfacing provider error messages.
fn split_response(body: Value) -> Result<(PageMeta, Vec<Value>), AppError> {
    let Value::Array(mut parts) = body else {
        return Err(AppError::data("World Bank response is not a JSON array."));
    };
    if parts.is_empty() {
        return Err(AppError::data("World Bank response is empty."));
    }

    let meta = parts.remove(0);
    if let Some(messages) = meta.get("message") {
        return Err(AppError::data(format!(
            "World Bank error: {}",
            provider_message(messages)
        )));
    }

    let pages = meta.get("pages").and_then(as_usize).unwrap_or(0);
    let rows = match parts.into_iter().next() {
        Some(Value::Array(rows)) => rows,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(AppError::data(format!(
                "World Bank rows have unexpected shape: {other}"
            )));
        }
    };
    Ok((PageMeta { pages }, rows))
}

fn provider_message(messages: &Value) -> String {
    let parts: Vec<String> = messages
        .as_array()
        .map(|arr| {
            arr.iter()
                .map(|m| {
                    let key = m.get("key").and_then(Value::as_str).unwrap_or("");
                    let value = m.get("value").and_then(Value::as_str).unwrap_or("");
                    format!("{key} {value}").trim().to_string()
                })
                .collect()
        })
        .unwrap_or_default();
    if parts.is_empty() {
        messages.to_string()
    } else {
        parts.join("; ")
    }
}

fn as_usize(v: &Value) -> Option<usize> {
    v.as_u64()
        .map(|n| n as usize)
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn finite(v: f64) -> Option<f64> {
    if v.is_finite() { Some(v) } else { None }
}

//! IMF World Economic Outlook (WEO) releases: download and parsing.
//!
//! Releases are tab-separated tables, one row per (country, subject code),
//! one column per year. Values may carry thousands separators, and missing
//! values are written as `n/a` or `--`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::domain::YearSeries;
use crate::error::{AppError, Notice};

const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const COL_SUBJECT: &str = "WEO Subject Code";
const COL_COUNTRY: &str = "Country";
const COL_ISO: &str = "ISO";

/// `1..=12` -> `Jan..Dec`.
pub fn month_abbrev(month: u32) -> Option<&'static str> {
    MONTH_ABBREVS.get(month.checked_sub(1)? as usize).copied()
}

/// Something that can fetch one WEO release to a local file.
pub trait ReleaseDownloader {
    fn download(&self, year: i32, release: &str, path: &Path) -> Result<(), AppError>;
}

/// A release that was downloaded successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeoRelease {
    pub path: PathBuf,
    pub year: i32,
    /// Month abbreviation, e.g. `Oct`.
    pub release: String,
}

impl WeoRelease {
    pub fn label(&self) -> String {
        format!("{} {}", self.release, self.year)
    }
}

/// Result of walking back through candidate months.
#[derive(Debug, Clone)]
pub struct ReleaseSearch {
    pub release: WeoRelease,
    /// One warning per month that failed before the successful one.
    pub notices: Vec<Notice>,
}

pub fn release_file_name(year: i32, release: &str) -> String {
    format!("weo_{year}_{release}.csv")
}

/// Try `target_month`, then each earlier month of `year`, until a download succeeds.
pub fn find_latest_release<D: ReleaseDownloader + ?Sized>(
    downloader: &D,
    year: i32,
    target_month: u32,
    dir: &Path,
) -> Result<ReleaseSearch, AppError> {
    if month_abbrev(target_month).is_none() {
        return Err(AppError::usage(format!(
            "Invalid WEO target month {target_month}."
        )));
    }

    let mut notices = Vec::new();
    for month in (1..=target_month).rev() {
        let Some(release) = month_abbrev(month) else {
            continue;
        };
        let path = dir.join(release_file_name(year, release));
        match downloader.download(year, release, &path) {
            Ok(()) => {
                info!(year, release, path = %path.display(), "WEO release downloaded");
                return Ok(ReleaseSearch {
                    release: WeoRelease {
                        path,
                        year,
                        release: release.to_string(),
                    },
                    notices,
                });
            }
            Err(err) => {
                warn!(year, release, error = %err, "WEO download failed");
                notices.push(Notice::warning(format!(
                    "Download failed for {release} {year}: {err}"
                )));
            }
        }
    }

    Err(AppError::data(format!(
        "Could not download any WEO release for {year} ({} attempts). Check which releases are published.",
        notices.len()
    ))
    .with_notices(notices))
}

/// Downloads releases over HTTP from a URL template.
pub struct HttpWeoDownloader {
    client: Client,
    url_template: String,
}

impl HttpWeoDownloader {
    pub fn new(client: Client, url_template: impl Into<String>) -> Self {
        Self {
            client,
            url_template: url_template.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, AppError> {
        Ok(Self::new(settings.http_client()?, settings.weo_url_template.clone()))
    }

    pub fn release_url(&self, year: i32, release: &str) -> String {
        self.url_template
            .replace("{year}", &year.to_string())
            .replace("{release}", release)
    }
}

impl ReleaseDownloader for HttpWeoDownloader {
    fn download(&self, year: i32, release: &str, path: &Path) -> Result<(), AppError> {
        let url = self.release_url(year, release);
        debug!(%url, "WEO request");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::data(format!("WEO request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(AppError::data(format!(
                "WEO request failed with status {}.",
                resp.status()
            )));
        }
        let bytes = resp
            .bytes()
            .map_err(|e| AppError::data(format!("Failed to read WEO response: {e}")))?;

        // Unknown releases come back as an HTML page with a 200 status.
        let text = decode_weo_bytes(&bytes)?;
        let header = text.lines().next().unwrap_or("");
        if !header.contains(COL_SUBJECT) {
            return Err(AppError::data(format!(
                "Response for {release} {year} is not a WEO table."
            )));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::data(format!("Failed to create '{}': {e}", parent.display())))?;
        }
        fs::write(path, &bytes)
            .map_err(|e| AppError::data(format!("Failed to write '{}': {e}", path.display())))?;
        Ok(())
    }
}

/// Decode a release file: UTF-16LE when it carries a BOM, else UTF-8, else Latin-1.
pub fn decode_weo_bytes(bytes: &[u8]) -> Result<String, AppError> {
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16(&units)
            .map_err(|e| AppError::data(format!("Invalid UTF-16 WEO file: {e}")));
    }
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => Ok(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// A WEO country (name + ISO code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeoCountry {
    pub name: String,
    pub iso: String,
}

#[derive(Debug, Clone)]
struct WeoRow {
    subject: String,
    country: String,
    iso: String,
    values: YearSeries,
}

/// A parsed WEO release.
#[derive(Debug, Clone)]
pub struct WeoDataset {
    rows: Vec<WeoRow>,
    years: Vec<i32>,
}

impl WeoDataset {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let bytes = fs::read(path)
            .map_err(|e| AppError::data(format!("Failed to read WEO file '{}': {e}", path.display())))?;
        let text = decode_weo_bytes(&bytes)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::data(format!("Failed to read WEO header: {e}")))?
            .clone();

        let find = |name: &str| headers.iter().position(|h| h == name);
        let (Some(i_country), Some(i_iso)) = (find(COL_COUNTRY), find(COL_ISO)) else {
            return Err(AppError::data(
                "WEO file has no 'Country' or 'ISO' column. Check the downloaded file.",
            ));
        };
        let i_subject = find(COL_SUBJECT)
            .ok_or_else(|| AppError::data("WEO file has no 'WEO Subject Code' column."))?;

        let year_cols: Vec<(usize, i32)> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                let year = h.parse::<i32>().ok()?;
                (1900..=2200).contains(&year).then_some((i, year))
            })
            .collect();
        if year_cols.is_empty() {
            return Err(AppError::data("WEO file has no year columns."));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AppError::data(format!("Malformed WEO row: {e}")))?;
            let subject = record.get(i_subject).unwrap_or("");
            let iso = record.get(i_iso).unwrap_or("");
            let country = record.get(i_country).unwrap_or("");
            // Footer lines carry a single cell.
            if subject.is_empty() || iso.is_empty() || country.is_empty() {
                continue;
            }

            let values = year_cols
                .iter()
                .filter_map(|&(i, year)| parse_weo_value(record.get(i)?).map(|v| (year, v)))
                .collect();

            rows.push(WeoRow {
                subject: subject.to_string(),
                country: country.to_string(),
                iso: iso.to_string(),
                values,
            });
        }

        debug!(rows = rows.len(), years = year_cols.len(), "WEO table parsed");
        Ok(Self {
            rows,
            years: year_cols.into_iter().map(|(_, y)| y).collect(),
        })
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Distinct countries in file order.
    pub fn countries(&self) -> Vec<WeoCountry> {
        let mut out: Vec<WeoCountry> = Vec::new();
        for row in &self.rows {
            if !out.iter().any(|c| c.iso == row.iso) {
                out.push(WeoCountry {
                    name: row.country.clone(),
                    iso: row.iso.clone(),
                });
            }
        }
        out
    }

    /// Resolve a country display name to its ISO code.
    pub fn iso_for(&self, name: &str) -> Result<String, AppError> {
        self.rows
            .iter()
            .find(|r| r.country == name)
            .map(|r| r.iso.clone())
            .ok_or_else(|| AppError::data(format!("No ISO code found for country '{name}'.")))
    }

    /// Per-country accessor over the raw subject series.
    pub fn country(&self, iso: &str) -> Result<CountryRecord, AppError> {
        let mut name = None;
        let mut fields = HashMap::new();
        for row in self.rows.iter().filter(|r| r.iso == iso) {
            name.get_or_insert_with(|| row.country.clone());
            fields
                .entry(row.subject.clone())
                .or_insert_with(|| row.values.clone());
        }
        let name = name.ok_or_else(|| AppError::data(format!("Country '{iso}' not found in WEO data.")))?;
        Ok(CountryRecord {
            iso: iso.to_string(),
            name,
            fields,
        })
    }
}

/// Raw WEO fields of one country, keyed by subject code.
#[derive(Debug, Clone)]
pub struct CountryRecord {
    pub iso: String,
    pub name: String,
    fields: HashMap<String, YearSeries>,
}

impl CountryRecord {
    pub fn field(&self, code: &str) -> Result<&YearSeries, AppError> {
        self.fields.get(code).ok_or_else(|| {
            AppError::data(format!("WEO field '{code}' is missing for {}.", self.name))
        })
    }
}

fn parse_weo_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") || trimmed == "--" {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

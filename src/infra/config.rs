use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analyzers::periods::YearQuarter;
use crate::analyzers::regions::RegionMap;

fn default_encoding() -> String {
    "cp949".to_string()
}

/// Run configuration, stored as a JSON object on disk:
/// ```json
/// {
///   "AWS_ACCESS_KEY_ID": "AKIA...",
///   "AWS_SECRET_ACCESS_KEY": "...",
///   "BUCKET_NAME": "airdna-exports",
///   "BASE_PREFIX": "korea/monthly/",
///   "DATA_DIRECTORY": "data",
///   "P_YM": "2024-06-01",
///   "YQ": "2024.Q2"
/// }
/// ```
#[derive(Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ReportConfig {
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_region: Option<String>,
    #[serde(default)]
    pub bucket_name: String,
    #[serde(default)]
    pub base_prefix: String,
    pub data_directory: PathBuf,
    #[serde(default)]
    pub p_ym: Option<String>,
    pub yq: Option<String>,
    pub output_path: Option<PathBuf>,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub region_map: Option<RegionMap>,
    #[serde(default)]
    pub report_all_quarters: bool,
}

impl ReportConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Vendor folder label of the export month, e.g. `June 2024`.
    pub fn export_folder(&self) -> Result<String> {
        let p_ym = self
            .p_ym
            .as_deref()
            .context("P_YM must be set to locate the export")?;
        export_folder_name(p_ym)
    }

    /// Object-store prefix holding the export files.
    pub fn object_prefix(&self) -> Result<String> {
        Ok(format!("{}{}", self.base_prefix, self.export_folder()?))
    }

    /// Local directory the export is downloaded into.
    pub fn export_dir(&self) -> Result<PathBuf> {
        Ok(self.data_directory.join(self.export_folder()?))
    }

    /// Static credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.aws_access_key_id, &self.aws_secret_access_key) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }

    /// Year-quarter to report on: `requested` when given, otherwise `YQ`.
    pub fn report_quarter(&self, requested: Option<&str>) -> Result<YearQuarter> {
        let yq = requested
            .or(self.yq.as_deref())
            .context("year-quarter not given: pass --yq or set YQ in the config")?;
        Ok(yq.parse()?)
    }

    /// Built-in city lookup with configured entries layered on top.
    pub fn regions(&self) -> RegionMap {
        let mut regions = RegionMap::default();
        if let Some(overrides) = &self.region_map {
            regions.extend(overrides.clone());
        }
        regions
    }

    /// Report destination for `yq`.
    pub fn output_path_for(&self, yq: &str) -> PathBuf {
        self.output_path.clone().unwrap_or_else(|| {
            self.data_directory
                .join(format!("airdna_report_{}.csv", yq.trim()))
        })
    }

    /// Logs the configuration with credentials masked.
    pub fn log_summary(&self) {
        info!(
            aws_access_key_id = %self.aws_access_key_id.as_deref().map(mask_secret).unwrap_or_default(),
            aws_secret_access_key = %self.aws_secret_access_key.as_deref().map(mask_secret).unwrap_or_default(),
            bucket = %self.bucket_name,
            prefix = %self.object_prefix().unwrap_or_else(|_| self.base_prefix.clone()),
            data_directory = %self.data_directory.display(),
            p_ym = ?self.p_ym,
            yq = ?self.yq,
            "Configuration"
        );
    }
}

impl fmt::Debug for ReportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportConfig")
            .field("aws_access_key_id", &self.aws_access_key_id.as_deref().map(mask_secret))
            .field(
                "aws_secret_access_key",
                &self.aws_secret_access_key.as_deref().map(mask_secret),
            )
            .field("aws_region", &self.aws_region)
            .field("bucket_name", &self.bucket_name)
            .field("base_prefix", &self.base_prefix)
            .field("data_directory", &self.data_directory)
            .field("p_ym", &self.p_ym)
            .field("yq", &self.yq)
            .field("output_path", &self.output_path)
            .field("encoding", &self.encoding)
            .field("report_all_quarters", &self.report_all_quarters)
            .finish_non_exhaustive()
    }
}

/// Hides all but the first and last three characters of a secret.
/// Secrets of six characters or fewer are masked entirely.
pub fn mask_secret(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > 6 {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 3..].iter().collect();
        format!("{head}{}{tail}", "*".repeat(chars.len() - 6))
    } else {
        "*".repeat(chars.len())
    }
}

/// Converts an export month (`2024-06-01`) to the vendor's folder label (`June 2024`).
pub fn export_folder_name(p_ym: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(p_ym.trim(), "%Y-%m-%d")
        .with_context(|| format!("P_YM '{p_ym}' is not a YYYY-MM-DD date"))?;
    Ok(date.format("%B %Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    const SAMPLE: &str = r#"{
        "AWS_ACCESS_KEY_ID": "AKIAEXAMPLE123",
        "AWS_SECRET_ACCESS_KEY": "secretsecret",
        "BUCKET_NAME": "airdna-exports",
        "BASE_PREFIX": "korea/monthly/",
        "DATA_DIRECTORY": "data",
        "P_YM": "2024-06-01",
        "YQ": "2024.Q2",
        "REGION_MAP": {"Sejong": "충청권"}
    }"#;

    fn sample() -> ReportConfig {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_config() {
        let config = sample();

        assert_eq!(config.bucket_name, "airdna-exports");
        assert_eq!(config.yq.as_deref(), Some("2024.Q2"));
        assert_eq!(config.encoding, "cp949");
        assert!(!config.report_all_quarters);
        assert_eq!(config.credentials(), Some(("AKIAEXAMPLE123", "secretsecret")));
    }

    #[test]
    fn test_export_locations() {
        let config = sample();

        assert_eq!(config.export_folder().unwrap(), "June 2024");
        assert_eq!(config.object_prefix().unwrap(), "korea/monthly/June 2024");
        assert_eq!(config.export_dir().unwrap(), PathBuf::from("data/June 2024"));
        assert_eq!(
            config.output_path_for("2024.Q2"),
            PathBuf::from("data/airdna_report_2024.Q2.csv")
        );
    }

    #[test]
    fn test_regions_merge_overrides() {
        let regions = sample().regions();
        assert_eq!(regions.region_of("Sejong"), Some("충청권"));
        assert_eq!(regions.region_of("Seoul"), Some("서울"));
    }

    #[test]
    fn test_missing_credentials_use_ambient_chain() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"DATA_DIRECTORY": "data", "P_YM": "2024-06-01"}"#).unwrap();
        assert_eq!(config.credentials(), None);
        assert!(config.bucket_name.is_empty());
    }

    #[test]
    fn test_export_month_only_needed_for_export_paths() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"DATA_DIRECTORY": "data", "YQ": "2024.Q2"}"#).unwrap();

        assert_eq!(config.p_ym, None);
        assert!(config.export_dir().is_err());
        assert!(config.object_prefix().is_err());
        assert_eq!(
            config.output_path_for("2024.Q2"),
            PathBuf::from("data/airdna_report_2024.Q2.csv")
        );
    }

    #[test]
    fn test_report_quarter() {
        let config = sample();
        assert_eq!(config.report_quarter(None).unwrap(), YearQuarter { year: 2024, quarter: 2 });
        assert_eq!(
            config.report_quarter(Some("2023Q4")).unwrap(),
            YearQuarter { year: 2023, quarter: 4 }
        );

        let err = config.report_quarter(Some("2024.Q9")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AnalysisError>(),
            Some(&AnalysisError::InvalidPeriod("2024.Q9".to_string()))
        );

        let no_yq: ReportConfig =
            serde_json::from_str(r#"{"DATA_DIRECTORY": "data"}"#).unwrap();
        assert!(no_yq.report_quarter(None).is_err());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("AKIAEXAMPLE123"), "AKI********123");
        assert_eq!(mask_secret("abcdef"), "******");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_debug_masks_credentials() {
        let debug = format!("{:?}", sample());
        assert!(!debug.contains("secretsecret"));
        assert!(debug.contains("sec******ret"));
    }

    #[test]
    fn test_export_folder_name() {
        assert_eq!(export_folder_name("2024-01-01").unwrap(), "January 2024");
        assert!(export_folder_name("2024/01/01").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = ReportConfig::load(&path).unwrap();
        assert_eq!(config.p_ym.as_deref(), Some("2024-06-01"));
        assert!(ReportConfig::load(&dir.path().join("missing.json")).is_err());
    }
}

//! Software version records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use softlcm_kernel::SoftwareId;

/// A software image release for a device platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareVersion {
    pub id: SoftwareId,
    pub device_platform: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_of_support: Option<NaiveDate>,
    #[serde(default)]
    pub long_term_support: bool,
    #[serde(default)]
    pub pre_release: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
}

impl SoftwareVersion {
    pub fn new(
        id: impl Into<String>,
        device_platform: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: SoftwareId::new(id),
            device_platform: device_platform.into(),
            version: version.into(),
            alias: None,
            release_date: None,
            end_of_support: None,
            long_term_support: false,
            pre_release: false,
            documentation_url: None,
        }
    }

    /// Display label: `platform - version`, with the alias when set.
    pub fn label(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} - {} ({alias})", self.device_platform, self.version),
            None => format!("{} - {}", self.device_platform, self.version),
        }
    }

    /// Whether vendor support has ended on `date`.
    pub fn is_end_of_support(&self, date: NaiveDate) -> bool {
        self.end_of_support.is_some_and(|end| end <= date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn label_includes_alias_when_set() {
        let mut software = SoftwareVersion::new("sw-1", "cisco_ios", "15.2(4)M");
        assert_eq!(software.label(), "cisco_ios - 15.2(4)M");
        software.alias = Some("Golden".to_string());
        assert_eq!(software.label(), "cisco_ios - 15.2(4)M (Golden)");
    }

    #[test]
    fn end_of_support_is_inclusive() {
        let mut software = SoftwareVersion::new("sw-1", "arista_eos", "4.25M");
        assert!(!software.is_end_of_support(date(2030, 1, 1)));
        software.end_of_support = Some(date(2024, 6, 30));
        assert!(!software.is_end_of_support(date(2024, 6, 29)));
        assert!(software.is_end_of_support(date(2024, 6, 30)));
    }

    #[test]
    fn record_parses_with_optional_fields_missing() {
        let raw = r#"{"id":"sw-1","device_platform":"juniper_junos","version":"21.4R3"}"#;
        let software: SoftwareVersion = serde_json::from_str(raw).expect("must parse");
        assert!(!software.long_term_support);
        assert!(software.release_date.is_none());
    }
}

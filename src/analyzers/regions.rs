//! City to reporting-region lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Built-in city → region table for the AirDNA Korea export.
static DEFAULT_REGIONS: &[(&str, &str)] = &[
    ("Gangwon-do", "강원"),
    ("Jeju Island", "제주"),
    ("Seoul", "서울"),
    ("Daegu", "경북권"),
    ("Busan", "부산"),
    ("Gyeongju-si", "경남권"),
    ("Suwon", "경기권"),
    ("Anyang", "경기권"),
    ("Chungcheongbuk-do", "충청권"),
    ("Incheon", "경기권"),
    ("Daejeon", "충청권"),
    ("Gwangju", "전라권"),
    ("Gyeonggi-do", "경기권"),
    ("Seongnam", "경기권"),
    ("Paengseong-eup", "경기권"),
    ("Bucheon", "경기권"),
    ("Jeollanam-do", "전라권"),
    ("Jeollabuk-do", "전라권"),
    ("Yongin", "경기권"),
    ("Chungcheongnam-do", "충청권"),
    ("Ulsan", "경남권"),
    ("Goyang", "경기권"),
    ("Uijeongbu", "경기권"),
];

/// Maps vendor city names to reporting regions.
///
/// Stored as a plain JSON object when configured:
/// ```json
/// { "Sejong": "충청권", "Pohang": "경북권" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionMap {
    entries: HashMap<String, String>,
}

impl Default for RegionMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_REGIONS
                .iter()
                .map(|(city, region)| (city.to_string(), region.to_string()))
                .collect(),
        }
    }
}

impl RegionMap {
    /// Returns the region for `city`, if one is configured.
    pub fn region_of(&self, city: &str) -> Option<&str> {
        self.entries.get(city).map(String::as_str)
    }

    /// Region label used for aggregation. Unmapped cities stand in as their own
    /// region, which counts toward the national figure but never reaches a
    /// report column.
    pub fn resolve<'a>(&'a self, city: &'a str) -> &'a str {
        self.region_of(city).unwrap_or(city)
    }

    /// Adds or replaces entries, keeping everything else.
    pub fn extend(&mut self, overrides: RegionMap) {
        self.entries.extend(overrides.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Legacy NVD 1.1 feed format, as persisted in the year partition files.
//!
//! Field names follow the retired `nvdcve-1.1` JSON feeds exactly; this is
//! the on-disk contract downstream consumers parse. Container lists are
//! always serialized (empty, never null) and `cpe_name` is always present
//! so consumers may index into them without presence checks.

use serde::{Deserialize, Serialize};

use crate::cvss::{CvssV2, CvssV3};
use crate::LangString;

pub const DATA_TYPE: &str = "CVE";
pub const DATA_FORMAT: &str = "MITRE";
pub const DATA_VERSION: &str = "4.0";

/// Top-level feed document, one per CVE year.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CveFeed {
    #[serde(rename = "CVE_data_type")]
    pub cve_data_type: String,
    #[serde(rename = "CVE_data_format")]
    pub cve_data_format: String,
    #[serde(rename = "CVE_data_version")]
    pub cve_data_version: String,
    /// Item count, string-encoded as in the original feeds.
    #[serde(rename = "CVE_data_numberOfCVEs")]
    pub cve_data_number_of_cves: String,
    #[serde(rename = "CVE_data_timestamp")]
    pub cve_data_timestamp: String,
    #[serde(rename = "CVE_Items")]
    pub cve_items: Vec<CveItem>,
}

impl CveFeed {
    /// Fresh feed with no items, stamped with the given generation time.
    pub fn empty(timestamp: impl Into<String>) -> Self {
        Self {
            cve_data_type: DATA_TYPE.to_string(),
            cve_data_format: DATA_FORMAT.to_string(),
            cve_data_version: DATA_VERSION.to_string(),
            cve_data_number_of_cves: "0".to_string(),
            cve_data_timestamp: timestamp.into(),
            cve_items: Vec::new(),
        }
    }

    pub fn update_count(&mut self) {
        self.cve_data_number_of_cves = self.cve_items.len().to_string();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CveItem {
    pub cve: Cve,
    #[serde(default)]
    pub configurations: Configurations,
    #[serde(default)]
    pub impact: Impact,
    /// Minute-precision `YYYY-MM-DDThh:mmZ`, empty when the upstream
    /// timestamp was missing or unparseable.
    #[serde(default)]
    pub last_modified_date: String,
    #[serde(default)]
    pub published_date: String,
}

/// The `cve` block of an item (the CVE JSON 4.0 sub-document).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cve {
    #[serde(rename = "CVE_data_meta")]
    pub cve_data_meta: CveDataMeta,
    pub data_format: String,
    pub data_type: String,
    pub data_version: String,
    pub description: Description,
    pub problemtype: ProblemType,
    pub references: References,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CveDataMeta {
    #[serde(rename = "ASSIGNER")]
    pub assigner: String,
    #[serde(rename = "ID")]
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub description_data: Vec<LangString>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemType {
    #[serde(default)]
    pub problemtype_data: Vec<ProblemTypeData>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemTypeData {
    #[serde(default)]
    pub description: Vec<LangString>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct References {
    #[serde(default)]
    pub reference_data: Vec<Reference>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub refsource: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Configurations {
    #[serde(rename = "CVE_data_version")]
    pub cve_data_version: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub cpe_match: Vec<CpeMatch>,
    #[serde(default)]
    pub negate: bool,
    #[serde(default)]
    pub operator: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpeMatch {
    #[serde(rename = "cpe23Uri")]
    pub cpe23_uri: String,
    #[serde(rename = "cpe_name", default)]
    pub cpe_name: Vec<CpeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_end_excluding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_end_including: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_start_excluding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_start_including: Option<String>,
    pub vulnerable: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CpeName {
    #[serde(rename = "cpe23Uri")]
    pub cpe23_uri: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_metric_v2: Option<BaseMetricV2>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_metric_v3: Option<BaseMetricV3>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMetricV2 {
    pub ac_insuf_info: bool,
    pub cvss_v2: CvssV2,
    pub exploitability_score: f64,
    pub impact_score: f64,
    pub obtain_all_privilege: bool,
    pub obtain_other_privilege: bool,
    pub obtain_user_privilege: bool,
    pub severity: String,
    pub user_interaction_required: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMetricV3 {
    pub cvss_v3: CvssV3,
    pub exploitability_score: f64,
    pub impact_score: f64,
}

//! Wire model for the VulnCheck NIST-NVD2 index (`/v3/index/nist-nvd2`).

use serde::{Deserialize, Serialize};

use crate::api2;

/// One page of the index. Pagination is cursor based: a non-null
/// `_meta.next_cursor` means more pages follow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnCheckResponse {
    #[serde(rename = "_meta", default)]
    pub meta: Meta,
    #[serde(default)]
    pub data: Vec<VulnCheckCve>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// A record is the NVD 2.0 CVE shape plus VulnCheck's own configuration
/// trees.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VulnCheckCve {
    #[serde(flatten)]
    pub cve: api2::Cve,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vc_configurations: Vec<api2::Config>,
}

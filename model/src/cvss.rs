//! CVSS metric data, shared between the 2.0 API models and the legacy feed
//! format. Both sides use the same camelCase field names, so one set of
//! structs serves the `cvssData` blocks upstream and the `cvssV2`/`cvssV3`
//! blocks in feed files.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvssV2 {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub vector_string: String,
    #[serde(default)]
    pub access_vector: String,
    #[serde(default)]
    pub access_complexity: String,
    #[serde(default)]
    pub authentication: String,
    #[serde(default)]
    pub confidentiality_impact: String,
    #[serde(default)]
    pub integrity_impact: String,
    #[serde(default)]
    pub availability_impact: String,
    #[serde(default)]
    pub base_score: f64,
    // Temporal and environmental metrics, rarely populated upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploitability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collateral_damage_potential: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_distribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidentiality_requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_score: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvssV3 {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub vector_string: String,
    #[serde(default)]
    pub attack_vector: String,
    #[serde(default)]
    pub attack_complexity: String,
    #[serde(default)]
    pub privileges_required: String,
    #[serde(default)]
    pub user_interaction: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub confidentiality_impact: String,
    #[serde(default)]
    pub integrity_impact: String,
    #[serde(default)]
    pub availability_impact: String,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default)]
    pub base_severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploit_code_maturity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidentiality_requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_requirement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_attack_vector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_attack_complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_privileges_required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_user_interaction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_confidentiality_impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_integrity_impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_availability_impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_severity: Option<String>,
}

//! Conversion of NVD API 2.0 records into the legacy 1.1 feed item shape.
//!
//! The mapping is lossy on purpose: the legacy format predates several 2.0
//! fields. It degrades instead of aborting: a malformed timestamp or unknown
//! description language costs that value a warning, never the record or the
//! page.

use chrono::NaiveDateTime;

use nvd_mirror_model::{api2, legacy, LangString};

const API20_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const LEGACY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

/// Convert one upstream record. Deterministic: the same input always yields
/// the same item.
pub fn to_legacy(cve: &api2::Cve) -> legacy::CveItem {
    let id = cve.id.clone().unwrap_or_default();

    legacy::CveItem {
        cve: legacy::Cve {
            cve_data_meta: legacy::CveDataMeta {
                assigner: cve.source_identifier.clone().unwrap_or_default(),
                id: id.clone(),
            },
            data_format: legacy::DATA_FORMAT.to_string(),
            data_type: legacy::DATA_TYPE.to_string(),
            data_version: legacy::DATA_VERSION.to_string(),
            description: legacy::Description {
                description_data: descriptions(&id, &cve.descriptions),
            },
            problemtype: problemtype(&cve.weaknesses),
            references: references(&cve.references),
        },
        configurations: configurations(&cve.configurations),
        impact: impact(&cve.metrics),
        last_modified_date: timestamp(&id, "lastModified", cve.last_modified.as_deref()),
        published_date: timestamp(&id, "published", cve.published.as_deref()),
    }
}

/// Legacy feeds carried English only. `en-US` is folded into `en`, Spanish
/// translations are dropped as the original feeds did, anything else is
/// unexpected and logged. Consumers rely on at least one entry being
/// present, so an empty result becomes a single blank English description.
fn descriptions(id: &str, descriptions: &[LangString]) -> Vec<LangString> {
    let mut out = Vec::new();
    for description in descriptions {
        match description.lang.as_str() {
            "en" => out.push(description.clone()),
            "en-US" => out.push(LangString::new("en", description.value.clone())),
            "es" => {}
            lang => log::warn!("Unknown description language {lang:?} on {id}, skipping"),
        }
    }
    if out.is_empty() {
        out.push(LangString::new("en", ""));
    }
    out
}

/// Consumers index into `problemtype_data` unconditionally, so a record
/// without weaknesses still gets one entry with an empty description list.
/// Records with weaknesses map the `Primary` ones only.
fn problemtype(weaknesses: &[api2::Weakness]) -> legacy::ProblemType {
    let mut problemtype_data = Vec::new();
    if weaknesses.is_empty() {
        problemtype_data.push(legacy::ProblemTypeData {
            description: Vec::new(),
        });
    } else {
        for weakness in weaknesses {
            if weakness.r#type.as_deref() != Some("Primary") {
                continue;
            }
            problemtype_data.push(legacy::ProblemTypeData {
                description: weakness.description.clone(),
            });
        }
    }
    legacy::ProblemType { problemtype_data }
}

fn references(references: &[api2::Reference]) -> legacy::References {
    legacy::References {
        reference_data: references
            .iter()
            .map(|reference| legacy::Reference {
                // The 2.0 API has no separate name, the URL doubles as one.
                name: reference.url.clone(),
                refsource: String::new(),
                tags: reference.tags.clone(),
                url: reference.url.clone(),
            })
            .collect(),
    }
}

/// A 2.0 configuration with an operator becomes a parent node holding its
/// member nodes as children; one without an operator has its nodes spliced
/// directly into the top-level list.
fn configurations(configurations: &[api2::Config]) -> legacy::Configurations {
    let mut nodes = Vec::new();
    for config in configurations {
        match config.operator {
            Some(operator) => nodes.push(legacy::Node {
                children: config.nodes.iter().map(node).collect(),
                cpe_match: Vec::new(),
                negate: config.negate.unwrap_or_default(),
                operator: operator.as_str().to_string(),
            }),
            None => nodes.extend(config.nodes.iter().map(node)),
        }
    }
    legacy::Configurations {
        cve_data_version: legacy::DATA_VERSION.to_string(),
        nodes,
    }
}

fn node(node: &api2::Node) -> legacy::Node {
    legacy::Node {
        children: Vec::new(),
        cpe_match: node.cpe_match.iter().map(cpe_match).collect(),
        negate: node.negate.unwrap_or_default(),
        operator: node
            .operator
            .map(|operator| operator.as_str().to_string())
            .unwrap_or_default(),
    }
}

fn cpe_match(cpe_match: &api2::CpeMatch) -> legacy::CpeMatch {
    legacy::CpeMatch {
        cpe23_uri: cpe_match.criteria.clone(),
        cpe_name: Vec::new(),
        version_end_excluding: cpe_match.version_end_excluding.clone(),
        version_end_including: cpe_match.version_end_including.clone(),
        version_start_excluding: cpe_match.version_start_excluding.clone(),
        version_start_including: cpe_match.version_start_including.clone(),
        vulnerable: cpe_match.vulnerable,
    }
}

/// Only `Primary` metrics make it into the feed; a list carrying several
/// keeps the last one. For v3 the newest scoring wins: a primary v3.1
/// metric takes precedence over a primary v3.0 one.
fn impact(metrics: &api2::Metrics) -> legacy::Impact {
    let base_metric_v2 = metrics
        .cvss_metric_v2
        .iter()
        .rfind(|metric| metric.r#type.as_deref() == Some("Primary"))
        .map(|metric| legacy::BaseMetricV2 {
            ac_insuf_info: metric.ac_insuf_info.unwrap_or_default(),
            cvss_v2: metric.cvss_data.clone(),
            exploitability_score: metric.exploitability_score.unwrap_or_default(),
            impact_score: metric.impact_score.unwrap_or_default(),
            obtain_all_privilege: metric.obtain_all_privilege.unwrap_or_default(),
            obtain_other_privilege: metric.obtain_other_privilege.unwrap_or_default(),
            obtain_user_privilege: metric.obtain_user_privilege.unwrap_or_default(),
            severity: metric.base_severity.clone().unwrap_or_default(),
            user_interaction_required: metric.user_interaction_required.unwrap_or_default(),
        });

    let base_metric_v3 = metrics
        .cvss_metric_v31
        .iter()
        .rfind(|metric| metric.r#type.as_deref() == Some("Primary"))
        .or_else(|| {
            metrics
                .cvss_metric_v30
                .iter()
                .rfind(|metric| metric.r#type.as_deref() == Some("Primary"))
        })
        .map(|metric| legacy::BaseMetricV3 {
            cvss_v3: metric.cvss_data.clone(),
            exploitability_score: metric.exploitability_score.unwrap_or_default(),
            impact_score: metric.impact_score.unwrap_or_default(),
        });

    legacy::Impact {
        base_metric_v2,
        base_metric_v3,
    }
}

/// `2023-03-06T21:15:10.733` becomes `2023-03-06T21:15Z`; the legacy feeds
/// kept minute precision only.
fn timestamp(id: &str, field: &str, value: Option<&str>) -> String {
    let value = value.unwrap_or_default();
    match NaiveDateTime::parse_from_str(value, API20_TIME_FORMAT) {
        Ok(parsed) => parsed.format(LEGACY_TIME_FORMAT).to_string(),
        Err(err) => {
            log::warn!("Unparseable {field} timestamp {value:?} on {id}: {err}");
            String::new()
        }
    }
}

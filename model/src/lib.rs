pub mod api2;
pub mod cvss;
pub mod legacy;
pub mod vulncheck;

use serde::{Deserialize, Serialize};

/// Language-tagged text, shared by the 2.0 API and the legacy feed format.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LangString {
    pub lang: String,
    pub value: String,
}

impl LangString {
    pub fn new(lang: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            value: value.into(),
        }
    }
}

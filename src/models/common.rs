//! Small records embedded in several responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, DefaultOnNull};

/// Content hashes of an uploaded file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hash {
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    /// File size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

/// License and copyright findings for one file.
///
/// The server sends `null` for empty lists; those become empty vectors.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    /// Licenses reported by scanners.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub scanner: Vec<String>,
    /// Licenses concluded during clearing.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub conclusion: Vec<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    #[serde(default)]
    pub copyright: Vec<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl Findings {
    /// Whether neither scanners nor clearing found anything.
    pub fn is_empty(&self) -> bool {
        self.scanner.is_empty() && self.conclusion.is_empty() && self.copyright.is_empty()
    }
}

/// Scanner agents enabled for a user.
///
/// Agents the server adds later land in `additional_info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Agents {
    #[serde(default)]
    pub bucket: bool,
    #[serde(default)]
    pub copyright_email_author: bool,
    /// Export control and customs.
    #[serde(default)]
    pub ecc: bool,
    #[serde(default)]
    pub keyword: bool,
    #[serde(default, alias = "mimetype")]
    pub mime: bool,
    #[serde(default)]
    pub monk: bool,
    #[serde(default)]
    pub nomos: bool,
    #[serde(default)]
    pub ojo: bool,
    #[serde(default)]
    pub package: bool,
    #[serde(default)]
    pub reso: bool,
    #[serde(default)]
    pub heritage: bool,
    #[serde(flatten)]
    pub additional_info: Map<String, Value>,
}

impl Agents {
    /// Every agent switched on.
    pub fn all() -> Self {
        Self {
            bucket: true,
            copyright_email_author: true,
            ecc: true,
            keyword: true,
            mime: true,
            monk: true,
            nomos: true,
            ojo: true,
            package: true,
            reso: true,
            heritage: true,
            additional_info: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_findings_null_lists() {
        let findings: Findings = serde_json::from_value(json!({
            "scanner": ["MIT"],
            "conclusion": null,
            "copyright": null
        }))
        .unwrap();
        assert_eq!(findings.scanner, vec!["MIT"]);
        assert!(findings.conclusion.is_empty());
        assert!(!findings.is_empty());
    }

    #[test]
    fn test_hash_keeps_unknown_fields() {
        let input = json!({
            "sha1": "abc",
            "md5": "def",
            "sha256": "0123",
            "size": 42,
            "sha512": "ffff"
        });
        let hash: Hash = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(hash.size, Some(42));
        assert_eq!(hash.additional_info.get("sha512"), Some(&json!("ffff")));
        assert_eq!(serde_json::to_value(&hash).unwrap(), input);
    }

    #[test]
    fn test_agents_extension_point() {
        let agents: Agents = serde_json::from_value(json!({
            "bucket": true,
            "nomos": true,
            "scancode": true
        }))
        .unwrap();
        assert!(agents.bucket);
        assert!(!agents.monk);
        assert_eq!(agents.additional_info.get("scancode"), Some(&json!(true)));
    }
}

//! Wire types for the Wandbox HTTP API
//!
//! Mirrors the JSON shapes served by `/api/list.json` and
//! `/api/compile.json`. Every response field is optional and
//! independently absent; absence never implies failure.

use serde::{Deserialize, Serialize};

/// One invocable compiler/interpreter configuration advertised by a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerDescriptor {
    /// Unique id within one server's directory
    pub name: String,

    /// Language display name, e.g. "C++"
    pub language: String,

    #[serde(rename = "display-name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub switches: Vec<SwitchGroup>,
}

/// A compiler switch: either a single on/off flag or a named group of
/// mutually exclusive options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SwitchGroup {
    Single {
        name: String,
        #[serde(rename = "display-name", skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        #[serde(rename = "display-flags", skip_serializing_if = "Option::is_none")]
        display_flags: Option<String>,
        #[serde(default)]
        default: bool,
    },
    Select {
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        options: Vec<SwitchOption>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchOption {
    pub name: String,
    #[serde(rename = "display-name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "display-flags", skip_serializing_if = "Option::is_none")]
    pub display_flags: Option<String>,
}

/// A companion source file submitted alongside the primary one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionSource {
    pub file: String,
    pub code: String,
}

/// Body of a POST to `/api/compile.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileRequest {
    pub compiler: String,

    /// Live text of the primary document, never a cached copy
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<CompanionSource>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,

    #[serde(rename = "compiler-option-raw", skip_serializing_if = "Option::is_none")]
    pub compiler_option_raw: Option<String>,

    #[serde(rename = "runtime-option-raw", skip_serializing_if = "Option::is_none")]
    pub runtime_option_raw: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<bool>,
}

/// Body of a 200 response from `/api/compile.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_output: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_output: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_error: Option<String>,

    /// Short permanent link id, present only when `save` was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permlink: Option<String>,

    /// Share URL, present only when `save` was requested and the server
    /// stored the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_roundtrip() {
        let json = r#"{
            "name": "clang-head",
            "language": "C++",
            "display-name": "clang HEAD",
            "version": "3.9.0",
            "switches": [
                {
                    "type": "single",
                    "name": "warning",
                    "display-name": "Warnings",
                    "display-flags": "-Wall -Wextra",
                    "default": true
                },
                {
                    "type": "select",
                    "default": "boost-1.60",
                    "options": [
                        { "name": "boost-1.60", "display-name": "Boost 1.60.0" }
                    ]
                }
            ]
        }"#;

        let descriptor: CompilerDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.name, "clang-head");
        assert_eq!(descriptor.language, "C++");
        assert_eq!(descriptor.switches.len(), 2);
        match &descriptor.switches[0] {
            SwitchGroup::Single { name, default, .. } => {
                assert_eq!(name, "warning");
                assert!(*default);
            }
            other => panic!("expected single switch, got {:?}", other),
        }
    }

    #[test]
    fn test_request_omits_absent_fields() {
        let request = CompileRequest {
            compiler: "clang-head".to_string(),
            code: "int main(){}".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&request).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 2, "only compiler and code should serialize");
        assert!(object.get("compiler-option-raw").is_none());
    }

    #[test]
    fn test_raw_option_field_names() {
        let request = CompileRequest {
            compiler: "clang-head".to_string(),
            code: String::new(),
            compiler_option_raw: Some("-v".to_string()),
            runtime_option_raw: Some("arg".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["compiler-option-raw"], "-v");
        assert_eq!(json["runtime-option-raw"], "arg");
    }

    #[test]
    fn test_result_all_fields_optional() {
        let result: CompileResult = serde_json::from_str("{}").unwrap();
        assert!(result.status.is_none());
        assert!(result.url.is_none());
    }
}

// Medical code extraction from free text.

use crate::client::ApiClient;
use crate::payload::{display_value, str_field};
use crate::report;
use crate::transport::{Method, Transport};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

pub const EXTRACT_PATH: &str = "/construe/extract";

/// Coding system and tuning knobs. These are passed to the service
/// verbatim; nothing here interprets them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtractConfig {
    #[serde(skip)]
    pub system_name: String,
    #[serde(skip)]
    pub system_version: String,
    pub chunking_method: String,
    pub max_codes_per_chunk: u32,
    pub code_similarity_filter: f64,
    pub include_rationale: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            system_name: "ICD-10-CM".into(),
            system_version: "2025".into(),
            chunking_method: "none".into(),
            max_codes_per_chunk: 20,
            code_similarity_filter: 0.9,
            include_rationale: true,
        }
    }
}

impl ExtractConfig {
    pub fn body(&self, text: &str) -> Value {
        json!({
            "system": {
                "name": self.system_name,
                "version": self.system_version,
            },
            "config": self,
            "text": text,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractedCode {
    pub code: String,
    pub description: String,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CodeSummary {
    pub system_name: String,
    pub system_version: String,
    pub codes: Vec<ExtractedCode>,
    pub include_rationale: bool,
}

impl CodeSummary {
    /// Success is signalled by a non-empty `codes` array rather than by
    /// `success`.
    pub fn from_response(response: &Value, include_rationale: bool) -> Option<Self> {
        let codes = response.get("codes").and_then(Value::as_array)?;
        if codes.is_empty() {
            return None;
        }
        let system = response.get("system").unwrap_or(&Value::Null);

        Some(CodeSummary {
            system_name: str_field(system, "name").unwrap_or("Unknown").to_string(),
            system_version: str_field(system, "version").unwrap_or("Unknown").to_string(),
            codes: codes
                .iter()
                .map(|c| ExtractedCode {
                    code: match c.get("code") {
                        None | Some(Value::Null) => "Unknown".to_string(),
                        v => display_value(v),
                    },
                    description: str_field(c, "description").unwrap_or("No description").to_string(),
                    reason: str_field(c, "reason").filter(|r| !r.is_empty()).map(str::to_string),
                })
                .collect(),
            include_rationale,
        })
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            report::outcome(true, "Medical codes extracted successfully!"),
            format!("   System: {} {}", self.system_name, self.system_version),
            format!("   Found {} medical codes:", self.codes.len()),
        ];
        for (i, code) in self.codes.iter().enumerate() {
            lines.push(format!("    {}. Code: {}", i + 1, code.code));
            lines.push(format!("       Description: {}", code.description));
            if let (true, Some(reason)) = (self.include_rationale, &code.reason) {
                lines.push(format!("       Reason: {}", reason));
            }
            lines.push(String::new());
        }
        lines
    }
}

fn extract_failure_lines(response: Option<&Value>) -> Vec<String> {
    let detail = match response {
        None => "No response received".to_string(),
        Some(r) => str_field(r, "message")
            .or_else(|| str_field(r, "error"))
            .unwrap_or("Unknown error occurred")
            .to_string(),
    };
    vec![
        report::outcome(false, "Failed to extract medical codes"),
        format!("   Error: {}", detail),
    ]
}

/// Extract medical codes from text. Returns the full response whenever
/// codes came back, whatever `include_rationale` says about printing.
pub fn extract_codes<T: Transport>(
    client: &ApiClient<T>,
    text: &str,
    config: &ExtractConfig,
) -> Option<Value> {
    report::banner(format!("Extracting medical codes from: '{}'", text));
    let body = config.body(text);
    debug!(payload = %report::pretty(&body), "code extraction request");

    let response = client.request(Method::Post, EXTRACT_PATH, Some(&body));
    match response
        .as_ref()
        .and_then(|r| CodeSummary::from_response(r, config.include_rationale))
    {
        Some(summary) => {
            report::print_lines(&summary.lines());
            response
        }
        None => {
            report::print_lines(&extract_failure_lines(response.as_ref()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_always_carries_system_and_config() {
        let body = ExtractConfig::default().body("chest pain and shortness of breath");
        assert_eq!(
            body,
            json!({
                "system": {"name": "ICD-10-CM", "version": "2025"},
                "config": {
                    "chunking_method": "none",
                    "max_codes_per_chunk": 20,
                    "code_similarity_filter": 0.9,
                    "include_rationale": true
                },
                "text": "chest pain and shortness of breath"
            })
        );
    }

    #[test]
    fn rationale_hidden_when_disabled() {
        let response = json!({
            "system": {"name": "ICD-10-CM", "version": "2025"},
            "codes": [{"code": "R07.9", "description": "Chest pain, unspecified", "reason": "mentions chest pain"}]
        });

        let shown = CodeSummary::from_response(&response, true).unwrap().lines();
        assert!(shown.iter().any(|l| l.contains("Reason: mentions chest pain")));

        let hidden = CodeSummary::from_response(&response, false).unwrap().lines();
        assert!(hidden.iter().all(|l| !l.contains("Reason")));
        assert!(hidden.iter().any(|l| l == "    1. Code: R07.9"));
    }

    #[test]
    fn missing_or_empty_codes_is_failure() {
        assert!(CodeSummary::from_response(&json!({"codes": []}), true).is_none());
        assert!(CodeSummary::from_response(&json!({"error": "quota"}), true).is_none());
        assert_eq!(
            extract_failure_lines(Some(&json!({"error": "quota"})))[1],
            "   Error: quota"
        );
        assert_eq!(extract_failure_lines(None)[1], "   Error: No response received");
    }
}

// Free text to FHIR: create a record, search records, query a cohort.

use crate::client::ApiClient;
use crate::payload::{display_value, is_success, str_field, Meta, Payload};
use crate::report;
use crate::transport::{Method, Transport};
use serde_json::Value;
use tracing::debug;

pub const CREATE_PATH: &str = "/tools/lang2fhir-and-create";
pub const SEARCH_PATH: &str = "/tools/lang2fhir-and-search";
pub const COHORT_PATH: &str = "/tools/cohort";

const SEARCH_SAMPLE: usize = 3;
const COHORT_SAMPLE: usize = 5;

/// Arguments for `lang2fhir_create`.
#[derive(Clone, Debug, Default)]
pub struct CreateRecord {
    pub resource: String,
    pub text: String,
    pub provider: Option<String>,
    pub meta: Meta,
}

impl CreateRecord {
    pub fn new(resource: impl Into<String>, text: impl Into<String>) -> Self {
        CreateRecord {
            resource: resource.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn body(&self) -> Value {
        Payload::new()
            .set("resource", self.resource.as_str())
            .set("text", self.text.as_str())
            .opt_str("provider", self.provider.as_deref())
            .opt_object("meta", self.meta.to_map())
            .into_value()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreateSummary {
    pub resource_type: String,
    pub fhir_id: String,
    pub message: Option<String>,
}

impl CreateSummary {
    /// `None` unless the envelope reports success.
    pub fn from_response(response: &Value) -> Option<Self> {
        if !is_success(response) {
            return None;
        }
        let resource = response.get("fhir_resource").unwrap_or(&Value::Null);
        Some(CreateSummary {
            resource_type: display_value(resource.get("resourceType")),
            fhir_id: display_value(response.get("fhir_id")),
            message: str_field(response, "message")
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        })
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            report::outcome(true, "Resource created successfully!"),
            format!("  Type: {}", self.resource_type),
            format!("  ID: {}", self.fhir_id),
        ];
        if let Some(msg) = &self.message {
            lines.push(format!("  Message: {}", msg));
        }
        lines
    }
}

/// Create a FHIR resource from natural language. Returns the full
/// response on success.
pub fn lang2fhir_create<T: Transport>(client: &ApiClient<T>, args: &CreateRecord) -> Option<Value> {
    report::banner(format!("Creating {} from: '{}'", args.resource, args.text));
    let body = args.body();
    debug!(payload = %report::pretty(&body), "lang2fhir create request");

    let response = client.request(Method::Post, CREATE_PATH, Some(&body));
    match response.as_ref().and_then(CreateSummary::from_response) {
        Some(summary) => {
            report::print_lines(&summary.lines());
            response
        }
        None => {
            report::print_lines(&report::failure_lines("Failed to create resource", response.as_ref()));
            None
        }
    }
}

/// Arguments for `lang2fhir_search`.
#[derive(Clone, Debug, Default)]
pub struct SearchRecords {
    pub text: String,
    pub provider: Option<String>,
    pub meta: Meta,
    pub patient_id: Option<String>,
    pub practitioner_id: Option<String>,
    pub count: Option<u32>,
}

impl SearchRecords {
    pub fn new(text: impl Into<String>) -> Self {
        SearchRecords {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn body(&self) -> Value {
        Payload::new()
            .set("text", self.text.as_str())
            .opt_str("provider", self.provider.as_deref())
            .opt_object("meta", self.meta.to_map())
            .opt_str("patient_id", self.patient_id.as_deref())
            .opt_str("practitioner_id", self.practitioner_id.as_deref())
            .opt_count("count", self.count)
            .into_value()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchSummary {
    pub total: usize,
    pub resource_type: String,
    pub search_params: String,
    /// `(resourceType, id)` of the first few results.
    pub samples: Vec<(String, String)>,
    pub message: Option<String>,
}

impl SearchSummary {
    pub fn from_response(response: &Value) -> Option<Self> {
        if !is_success(response) {
            return None;
        }
        let results = response
            .get("fhir_results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let search_params = match response.get("search_params") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        Some(SearchSummary {
            total: results.len(),
            resource_type: str_field(response, "resource_type").unwrap_or("Unknown").to_string(),
            search_params,
            samples: results
                .iter()
                .take(SEARCH_SAMPLE)
                .map(|r| (display_value(r.get("resourceType")), display_value(r.get("id"))))
                .collect(),
            message: str_field(response, "message")
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        })
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.samples.len())
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            report::outcome(true, format!("Found {} results", self.total)),
            format!("  Resource Type: {}", self.resource_type),
            format!("  Search Params: {}", self.search_params),
        ];
        for (i, (kind, id)) in self.samples.iter().enumerate() {
            lines.push(format!("  {}. {} (ID: {})", i + 1, kind, id));
        }
        if self.remaining() > 0 {
            lines.push(format!("  ... and {} more", self.remaining()));
        }
        if let Some(msg) = &self.message {
            lines.push(format!("  Message: {}", msg));
        }
        lines
    }
}

/// Search FHIR resources using natural language.
pub fn lang2fhir_search<T: Transport>(client: &ApiClient<T>, args: &SearchRecords) -> Option<Value> {
    report::banner(format!("Searching for: '{}'", args.text));
    let body = args.body();
    debug!(payload = %report::pretty(&body), "lang2fhir search request");

    let response = client.request(Method::Post, SEARCH_PATH, Some(&body));
    match response.as_ref().and_then(SearchSummary::from_response) {
        Some(summary) => {
            report::print_lines(&summary.lines());
            response
        }
        None => {
            report::print_lines(&report::failure_lines("Search failed", response.as_ref()));
            None
        }
    }
}

/// Arguments for `cohort`. The provider is always sent.
#[derive(Clone, Debug, Default)]
pub struct CohortQuery {
    pub text: String,
    pub provider: String,
    pub meta: Meta,
}

impl CohortQuery {
    pub fn new(text: impl Into<String>, provider: impl Into<String>) -> Self {
        CohortQuery {
            text: text.into(),
            provider: provider.into(),
            meta: Meta::default(),
        }
    }

    pub fn body(&self) -> Value {
        Payload::new()
            .set("text", self.text.as_str())
            .set("provider", self.provider.as_str())
            .opt_object("meta", self.meta.to_map())
            .into_value()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CohortSummary {
    pub patient_count: u64,
    pub sample_ids: Vec<String>,
    pub total_ids: usize,
    pub message: Option<String>,
}

impl CohortSummary {
    pub fn from_response(response: &Value) -> Option<Self> {
        if !is_success(response) {
            return None;
        }
        let ids = response
            .get("patient_ids")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let patient_count = response
            .get("patient_count")
            .and_then(Value::as_u64)
            .unwrap_or(ids.len() as u64);

        Some(CohortSummary {
            patient_count,
            sample_ids: ids.iter().take(COHORT_SAMPLE).map(|id| display_value(Some(id))).collect(),
            total_ids: ids.len(),
            message: str_field(response, "message")
                .filter(|m| !m.is_empty())
                .map(str::to_string),
        })
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![report::outcome(true, format!("Found {} patients", self.patient_count))];
        for (i, id) in self.sample_ids.iter().enumerate() {
            lines.push(format!("  {}. Patient/{}", i + 1, id));
        }
        let remaining = self.total_ids.saturating_sub(self.sample_ids.len());
        if remaining > 0 {
            lines.push(format!("  ... and {} more", remaining));
        }
        if let Some(msg) = &self.message {
            lines.push(format!("  Message: {}", msg));
        }
        lines
    }
}

/// Build a patient cohort from a natural-language description.
pub fn cohort<T: Transport>(client: &ApiClient<T>, args: &CohortQuery) -> Option<Value> {
    report::banner(format!("Building cohort for: '{}'", args.text));
    let body = args.body();
    debug!(payload = %report::pretty(&body), "cohort request");

    let response = client.request(Method::Post, COHORT_PATH, Some(&body));
    match response.as_ref().and_then(CohortSummary::from_response) {
        Some(summary) => {
            report::print_lines(&summary.lines());
            response
        }
        None => {
            report::print_lines(&report::failure_lines("Cohort query failed", response.as_ref()));
            None
        }
    }
}

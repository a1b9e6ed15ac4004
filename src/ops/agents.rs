// Prompt and agent management, plus chatting with an agent.

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::payload::{display_value, first_array, is_success, str_field, Payload};
use crate::report;
use crate::transport::{Method, Transport};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

pub const PROMPTS_PATH: &str = "/agent/prompts";
pub const AGENT_CREATE_PATH: &str = "/agent/create";
pub const AGENT_LIST_PATH: &str = "/agent/list";
pub const AGENT_CHAT_PATH: &str = "/agent/chat";

pub const DEFAULT_TOOLS: [&str; 2] = ["lang2fhir_create", "lang2fhir_search"];

/// Id as a string; accepts string or numeric ids.
fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Id of a freshly created resource: `data.id`, then top-level `id`.
pub fn created_id(response: &Value) -> Option<String> {
    id_string(response.get("data").and_then(|d| d.get("id"))).or_else(|| id_string(response.get("id")))
}

/// Entries of a list envelope under any of `keys`, empty unless successful.
fn listed<'a>(response: &'a Value, keys: &[&str]) -> &'a [Value] {
    if is_success(response) {
        first_array(response, keys)
    } else {
        &[]
    }
}

/// Id of the first listed prompt whose `name` matches exactly.
pub fn find_prompt_id(list_response: &Value, name: &str) -> Option<String> {
    listed(list_response, &["prompts", "data"])
        .iter()
        .find(|p| str_field(p, "name") == Some(name))
        .and_then(|p| id_string(p.get("id")))
}

pub fn prompt_body(name: &str, content: &str, description: Option<&str>) -> Value {
    let description = description
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Prompt for {}", name));
    json!({
        "name": name,
        "description": description,
        "type": "system",
        "content": content,
        "is_active": true,
        "is_default": false,
        "tags": ["demo"],
    })
}

/// Create a system prompt. A prompt that already exists counts as
/// created: when the create call yields no id, the prompt list is
/// searched by name instead.
pub fn create_prompt<T: Transport>(
    client: &ApiClient<T>,
    name: &str,
    content: &str,
    description: Option<&str>,
) -> Option<String> {
    report::banner(format!("Creating prompt: '{}'", name));
    let body = prompt_body(name, content, description);

    let response = client.request(Method::Post, PROMPTS_PATH, Some(&body));
    if let Some(id) = response.as_ref().filter(|r| is_success(r)).and_then(created_id) {
        report::print_lines(&[report::outcome(true, format!("Prompt created with ID: {}", id))]);
        return Some(id);
    }

    debug!(name, "prompt not created, looking for an existing one");
    let existing = client
        .request(Method::Get, PROMPTS_PATH, None)
        .and_then(|list| find_prompt_id(&list, name));
    match existing {
        Some(id) => {
            report::print_lines(&[report::outcome(true, format!("Found existing prompt with ID: {}", id))]);
            Some(id)
        }
        None => {
            report::print_lines(&[report::outcome(false, "Failed to create or find prompt")]);
            None
        }
    }
}

/// Lines describing a listed prompt or agent.
pub fn entry_lines(index: usize, entry: &Value, with_tools: bool) -> Vec<String> {
    let mut lines = vec![
        format!(
            "  {}. {} (ID: {})",
            index + 1,
            display_value(entry.get("name")),
            display_value(entry.get("id"))
        ),
        format!(
            "     Description: {}",
            str_field(entry, "description").unwrap_or("No description")
        ),
    ];
    if with_tools {
        let tools = entry.get("tools").cloned().unwrap_or_else(|| json!([]));
        lines.push(format!("     Tools: {}", tools));
    }
    lines.push(format!("     Active: {}", display_value(entry.get("is_active"))));
    lines.push(String::new());
    lines
}

fn list_entries<T: Transport>(
    client: &ApiClient<T>,
    path: &str,
    keys: &[&str],
    noun: &str,
    with_tools: bool,
) -> Option<Vec<Value>> {
    report::banner(format!("Listing {}...", noun));
    match client.request(Method::Get, path, None) {
        Some(response) if is_success(&response) => {
            let entries = first_array(&response, keys).to_vec();
            let mut lines = vec![report::outcome(true, format!("Found {} {}", entries.len(), noun))];
            for (i, entry) in entries.iter().enumerate() {
                lines.extend(entry_lines(i, entry, with_tools));
            }
            report::print_lines(&lines);
            Some(entries)
        }
        _ => {
            report::print_lines(&[report::outcome(false, format!("Failed to list {}", noun))]);
            None
        }
    }
}

pub fn list_prompts<T: Transport>(client: &ApiClient<T>) -> Option<Vec<Value>> {
    list_entries(client, PROMPTS_PATH, &["prompts", "data"], "prompts", false)
}

pub fn list_agents<T: Transport>(client: &ApiClient<T>) -> Option<Vec<Value>> {
    list_entries(client, AGENT_LIST_PATH, &["agents", "data"], "agents", true)
}

/// The `provider` field of an agent: one provider, or an ordered list of
/// providers to try.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    Single(String),
    Ordered(Vec<String>),
}

impl Provider {
    /// Interpret an arbitrary JSON value. Null, `""` and `[]` mean "no
    /// provider" and empty entries of a list are skipped; any other
    /// non-string shape is an error.
    pub fn parse(value: &Value) -> Result<Option<Provider>> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => Ok(Some(Provider::Single(s.clone()))),
            Value::Array(items) => {
                let list = items
                    .iter()
                    .map(|item| {
                        item.as_str()
                            .ok_or_else(|| Error::InvalidProvider(value.to_string()))
                    })
                    .filter(|name| !matches!(name, Ok("")))
                    .map(|name| name.map(str::to_string))
                    .collect::<Result<Vec<_>>>()?;
                Ok((!list.is_empty()).then_some(Provider::Ordered(list)))
            }
            other => Err(Error::InvalidProvider(other.to_string())),
        }
    }

    /// Provider typed at a prompt: one name, or a comma separated
    /// fallback list. Blank segments are dropped.
    pub fn from_input(input: &str) -> Option<Provider> {
        let mut names: Vec<String> = input
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        match names.len() {
            0 => None,
            1 => names.pop().map(Provider::Single),
            _ => Some(Provider::Ordered(names)),
        }
    }
}

impl From<Provider> for Value {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Single(name) => Value::String(name),
            Provider::Ordered(names) => json!(names),
        }
    }
}

/// Arguments for `create_agent`.
#[derive(Clone, Debug, Default)]
pub struct CreateAgent {
    pub name: String,
    pub prompts: Vec<String>,
    /// Empty means the default lang2fhir tool pair.
    pub tools: Vec<String>,
    pub provider: Option<Value>,
    pub meta: Option<Map<String, Value>>,
}

impl CreateAgent {
    pub fn new(name: impl Into<String>, prompts: Vec<String>) -> Self {
        CreateAgent {
            name: name.into(),
            prompts,
            ..Self::default()
        }
    }

    pub fn with_provider(mut self, provider: impl Into<Value>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn body(&self) -> Value {
        let tools: Vec<String> = if self.tools.is_empty() {
            DEFAULT_TOOLS.iter().map(|t| t.to_string()).collect()
        } else {
            self.tools.clone()
        };

        let mut payload = Payload::new()
            .set("name", self.name.as_str())
            .set("description", format!("AI agent for {}", self.name))
            .set("prompts", self.prompts.clone())
            .set("is_active", true)
            .set("tools", tools)
            .set("tags", vec!["demo"]);

        if let Some(raw) = &self.provider {
            match Provider::parse(raw) {
                Ok(Some(provider)) => payload = payload.set("provider", provider),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "ignoring provider"),
            }
        }

        payload.opt_object("meta", self.meta.clone()).into_value()
    }
}

/// Create an agent wired to the given prompt ids. Returns the new id.
pub fn create_agent<T: Transport>(client: &ApiClient<T>, args: &CreateAgent) -> Option<String> {
    report::banner(format!("Creating agent: '{}'", args.name));
    let body = args.body();
    debug!(payload = %report::pretty(&body), "agent create request");

    let id = client
        .request(Method::Post, AGENT_CREATE_PATH, Some(&body))
        .filter(is_success)
        .and_then(|r| id_string(r.get("data").and_then(|d| d.get("id"))));
    match id {
        Some(id) => {
            report::print_lines(&[report::outcome(true, format!("Agent created with ID: {}", id))]);
            Some(id)
        }
        None => {
            report::print_lines(&[report::outcome(false, "Failed to create agent")]);
            None
        }
    }
}

pub fn chat_body(message: &str, agent_id: &str, session_id: Option<&str>) -> Value {
    Payload::new()
        .set("message", message)
        .set("agent_id", agent_id)
        .opt_str("session_id", session_id)
        .into_value()
}

/// Send one chat message to an agent and print its reply.
pub fn chat_with_agent<T: Transport>(
    client: &ApiClient<T>,
    message: &str,
    agent_id: &str,
    session_id: Option<&str>,
) -> Option<Value> {
    report::banner(format!("Chatting with agent: '{}'", message));
    let body = chat_body(message, agent_id, session_id);

    let response = client.request(Method::Post, AGENT_CHAT_PATH, Some(&body));
    match response.as_ref().filter(|r| is_success(r)) {
        Some(r) => {
            let reply = match r.get("response") {
                None | Some(Value::Null) => "No response".to_string(),
                v => display_value(v),
            };
            report::print_lines(&[format!(" Agent: {}", reply)]);
            response
        }
        None => {
            report::print_lines(&report::failure_lines("Chat failed", response.as_ref()));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_accepts_string_or_string_list() {
        assert_eq!(
            Provider::parse(&json!("openai")).unwrap(),
            Some(Provider::Single("openai".into()))
        );
        assert_eq!(
            Provider::parse(&json!(["openai", "anthropic"])).unwrap(),
            Some(Provider::Ordered(vec!["openai".into(), "anthropic".into()]))
        );
        assert_eq!(Provider::parse(&json!("")).unwrap(), None);
        assert!(Provider::parse(&json!(123)).is_err());
        assert!(Provider::parse(&json!(["openai", 7])).is_err());
    }

    #[test]
    fn provider_list_skips_blank_entries() {
        assert_eq!(
            Provider::parse(&json!(["openai", ""])).unwrap(),
            Some(Provider::Ordered(vec!["openai".into()]))
        );
        assert_eq!(Provider::parse(&json!(["", ""])).unwrap(), None);

        let body = CreateAgent::new("triage", vec!["p1".into()])
            .with_provider(json!(["openai", ""]))
            .body();
        assert_eq!(body["provider"], json!(["openai"]));
    }

    #[test]
    fn provider_from_typed_input() {
        assert_eq!(Provider::from_input("openai,"), Some(Provider::Single("openai".into())));
        assert_eq!(
            Provider::from_input(" openai , anthropic "),
            Some(Provider::Ordered(vec!["openai".into(), "anthropic".into()]))
        );
        assert_eq!(Provider::from_input(" , "), None);
    }

    #[test]
    fn agent_body_embeds_provider_by_shape() {
        let single = CreateAgent::new("triage", vec!["p1".into()]).with_provider("openai").body();
        assert_eq!(single["provider"], json!("openai"));

        let ordered = CreateAgent::new("triage", vec!["p1".into()])
            .with_provider(json!(["openai", "anthropic"]))
            .body();
        assert_eq!(ordered["provider"], json!(["openai", "anthropic"]));

        let rejected = CreateAgent::new("triage", vec!["p1".into()]).with_provider(123).body();
        assert!(rejected.get("provider").is_none());
        assert_eq!(rejected["name"], "triage");
    }

    #[test]
    fn agent_body_defaults() {
        let body = CreateAgent::new("triage", vec!["p1".into(), "p2".into()]).body();
        assert_eq!(
            body,
            json!({
                "name": "triage",
                "description": "AI agent for triage",
                "prompts": ["p1", "p2"],
                "is_active": true,
                "tools": ["lang2fhir_create", "lang2fhir_search"],
                "tags": ["demo"]
            })
        );
    }

    #[test]
    fn chat_body_omits_missing_session() {
        assert_eq!(
            chat_body("hi", "a1", None),
            json!({"message": "hi", "agent_id": "a1"})
        );
        assert_eq!(chat_body("hi", "a1", Some("s1"))["session_id"], "s1");
    }

    #[test]
    fn created_id_prefers_data() {
        assert_eq!(created_id(&json!({"data": {"id": "d"}, "id": "top"})), Some("d".into()));
        assert_eq!(created_id(&json!({"id": 42})), Some("42".into()));
        assert_eq!(created_id(&json!({"data": {}})), None);
    }

    #[test]
    fn find_prompt_matches_exact_name() {
        let list = json!({"success": true, "data": [
            {"name": "intake-helper", "id": "x"},
            {"name": "intake", "id": "y"}
        ]});
        assert_eq!(find_prompt_id(&list, "intake"), Some("y".into()));
        assert_eq!(find_prompt_id(&list, "missing"), None);
        assert_eq!(find_prompt_id(&json!({"success": false, "data": [{"name": "intake", "id": "y"}]}), "intake"), None);
    }

    #[test]
    fn default_prompt_description() {
        let body = prompt_body("intake", "You are helpful.", None);
        assert_eq!(body["description"], "Prompt for intake");
        assert_eq!(body["type"], "system");
        assert_eq!(body["is_default"], false);
    }
}

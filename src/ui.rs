// UI layer: a simple interactive menu using `dialoguer`. Each entry
// collects its arguments and hands them to one demo operation.

use crate::client::ApiClient;
use crate::ops::{self, CohortQuery, CreateAgent, CreateRecord, ExtractConfig, Provider, SearchRecords};
use crate::payload::Meta;
use crate::transport::Transport;
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const WALKTHROUGH_PROMPT: &str = "You are a clinical assistant. Turn the clinician's notes into \
FHIR resources and answer questions by searching the patient's record.";

/// Authenticate with a spinner while the login call is in flight.
pub fn login<T: Transport>(api: &mut ApiClient<T>) -> Result<bool> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").context("spinner template")?);
    spinner.set_message("Logging in...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let ok = api.authenticate();
    spinner.finish_and_clear();
    if ok {
        println!("{}", crate::report::outcome(true, "Authentication successful!"));
    } else {
        println!("{}", crate::report::outcome(false, "Authentication failed, see log for details"));
    }
    Ok(ok)
}

/// Main interactive menu. Runs until the user chooses "Exit".
pub fn main_menu<T: Transport>(api: &ApiClient<T>) -> Result<()> {
    let items = [
        "Create a FHIR resource from text",
        "Search FHIR resources",
        "Query a patient cohort",
        "Extract medical codes",
        "List prompts",
        "List agents",
        "Create prompt and agent, then chat",
        "Exit",
    ];
    loop {
        let selection = Select::new()
            .with_prompt("What would you like to try?")
            .items(&items)
            .default(0)
            .interact()?;
        match selection {
            0 => handle_create(api)?,
            1 => handle_search(api)?,
            2 => handle_cohort(api)?,
            3 => handle_extract(api)?,
            4 => {
                ops::list_prompts(api);
            }
            5 => {
                ops::list_agents(api);
            }
            6 => walkthrough(api)?,
            _ => break,
        }
    }
    Ok(())
}

/// Free-form optional field; an empty answer means "not supplied".
fn optional(prompt: &str) -> Result<Option<String>> {
    let value: String = Input::new()
        .with_prompt(format!("{} (optional)", prompt))
        .allow_empty(true)
        .interact_text()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// Accepts a blank answer or a whole number.
#[allow(clippy::ptr_arg)]
fn validate_count(input: &String) -> std::result::Result<(), &'static str> {
    match input.trim() {
        "" => Ok(()),
        v if v.parse::<u32>().is_ok() => Ok(()),
        _ => Err("Enter a whole number, or leave blank"),
    }
}

/// Optional count; dialoguer asks again until the answer validates.
fn optional_count(prompt: &str) -> Result<Option<u32>> {
    let value: String = Input::new()
        .with_prompt(format!("{} (optional)", prompt))
        .allow_empty(true)
        .validate_with(validate_count)
        .interact_text()?;
    Ok(value.trim().parse::<u32>().ok())
}

fn required(prompt: &str) -> Result<String> {
    Ok(Input::<String>::new().with_prompt(prompt).interact_text()?)
}

fn collect_meta() -> Result<Meta> {
    if !Confirm::new()
        .with_prompt("Target a specific FHIR store?")
        .default(false)
        .interact()?
    {
        return Ok(Meta::default());
    }
    Ok(Meta {
        fhir_store_id: optional("FHIR store id")?,
        instance_name: optional("Instance name")?,
        on_behalf_of_email: optional("On behalf of (email)")?,
    })
}

fn handle_create<T: Transport>(api: &ApiClient<T>) -> Result<()> {
    let resource = required("Resource type (e.g. Patient, Condition)")?;
    let text = required("Describe the resource")?;
    let args = CreateRecord {
        provider: optional("Provider")?,
        meta: collect_meta()?,
        ..CreateRecord::new(resource, text)
    };
    ops::lang2fhir_create(api, &args);
    Ok(())
}

fn handle_search<T: Transport>(api: &ApiClient<T>) -> Result<()> {
    let text = required("What are you looking for?")?;
    let count = optional_count("Max results")?;
    let args = SearchRecords {
        provider: optional("Provider")?,
        meta: collect_meta()?,
        patient_id: optional("Patient id")?,
        practitioner_id: optional("Practitioner id")?,
        count,
        ..SearchRecords::new(text)
    };
    ops::lang2fhir_search(api, &args);
    Ok(())
}

fn handle_cohort<T: Transport>(api: &ApiClient<T>) -> Result<()> {
    let text = required("Describe the cohort")?;
    let provider = required("Provider")?;
    let args = CohortQuery {
        meta: collect_meta()?,
        ..CohortQuery::new(text, provider)
    };
    ops::cohort(api, &args);
    Ok(())
}

fn handle_extract<T: Transport>(api: &ApiClient<T>) -> Result<()> {
    let text = required("Clinical text")?;
    let mut config = ExtractConfig::default();
    if let Some(name) = optional(&format!("Coding system [{}]", config.system_name))? {
        config.system_name = name;
    }
    if let Some(version) = optional(&format!("System version [{}]", config.system_version))? {
        config.system_version = version;
    }
    config.include_rationale = Confirm::new()
        .with_prompt("Include rationale?")
        .default(true)
        .interact()?;
    ops::extract_codes(api, &text, &config);
    Ok(())
}

/// Prompt -> agent -> chat, each step feeding the next.
fn walkthrough<T: Transport>(api: &ApiClient<T>) -> Result<()> {
    let name = required("Agent name")?;
    let Some(prompt_id) = ops::create_prompt(api, &format!("{}-system", name), WALKTHROUGH_PROMPT, None)
    else {
        return Ok(());
    };

    let mut args = CreateAgent::new(name, vec![prompt_id]);
    if let Some(provider) = optional("Provider (comma separated for a fallback list)")? {
        if let Some(provider) = Provider::from_input(&provider) {
            args = args.with_provider(provider);
        }
    }
    let Some(agent_id) = ops::create_agent(api, &args) else {
        return Ok(());
    };

    let mut session_id: Option<String> = None;
    while let Some(message) = optional("Message (empty to stop)")? {
        if let Some(reply) = ops::chat_with_agent(api, &message, &agent_id, session_id.as_deref()) {
            if let Some(id) = reply.get("session_id").and_then(|v| v.as_str()) {
                session_id = Some(id.to_string());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_answer_must_be_blank_or_numeric() {
        assert!(validate_count(&String::new()).is_ok());
        assert!(validate_count(&" 25 ".to_string()).is_ok());
        assert!(validate_count(&"ten".to_string()).is_err());
        assert!(validate_count(&"-3".to_string()).is_err());
    }
}

// One function per service capability. Each builds its request body,
// makes a single call and prints a short report; failures are printed
// and surface as `None`.

pub mod agents;
pub mod codes;
pub mod records;

pub use agents::{
    chat_with_agent, create_agent, create_prompt, list_agents, list_prompts, CreateAgent, Provider,
};
pub use codes::{extract_codes, ExtractConfig};
pub use records::{cohort, lang2fhir_create, lang2fhir_search, CohortQuery, CreateRecord, SearchRecords};

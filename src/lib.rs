// Library root
// -----------
// Client library for the PhenoML natural-language medical-data API, plus
// the interactive demo front end the binary runs.
//
// Module responsibilities:
// - `config`: connection settings loaded from the environment.
// - `auth`: the two login schemes the service offers.
// - `transport`: one HTTP round trip; reqwest in production.
// - `client`: token handling and authenticated JSON calls.
// - `payload`: request body assembly that omits absent fields.
// - `ops`: one demo operation per service capability.
// - `report`: console rendering of operation results.
// - `ui`: the terminal menu driving `ops`.
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ops;
pub mod payload;
pub mod report;
pub mod transport;
pub mod ui;

pub use auth::AuthScheme;
pub use client::ApiClient;
pub use config::Config;
pub use error::{Error, Result};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, Transport};

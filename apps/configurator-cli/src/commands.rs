//! # Protocol Commands
//!
//! Everything the rendering layer can ask of the engine, one JSON object per
//! line.
//!
//! ## Command Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Round Trip                                   │
//! │                                                                         │
//! │  UI                                                                     │
//! │  ──                                                                     │
//! │  {"command": "options", "handle": "pcb", "position": 2,                │
//! │   "prior": {"1": "ANSI"}}                                               │
//! │         │                                                               │
//! │         │ (stdin, one line)                                             │
//! │         ▼                                                               │
//! │  Session::handle_line ──► Command ──► Session::dispatch                 │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                   Configurator (core)                   │
//! │                                            │                            │
//! │         ┌──────────────────────────────────┘                            │
//! │         ▼ (stdout, one line)                                            │
//! │  {"status": "ok", "response": {"type": "options", "data": {...}}}       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutating command answers with a fresh configuration snapshot so the
//! UI can redraw the summary, totals and checkout button in one go.

use std::collections::BTreeMap;

use configurator_checkout::{
    submit_configuration, CommerceBackend, RetrySettings, SubmissionReceipt,
};
use configurator_core::{
    CartPayload, CatalogIssue, ChoiceOutcome, ConfigurationSnapshot, ConflictReport,
    Configurator, Direction, Focus, PositionOptions, SelectionKind, VariantId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;

// =============================================================================
// Commands
// =============================================================================

fn default_quantity() -> u32 {
    1
}

/// A request from the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Component list and load-time integrity issues.
    Catalog,

    /// Current selections, totals and checkout state.
    Snapshot,

    /// Legal values for one dropdown given the values chosen before it.
    ///
    /// `prior` maps 1-based positions (as JSON object keys) to raw values.
    #[serde(rename_all = "camelCase")]
    Options {
        handle: String,
        position: usize,
        #[serde(default)]
        prior: BTreeMap<String, String>,
    },

    /// Select whatever variant the dropdown values resolve to.
    #[serde(rename_all = "camelCase")]
    Choose {
        handle: String,
        #[serde(default)]
        kind: SelectionKind,
        values: Vec<String>,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },

    #[serde(rename_all = "camelCase")]
    Select {
        handle: String,
        variant_id: VariantId,
        #[serde(default)]
        kind: SelectionKind,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },

    #[serde(rename_all = "camelCase")]
    Remove {
        handle: String,
        variant_id: VariantId,
        #[serde(default)]
        kind: SelectionKind,
    },

    #[serde(rename_all = "camelCase")]
    RemoveComponent {
        handle: String,
        #[serde(default)]
        kind: SelectionKind,
    },

    #[serde(rename_all = "camelCase")]
    SetQuantity {
        handle: String,
        variant_id: VariantId,
        quantity: u32,
    },

    Focus {
        handle: String,
        #[serde(default)]
        kind: SelectionKind,
    },

    Navigate {
        direction: Direction,
    },

    AcceptPreorder {
        accepted: bool,
    },

    Conflicts,

    Clear,

    /// Preview of what `submit` would send.
    Payload,

    Submit,
}

// =============================================================================
// Responses
// =============================================================================

/// One component as listed in the catalog overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub handle: String,
    pub title: String,
    pub required: bool,
    pub options: Vec<String>,
    pub variant_count: usize,
    pub layer_index: i64,
    pub featured_image: Option<String>,
    pub clarifying_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSummary {
    pub parent_product_title: String,
    pub components: Vec<ComponentSummary>,
    pub issues: Vec<CatalogIssue>,
}

/// A successful answer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Response {
    Catalog(CatalogSummary),
    Snapshot(Box<ConfigurationSnapshot>),
    Options(PositionOptions),
    /// `choose` values did not resolve to a variant; nothing changed.
    Incomplete,
    Focus(Focus),
    Conflicts(ConflictReport),
    #[serde(rename_all = "camelCase")]
    Payload {
        bundle_id: String,
        payload: CartPayload,
    },
    Submitted(SubmissionReceipt),
}

/// The line written back for every command.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reply {
    Ok { response: Response },
    Error { error: ApiError },
}

impl From<Result<Response, ApiError>> for Reply {
    fn from(result: Result<Response, ApiError>) -> Self {
        match result {
            Ok(response) => Reply::Ok { response },
            Err(error) => Reply::Error { error },
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// One buyer's configuration plus the backend it will be sent to.
pub struct Session {
    configurator: Configurator,
    backend: Box<dyn CommerceBackend>,
    retry: RetrySettings,
}

impl Session {
    pub fn new(
        configurator: Configurator,
        backend: Box<dyn CommerceBackend>,
        retry: RetrySettings,
    ) -> Self {
        Session {
            configurator,
            backend,
            retry,
        }
    }

    pub fn configurator(&self) -> &Configurator {
        &self.configurator
    }

    /// Parses and runs one protocol line.
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        let result = match serde_json::from_str::<Command>(line) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => Err(ApiError::validation(format!("Malformed command: {}", e))),
        };
        Reply::from(result)
    }

    /// Runs one command against the configurator.
    pub async fn dispatch(&mut self, command: Command) -> Result<Response, ApiError> {
        match command {
            Command::Catalog => {
                debug!("catalog command");
                Ok(Response::Catalog(self.catalog_summary()))
            }
            Command::Snapshot => {
                debug!("snapshot command");
                Ok(snapshot(self.configurator.snapshot()?))
            }
            Command::Options {
                handle,
                position,
                prior,
            } => {
                debug!(handle = %handle, position, "options command");
                let prior = parse_prior(prior)?;
                let options = self
                    .configurator
                    .options_for_position(&handle, position, &prior)?;
                Ok(Response::Options(options))
            }
            Command::Choose {
                handle,
                kind,
                values,
                quantity,
            } => {
                debug!(handle = %handle, ?kind, ?values, quantity, "choose command");
                match self.configurator.choose(&handle, kind, values.as_slice(), quantity)? {
                    ChoiceOutcome::Selected(snap) => Ok(Response::Snapshot(snap)),
                    ChoiceOutcome::Incomplete => Ok(Response::Incomplete),
                }
            }
            Command::Select {
                handle,
                variant_id,
                kind,
                quantity,
            } => {
                debug!(handle = %handle, variant_id, ?kind, quantity, "select command");
                Ok(snapshot(self.configurator.select(
                    &handle, variant_id, kind, quantity,
                )?))
            }
            Command::Remove {
                handle,
                variant_id,
                kind,
            } => {
                debug!(handle = %handle, variant_id, ?kind, "remove command");
                Ok(snapshot(self.configurator.remove(&handle, variant_id, kind)?))
            }
            Command::RemoveComponent { handle, kind } => {
                debug!(handle = %handle, ?kind, "remove_component command");
                Ok(snapshot(self.configurator.remove_component(&handle, kind)?))
            }
            Command::SetQuantity {
                handle,
                variant_id,
                quantity,
            } => {
                debug!(handle = %handle, variant_id, quantity, "set_quantity command");
                Ok(snapshot(self.configurator.set_quantity(
                    &handle, variant_id, quantity,
                )?))
            }
            Command::Focus { handle, kind } => {
                debug!(handle = %handle, ?kind, "focus command");
                Ok(Response::Focus(
                    self.configurator.set_focus(&handle, kind)?.clone(),
                ))
            }
            Command::Navigate { direction } => {
                debug!(?direction, "navigate command");
                Ok(Response::Focus(self.configurator.navigate(direction).clone()))
            }
            Command::AcceptPreorder { accepted } => {
                debug!(accepted, "accept_preorder command");
                Ok(snapshot(self.configurator.set_preorder_accepted(accepted)?))
            }
            Command::Conflicts => {
                debug!("conflicts command");
                Ok(Response::Conflicts(self.configurator.conflicts()))
            }
            Command::Clear => {
                debug!("clear command");
                Ok(snapshot(self.configurator.clear()?))
            }
            Command::Payload => {
                debug!("payload command");
                let (bundle_id, payload) = self.configurator.cart_payload()?;
                Ok(Response::Payload { bundle_id, payload })
            }
            Command::Submit => {
                info!("submit command");
                let receipt =
                    submit_configuration(&self.configurator, self.backend.as_ref(), &self.retry)
                        .await?;
                Ok(Response::Submitted(receipt))
            }
        }
    }

    fn catalog_summary(&self) -> CatalogSummary {
        let catalog = self.configurator.catalog();
        CatalogSummary {
            parent_product_title: catalog.parent_product_title().to_string(),
            components: catalog
                .components()
                .iter()
                .map(|c| ComponentSummary {
                    handle: c.handle.clone(),
                    title: catalog.format_component_title(c, SelectionKind::Primary),
                    required: c.required,
                    options: c.options.iter().map(|o| o.name.clone()).collect(),
                    variant_count: c.variants.len(),
                    layer_index: c.layer_index,
                    featured_image: c.featured_image.clone(),
                    clarifying_text: c.clarifying_text.clone(),
                })
                .collect(),
            issues: catalog.issues().to_vec(),
        }
    }
}

/// Positions arrive as object keys, so they are strings on the wire.
fn parse_prior(prior: BTreeMap<String, String>) -> Result<BTreeMap<usize, String>, ApiError> {
    prior
        .into_iter()
        .map(|(key, value)| {
            key.trim()
                .parse::<usize>()
                .map(|position| (position, value))
                .map_err(|_| ApiError::validation(format!("Invalid option position: '{}'", key)))
        })
        .collect()
}

fn snapshot(snapshot: ConfigurationSnapshot) -> Response {
    Response::Snapshot(Box::new(snapshot))
}

// =============================================================================
// Unit Tests
// =============================================================================

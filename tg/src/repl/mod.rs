//! Interactive chat for TripGuide
//!
//! Line-based front end over the flow controller: password gate, guided
//! questions, free chat afterwards, and itinerary browsing.

pub mod render;
mod session;

pub use session::ChatSession;

use eyre::{Context, Result};
use tracing::{debug, info};

use crate::backend::create_client;
use crate::config::Config;
use crate::flow::{FlowController, FlowDefinition};
use crate::pipeline::SubmissionPipeline;
use crate::transcript::TranscriptLogger;

/// Run the interactive session
///
/// This is the main entry point for `tripguide chat`.
pub async fn run_interactive(config: &Config) -> Result<()> {
    info!(base_url = %config.backend.base_url, "run_interactive: starting");
    let backend = create_client(&config.backend).context("Failed to create backend client")?;

    let pipeline = SubmissionPipeline::from_config(backend.clone(), &config.backend);
    let controller = FlowController::new(FlowDefinition::road_trip(), pipeline, config.chat.clone());

    let transcript = if config.debug.log_conversations {
        TranscriptLogger::enabled()
    } else {
        TranscriptLogger::disabled()
    };
    debug!(enabled = transcript.is_enabled(), "run_interactive: transcript");

    let mut session = ChatSession::new(backend, controller, transcript, config.backend.require_password);
    session.run().await
}

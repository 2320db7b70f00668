//! TripGuide - guided road trip planning
//!
//! A chat that walks the user through a fixed set of trip questions,
//! submits the answers to a planning backend (directly or as a polled job)
//! and shows the returned itinerary as navigable day cards.
//!
//! # Modules
//!
//! - [`chat`] - Messages and the ordered message store
//! - [`flow`] - Question definitions, flow state and the controller
//! - [`pipeline`] - Request building, dispatch and job polling
//! - [`backend`] - HTTP seam to the planning service
//! - [`itinerary`] - Itinerary text parser and POI extraction
//! - [`repl`] - Interactive terminal session
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod backend;
pub mod chat;
pub mod cli;
pub mod config;
pub mod flow;
pub mod itinerary;
pub mod pipeline;
pub mod repl;
pub mod transcript;

pub use backend::{BackendClient, BackendError, HttpBackend, create_client};
pub use chat::{Message, MessageId, MessageStore, Role, StoreEvent};
pub use config::Config;
pub use flow::{FlowController, FlowDefinition, FlowError, FlowPhase, FlowState, Question, SubmitOutcome};
pub use itinerary::{DaySection, ItineraryDocument, Poi, ResponseView, is_itinerary};
pub use pipeline::{JobPoller, SubmissionPipeline, SubmitError};

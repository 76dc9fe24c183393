//! Port trait definitions (Hexagonal Architecture)
//!
//! Async trait interfaces that infrastructure adapters implement:
//! - AutomationRepository: definitions and time-trigger snapshots
//! - EntityStore: project-scoped entity reads/writes and poller queries
//! - ExecutionRepository: execution audit records
//! - NotificationSink / TagStore / ActivitySink / ResearchQueue /
//!   SequenceService: the outbound services actions fan out to
//! - WebhookTransport: filtered HTTP egress
//!
//! These traits keep the engine independent of specific infrastructure.

pub mod activity_sink;
pub mod automation_repository;
pub mod entity_store;
pub mod execution_repository;
pub mod notification_sink;
pub mod research_queue;
pub mod sequence_service;
pub mod tag_store;
pub mod webhook_transport;

pub use activity_sink::{ActivitySink, NewActivity};
pub use automation_repository::AutomationRepository;
pub use entity_store::{EmailTemplate, EntityRow, EntityStore, NewEmailDraft, NewTask};
pub use execution_repository::ExecutionRepository;
pub use notification_sink::NotificationSink;
pub use research_queue::{ResearchJob, ResearchQueue};
pub use sequence_service::{EnrollOutcome, SequenceService};
pub use tag_store::TagStore;
pub use webhook_transport::{WebhookResponse, WebhookTransport};

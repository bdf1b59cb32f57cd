pub mod batch;
pub mod dispatcher;
pub mod orchestrator;
pub mod router;
pub mod template;
pub mod tracker;

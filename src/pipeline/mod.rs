//! Request validation and the end-to-end stage pipeline.

pub(crate) mod opts;
pub(crate) mod orchestrator;
pub(crate) mod request;

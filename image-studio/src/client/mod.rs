//! Client-side form logic: the state machine behind the studio page and a
//! small HTTP client for driving a running relay.

pub mod form;
pub mod studio_client;

pub use form::{FormPhase, ImageForm};
pub use studio_client::{ClientError, StudioClient};

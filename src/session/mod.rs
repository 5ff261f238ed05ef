//! Session state holder.

mod application;
mod client;
mod context;
mod id_table;
mod poll;
mod store;
mod update;

pub use application::{Application, ApplicationFactory, RequestParameters, TreeApplication};
pub use client::{ClientConfiguration, ClientProperties};
pub use context::{
    active_session, parse_client_render_id, SessionContext, SessionSnapshot,
    CLIENT_CONFIGURATION_PROPERTY, SERVICE_ID_PARAMETER,
};
pub use id_table::IdTable;
pub use poll::{PollIntervals, TaskQueueHandle};
pub use store::{SessionStore, SharedSession};
pub use update::SessionUpdateManager;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session {0} is already initialized")]
    AlreadyInitialized(Uuid),

    #[error("Session is not initialized")]
    NotInitialized,

    #[error("Invalid client render id '{0}'")]
    InvalidClientRenderId(String),

    #[error("No component with id '{0}'")]
    UnknownComponent(String),

    #[error("Render state does not match the requested type: {0}")]
    RenderState(#[from] serde_json::Error),
}

//! Per-session state.
//!
//! A `SessionContext` is not synchronized. The transport serializes access
//! per session (see [`SessionStore`](crate::session::SessionStore)); the
//! render-state map, transaction counter and id table must never be touched
//! from two requests at once.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::session::{
    Application, ApplicationFactory, ClientConfiguration, ClientProperties, IdTable,
    PollIntervals, RequestParameters, SessionError, SessionUpdateManager, TaskQueueHandle,
};
use crate::tree::ComponentNode;

/// Session-level property name recorded when the client configuration changes.
pub const CLIENT_CONFIGURATION_PROPERTY: &str = "clientConfiguration";

/// Query parameter carrying the service id in service URIs.
pub const SERVICE_ID_PARAMETER: &str = "sid";

const CLIENT_RENDER_ID_PREFIX: &str = "c_";

const ROOT_ELEMENT_ID: &str = "approot";

thread_local! {
    static ACTIVE_SESSION: Cell<Option<Uuid>> = const { Cell::new(None) };
}

/// Session currently running application code on this thread, if any.
pub fn active_session() -> Option<Uuid> {
    ACTIVE_SESSION.with(Cell::get)
}

fn set_active_session(id: Option<Uuid>) -> Option<Uuid> {
    ACTIVE_SESSION.with(|active| active.replace(id))
}

/// Component id carried by a client render id (`"c_" + id`).
pub fn parse_client_render_id(client_id: &str) -> Result<&str, SessionError> {
    client_id
        .strip_prefix(CLIENT_RENDER_ID_PREFIX)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| SessionError::InvalidClientRenderId(client_id.to_string()))
}

/// Server-side state of one user session.
pub struct SessionContext {
    id: Uuid,
    initialized: bool,
    frozen: bool,
    application: Option<Box<dyn Application>>,
    render_states: HashMap<String, serde_json::Value>,
    transaction_id: u64,
    initial_parameters: Arc<RequestParameters>,
    character_encoding: String,
    servlet_uri: String,
    client_configuration: Option<ClientConfiguration>,
    client_properties: Option<ClientProperties>,
    update_manager: SessionUpdateManager,
    default_poll_interval_ms: u64,
    // Transient: dropped on freeze, rebuilt on first use.
    id_table: Option<IdTable>,
    poll_intervals: Option<PollIntervals>,
}

impl SessionContext {
    pub fn new(config: &SessionConfig, initial_parameters: RequestParameters) -> Self {
        Self::with_id(Uuid::new_v4(), config, initial_parameters)
    }

    pub fn with_id(id: Uuid, config: &SessionConfig, initial_parameters: RequestParameters) -> Self {
        Self {
            id,
            initialized: false,
            frozen: false,
            application: None,
            render_states: HashMap::new(),
            transaction_id: 0,
            initial_parameters: Arc::new(initial_parameters),
            character_encoding: config.character_encoding.clone(),
            servlet_uri: config.servlet_uri.clone(),
            client_configuration: None,
            client_properties: None,
            update_manager: SessionUpdateManager::new(),
            default_poll_interval_ms: config.default_poll_interval_ms,
            id_table: None,
            poll_intervals: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create and initialize the application. Allowed exactly once.
    pub fn init(&mut self, factory: &dyn ApplicationFactory) -> Result<(), SessionError> {
        if self.initialized {
            return Err(SessionError::AlreadyInitialized(self.id));
        }

        let mut application = factory.create(&self.initial_parameters);
        {
            let previous = set_active_session(Some(self.id));
            let _restore = scopeguard::guard(previous, |previous| {
                set_active_session(previous);
            });
            application.init();
        }

        self.application = Some(application);
        self.initialized = true;
        tracing::info!(session = %self.id, "Session initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Prepare for serialization: passivate the application and drop the
    /// transient handles. Counters, render state and parameters stay.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        if let Some(application) = self.application.as_mut() {
            application.passivate();
        }
        self.id_table = None;
        self.poll_intervals = None;
        self.frozen = true;
        tracing::debug!(session = %self.id, transaction_id = self.transaction_id, "Session frozen");
    }

    /// Undo [`freeze`](Self::freeze). Transient handles come back lazily.
    pub fn thaw(&mut self) {
        if !self.frozen {
            return;
        }
        if let Some(application) = self.application.as_mut() {
            application.activate();
        }
        self.frozen = false;
        tracing::debug!(session = %self.id, "Session thawed");
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Dispose the application. The context stays usable for inspection.
    pub fn end(&mut self) {
        if let Some(mut application) = self.application.take() {
            application.dispose();
        }
        self.render_states.clear();
        self.id_table = None;
        self.poll_intervals = None;
        tracing::info!(session = %self.id, "Session ended");
    }

    /// Persistable part of the session.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            transaction_id: self.transaction_id,
            render_states: self.render_states.clone(),
            initial_parameters: self.initial_parameters.as_ref().clone(),
            character_encoding: self.character_encoding.clone(),
            servlet_uri: self.servlet_uri.clone(),
            client_configuration: self.client_configuration.clone(),
            client_properties: self.client_properties.clone(),
        }
    }

    /// Rebuild a context from a snapshot. The application is not part of the
    /// snapshot, so the result needs [`init`](Self::init) again; the
    /// transaction counter carries on where it was.
    pub fn restore(snapshot: SessionSnapshot, config: &SessionConfig) -> Self {
        let mut context = Self::with_id(snapshot.id, config, snapshot.initial_parameters);
        context.transaction_id = snapshot.transaction_id;
        context.render_states = snapshot.render_states;
        context.character_encoding = snapshot.character_encoding;
        context.servlet_uri = snapshot.servlet_uri;
        context.client_configuration = snapshot.client_configuration;
        context.client_properties = snapshot.client_properties;
        context
    }

    // ========================================================================
    // Application and components
    // ========================================================================

    pub fn application(&self) -> Option<&dyn Application> {
        self.application.as_deref()
    }

    pub fn root(&self) -> Result<&ComponentNode, SessionError> {
        self.application
            .as_ref()
            .map(|application| application.root())
            .ok_or(SessionError::NotInitialized)
    }

    pub fn root_mut(&mut self) -> Result<&mut ComponentNode, SessionError> {
        self.application
            .as_mut()
            .map(|application| application.root_mut())
            .ok_or(SessionError::NotInitialized)
    }

    pub fn client_render_id(&self, component_id: &str) -> String {
        format!("{}{}", CLIENT_RENDER_ID_PREFIX, component_id)
    }

    pub fn component_by_client_render_id(
        &self,
        client_id: &str,
    ) -> Result<&ComponentNode, SessionError> {
        let id = parse_client_render_id(client_id)?;
        self.root()?
            .find(id)
            .ok_or_else(|| SessionError::UnknownComponent(id.to_string()))
    }

    pub fn root_element_id(&self) -> &'static str {
        ROOT_ELEMENT_ID
    }

    // ========================================================================
    // Render state
    // ========================================================================

    pub fn render_state(&self, component_id: &str) -> Option<&serde_json::Value> {
        self.render_states.get(component_id)
    }

    pub fn set_render_state(&mut self, component_id: &str, state: serde_json::Value) {
        self.render_states.insert(component_id.to_string(), state);
    }

    /// Removing state of destroyed components is the caller's job.
    pub fn remove_render_state(&mut self, component_id: &str) -> Option<serde_json::Value> {
        self.render_states.remove(component_id)
    }

    /// Remove the state of `node` and all its descendants.
    pub fn remove_render_states_for(&mut self, node: &ComponentNode) {
        node.walk(&mut |n| {
            self.render_states.remove(&n.id);
        });
    }

    pub fn render_state_as<T: DeserializeOwned>(
        &self,
        component_id: &str,
    ) -> Result<Option<T>, SessionError> {
        self.render_states
            .get(component_id)
            .map(|state| serde_json::from_value(state.clone()))
            .transpose()
            .map_err(SessionError::from)
    }

    pub fn set_render_state_from<T: Serialize>(
        &mut self,
        component_id: &str,
        state: &T,
    ) -> Result<(), SessionError> {
        let value = serde_json::to_value(state)?;
        self.set_render_state(component_id, value);
        Ok(())
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    pub fn current_transaction_id(&self) -> u64 {
        self.transaction_id
    }

    /// Increment and return the counter. Called once per outgoing server
    /// message and never on behalf of the client.
    pub fn next_transaction_id(&mut self) -> u64 {
        self.transaction_id += 1;
        tracing::trace!(session = %self.id, transaction_id = self.transaction_id, "Transaction id advanced");
        self.transaction_id
    }

    // ========================================================================
    // Task queues
    // ========================================================================

    pub fn set_poll_interval(&mut self, queue: &TaskQueueHandle, interval_ms: u64) {
        let default_ms = self.default_poll_interval_ms;
        self.poll_intervals
            .get_or_insert_with(|| PollIntervals::new(default_ms))
            .set(queue, interval_ms);
    }

    pub fn remove_poll_interval(&mut self, queue: &TaskQueueHandle) -> bool {
        self.poll_intervals
            .as_mut()
            .is_some_and(|intervals| intervals.remove(queue))
    }

    /// Minimum interval voted by live task queues, or the default.
    pub fn resolve_poll_interval(&self) -> u64 {
        self.poll_intervals
            .as_ref()
            .map_or(self.default_poll_interval_ms, PollIntervals::resolve)
    }

    pub fn id_table(&mut self) -> &mut IdTable {
        self.id_table.get_or_insert_with(IdTable::new)
    }

    /// Number of objects in the id table without creating it.
    pub fn id_table_len(&self) -> usize {
        self.id_table.as_ref().map_or(0, IdTable::len)
    }

    // ========================================================================
    // Client and transport details
    // ========================================================================

    pub fn initial_parameters(&self) -> &RequestParameters {
        &self.initial_parameters
    }

    pub fn character_encoding(&self) -> &str {
        &self.character_encoding
    }

    pub fn servlet_uri(&self) -> &str {
        &self.servlet_uri
    }

    pub fn set_servlet_uri(&mut self, uri: impl Into<String>) {
        self.servlet_uri = uri.into();
    }

    pub fn service_uri(&self, service_id: &str) -> String {
        format!("{}?{}={}", self.servlet_uri, SERVICE_ID_PARAMETER, service_id)
    }

    /// Service URI with extra parameters; a `None` value renders the name only.
    pub fn service_uri_with(&self, service_id: &str, parameters: &[(&str, Option<&str>)]) -> String {
        let mut uri = self.service_uri(service_id);
        for (name, value) in parameters {
            uri.push('&');
            uri.push_str(name);
            if let Some(value) = value {
                uri.push('=');
                uri.push_str(value);
            }
        }
        uri
    }

    pub fn client_configuration(&self) -> Option<&ClientConfiguration> {
        self.client_configuration.as_ref()
    }

    pub fn set_client_configuration(&mut self, configuration: ClientConfiguration) {
        self.client_configuration = Some(configuration);
        self.update_manager
            .process_property_update(CLIENT_CONFIGURATION_PROPERTY);
    }

    pub fn client_properties(&self) -> Option<&ClientProperties> {
        self.client_properties.as_ref()
    }

    pub fn set_client_properties(&mut self, properties: ClientProperties) {
        self.client_properties = Some(properties);
    }

    pub fn update_manager(&self) -> &SessionUpdateManager {
        &self.update_manager
    }

    pub fn update_manager_mut(&mut self) -> &mut SessionUpdateManager {
        &mut self.update_manager
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("id", &self.id)
            .field("initialized", &self.initialized)
            .field("frozen", &self.frozen)
            .field("transaction_id", &self.transaction_id)
            .field("render_states", &self.render_states.len())
            .finish_non_exhaustive()
    }
}

/// Serializable state of a session, produced by [`SessionContext::snapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub transaction_id: u64,
    pub render_states: HashMap<String, serde_json::Value>,
    pub initial_parameters: RequestParameters,
    pub character_encoding: String,
    pub servlet_uri: String,
    pub client_configuration: Option<ClientConfiguration>,
    pub client_properties: Option<ClientProperties>,
}

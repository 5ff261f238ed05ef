//! The application instance a session drives.

use std::collections::BTreeMap;

use crate::tree::ComponentNode;

/// Request parameters: name → values, as sent on the first request.
pub type RequestParameters = BTreeMap<String, Vec<String>>;

/// Owner of a session's component tree.
pub trait Application: Send {
    /// Called once from [`SessionContext::init`](crate::session::SessionContext::init)
    /// while the session is marked active on the current thread.
    fn init(&mut self) {}

    fn root(&self) -> &ComponentNode;

    fn root_mut(&mut self) -> &mut ComponentNode;

    /// Session is about to be frozen.
    fn passivate(&mut self) {}

    /// Session was thawed.
    fn activate(&mut self) {}

    /// Session ended.
    fn dispose(&mut self) {}
}

/// Creates the application instance for a new session.
pub trait ApplicationFactory {
    fn create(&self, parameters: &RequestParameters) -> Box<dyn Application>;
}

impl<F> ApplicationFactory for F
where
    F: Fn(&RequestParameters) -> Box<dyn Application>,
{
    fn create(&self, parameters: &RequestParameters) -> Box<dyn Application> {
        self(parameters)
    }
}

/// An application that is nothing but its tree.
#[derive(Debug, Clone)]
pub struct TreeApplication {
    root: ComponentNode,
}

impl TreeApplication {
    pub fn new(root: ComponentNode) -> Self {
        Self { root }
    }
}

impl Application for TreeApplication {
    fn root(&self) -> &ComponentNode {
        &self.root
    }

    fn root_mut(&mut self) -> &mut ComponentNode {
        &mut self.root
    }
}

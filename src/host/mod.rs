//! Host API surface
//!
//! The console runs embedded in a place-and-route host. The host hands the
//! session two things: a module (version, architecture, exported names) and a
//! live context object bound as [`CONTEXT_NAME`]. Both are shared with the host
//! through `Arc` for the whole session; the console never owns them.
//!
//! Hosts make themselves available through a process-wide registry. A session
//! must never start against a host that cannot be located.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::repl::namespace::Value;

pub mod generic;

pub use generic::{Design, GenericHost};

/// Name the host context is bound to in the session namespace
pub const CONTEXT_NAME: &str = "ctx";

/// A live host object reachable from scripts
pub trait HostObject: fmt::Debug + Send + Sync {
    /// Type name shown by `repr` and error messages
    fn type_name(&self) -> &str;

    /// Developer-facing representation
    fn repr(&self) -> String {
        format!("<{} object>", self.type_name())
    }

    /// Attribute lookup
    fn attr(
        &self,
        name: &str,
    ) -> Option<Value>;

    /// Attribute names, for `dir()`
    fn attr_names(&self) -> Vec<String> {
        Vec::new()
    }
}

/// The host's scripting module
pub trait HostModule: fmt::Debug + Send + Sync {
    /// Module name, also the name it is bound under in the namespace
    fn name(&self) -> &str;

    /// Product version string shown in the banner
    fn version(&self) -> &str;

    /// Active architecture name shown in the banner
    fn arch(&self) -> &str;

    /// Names imported into the namespace at session start
    fn exports(&self) -> Vec<(String, Value)>;

    /// Context for stand-alone sessions; embedding hosts pass theirs explicitly
    fn context(&self) -> Option<Arc<dyn HostObject>> {
        None
    }
}

/// Host lookup errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Unable to import `{name}` API, this console may only be used inside {name}")]
    Unavailable { name: String },
    #[error("Host `{name}` does not provide a context")]
    NoContext { name: String },
}

static HOSTS: Lazy<RwLock<IndexMap<String, Arc<dyn HostModule>>>> =
    Lazy::new(|| RwLock::new(IndexMap::new()));

/// Make a host available to [`locate_host`]; replaces any host of the same name
pub fn register_host(host: Arc<dyn HostModule>) {
    let name = host.name().to_string();
    debug!(host = %name, "registering host");
    HOSTS.write().insert(name, host);
}

/// Find a registered host by module name
pub fn locate_host(name: &str) -> Result<Arc<dyn HostModule>, HostError> {
    HOSTS
        .read()
        .get(name)
        .cloned()
        .ok_or_else(|| HostError::Unavailable {
            name: name.to_string(),
        })
}

/// Names of every registered host
pub fn registered_hosts() -> Vec<String> {
    HOSTS.read().keys().cloned().collect()
}

/// Enum-like namespace exported by a host (`PlaceStrength.STRONG`, ...)
#[derive(Debug, Clone)]
pub struct EnumNamespace {
    name: &'static str,
    members: &'static [(&'static str, i64)],
}

impl EnumNamespace {
    pub const fn new(
        name: &'static str,
        members: &'static [(&'static str, i64)],
    ) -> Self {
        Self { name, members }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl HostObject for EnumNamespace {
    fn type_name(&self) -> &str {
        "enum"
    }

    fn repr(&self) -> String {
        format!("<enum '{}'>", self.name)
    }

    fn attr(
        &self,
        name: &str,
    ) -> Option<Value> {
        self.members
            .iter()
            .find(|(member, _)| *member == name)
            .map(|(_, value)| Value::Int(*value))
    }

    fn attr_names(&self) -> Vec<String> {
        self.members.iter().map(|(name, _)| name.to_string()).collect()
    }
}

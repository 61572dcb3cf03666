//! azcore - Azure Resource Manager building blocks
//!
//! Resource identifier parsing/formatting and long-running operation polling,
//! written against an injected HTTP [`Sender`](http::Sender) so providers can
//! bring their own transport and authorization.

// Core modules
pub mod context;
pub mod error;
pub mod http;

// Resource addressing
pub mod resource_id;

// Long-running operations
pub mod poller;

// Helper modules
pub mod validator;

#[cfg(test)]
#[allow(dead_code)]
mod test_helpers;

// Re-exports for convenience
pub use context::{Context, Interrupted};
pub use error::{OperationError, ParseError, ServiceError};
pub use http::{Authorizer, BearerAuthorizer, Request, Response, SendError, Sender};
pub use poller::{
    wait_for_completion, AsyncOperation, OperationStatus, PollingMethod, PollingPolicy,
    PollingState,
};
pub use resource_id::{ResourceId, ResourceIdentifier};
pub use validator::{Diagnostic, DiagnosticSeverity, Diagnostics, Validator};

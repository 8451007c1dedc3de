pub mod builtin;
pub mod dispatcher;
pub mod registry;

pub use dispatcher::{CommandDispatcher, DispatchContext, DispatchOutcome};
pub use registry::CommandRegistry;

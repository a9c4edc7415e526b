pub mod backend;
pub mod cli;
pub mod command;
pub mod dispatch;
pub mod logging;
pub mod pretty;
pub mod repl;
pub mod store;
pub mod types;

// Re-export key types and functions at the crate root
pub use backend::{Availability, Invocation};
pub use command::{Action, interpret};
pub use dispatch::{Dispatcher, DispatcherConfig};
pub use logging::{get_log_file_path, init_logging};
pub use repl::Repl;
pub use store::ResultStore;
pub use types::{BackendKind, OutcomeStatus, ScanCommand, ScanOutcome, ScanRequest};

pub mod error;
pub mod ports;
pub mod process;
pub mod router;

pub use error::{DispatchError, DispatchErrorKind};
pub use ports::{DispatchMechanism, DispatchOutcome, TriggerPort};
pub use process::GhTrigger;
pub use router::{BUILTIN_AGENTS, DispatchRouter, is_builtin_agent};

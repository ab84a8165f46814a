//! Domain model (priorities, errors).

pub mod errors;
pub mod priority;

pub use self::errors::{CursorPhase, ErrorKind, LifecycleError, RegistryError};
pub use self::priority::Priority;

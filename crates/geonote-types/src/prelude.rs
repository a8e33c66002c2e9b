pub use crate::error::{AuthError, Error, GnResult};
pub use crate::types::{NoteId, Timestamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4

pub use crate::app::{App, AppState};
pub use geonote_types::prelude::*;

// vim: ts=4

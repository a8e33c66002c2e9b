pub use geonote_core::prelude::*;

// vim: ts=4

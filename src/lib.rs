pub mod activity;
pub mod document;
pub mod error;
pub mod links;

pub use error::*;
pub use crate::activity::BPEL_ACTIVITIES;
pub use crate::document::{parse_bpel, BpelDocument, NodeId, NodeRef};

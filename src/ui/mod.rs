//! Terminal and speech output

pub mod notify;
pub mod progress;

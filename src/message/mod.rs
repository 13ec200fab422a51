//! Frame parsing and transcript reconciliation

mod parser;
mod transcript;

pub use parser::{parse_frame, parse_frame_str};
pub use transcript::{MergeOutcome, Transcript};

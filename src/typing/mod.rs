//! Typing signal handling
//!
//! The outbound half ([`TypingDebouncer`]) converts raw keystrokes into a
//! minimal alternating start/stop stream; the inbound half
//! ([`PeerTypingSet`]) holds the peers currently composing.

mod debouncer;
mod peers;

pub use debouncer::TypingDebouncer;
pub use peers::PeerTypingSet;

//! Local state paths, JSONL I/O and host event shaping

mod events;
mod io;
mod paths;

pub use events::{sourcetype_for, write_events, HostEvent, DEFAULT_INDEX};
pub use io::{append_jsonl, atomic_write, read_jsonl};
pub use paths::{Paths, HOME_ENV};

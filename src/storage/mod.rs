pub mod memory;

pub use memory::{Clock, ManualClock, SystemClock, TtlCache};

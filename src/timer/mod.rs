pub mod state;
pub mod ticker;

pub use state::{Stopwatch, StopwatchSnapshot, StopwatchStatus};
pub use ticker::{Tick, Ticker};

pub mod logger;

pub use logger::{Outcome, RequestLog};

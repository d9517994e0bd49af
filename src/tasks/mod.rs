//! Background tasks module
//!
//! Periodic ticks that run alongside the HTTP server.

pub mod countdown;
pub mod elapsed_ticker;

pub use countdown::{countdown_task, CountdownRegistry};
pub use elapsed_ticker::elapsed_ticker_task;

//! Adapter implementations of the port traits.
//!
//! - `live`: real system clock, disk, RNG and `git` subprocesses.
//! - `recording`: wraps another adapter and captures every call to a cassette.
//! - `replaying`: serves previously captured outputs in order.

pub mod live;
pub mod recording;
pub mod replaying;

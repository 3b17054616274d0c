//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the grid/scheduling core and an
//! external system (time, randomness, filesystem, version control).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod random;
pub mod vcs;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use random::RandomSource;
pub use vcs::{VcsExecutor, VcsOutput};

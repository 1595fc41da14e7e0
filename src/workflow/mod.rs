pub mod progress;
pub mod session;

pub use progress::{drive_with_progress, ProgressRotator, INITIAL_MESSAGE, ROTATING_MESSAGES};
pub use session::{GradingSession, PendingPair, Step};

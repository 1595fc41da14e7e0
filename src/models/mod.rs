pub mod grading;
pub mod image;
pub mod loaders;
pub mod task_type;

pub use grading::{Correction, FeedbackSection, GradingResult, ScoreBreakdown, TaskResult};
pub use image::{EncodedImage, ImagePair};
pub use loaders::{load_submission, load_submission_manifest, Submission, SubmissionManifest};
pub use task_type::TaskType;

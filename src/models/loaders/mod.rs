pub mod submission_loader;

pub use submission_loader::{
    load_image, load_submission, load_submission_manifest, ManifestTask, Submission,
    SubmissionManifest,
};

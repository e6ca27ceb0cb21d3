// Templates: recruiter-authored example resumes with hiring notes, browsable
// by everyone signed in and copyable into a caller's own resumes.

pub mod handlers;
pub mod repo;

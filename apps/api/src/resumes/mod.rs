// Resumes: structured content, CRUD, and the read-only reports shown on the
// detail view (keywords, completeness, bullet feedback).

pub mod completeness;
pub mod content;
pub mod feedback;
pub mod handlers;
pub mod repo;
pub mod storage;

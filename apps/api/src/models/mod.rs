pub mod credits;
pub mod payment;
pub mod resume;
pub mod template;
pub mod user;

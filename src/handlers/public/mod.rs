// Open surface: routes that run without the access guard.

pub mod categories;
pub mod comments;
pub mod dashboard;
pub mod posts;
pub mod session;
pub mod users;

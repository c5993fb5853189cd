// Guarded surface: every route in this tree sits behind the access guard,
// so handlers can rely on `AuthIdentity` being present in the extensions.

pub mod categories;
pub mod comments;
pub mod posts;
pub mod wishlist;

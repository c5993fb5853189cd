pub mod client;
pub mod collection;
pub mod filter;

pub use client::{StoreClient, StoreError};
pub use collection::{Collection, DeleteResult, FindOptions, InsertResult, UpdateResult};
pub use filter::DocFilter;

/// Named collections backing the API. Each maps to one JSONB table created
/// at startup by [`StoreClient::init_schema`].
pub mod names {
    pub const POSTS: &str = "posts";
    pub const CATEGORIES: &str = "categories";
    pub const COMMENTS: &str = "comments";
    pub const USERS: &str = "users";
    pub const WISHLISTS: &str = "wishlists";

    pub const ALL: [&str; 5] = [POSTS, CATEGORIES, COMMENTS, USERS, WISHLISTS];
}

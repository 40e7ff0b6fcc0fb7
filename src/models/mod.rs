pub mod post;
pub mod tag;
pub mod user;

pub use post::{Post, PostFields, PostWithTags, RecentPost};
pub use tag::{PostTag, Tag, TagWithPosts};
pub use user::{User, UserFields, UserWithPosts, DEFAULT_IMAGE_URL};

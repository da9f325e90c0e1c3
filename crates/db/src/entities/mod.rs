//! Database entities.

pub mod blocking;
pub mod comment;
pub mod following;
pub mod notification;
pub mod post;
pub mod post_like;
pub mod report;
pub mod user;

pub use blocking::Entity as Blocking;
pub use comment::Entity as Comment;
pub use following::Entity as Following;
pub use notification::Entity as Notification;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use report::Entity as Report;
pub use user::Entity as User;

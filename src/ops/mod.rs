pub mod auth_ops;
pub mod friend_ops;
pub mod contact_ops;
pub mod category_ops;
pub mod relationship_ops;
pub mod activity_ops;
pub mod share_ops;
pub mod import_ops;

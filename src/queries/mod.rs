pub mod friend_queries;
pub mod category_queries;
pub mod relationship_queries;
pub mod activity_queries;
pub mod reminder_queries;
pub mod stats_queries;
pub mod share_queries;

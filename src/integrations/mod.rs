pub mod gravatar;
pub mod instagram;

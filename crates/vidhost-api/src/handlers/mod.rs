pub mod health;
pub mod login;
pub mod media_proxy;
pub mod upload;
pub mod videos;

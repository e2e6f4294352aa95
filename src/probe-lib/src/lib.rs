pub mod auth;
pub mod client;
pub mod core;
pub mod model;
pub mod request;
pub mod resolve;
pub mod runner;
pub mod validation;

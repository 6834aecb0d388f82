pub mod error;
pub mod evaluation;
pub mod health;
pub mod openapi;
pub mod search;

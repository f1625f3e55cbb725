pub mod apps;
pub mod asana;
pub mod config;
pub mod export;
pub mod http;
pub mod trello;
pub mod types;

pub mod artifacts;
pub mod blogs;
pub mod cli;
mod http;
pub mod load_config;
pub mod openai;
pub mod pexels;
pub mod unsplash;
pub mod wordpress;

pub use cli::{run, Cli, Commands};

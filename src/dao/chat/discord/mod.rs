mod client;
mod config;
mod wire;

pub use client::DiscordGateway;
pub use config::DiscordConfig;

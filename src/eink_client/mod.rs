mod api_types;
mod client;
mod helpers;
mod render;

pub use client::EinkClient;
pub use helpers::next_refresh_interval;
pub use render::render_lines;

pub mod config;
pub mod dupeseek_toml;
pub mod fd_limit;
pub mod logger;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, max_open_fds, worker_pool};
pub use logger::setup_logging;

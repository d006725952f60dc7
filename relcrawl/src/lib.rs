pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{parse_seed_line, read_seed};

// Re-export crawl functionality from relcrawl-core
pub use relcrawl_core::crawl::{CrawlOptions, execute_crawl, seed_identifier};

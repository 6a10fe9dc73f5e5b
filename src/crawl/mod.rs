pub mod aggregate;
pub mod ancestry;
pub mod crawl_model;
pub mod crawler;
pub mod materialize;

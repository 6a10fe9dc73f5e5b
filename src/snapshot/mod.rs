pub mod snapshot_model;
pub mod viewport;

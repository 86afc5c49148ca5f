pub mod alerts;
pub mod organizations;
pub mod plants;
pub mod sync_runs;
pub mod vendors;

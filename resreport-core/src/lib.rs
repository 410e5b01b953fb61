pub mod aggregate;
pub mod charts;
pub mod columns;
pub mod config;
pub mod data_loader;
pub mod errors;
pub mod export;
pub mod filter;
pub mod format;
pub mod import;
pub mod inclusion;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod session;
pub mod table;

pub use config::ReportConfig;
pub use session::Session;

mod types;

pub use types::TrmConfig;

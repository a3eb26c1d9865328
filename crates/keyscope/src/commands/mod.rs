pub mod compile;
pub mod granularity;
pub mod sql;
pub mod version;

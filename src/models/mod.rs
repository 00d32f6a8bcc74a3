mod credit_log;
mod order;
mod plan;
mod usage;

pub use credit_log::*;
pub use order::*;
pub use plan::*;
pub use usage::*;

pub mod aggregate;

pub use aggregate::{Cost, CostId};

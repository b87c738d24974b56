pub mod cost_frequency;

pub use cost_frequency::CostFrequency;

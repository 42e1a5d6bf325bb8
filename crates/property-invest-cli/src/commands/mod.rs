pub mod analysis;
pub mod cash_flow;
pub mod mortgage;
pub mod ratios;

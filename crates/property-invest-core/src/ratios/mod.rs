pub mod depreciation;
pub mod income;
pub mod rental_comps;

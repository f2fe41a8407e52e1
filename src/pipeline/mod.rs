pub mod aggregate;
pub mod dates;
pub mod filter;
pub mod normalize;
pub mod table;

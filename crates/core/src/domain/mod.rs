pub mod customer;
pub mod finding;
pub mod order;
pub mod product;

//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;

pub use cart::{Cart, CartError, CartLine, CartSnapshot, LineKey};
pub use order::{Buyer, Order, OrderError, OrderStatus};
pub use product::{Category, Product};

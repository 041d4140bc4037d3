//! Back office of a digital-code storefront: users, wallet ledger, products,
//! orders, coupons and payment settings kept in a string-keyed store.

pub mod config;
mod entity;
pub mod error;
pub mod media;
pub mod model;
pub mod plugins;
mod prelude;
pub mod state;
pub mod storage;
pub mod store;
pub mod sv;

pub use error::{Error, Result};
pub use store::Store;

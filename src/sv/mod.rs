pub mod coupon;
pub mod order;
pub mod product;
pub mod seed;
pub mod settings;
#[cfg(test)]
pub mod test_utils;
pub mod user;
pub mod wallet;

pub use coupon::Coupon;
pub use order::Order;
pub use product::Product;
pub use seed::Seed;
pub use settings::Settings;
pub use user::User;
pub use wallet::{Outcome, Wallet};

use crate::store::Store;

/// Every service, borrowed from one [`Store`].
pub struct Services<'a> {
  pub user: User<'a>,
  pub wallet: Wallet<'a>,
  pub product: Product<'a>,
  pub order: Order<'a>,
  pub coupon: Coupon<'a>,
  pub settings: Settings<'a>,
  pub seed: Seed<'a>,
}

impl<'a> Services<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self {
      user: User::new(store),
      wallet: Wallet::new(store),
      product: Product::new(store),
      order: Order::new(store),
      coupon: Coupon::new(store),
      settings: Settings::new(store),
      seed: Seed::new(store),
    }
  }
}

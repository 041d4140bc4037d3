use crate::{
  model::{
    self, Category, GlobalSettings, Record, UserRole, settings::SETTINGS_KEY,
  },
  prelude::*,
  store::Store,
};

pub const ADMIN_ID: &str = "admin-1";
pub const ADMIN_USERNAME: &str = "niraj2546";
pub const ADMIN_PHONE: &str = "7070294070";
pub const ADMIN_PASSWORD: &str = "0852963741@Ap";
pub const ADMIN_INITIAL_BALANCE: i64 = 10_000;

/// First-run fixtures and the super admin account.
pub struct Seed<'a> {
  store: &'a Store,
}

impl<'a> Seed<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  /// Idempotent. The super admin's credentials are rewritten on every run;
  /// its id, balance and creation date are preserved.
  pub async fn run(&self) -> Result<()> {
    let mut tx = self.store.begin().await;

    let mut users = tx.load::<model::User>().await?;
    match users.iter_mut().find(|user| user.username == ADMIN_USERNAME) {
      Some(admin) => {
        admin.phone = ADMIN_PHONE.to_string();
        admin.password_hash = model::User::hash_password(ADMIN_PASSWORD);
        admin.role = UserRole::SuperAdmin;
        admin.is_banned = false;
        info!("super admin credentials updated");
      }
      None => {
        let mut admin =
          model::User::new(ADMIN_USERNAME, ADMIN_PHONE, ADMIN_PASSWORD);
        admin.id = ADMIN_ID.to_string();
        admin.role = UserRole::SuperAdmin;
        admin.wallet_balance = ADMIN_INITIAL_BALANCE;
        users.push(admin);
        info!("super admin initialized");
      }
    }
    tx.stage(&users)?;

    if tx.get_raw(SETTINGS_KEY).await?.is_none() {
      tx.stage_raw(SETTINGS_KEY, json::to_string(&GlobalSettings::default())?);
    }

    let products_key = model::Product::COLLECTION.key();
    if tx.get_raw(products_key).await?.is_none() {
      tx.stage(&default_products())?;
      info!("default products seeded");
    }

    if tx.get_raw(model::Coupon::COLLECTION.key()).await?.is_none() {
      tx.stage::<model::Coupon>(&[])?;
    }

    tx.commit().await
  }
}

fn default_products() -> Vec<model::Product> {
  let mut amazon = model::Product::new(
    "Amazon ₹500 Gift Card",
    "Valid for 1 year. Instant redemption.",
    500,
    Category::GiftCard,
    10,
  );
  amazon.id = "p1".into();
  amazon.image_url =
    "https://placehold.co/600x400/252f3f/ffffff?text=Amazon+Card".into();

  let mut visa = model::Product::new(
    "Visa Prepaid ₹1000",
    "Use anywhere Visa is accepted online.",
    1050,
    Category::PrepaidCard,
    5,
  );
  visa.id = "p2".into();
  visa.image_url =
    "https://placehold.co/600x400/10b981/ffffff?text=Visa+Prepaid".into();

  vec![amazon, visa]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils;

  #[tokio::test]
  async fn test_seed_fresh_store() {
    let store = test_utils::memory_store();
    let sv = store.sv();

    sv.seed.run().await.unwrap();

    let admin = sv.user.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(admin.id, ADMIN_ID);
    assert_eq!(admin.role, UserRole::SuperAdmin);
    assert_eq!(admin.wallet_balance, ADMIN_INITIAL_BALANCE);

    let products = sv.product.all().await.unwrap();
    let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
    assert_eq!((products[0].stock, products[1].stock), (10, 5));

    assert_eq!(sv.settings.get().await.unwrap(), GlobalSettings::default());
    assert!(sv.coupon.all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_reseed_updates_admin_in_place() {
    let store = test_utils::memory_store();
    let sv = store.sv();
    sv.seed.run().await.unwrap();

    let mut admin = sv.user.find_by_username(ADMIN_USERNAME).await.unwrap().unwrap();
    sv.wallet.adjust(&admin.id, -500).await.unwrap();
    admin.password_hash = model::User::hash_password("changed");
    admin.phone = "0".into();
    sv.user.save(admin.clone()).await.unwrap();
    sv.product.delete("p1").await.unwrap();

    sv.seed.run().await.unwrap();

    let users = sv.user.all().await.unwrap();
    let admins: Vec<_> =
      users.iter().filter(|u| u.role == UserRole::SuperAdmin).collect();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].id, admin.id);
    assert_eq!(admins[0].created_at, admin.created_at);
    assert_eq!(admins[0].phone, ADMIN_PHONE);
    assert_eq!(admins[0].wallet_balance, ADMIN_INITIAL_BALANCE - 500);
    assert!(admins[0].check_password(ADMIN_PASSWORD));

    // an emptied collection is not re-seeded
    let products = sv.product.all().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "p2");
  }

  #[tokio::test]
  async fn test_seed_keeps_custom_settings() {
    let store = test_utils::sqlite_store().await;
    let sv = store.sv();
    let custom = GlobalSettings { upi_id: "me@upi".into(), ..Default::default() };
    sv.settings.save(&custom).await.unwrap();

    sv.seed.run().await.unwrap();
    sv.seed.run().await.unwrap();

    assert_eq!(sv.settings.get().await.unwrap(), custom);
    assert_eq!(sv.user.all().await.unwrap().len(), 1);
  }
}

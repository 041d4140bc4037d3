use crate::{model, prelude::*, store::Store};

pub struct Coupon<'a> {
  store: &'a Store,
}

impl<'a> Coupon<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  pub async fn all(&self) -> Result<Vec<model::Coupon>> {
    self.store.list().await
  }

  /// Creates an active coupon, replacing any coupon with the same code.
  pub async fn save(
    &self,
    code: &str,
    discount_amount: i64,
  ) -> Result<model::Coupon> {
    let coupon = model::Coupon::new(code, discount_amount);
    if coupon.code.is_empty() {
      return Err(Error::InvalidArgs("Coupon code is required".into()));
    }
    if discount_amount <= 0 {
      return Err(Error::InvalidArgs("Discount must be positive".into()));
    }

    self.store.upsert(coupon.clone()).await?;
    info!(code = %coupon.code, discount_amount, "coupon saved");
    Ok(coupon)
  }

  pub async fn set_active(&self, code: &str, active: bool) -> Result<()> {
    let code = model::Coupon::normalize(code);
    self
      .store
      .update::<model::Coupon, _>(&code, |coupon| {
        coupon.is_active = active;
        Ok(())
      })
      .await
  }

  pub async fn find_active(&self, code: &str) -> Result<Option<model::Coupon>> {
    let code = model::Coupon::normalize(code);
    let coupon = self.store.get::<model::Coupon>(&code).await?;
    Ok(coupon.filter(|coupon| coupon.is_active))
  }

  pub async fn delete(&self, code: &str) -> Result<()> {
    let code = model::Coupon::normalize(code);
    self.store.remove::<model::Coupon>(&code).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils;

  #[tokio::test]
  async fn test_coupon_lifecycle() {
    let store = test_utils::memory_store();
    let sv = store.sv();

    sv.coupon.save("save50", 50).await.unwrap();
    let found = sv.coupon.find_active("SAVE50 ").await.unwrap().unwrap();
    assert_eq!(found.discount_amount, 50);

    sv.coupon.set_active("Save50", false).await.unwrap();
    assert_eq!(sv.coupon.find_active("save50").await.unwrap(), None);
    assert_eq!(sv.coupon.all().await.unwrap().len(), 1);

    sv.coupon.delete("save50").await.unwrap();
    assert!(sv.coupon.all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_same_code_replaces() {
    let store = test_utils::memory_store();
    let sv = store.sv();

    sv.coupon.save("X", 10).await.unwrap();
    sv.coupon.save("x", 20).await.unwrap();

    let all = sv.coupon.all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].discount_amount, 20);
  }

  #[tokio::test]
  async fn test_validation() {
    let store = test_utils::memory_store();
    let sv = store.sv();

    assert!(matches!(sv.coupon.save("  ", 10).await, Err(Error::InvalidArgs(_))));
    assert!(matches!(sv.coupon.save("A", 0).await, Err(Error::InvalidArgs(_))));
    assert!(matches!(
      sv.coupon.set_active("nope", true).await,
      Err(Error::NotFound { .. })
    ));
  }
}

use crate::{
  model::{
    self, Collection, OrderStatus, Transaction, TransactionStatus,
    TransactionType, recent_first,
  },
  prelude::*,
  store::Store,
};

pub struct Order<'a> {
  store: &'a Store,
}

impl<'a> Order<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  /// Records a pending order for `product` at its current price without
  /// touching the wallet.
  pub async fn create(
    &self,
    user_id: &str,
    product: &model::Product,
  ) -> Result<model::Order> {
    let order = model::Order::new(user_id, product, product.price);
    self.store.upsert(order.clone()).await?;
    Ok(order)
  }

  /// Buys one unit of a product with wallet funds, optionally applying an
  /// active coupon. The wallet debit, ledger entry, stock decrement and new
  /// order are written together.
  pub async fn purchase(
    &self,
    user_id: &str,
    product_id: &str,
    coupon: Option<&str>,
  ) -> Result<model::Order> {
    let mut tx = self.store.begin().await;
    let mut users = tx.load::<model::User>().await?;
    let mut products = tx.load::<model::Product>().await?;

    let user = users
      .iter_mut()
      .find(|user| user.id == user_id)
      .ok_or_else(|| Error::not_found(Collection::Users, user_id))?;
    if user.is_banned {
      return Err(Error::Banned);
    }

    let product = products
      .iter_mut()
      .find(|product| product.id == product_id)
      .ok_or_else(|| Error::not_found(Collection::Products, product_id))?;
    if product.stock == 0 {
      return Err(Error::InvalidState(format!("{} is out of stock", product.name)));
    }

    let price = match coupon {
      Some(code) => {
        let code = model::Coupon::normalize(code);
        let coupons = tx.load::<model::Coupon>().await?;
        let coupon = coupons
          .into_iter()
          .find(|coupon| coupon.code == code && coupon.is_active)
          .ok_or_else(|| Error::not_found(Collection::Coupons, code))?;
        coupon.apply(product.price)
      }
      None => product.price,
    };

    if user.wallet_balance < price {
      return Err(Error::InsufficientBalance);
    }

    user.add_balance(-price)?;
    product.stock -= 1;

    let order = model::Order::new(user_id, product, price);
    let mut orders = tx.load::<model::Order>().await?;
    orders.push(order.clone());

    let mut ledger = tx.load::<Transaction>().await?;
    ledger.push(Transaction::new(
      user_id,
      TransactionType::Purchase,
      -price,
      format!("Purchase: {}", product.name),
      TransactionStatus::Success,
    ));

    tx.stage(&users)?;
    tx.stage(&products)?;
    tx.stage(&orders)?;
    tx.stage(&ledger)?;
    tx.commit().await?;

    info!(order_id = %order.id, user_id, product_id, price, "order placed");
    Ok(order)
  }

  /// Delivers the code or link for a pending order.
  pub async fn approve(
    &self,
    order_id: &str,
    content: &str,
  ) -> Result<model::Order> {
    let content = content.trim();
    if content.is_empty() {
      return Err(Error::InvalidArgs(
        "Unlocked content is required to approve an order".into(),
      ));
    }

    let order = self
      .store
      .update::<model::Order, _>(order_id, |order| {
        ensure_pending(order)?;
        order.status = OrderStatus::Approved;
        order.unlocked_content = Some(content.to_string());
        Ok(order.clone())
      })
      .await?;

    info!(order_id, "order approved");
    Ok(order)
  }

  /// Rejects a pending order, optionally refunding the paid price to the
  /// wallet.
  pub async fn reject(
    &self,
    order_id: &str,
    refund: bool,
  ) -> Result<model::Order> {
    let mut tx = self.store.begin().await;
    let mut orders = tx.load::<model::Order>().await?;

    let order = orders
      .iter_mut()
      .find(|order| order.id == order_id)
      .ok_or_else(|| Error::not_found(Collection::Orders, order_id))?;
    ensure_pending(order)?;
    order.status = OrderStatus::Rejected;
    let order = order.clone();

    if refund && order.price > 0 {
      let mut users = tx.load::<model::User>().await?;
      let user = users
        .iter_mut()
        .find(|user| user.id == order.user_id)
        .ok_or_else(|| Error::not_found(Collection::Users, &order.user_id))?;
      user.add_balance(order.price)?;

      let mut ledger = tx.load::<Transaction>().await?;
      ledger.push(Transaction::new(
        &order.user_id,
        TransactionType::Refund,
        order.price,
        format!("Refund: {}", order.product_name),
        TransactionStatus::Success,
      ));

      tx.stage(&users)?;
      tx.stage(&ledger)?;
    }

    tx.stage(&orders)?;
    tx.commit().await?;

    info!(order_id, refund, "order rejected");
    Ok(order)
  }

  /// Replaces an existing order as-is, e.g. to correct delivered content.
  pub async fn update(&self, order: model::Order) -> Result<()> {
    let delivered =
      order.unlocked_content.as_deref().is_some_and(|c| !c.trim().is_empty());
    if order.status == OrderStatus::Approved && !delivered {
      return Err(Error::InvalidArgs(
        "Unlocked content is required to approve an order".into(),
      ));
    }

    let id = order.id.clone();
    self
      .store
      .update::<model::Order, _>(&id, move |slot| {
        *slot = order;
        Ok(())
      })
      .await
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<model::Order>> {
    self.store.get(id).await
  }

  /// Every order, newest first.
  pub async fn all(&self) -> Result<Vec<model::Order>> {
    Ok(recent_first(self.store.list().await?))
  }

  /// A user's orders, newest first.
  pub async fn by_user(&self, user_id: &str) -> Result<Vec<model::Order>> {
    let orders = self.store.list::<model::Order>().await?;
    Ok(recent_first(
      orders.into_iter().filter(|order| order.user_id == user_id).collect(),
    ))
  }
}

fn ensure_pending(order: &model::Order) -> Result<()> {
  if order.status != OrderStatus::Pending {
    return Err(Error::InvalidState(format!(
      "Order {} is already {:?}",
      order.id, order.status
    )));
  }
  Ok(())
}

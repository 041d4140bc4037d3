use crate::{
  media,
  model::{self, product::PLACEHOLDER_IMAGE},
  prelude::*,
  store::Store,
};

pub struct Product<'a> {
  store: &'a Store,
}

impl<'a> Product<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  pub async fn all(&self) -> Result<Vec<model::Product>> {
    self.store.list().await
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<model::Product>> {
    self.store.get(id).await
  }

  /// Creates or replaces a product. An empty image falls back to the
  /// placeholder.
  pub async fn save(&self, mut product: model::Product) -> Result<()> {
    if product.name.trim().is_empty() {
      return Err(Error::InvalidArgs("Product name is required".into()));
    }
    if product.price < 0 {
      return Err(Error::InvalidArgs("Price cannot be negative".into()));
    }
    if product.image_url.trim().is_empty() {
      product.image_url = PLACEHOLDER_IMAGE.to_string();
    }

    let id = product.id.clone();
    self.store.upsert(product).await?;
    debug!(id = %id, "product saved");
    Ok(())
  }

  /// Compresses an uploaded picture and saves it as the product image.
  pub async fn save_with_image(
    &self,
    mut product: model::Product,
    image: Vec<u8>,
  ) -> Result<model::Product> {
    product.image_url =
      media::compress(image, media::MAX_WIDTH, media::QUALITY).await?;
    self.save(product.clone()).await?;
    Ok(product)
  }

  /// Orders keep their own snapshot, so deleting never touches them.
  pub async fn delete(&self, id: &str) -> Result<()> {
    self.store.remove::<model::Product>(id).await?;
    info!(id, "product deleted");
    Ok(())
  }
}

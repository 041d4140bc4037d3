use crate::{config::Config, prelude::*, storage::Sqlite, store::Store, sv};

pub struct AppState {
  pub store: Store,
  pub config: Config,
}

impl AppState {
  /// Opens the configured database and seeds it.
  pub async fn new(config: Config) -> Result<Self> {
    let storage =
      Sqlite::connect(&config.database_url, config.storage_quota).await?;
    let store = Store::new(Arc::new(storage));
    store.sv().seed.run().await?;

    Ok(Self { store, config })
  }

  pub fn sv(&self) -> sv::Services<'_> {
    self.store.sv()
  }
}

use crate::{
  media,
  model::GlobalSettings,
  prelude::*,
  store::{SettingsWatch, Store},
};

pub struct Settings<'a> {
  store: &'a Store,
}

impl<'a> Settings<'a> {
  pub fn new(store: &'a Store) -> Self {
    Self { store }
  }

  pub async fn get(&self) -> Result<GlobalSettings> {
    self.store.get_settings().await
  }

  pub async fn save(&self, settings: &GlobalSettings) -> Result<()> {
    if settings.upi_id.trim().is_empty() {
      return Err(Error::InvalidArgs("UPI ID is required".into()));
    }
    self.store.save_settings(settings).await
  }

  pub async fn reset(&self) -> Result<GlobalSettings> {
    let defaults = GlobalSettings::default();
    self.store.save_settings(&defaults).await?;
    info!("payment settings reset to defaults");
    Ok(defaults)
  }

  /// Compresses a QR code picture and stores it in the settings. When the
  /// write is rejected the previous settings stay in place.
  pub async fn upload_qr(&self, image: Vec<u8>) -> Result<GlobalSettings> {
    let qr = media::compress(image, media::MAX_WIDTH, media::QUALITY).await?;

    let mut settings = self.get().await?;
    settings.upi_qr_url = qr;
    self.store.save_settings(&settings).await?;
    Ok(settings)
  }

  pub fn watch(&self) -> SettingsWatch {
    self.store.watch_settings()
  }
}

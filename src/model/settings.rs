use serde::{Deserialize, Serialize};

pub const SETTINGS_KEY: &str = "acarder_settings";

pub const DEFAULT_UPI_ID: &str = "merchant@upi";
pub const DEFAULT_PAYMENT_NOTE: &str =
  "Scan and pay. Mention your username in remarks.";

/// Payment settings singleton. Missing fields decode to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalSettings {
  pub upi_id: String,
  /// `data:` URI or URL of the payment QR code, empty when unset.
  pub upi_qr_url: String,
  pub payment_note: String,
}

impl Default for GlobalSettings {
  fn default() -> Self {
    Self {
      upi_id: DEFAULT_UPI_ID.to_string(),
      upi_qr_url: String::new(),
      payment_note: DEFAULT_PAYMENT_NOTE.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partial_object_merges_over_defaults() {
    let settings: GlobalSettings =
      json::from_str(r#"{"upiId":"shop@okbank"}"#).unwrap();

    assert_eq!(settings.upi_id, "shop@okbank");
    assert_eq!(settings.upi_qr_url, "");
    assert_eq!(settings.payment_note, DEFAULT_PAYMENT_NOTE);
  }
}

//! Image downscaling for product pictures and payment QR codes.
//!
//! Images are stored inline as `data:` URIs, so they are shrunk hard before
//! they reach the store.

use base64::{Engine, prelude::BASE64_STANDARD};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType};

use crate::prelude::*;

pub const MAX_WIDTH: u32 = 200;
pub const QUALITY: u8 = 50;

/// Decodes `data`, scales it down to at most `max_width` pixels wide and
/// re-encodes it as a JPEG `data:` URI.
pub async fn compress(
  data: Vec<u8>,
  max_width: u32,
  quality: u8,
) -> Result<String> {
  tokio::task::spawn_blocking(move || encode(&data, max_width, quality))
    .await
    .map_err(|err| Error::Image(format!("encoder task failed: {err}")))?
}

fn encode(data: &[u8], max_width: u32, quality: u8) -> Result<String> {
  let img = image::load_from_memory(data)
    .map_err(|err| Error::Image(format!("invalid image: {err}")))?;

  let img = if img.width() > max_width {
    let height =
      (u64::from(img.height()) * u64::from(max_width) / u64::from(img.width()))
        .max(1) as u32;
    img.resize_exact(max_width, height, FilterType::Triangle)
  } else {
    img
  };

  let mut buffer = Vec::new();
  let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
  img
    .to_rgb8()
    .write_with_encoder(encoder)
    .map_err(|err| Error::Image(format!("failed to encode image: {err}")))?;

  debug!(
    width = img.width(),
    height = img.height(),
    input = data.len(),
    output = buffer.len(),
    "image compressed"
  );
  Ok(format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(&buffer)))
}

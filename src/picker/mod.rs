//! Image selection and upload encoding.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageOutputFormat;
use thiserror::Error;
use tracing::debug;

/// Fixed JPEG quality applied to every upload, whatever the source format.
pub const JPEG_QUALITY: u8 = 80;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to read image: {0}")]
    Read(#[from] image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(String),
}

/// Single-shot image selection. `None` means the user cancelled.
pub trait ImagePicker: Send + Sync {
    fn pick_image(&self) -> Option<PathBuf>;
}

/// Native file-dialog picker.
pub struct DialogPicker;

impl ImagePicker for DialogPicker {
    fn pick_image(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select an ingredient photo")
            .add_filter("Images", &["jpg", "jpeg", "png", "webp", "bmp"])
            .pick_file()
    }
}

/// Scripted picker for tests.
pub struct FakePicker {
    selection: Option<PathBuf>,
}

impl FakePicker {
    pub fn picking(path: impl Into<PathBuf>) -> Self {
        Self {
            selection: Some(path.into()),
        }
    }

    pub fn cancelling() -> Self {
        Self { selection: None }
    }
}

impl ImagePicker for FakePicker {
    fn pick_image(&self) -> Option<PathBuf> {
        self.selection.clone()
    }
}

/// Re-encodes the picked file as a quality-80 JPEG and wraps it in a
/// base64 data URL, the shape the analysis endpoint expects. Re-encoding
/// bounds the upload size for photos straight off a camera roll.
pub fn encode_image_data_url(path: &Path) -> Result<String, EncodeError> {
    let image = image::open(path)?;

    // JPEG carries no alpha channel; flatten to RGB before encoding.
    let mut jpeg = Vec::new();
    image
        .to_rgb8()
        .write_to(&mut Cursor::new(&mut jpeg), ImageOutputFormat::Jpeg(JPEG_QUALITY))
        .map_err(|e| EncodeError::Encode(e.to_string()))?;

    debug!(path = %path.display(), jpeg_bytes = jpeg.len(), "encoded upload");
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)))
}

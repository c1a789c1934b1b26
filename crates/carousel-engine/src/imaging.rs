use std::fs;
use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};

use crate::error::{GenerationError, Result};

/// Brand logo attached to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    image: DynamicImage,
}

impl Logo {
    pub fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Decodes PNG or JPEG bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_image(bytes).map(Self::from_image)
    }

    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| GenerationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }
}

pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| GenerationError::Encode(format!("png: {err}")))?;
    Ok(cursor.into_inner())
}

pub fn encode_png_base64(image: &DynamicImage) -> Result<String> {
    Ok(BASE64.encode(encode_png(image)?))
}

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|err| GenerationError::ImageDecode(err.to_string()))
}

pub fn decode_base64_image(data: &str) -> Result<DynamicImage> {
    let bytes = BASE64.decode(data.trim().as_bytes()).map_err(|err| {
        GenerationError::ImageDecode(format!("inline data is not valid base64: {err}"))
    })?;
    decode_image(&bytes)
}

/// Writes `image` as PNG, replacing any existing file.
pub fn write_png(image: &DynamicImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| GenerationError::Write {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use base64::Engine as _;

    use image::DynamicImage;

    use super::{decode_base64_image, encode_png, encode_png_base64, write_png, Logo, BASE64};
    use crate::error::GenerationError;
    use crate::testing::sample_image;

    #[test]
    fn logo_png_survives_base64_round_trip_byte_for_byte() -> anyhow::Result<()> {
        let logo = Logo::from_image(sample_image(12, 7, [207, 169, 53]));
        let png = logo.to_png_bytes()?;
        let encoded = encode_png_base64(logo.image())?;
        let decoded = BASE64.decode(encoded.as_bytes())?;
        assert_eq!(decoded, png);

        let reopened = Logo::from_bytes(&decoded)?;
        assert_eq!(reopened.dimensions(), (12, 7));
        assert_eq!(reopened.image().to_rgba8(), logo.image().to_rgba8());
        Ok(())
    }

    #[test]
    fn garbage_bytes_are_an_image_decode_error() {
        let err = Logo::from_bytes(b"definitely not an image").err();
        assert!(matches!(err, Some(GenerationError::ImageDecode(_))));

        let err = decode_base64_image("%%% not base64 %%%").err();
        assert!(matches!(err, Some(GenerationError::ImageDecode(message)) if message.contains("base64")));
    }

    #[test]
    fn empty_image_is_an_encode_error() {
        let err = encode_png(&DynamicImage::new_rgb8(0, 0)).err();
        assert!(matches!(err, Some(GenerationError::Encode(_))));
    }

    #[test]
    fn missing_logo_file_is_an_io_error() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let err = Logo::open(&temp.path().join("absent.png")).err();
        assert!(matches!(err, Some(GenerationError::Io { .. })));
        Ok(())
    }

    #[test]
    fn write_png_overwrites_existing_file() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("slide.png");
        fs::write(&path, b"stale")?;

        write_png(&sample_image(4, 4, [9, 138, 125]), &path)?;

        let written = fs::read(&path)?;
        assert!(written.starts_with(b"\x89PNG\r\n\x1a\n"));
        assert_eq!(image::load_from_memory(&written)?.width(), 4);
        Ok(())
    }
}

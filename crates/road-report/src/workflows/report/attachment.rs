use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::domain::ImageAttachment;

/// Largest accepted upload: 5 MiB.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Raw file handed over by the picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub mime_type: String,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("Please upload only JPG, PNG, or GIF images (got '{0}').")]
    UnsupportedType(String),
    #[error("File size exceeds 5MB limit. Please choose a smaller image.")]
    TooLarge { size_bytes: u64 },
}

fn accepted(mime_type: &str) -> bool {
    let Ok(parsed) = mime_type.trim().parse::<mime::Mime>() else {
        return false;
    };
    let subtype = parsed.subtype();
    parsed.type_() == mime::IMAGE
        && (subtype == mime::JPEG || subtype == mime::PNG || subtype == mime::GIF)
}

/// Checks the type and size of an upload and builds its preview data URL.
pub fn prepare_attachment(file: &ImageFile) -> Result<ImageAttachment, ImageError> {
    if !accepted(&file.mime_type) {
        return Err(ImageError::UnsupportedType(file.mime_type.clone()));
    }
    if file.size_bytes > MAX_IMAGE_BYTES {
        return Err(ImageError::TooLarge {
            size_bytes: file.size_bytes,
        });
    }

    let mime_type = file.mime_type.trim().to_ascii_lowercase();
    let preview_data = format!("data:{mime_type};base64,{}", STANDARD.encode(&file.bytes));

    Ok(ImageAttachment {
        mime_type,
        size_bytes: file.size_bytes,
        preview_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(mime_type: &str, size_bytes: u64) -> ImageFile {
        ImageFile {
            mime_type: mime_type.to_string(),
            size_bytes,
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[test]
    fn accepts_exactly_five_mebibytes() {
        let attachment =
            prepare_attachment(&sized("image/jpeg", MAX_IMAGE_BYTES)).expect("limit is inclusive");
        assert_eq!(attachment.size_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn rejects_one_byte_over_the_limit() {
        assert_eq!(
            prepare_attachment(&sized("image/png", MAX_IMAGE_BYTES + 1)),
            Err(ImageError::TooLarge {
                size_bytes: MAX_IMAGE_BYTES + 1
            })
        );
    }

    #[test]
    fn rejects_other_media_types() {
        for mime_type in ["image/webp", "application/pdf", "text/plain", "not a mime"] {
            assert!(matches!(
                prepare_attachment(&sized(mime_type, 10)),
                Err(ImageError::UnsupportedType(_))
            ));
        }
    }

    #[test]
    fn preview_is_a_data_url() {
        let attachment =
            prepare_attachment(&ImageFile::new("image/gif", b"GIF89a".to_vec())).expect("gif ok");
        assert_eq!(attachment.preview_data, "data:image/gif;base64,R0lGODlh");
        assert_eq!(attachment.size_bytes, 6);
    }
}

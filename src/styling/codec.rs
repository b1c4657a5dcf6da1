// Image codec - turns user files into transferable base64 payloads and back

use super::error::{Result, StylistError};
use super::types::ImageFile;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const PNG: &str = "image/png";
pub const JPEG: &str = "image/jpeg";
pub const WEBP: &str = "image/webp";

/// Base64 payload plus the media type describing it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncodedImage {
    pub media_type: String,
    pub data: String,
}

impl EncodedImage {
    pub fn new(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Self-describing reference: `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Split a data URL back into media type and payload
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (header, payload) = url
            .split_once(',')
            .ok_or_else(|| StylistError::Format("missing ',' separator".to_string()))?;

        let media_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.strip_suffix(";base64"))
            .ok_or_else(|| StylistError::Format(format!("unexpected header '{}'", header)))?;

        if media_type.is_empty() {
            return Err(StylistError::Format("empty media type".to_string()));
        }
        if payload.is_empty() {
            return Err(StylistError::Format("empty payload".to_string()));
        }

        Ok(Self::new(media_type, payload))
    }

    /// Raw image bytes, e.g. for writing to disk
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| StylistError::Decode(format!("invalid base64 payload: {}", e)))
    }

    /// File extension matching the media type
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            PNG => "png",
            JPEG => "jpg",
            WEBP => "webp",
            _ => "img",
        }
    }
}

/// Detect a media type from a file extension
pub fn media_type_from_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "png" => Some(PNG),
        "jpg" | "jpeg" => Some(JPEG),
        "webp" => Some(WEBP),
        _ => None,
    }
}

/// Detect a media type from the leading bytes of the file
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some(PNG)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(JPEG)
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(WEBP)
    } else {
        None
    }
}

/// Read and encode an uploaded file.
///
/// The content is forwarded as-is: no resizing or recompression.
pub async fn encode_file(file: &ImageFile) -> Result<EncodedImage> {
    match file {
        ImageFile::Path(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| StylistError::Decode(format!("{}: {}", path.display(), e)))?;
            let hint = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(media_type_from_extension);
            encode_bytes(&bytes, hint, path)
        }
        ImageFile::Bytes {
            name,
            media_type,
            data,
        } => {
            let hint = media_type.as_deref().or_else(|| {
                Path::new(name)
                    .extension()
                    .and_then(|e| e.to_str())
                    .and_then(media_type_from_extension)
            });
            encode_bytes(data, hint, Path::new(name))
        }
    }
}

fn encode_bytes(bytes: &[u8], hint: Option<&str>, source: &Path) -> Result<EncodedImage> {
    if bytes.is_empty() {
        return Err(StylistError::Decode(format!("{}: file is empty", source.display())));
    }

    // Content wins over names; a mislabeled extension is common
    let media_type = sniff_media_type(bytes)
        .or(hint)
        .ok_or_else(|| {
            StylistError::Decode(format!("{}: unsupported image type", source.display()))
        })?;

    Ok(EncodedImage::new(media_type, STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_data_url_parse() {
        let image = EncodedImage::from_data_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.data, "iVBORw0KGgo=");
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_malformed_data_urls_are_format_errors() {
        for url in [
            "",
            "not a url",
            "data:image/png;base64,",
            "data:;base64,AAAA",
            "image/png;base64,AAAA",
            "data:image/png,AAAA",
        ] {
            let err = EncodedImage::from_data_url(url).unwrap_err();
            assert!(matches!(err, StylistError::Format(_)), "{url:?} gave {err:?}");
        }
    }

    #[test]
    fn test_sniffing() {
        assert_eq!(sniff_media_type(&PNG_HEADER), Some(PNG));
        assert_eq!(sniff_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(JPEG));
        assert_eq!(sniff_media_type(b"RIFF\x10\x00\x00\x00WEBPVP8 "), Some(WEBP));
        assert_eq!(sniff_media_type(b"GIF89a"), None);
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(media_type_from_extension("JPG"), Some(JPEG));
        assert_eq!(media_type_from_extension("webp"), Some(WEBP));
        assert_eq!(media_type_from_extension("bmp"), None);
        assert_eq!(EncodedImage::new(JPEG, "").extension(), "jpg");
    }

    #[tokio::test]
    async fn test_encode_file_forwards_content_unchanged() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        let mut content = PNG_HEADER.to_vec();
        content.extend_from_slice(b"rest-of-image");
        file.write_all(&content).unwrap();

        let encoded = encode_file(&ImageFile::from_path(file.path())).await.unwrap();
        assert_eq!(encoded.media_type, PNG);
        assert_eq!(encoded.decode_bytes().unwrap(), content);
    }

    #[tokio::test]
    async fn test_content_beats_extension() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let encoded = encode_file(&ImageFile::from_bytes("mislabeled.png", bytes))
            .await
            .unwrap();
        assert_eq!(encoded.media_type, JPEG);
    }

    #[tokio::test]
    async fn test_unreadable_files_are_decode_errors() {
        let missing = ImageFile::from_path("/definitely/not/here.png");
        assert!(matches!(encode_file(&missing).await, Err(StylistError::Decode(_))));

        let empty = ImageFile::from_bytes("empty.png", Vec::new());
        assert!(matches!(encode_file(&empty).await, Err(StylistError::Decode(_))));

        let unknown = ImageFile::from_bytes("notes.txt", b"hello".to_vec());
        assert!(matches!(encode_file(&unknown).await, Err(StylistError::Decode(_))));
    }
}

use std::path::{Path, PathBuf};

use base64::Engine;
use sha2::{Digest, Sha256};

use crate::core::config::StorageSettings;

#[derive(Debug, thiserror::Error)]
pub(crate) enum AvatarError {
    #[error("avatar payload is not valid base64")]
    InvalidBase64,
    #[error("avatar exceeds the {limit_mb} MiB upload limit")]
    TooLarge { limit_mb: u64 },
    #[error("unsupported image extension '{0}'")]
    UnsupportedExtension(String),
    #[error("failed to store avatar: {0}")]
    Io(#[from] std::io::Error),
}

/// Decodes a base64 image and writes it under the media root, named by the
/// content hash so re-uploads of the same bytes dedupe. Returns the path
/// relative to the media root, which is what gets persisted on the profile.
pub(crate) async fn store_avatar(
    storage: &StorageSettings,
    data_b64: &str,
    extension: &str,
) -> Result<String, AvatarError> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    if !storage.allowed_image_extensions.iter().any(|allowed| *allowed == extension) {
        return Err(AvatarError::UnsupportedExtension(extension));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data_b64.trim())
        .map_err(|_| AvatarError::InvalidBase64)?;
    let limit = storage.max_upload_size_mb * 1024 * 1024;
    if bytes.len() as u64 > limit {
        return Err(AvatarError::TooLarge { limit_mb: storage.max_upload_size_mb });
    }

    let file_name = format!("{}.{extension}", hex::encode(Sha256::digest(&bytes)));
    let root = Path::new(&storage.media_root).join("avatars");
    tokio::fs::create_dir_all(&root).await?;
    let target: PathBuf = root.join(&file_name);
    tokio::fs::write(&target, &bytes).await?;

    Ok(format!("avatars/{file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(root: &Path) -> StorageSettings {
        StorageSettings {
            media_root: root.to_string_lossy().into_owned(),
            max_upload_size_mb: 1,
            allowed_image_extensions: vec!["png".into(), "jpg".into()],
        }
    }

    #[tokio::test]
    async fn stores_by_content_hash() {
        let dir = std::env::temp_dir().join(format!("avatars-test-{}", uuid::Uuid::new_v4()));
        let settings = storage(&dir);

        let encoded = base64::engine::general_purpose::STANDARD.encode(b"fake png bytes");
        let first = store_avatar(&settings, &encoded, "png").await.unwrap();
        let second = store_avatar(&settings, &encoded, ".PNG").await.unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("avatars/"));
        assert!(first.ends_with(".png"));

        let on_disk = Path::new(&settings.media_root).join(&first);
        assert_eq!(tokio::fs::read(on_disk).await.unwrap(), b"fake png bytes");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_bad_extension_and_bad_base64() {
        let dir = std::env::temp_dir().join(format!("avatars-test-{}", uuid::Uuid::new_v4()));
        let settings = storage(&dir);

        let err = store_avatar(&settings, "aGk=", "svg").await.unwrap_err();
        assert!(matches!(err, AvatarError::UnsupportedExtension(_)));

        let err = store_avatar(&settings, "%%%not base64%%%", "png").await.unwrap_err();
        assert!(matches!(err, AvatarError::InvalidBase64));
    }
}

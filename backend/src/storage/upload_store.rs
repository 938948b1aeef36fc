use log::{debug, info};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

#[derive(Debug, thiserror::Error)]
pub enum UploadStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid file format")]
    InvalidFormat,
    #[error("File too large")]
    FileTooLarge,
    #[error("Invalid file name")]
    InvalidFileName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub filename: String,
    pub extension: String,
    pub path: PathBuf,
}

impl UploadRecord {
    pub fn image_url(&self) -> String {
        format!("/uploads/{}", self.filename)
    }
}

/// Flat, append-only directory of uploaded images keyed by random names.
#[derive(Clone)]
pub struct UploadStore {
    upload_dir: PathBuf,
    max_size: usize,
}

impl UploadStore {
    pub fn new(upload_dir: PathBuf, max_size: usize) -> Result<Self, UploadStoreError> {
        std::fs::create_dir_all(&upload_dir)?;
        info!("Upload directory ready at {}", upload_dir.display());
        Ok(Self {
            upload_dir,
            max_size,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Lowercased extension of `file_name` if it is on the allow-list.
    pub fn extract_file_extension(file_name: &str) -> Result<String, UploadStoreError> {
        let (_, ext) = file_name
            .rsplit_once('.')
            .ok_or(UploadStoreError::InvalidFormat)?;
        let ext = ext.to_ascii_lowercase();
        if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(UploadStoreError::InvalidFormat)
        }
    }

    pub fn generate_file_name(extension: &str) -> String {
        format!("{}.{}", Uuid::new_v4().simple(), extension)
    }

    pub fn validate_image_size(&self, image_data: &[u8]) -> Result<(), UploadStoreError> {
        if image_data.len() > self.max_size {
            return Err(UploadStoreError::FileTooLarge);
        }
        Ok(())
    }

    pub async fn save(
        &self,
        original_name: &str,
        image_data: &[u8],
    ) -> Result<UploadRecord, UploadStoreError> {
        let extension = Self::extract_file_extension(original_name)?;
        self.validate_image_size(image_data)?;

        let filename = Self::generate_file_name(&extension);
        let path = self.upload_dir.join(&filename);
        tokio::fs::write(&path, image_data).await?;
        debug!(
            "Stored upload {} ({} bytes) as {}",
            original_name,
            image_data.len(),
            path.display()
        );

        Ok(UploadRecord {
            filename,
            extension,
            path,
        })
    }

    /// Resolves a previously generated file name to its path. Rejects anything
    /// that is not a bare file name.
    pub fn resolve(&self, filename: &str) -> Result<PathBuf, UploadStoreError> {
        let is_plain = !filename.is_empty()
            && !filename.starts_with('.')
            && !filename.contains(['/', '\\'])
            && Path::new(filename).file_name().and_then(|n| n.to_str()) == Some(filename);
        if !is_plain {
            return Err(UploadStoreError::InvalidFileName);
        }
        Ok(self.upload_dir.join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> UploadStore {
        UploadStore::new(dir.path().join("uploads"), 1024).unwrap()
    }

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert_eq!(UploadStore::extract_file_extension("curry.JPG").unwrap(), "jpg");
        assert_eq!(UploadStore::extract_file_extension("a.b.jpeg").unwrap(), "jpeg");
        assert_eq!(UploadStore::extract_file_extension("dunk.gif").unwrap(), "gif");
        assert!(UploadStore::extract_file_extension("clip.mp4").is_err());
        assert!(UploadStore::extract_file_extension("noextension").is_err());
    }

    #[test]
    fn generated_names_are_hex_with_extension() {
        let name = UploadStore::generate_file_name("png");
        let (stem, ext) = name.rsplit_once('.').unwrap();
        assert_eq!(ext, "png");
        assert_eq!(stem.len(), 32);
        assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(name, UploadStore::generate_file_name("png"));
    }

    #[actix_web::test]
    async fn save_writes_file_under_generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let record = store.save("Shot.PNG", b"fake-image").await.unwrap();
        assert_eq!(record.extension, "png");
        assert!(record.filename.ends_with(".png"));
        assert_eq!(record.image_url(), format!("/uploads/{}", record.filename));
        assert_eq!(std::fs::read(&record.path).unwrap(), b"fake-image");
        assert_eq!(store.resolve(&record.filename).unwrap(), record.path);
    }

    #[actix_web::test]
    async fn save_rejects_oversized_and_disallowed_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let big = vec![0u8; 2048];
        assert!(matches!(
            store.save("big.png", &big).await,
            Err(UploadStoreError::FileTooLarge)
        ));
        assert!(matches!(
            store.save("notes.txt", b"x").await,
            Err(UploadStoreError::InvalidFormat)
        ));
        assert_eq!(std::fs::read_dir(store.upload_dir()).unwrap().count(), 0);
    }

    #[test]
    fn resolve_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        assert!(store.resolve("../secret.png").is_err());
        assert!(store.resolve("nested/file.png").is_err());
        assert!(store.resolve("..").is_err());
        assert!(store.resolve("").is_err());
        assert!(store.resolve("abc123.png").is_ok());
    }
}

use crate::contract::model::ImageUpload;

/// Shown whenever a batch lost at least one file.
pub const SKIPPED_FILES_WARNING: &str =
    "Some files were skipped. Only JPG, PNG, and HEIC files under 10MB are allowed.";

/// Which uploads are accepted as photos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_bytes: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            allowed_types: ["image/jpeg", "image/jpg", "image/png", "image/heic"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    UnsupportedType(String),
    TooLarge { size: u64, max: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    pub reason: DropReason,
}

/// Outcome of filtering a batch: the survivors keep their original order.
#[derive(Debug, Clone, Default)]
pub struct ImageBatch {
    pub accepted: Vec<ImageUpload>,
    pub dropped: Vec<DroppedFile>,
}

impl ImageBatch {
    pub fn warning(&self) -> Option<String> {
        (!self.dropped.is_empty()).then(|| SKIPPED_FILES_WARNING.to_string())
    }
}

impl UploadPolicy {
    pub fn check(&self, upload: &ImageUpload) -> Result<(), DropReason> {
        if !self
            .allowed_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&upload.content_type))
        {
            return Err(DropReason::UnsupportedType(upload.content_type.clone()));
        }
        if upload.size() > self.max_bytes {
            return Err(DropReason::TooLarge {
                size: upload.size(),
                max: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Partial-failure filter: bad files are dropped, good ones proceed.
    pub fn filter(&self, uploads: Vec<ImageUpload>) -> ImageBatch {
        let mut batch = ImageBatch::default();
        for upload in uploads {
            match self.check(&upload) {
                Ok(()) => batch.accepted.push(upload),
                Err(reason) => batch.dropped.push(DroppedFile {
                    name: upload.name,
                    reason,
                }),
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: &str, size: usize) -> ImageUpload {
        ImageUpload::new(name, content_type, vec![0u8; size])
    }

    #[test]
    fn keeps_valid_files_in_order() {
        let policy = UploadPolicy::default();
        let batch = policy.filter(vec![
            upload("a.jpg", "image/jpeg", 10),
            upload("b.png", "image/png", 10),
            upload("c.heic", "image/heic", 10),
            upload("d.jpg", "image/jpg", 10),
        ]);

        let names: Vec<_> = batch.accepted.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.heic", "d.jpg"]);
        assert!(batch.dropped.is_empty());
        assert_eq!(batch.warning(), None);
    }

    #[test]
    fn drops_wrong_type_and_oversized() {
        let policy = UploadPolicy {
            max_bytes: 100,
            ..Default::default()
        };
        let batch = policy.filter(vec![
            upload("ok.png", "image/png", 100),
            upload("big.png", "image/png", 101),
            upload("doc.pdf", "application/pdf", 1),
        ]);

        assert_eq!(batch.accepted.len(), 1);
        assert_eq!(
            batch.dropped,
            vec![
                DroppedFile {
                    name: "big.png".into(),
                    reason: DropReason::TooLarge { size: 101, max: 100 },
                },
                DroppedFile {
                    name: "doc.pdf".into(),
                    reason: DropReason::UnsupportedType("application/pdf".into()),
                },
            ]
        );
        assert_eq!(batch.warning().as_deref(), Some(SKIPPED_FILES_WARNING));
    }

    #[test]
    fn default_limit_is_ten_mebibytes() {
        let policy = UploadPolicy::default();
        assert!(policy
            .check(&upload("edge.jpg", "image/jpeg", 10 * 1024 * 1024))
            .is_ok());
        assert!(policy
            .check(&upload("over.jpg", "image/jpeg", 10 * 1024 * 1024 + 1))
            .is_err());
    }
}

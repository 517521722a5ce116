use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::ImageFormat;

use crate::intake::Visit;
use crate::visits::{patient_label, VisitImagePair};

/// Attaches the two images of a freshly created visit.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    label: String,
    images: VisitImagePair,
}

impl CaptureSession {
    pub fn new(visit: &Visit) -> Self {
        Self {
            label: patient_label(visit.number),
            images: VisitImagePair::for_number(&visit.folder, visit.number),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn slot_path(&self, slot: u8) -> Option<&Path> {
        match slot {
            1 => Some(&self.images.first),
            2 => Some(&self.images.second),
            _ => None,
        }
    }

    /// Decodes `source` and stores it as the PNG for `slot`.
    pub fn import_image(&self, slot: u8, source: &Path) -> Result<PathBuf> {
        let Some(destination) = self.slot_path(slot) else {
            bail!("Image slot {slot} does not exist (expected 1 or 2)");
        };

        let decoded =
            image::open(source).with_context(|| format!("Could not decode {}", source.display()))?;
        decoded
            .save_with_format(destination, ImageFormat::Png)
            .with_context(|| format!("Could not write {}", destination.display()))?;

        log::info!("Stored {} as {}", source.display(), destination.display());
        Ok(destination.to_path_buf())
    }

    pub fn is_complete(&self) -> bool {
        self.images.first_missing().is_none()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;
    use crate::db::PatientRecord;

    fn visit_in(root: &Path, number: u32) -> Visit {
        let folder = root.join(format!("2024-01-01_Pasien-{number}"));
        fs::create_dir_all(&folder).unwrap();
        Visit {
            record: PatientRecord {
                id: 1,
                name: "Budi".to_string(),
                examination_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            },
            number,
            folder,
        }
    }

    fn write_sample(path: &Path, format: ImageFormat) {
        RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]))
            .save_with_format(path, format)
            .unwrap();
    }

    #[test]
    fn slot_paths_follow_visit_number() {
        let root = tempfile::tempdir().unwrap();
        let visit = visit_in(root.path(), 5);
        let session = CaptureSession::new(&visit);

        assert_eq!(session.label(), "Pasien-5");
        assert_eq!(session.slot_path(1), Some(visit.folder.join("5.1.png").as_path()));
        assert_eq!(session.slot_path(2), Some(visit.folder.join("5.2.png").as_path()));
        assert_eq!(session.slot_path(3), None);
    }

    #[test]
    fn importing_both_slots_completes_the_visit() {
        let root = tempfile::tempdir().unwrap();
        let visit = visit_in(root.path(), 2);
        let session = CaptureSession::new(&visit);
        let png_source = root.path().join("left.png");
        let jpeg_source = root.path().join("right.jpg");
        write_sample(&png_source, ImageFormat::Png);
        RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]))
            .save_with_format(&jpeg_source, ImageFormat::Jpeg)
            .unwrap();

        session.import_image(1, &png_source).unwrap();
        assert!(!session.is_complete());
        let stored = session.import_image(2, &jpeg_source).unwrap();

        assert!(session.is_complete());
        assert_eq!(stored, visit.folder.join("2.2.png"));
        let reopened = image::open(&stored).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (3, 2));
    }

    #[test]
    fn import_rejects_unknown_slot_and_undecodable_source() {
        let root = tempfile::tempdir().unwrap();
        let session = CaptureSession::new(&visit_in(root.path(), 2));
        let source = root.path().join("sample.png");
        write_sample(&source, ImageFormat::Png);

        assert!(session.import_image(0, &source).is_err());

        let garbage = root.path().join("garbage.png");
        fs::write(&garbage, b"not an image").unwrap();
        assert!(session.import_image(1, &garbage).is_err());
        assert!(!session.is_complete());
    }
}

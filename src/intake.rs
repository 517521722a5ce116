use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::db::{DbError, PatientRecord, PatientStore};
use crate::navigation::{Navigator, Page};
use crate::visits::{parse_exam_date, visit_folder_name};

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Patient name must not be empty.")]
    EmptyName,

    #[error("Invalid date {0:?}: must be in YYYY-MM-DD format.")]
    InvalidDate(String),

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("Could not create visit folder {}: {source}", .path.display())]
    Folder { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub record: PatientRecord,
    pub number: u32,
    pub folder: PathBuf,
}

pub struct IntakeForm {
    store: PatientStore,
    data_root: PathBuf,
    pub name: String,
    pub date: String,
}

impl IntakeForm {
    pub fn new(store: PatientStore, data_root: PathBuf) -> Self {
        Self {
            store,
            data_root,
            name: String::new(),
            date: String::new(),
        }
    }

    pub fn set_data_root(&mut self, data_root: PathBuf) {
        self.data_root = data_root;
    }

    /// Stores the patient, creates the visit folder and moves on to capture.
    ///
    /// The insert and the folder creation are independent: a folder failure
    /// leaves the inserted row in place.
    pub fn save_and_navigate(
        &mut self,
        navigator: &mut dyn Navigator,
    ) -> Result<Visit, IntakeError> {
        if self.name.trim().is_empty() {
            return Err(IntakeError::EmptyName);
        }
        let date =
            parse_exam_date(&self.date).map_err(|_| IntakeError::InvalidDate(self.date.clone()))?;

        let record = self.store.insert_patient(&self.name, date)?;
        let number = self.store.patient_count()? + 1;

        let folder = self.data_root.join(visit_folder_name(date, number));
        fs::create_dir_all(&folder).map_err(|source| IntakeError::Folder {
            path: folder.clone(),
            source,
        })?;
        log::info!("Folder created: {}", folder.display());

        self.name.clear();
        self.date.clear();
        navigator.show_frame(Page::LiveCamera);

        Ok(Visit {
            record,
            number,
            folder,
        })
    }
}

use std::path::PathBuf;

use anyhow::Result;

use crate::navigation::{Navigator, Page};
use crate::visits::{scan_visit_folders, VisitImagePair};

pub const COLUMN_TITLES: [&str; 4] = ["No.", "Patient", "Examination Date", "Result"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub number: usize,
    pub patient_label: String,
    pub examination_date: String,
    pub result: String,
}

pub struct HistoryBrowser {
    data_root: PathBuf,
    rows: Vec<HistoryRow>,
    selected: Option<usize>,
}

impl HistoryBrowser {
    pub fn new(data_root: PathBuf) -> Self {
        Self {
            data_root,
            rows: Vec::new(),
            selected: None,
        }
    }

    pub fn set_data_root(&mut self, data_root: PathBuf) {
        self.data_root = data_root;
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        self.selected = (index < self.rows.len()).then_some(index);
    }

    /// Rebuilds the table from disk. On error the table is left empty.
    pub fn display_folders(&mut self) -> Result<()> {
        self.rows.clear();
        self.selected = None;

        let visits = scan_visit_folders(&self.data_root)?;
        self.rows = visits
            .into_iter()
            .enumerate()
            .map(|(index, visit)| HistoryRow {
                number: index + 1,
                examination_date: visit.date_text,
                patient_label: visit.label,
                result: String::new(),
            })
            .collect();
        Ok(())
    }

    /// Opens the selected visit in the result viewer. Returns whether it navigated.
    pub fn on_double_click(&self, navigator: &mut dyn Navigator) -> Result<bool> {
        let Some(row) = self.selected.and_then(|index| self.rows.get(index)) else {
            return Ok(false);
        };

        let pair =
            VisitImagePair::locate(&self.data_root, &row.examination_date, &row.patient_label)?;
        log::info!("Image 1 path: {}", pair.first.display());
        log::info!("Image 2 path: {}", pair.second.display());

        if let Some(missing) = pair.first_missing() {
            log::error!("Error: image {} not found.", missing.display());
            return Ok(false);
        }

        navigator.load_images(&pair.first, &pair.second, &row.patient_label);
        navigator.show_frame(Page::DiagnosisResult);
        Ok(true)
    }
}

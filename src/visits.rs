use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const PATIENT_LABEL_PREFIX: &str = "Pasien";

/// Strict `YYYY-MM-DD`; surrounding whitespace is rejected, not trimmed.
pub fn parse_exam_date(value: &str) -> Result<NaiveDate> {
    if value.trim() != value {
        bail!("Invalid date {value:?}, surrounding whitespace is not allowed");
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("Invalid date {value:?}, expected YYYY-MM-DD"))
}

pub fn patient_label(number: u32) -> String {
    format!("{PATIENT_LABEL_PREFIX}-{number}")
}

pub fn visit_folder_name(date: NaiveDate, number: u32) -> String {
    format!("{}_{}", date.format(DATE_FORMAT), patient_label(number))
}

pub fn parse_patient_number(label: &str) -> Result<u32> {
    let Some(token) = label.split('-').nth(1) else {
        bail!("Patient label {label:?} has no '-' separated number");
    };
    token
        .parse::<u32>()
        .with_context(|| format!("Patient label {label:?} has a non-numeric id"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitFolder {
    /// Ordering key only; paths are rebuilt from `date_text`.
    pub date: NaiveDate,
    /// Date part exactly as it appears in the folder name.
    pub date_text: String,
    pub label: String,
    pub number: u32,
}

impl VisitFolder {
    /// Parses `<YYYY-MM-DD>_<label>`; parts after the second `_` are ignored.
    pub fn parse(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|value| value.to_str())
            .with_context(|| format!("Folder {} has no UTF-8 name", path.display()))?;

        let mut parts = name.split('_');
        let (Some(date_part), Some(label)) = (parts.next(), parts.next()) else {
            bail!("Folder {name:?} does not match <date>_<patient label>");
        };

        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
            .with_context(|| format!("Folder {name:?} has an invalid date"))?;
        let number = parse_patient_number(label)?;

        Ok(Self {
            date,
            date_text: date_part.to_string(),
            label: label.to_string(),
            number,
        })
    }
}

/// Lists visit folders newest first. One malformed folder fails the whole scan.
pub fn scan_visit_folders(root: &Path) -> Result<Vec<VisitFolder>> {
    if !root.exists() {
        log::warn!("Patient data folder not found: {}", root.display());
        return Ok(Vec::new());
    }

    let entries =
        fs::read_dir(root).with_context(|| format!("Could not read {}", root.display()))?;

    let mut visits = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Could not read {}", root.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        visits.push(VisitFolder::parse(&path)?);
    }

    visits.sort_by(|a, b| (b.date, b.number).cmp(&(a.date, a.number)));
    Ok(visits)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitImagePair {
    pub first: PathBuf,
    pub second: PathBuf,
}

impl VisitImagePair {
    pub fn for_number(folder: &Path, number: u32) -> Self {
        Self {
            first: folder.join(format!("{number}.1.png")),
            second: folder.join(format!("{number}.2.png")),
        }
    }

    /// Rebuilds the pair from the values shown in a history row.
    pub fn locate(root: &Path, date_text: &str, label: &str) -> Result<Self> {
        let number = parse_patient_number(label)?;
        let folder = root.join(format!("{date_text}_{label}"));
        Ok(Self::for_number(&folder, number))
    }

    pub fn first_missing(&self) -> Option<&Path> {
        [self.first.as_path(), self.second.as_path()]
            .into_iter()
            .find(|path| !path.exists())
    }
}

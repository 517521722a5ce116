use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use eframe::egui::{self, RichText, TextureHandle, TextureOptions};

use crate::capture::CaptureSession;
use crate::db::PatientStore;
use crate::history::{HistoryBrowser, COLUMN_TITLES};
use crate::intake::IntakeForm;
use crate::navigation::{Navigator, Page, ResultRequest, Router};
use crate::renderer::{fit_size, load_color_image};
use crate::settings::{save_settings, ResolvedPaths, Settings};

const APP_TITLE: &str = "TransAID";
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const HEADER_FILL: egui::Color32 = egui::Color32::from_rgb(0xA8, 0xDF, 0xE6);
const HEADER_TEXT: egui::Color32 = egui::Color32::from_rgb(0x15, 0x21, 0x8E);
const FORM_WIDTH: f32 = 520.0;

struct ResultView {
    label: String,
    first: TextureHandle,
    second: TextureHandle,
}

pub struct TransAidApp {
    router: Router,
    shown_page: Option<Page>,
    paths: ResolvedPaths,
    settings: Settings,
    settings_path: Option<PathBuf>,
    intake: Option<IntakeForm>,
    history: HistoryBrowser,
    capture: Option<CaptureSession>,
    result: Option<ResultView>,
    status_line: String,
}

impl TransAidApp {
    pub fn new(
        paths: ResolvedPaths,
        settings: Settings,
        settings_path: Option<PathBuf>,
        start_page: Page,
        initial_status: Option<String>,
    ) -> Self {
        let mut status_line = initial_status.unwrap_or_default();

        if let Err(err) = fs::create_dir_all(&paths.data_root) {
            log::error!(
                "Could not create patient data folder {}: {err}",
                paths.data_root.display()
            );
        }

        let intake = match PatientStore::open(&paths.database) {
            Ok(store) => Some(IntakeForm::new(store, paths.data_root.clone())),
            Err(err) => {
                status_line = format!("Could not open {}: {err}", paths.database.display());
                log::error!("{status_line}");
                None
            }
        };

        Self {
            router: Router::new(start_page),
            shown_page: None,
            history: HistoryBrowser::new(paths.data_root.clone()),
            paths,
            settings,
            settings_path,
            intake,
            capture: None,
            result: None,
            status_line,
        }
    }

    fn apply_clinic_style(ctx: &egui::Context) {
        let mut visuals = egui::Visuals::light();
        visuals.panel_fill = egui::Color32::WHITE;
        visuals.selection.bg_fill = HEADER_TEXT;
        visuals.selection.stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
        ctx.set_visuals(visuals);
    }

    fn report(&mut self, message: String) {
        log::error!("{message}");
        self.status_line = message;
    }

    fn enter_page(&mut self, page: Page, ctx: &egui::Context) {
        match page {
            Page::DiagnosisHistory => self.refresh_history(),
            Page::DiagnosisResult => {
                if let Some(request) = self.router.take_result_request() {
                    self.load_result(request, ctx);
                }
            }
            Page::Home | Page::PatientData | Page::LiveCamera => {}
        }
    }

    fn refresh_history(&mut self) {
        match self.history.display_folders() {
            Ok(()) => log::debug!("Listed {} visits", self.history.rows().len()),
            Err(err) => self.report(format!("Could not list visits: {err:#}")),
        }
    }

    fn load_result(&mut self, request: ResultRequest, ctx: &egui::Context) {
        let load = |path: &Path, name: &str| -> Result<TextureHandle> {
            let image = load_color_image(path)?;
            Ok(ctx.load_texture(name, image, TextureOptions::LINEAR))
        };

        match (
            load(&request.first, "result-image-1"),
            load(&request.second, "result-image-2"),
        ) {
            (Ok(first), Ok(second)) => {
                self.result = Some(ResultView {
                    label: request.label,
                    first,
                    second,
                });
                self.status_line.clear();
            }
            (Err(err), _) | (_, Err(err)) => {
                self.result = None;
                self.report(format!("Error opening images for {}: {err:#}", request.label));
            }
        }
    }

    fn change_data_root(&mut self) {
        let Some(folder) = rfd::FileDialog::new()
            .set_directory(&self.paths.data_root)
            .pick_folder()
        else {
            return;
        };

        log::info!("Patient data folder set to {}", folder.display());
        self.paths.data_root = folder.clone();
        if let Some(intake) = self.intake.as_mut() {
            intake.set_data_root(folder.clone());
        }
        self.history.set_data_root(folder.clone());
        self.settings.data_root = Some(folder);

        if let Some(path) = self.settings_path.as_deref() {
            if let Err(err) = save_settings(path, &self.settings) {
                self.report(format!("{err:#}"));
            }
        }
        if self.router.current() == Page::DiagnosisHistory {
            self.refresh_history();
        }
    }

    fn submit_intake(&mut self) {
        let Some(intake) = self.intake.as_mut() else {
            self.report("Patient database is not available.".to_string());
            return;
        };

        match intake.save_and_navigate(&mut self.router) {
            Ok(visit) => {
                self.status_line = format!(
                    "Saved {} (record #{}, {}) to {}",
                    visit.record.name.trim(),
                    visit.record.id,
                    visit.record.examination_date,
                    visit.folder.display()
                );
                self.capture = Some(CaptureSession::new(&visit));
            }
            Err(err) => self.report(err.to_string()),
        }
    }

    fn import_capture(&mut self, slot: u8) {
        let Some(session) = self.capture.as_ref() else {
            return;
        };
        let Some(source) = rfd::FileDialog::new()
            .add_filter("Image", &["png", "jpg", "jpeg"])
            .pick_file()
        else {
            return;
        };

        match session.import_image(slot, &source) {
            Ok(stored) => self.status_line = format!("Stored {}", stored.display()),
            Err(err) => self.report(format!("{err:#}")),
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        let mut change_root_clicked = false;
        let mut go_to = None;
        let page = self.router.current();

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(HEADER_FILL).inner_margin(egui::Margin::same(10.0)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.menu_button("Menu", |ui| {
                        if ui.button("Home").clicked() {
                            go_to = Some(Page::Home);
                            ui.close_menu();
                        }
                        if ui.button("Change data folder…").clicked() {
                            change_root_clicked = true;
                            ui.close_menu();
                        }
                        ui.separator();
                        ui.label(format!("Data: {}", self.paths.data_root.display()));
                        ui.label(format!("Database: {}", self.paths.database.display()));
                    });
                    ui.label(
                        RichText::new(page.title())
                            .size(24.0)
                            .strong()
                            .color(HEADER_TEXT),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format!("{APP_TITLE} v{APP_VERSION}")).color(HEADER_TEXT),
                        );
                    });
                });
            });

        if let Some(page) = go_to {
            self.router.show_frame(page);
        }
        if change_root_clicked {
            self.change_data_root();
        }
    }

    fn show_home(&mut self, ui: &mut egui::Ui) {
        let mut go_to = None;
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(RichText::new(APP_TITLE).size(40.0).strong().color(HEADER_TEXT));
            ui.add_space(40.0);
            let button_size = egui::vec2(320.0, 56.0);
            let big_button = |text: &str| egui::Button::new(RichText::new(text).size(20.0));
            if ui
                .add_sized(button_size, big_button("New Examination"))
                .clicked()
            {
                go_to = Some(Page::PatientData);
            }
            ui.add_space(12.0);
            if ui
                .add_sized(button_size, big_button("Examination History"))
                .clicked()
            {
                go_to = Some(Page::DiagnosisHistory);
            }
        });
        if let Some(page) = go_to {
            self.router.show_frame(page);
        }
    }

    fn show_patient_data(&mut self, ui: &mut egui::Ui) {
        let Some(intake) = self.intake.as_mut() else {
            ui.centered_and_justified(|ui| {
                ui.label("Patient database is not available.");
            });
            return;
        };

        let mut submit = false;
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.set_max_width(FORM_WIDTH);
            ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                ui.label(RichText::new("Patient Name").size(20.0).strong());
                ui.add(egui::TextEdit::singleline(&mut intake.name).desired_width(FORM_WIDTH));
                ui.add_space(16.0);
                ui.label(RichText::new("Examination Date").size(20.0).strong());
                let date_response = ui.add(
                    egui::TextEdit::singleline(&mut intake.date)
                        .hint_text("YYYY-MM-DD")
                        .desired_width(FORM_WIDTH),
                );
                let enter_pressed = ui.input(|input| input.key_pressed(egui::Key::Enter));
                if date_response.lost_focus() && enter_pressed {
                    submit = true;
                }
            });
            ui.add_space(32.0);
            if ui
                .add_sized([200.0, 44.0], egui::Button::new(RichText::new("Next").size(18.0)))
                .clicked()
            {
                submit = true;
            }
        });

        if submit {
            self.submit_intake();
        }
    }

    fn show_capture(&mut self, ui: &mut egui::Ui) {
        let Some(session) = self.capture.as_ref() else {
            ui.centered_and_justified(|ui| {
                ui.label("Register a patient to attach examination images.");
            });
            return;
        };

        let mut import_slot = None;
        let mut done = false;
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(session.label());
            ui.add_space(16.0);
            for slot in [1u8, 2] {
                let Some(path) = session.slot_path(slot) else {
                    continue;
                };
                ui.horizontal(|ui| {
                    let state = if path.exists() { "stored" } else { "missing" };
                    ui.label(format!("Image {slot}: {} ({state})", path.display()));
                    if ui.button(format!("Choose image {slot}…")).clicked() {
                        import_slot = Some(slot);
                    }
                });
            }
            ui.add_space(24.0);
            let finish_label = if session.is_complete() {
                "Finish"
            } else {
                "Finish without all images"
            };
            if ui.button(finish_label).clicked() {
                done = true;
            }
        });

        if let Some(slot) = import_slot {
            self.import_capture(slot);
        }
        if done {
            self.capture = None;
            self.router.show_frame(Page::Home);
        }
    }

    fn show_history(&mut self, ui: &mut egui::Ui) {
        let mut refresh = false;
        let mut back = false;
        ui.horizontal(|ui| {
            if ui.button("Refresh").clicked() {
                refresh = true;
            }
            if ui.button("Back").clicked() {
                back = true;
            }
        });
        ui.add_space(8.0);

        let mut clicked_row = None;
        let mut open_row = None;
        if self.history.rows().is_empty() {
            ui.label("No examinations found.");
        } else {
            let selected = self.history.selected();
            egui::ScrollArea::vertical()
                .id_salt("history-table")
                .show(ui, |ui| {
                    egui::Grid::new("history-grid")
                        .num_columns(COLUMN_TITLES.len())
                        .striped(true)
                        .min_col_width(80.0)
                        .spacing([24.0, 10.0])
                        .show(ui, |ui| {
                            for title in COLUMN_TITLES {
                                ui.label(RichText::new(title).strong().color(HEADER_TEXT));
                            }
                            ui.end_row();

                            for (index, row) in self.history.rows().iter().enumerate() {
                                let is_selected = selected == Some(index);
                                let cells = [
                                    row.number.to_string(),
                                    row.patient_label.clone(),
                                    row.examination_date.clone(),
                                    row.result.clone(),
                                ];
                                for cell in cells {
                                    let response = ui.selectable_label(is_selected, cell);
                                    if response.double_clicked() {
                                        open_row = Some(index);
                                    } else if response.clicked() {
                                        clicked_row = Some(index);
                                    }
                                }
                                ui.end_row();
                            }
                        });
                });
        }

        if let Some(index) = clicked_row.or(open_row) {
            self.history.select(index);
        }
        if open_row.is_some() {
            match self.history.on_double_click(&mut self.router) {
                Ok(true) => {}
                Ok(false) => {
                    self.status_line = "Examination images not found for this visit.".to_string();
                }
                Err(err) => self.report(format!("{err:#}")),
            }
        }
        if refresh {
            self.refresh_history();
        }
        if back {
            self.router.show_frame(Page::Home);
        }
    }

    fn show_result(&mut self, ui: &mut egui::Ui) {
        let mut back = false;
        ui.horizontal(|ui| {
            if ui.button("Back to history").clicked() {
                back = true;
            }
            if let Some(result) = self.result.as_ref() {
                ui.heading(&result.label);
            }
        });
        ui.add_space(8.0);

        if let Some(result) = self.result.as_ref() {
            let spacing = ui.spacing().item_spacing.x;
            let cell = egui::vec2(
                ((ui.available_width() - spacing) / 2.0).max(1.0),
                ui.available_height().max(1.0),
            );
            ui.horizontal(|ui| {
                for texture in [&result.first, &result.second] {
                    let size = fit_size(texture.size_vec2(), cell);
                    ui.add(egui::Image::new((texture.id(), size)));
                }
            });
        } else {
            ui.label("No images loaded.");
        }

        if back {
            self.router.show_frame(Page::DiagnosisHistory);
        }
    }
}

impl eframe::App for TransAidApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        Self::apply_clinic_style(ctx);

        let page = self.router.current();
        if self.shown_page != Some(page) {
            self.shown_page = Some(page);
            self.enter_page(page, ctx);
        }

        self.show_header(ctx);

        egui::TopBottomPanel::bottom("status")
            .show_separator_line(true)
            .show(ctx, |ui| {
                if self.status_line.is_empty() {
                    ui.weak("Ready");
                } else {
                    ui.label(&self.status_line);
                }
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.router.current() {
            Page::Home => self.show_home(ui),
            Page::PatientData => self.show_patient_data(ui),
            Page::LiveCamera => self.show_capture(ui),
            Page::DiagnosisHistory => self.show_history(ui),
            Page::DiagnosisResult => self.show_result(ui),
        });

        if self.router.current() != page {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_in(root: &Path, start_page: Page) -> TransAidApp {
        TransAidApp::new(
            ResolvedPaths {
                data_root: root.join("Data_Pasien"),
                database: root.join("pasien.db"),
            },
            Settings::default(),
            None,
            start_page,
            None,
        )
    }

    #[test]
    fn startup_creates_data_root_and_opens_database() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(dir.path(), Page::Home);

        assert!(dir.path().join("Data_Pasien").is_dir());
        assert!(dir.path().join("pasien.db").is_file());
        assert!(app.intake.is_some());
        assert!(app.status_line.is_empty());
    }

    #[test]
    fn unusable_database_leaves_intake_disabled() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("pasien.db")).unwrap();

        let app = app_in(dir.path(), Page::Home);

        assert!(app.intake.is_none());
        assert!(app.status_line.contains("Could not open"));
    }

    #[test]
    fn submit_moves_to_capture_with_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Page::PatientData);
        if let Some(intake) = app.intake.as_mut() {
            intake.name = "Budi".to_string();
            intake.date = "2024-06-01".to_string();
        }

        app.submit_intake();

        assert_eq!(app.router.current(), Page::LiveCamera);
        let session = app.capture.as_ref().expect("capture session should start");
        assert_eq!(session.label(), "Pasien-2");
        assert!(dir.path().join("Data_Pasien").join("2024-06-01_Pasien-2").is_dir());
    }

    #[test]
    fn rejected_submit_reports_and_stays() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Page::PatientData);
        if let Some(intake) = app.intake.as_mut() {
            intake.name = "Budi".to_string();
            intake.date = "01/06/2024".to_string();
        }

        app.submit_intake();

        assert_eq!(app.router.current(), Page::PatientData);
        assert!(app.capture.is_none());
        assert!(app.status_line.contains("YYYY-MM-DD"));
    }

    #[test]
    fn entering_history_lists_visits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Page::DiagnosisHistory);
        fs::create_dir(dir.path().join("Data_Pasien").join("2024-01-01_Pasien-1")).unwrap();

        app.enter_page(Page::DiagnosisHistory, &egui::Context::default());

        assert_eq!(app.history.rows().len(), 1);
    }

    #[test]
    fn malformed_folder_is_reported_on_status_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path(), Page::DiagnosisHistory);
        fs::create_dir(dir.path().join("Data_Pasien").join("backup")).unwrap();

        app.enter_page(Page::DiagnosisHistory, &egui::Context::default());

        assert!(app.history.rows().is_empty());
        assert!(app.status_line.contains("Could not list visits"));
    }
}

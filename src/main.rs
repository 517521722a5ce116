mod app;
mod capture;
mod db;
mod history;
mod intake;
mod launch;
mod navigation;
mod renderer;
mod settings;
mod visits;

use std::env;
use std::path::PathBuf;

use navigation::Page;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli_args = env::args().skip(1).collect::<Vec<_>>();
    let (launch_options, initial_status) = match launch::parse_launch_options(&cli_args) {
        Ok(options) => (options, None),
        Err(err) => {
            log::warn!("Launch args error: {err}");
            (Default::default(), Some(format!("Launch args error: {err}")))
        }
    };

    let settings_path = settings::settings_file_path();
    let stored_settings = settings_path
        .as_deref()
        .and_then(settings::load_settings)
        .unwrap_or_default();
    let base_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let paths = stored_settings.resolve(&launch_options, &base_dir);
    log::info!(
        "Patient data in {}, database {}",
        paths.data_root.display(),
        paths.database.display()
    );
    let start_page = launch_options.start_page.unwrap_or(Page::Home);

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "TransAID",
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(app::TransAidApp::new(
                paths,
                stored_settings,
                settings_path,
                start_page,
                initial_status,
            )))
        }),
    )
}

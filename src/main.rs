use eframe::egui;
use filter_builder::app::FilterBuilderApp;
use filter_builder::config::Config;
use filter_builder::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = Config::load(Config::default_path()).unwrap_or_else(|e| {
        log::error!("Ignoring config: {e:#}");
        Config::default()
    });

    let mut state = AppState::new(&config);
    if let Some(path) = &config.catalog {
        state.open_catalog(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Filter Builder",
        options,
        Box::new(|_cc| Ok(Box::new(FilterBuilderApp::new(state)))),
    )
}

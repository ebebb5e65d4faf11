use eframe::egui;
use tracing::info;
use tracing_subscriber::{
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use vocabook::{
    gui::{
        settings::data::SETTINGS_FILE,
        SettingsData,
        VocabApp,
    },
    persistence::load_json_or_default,
};

fn main() -> eframe::Result {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut settings = load_json_or_default::<SettingsData>(SETTINGS_FILE);
    settings.apply_env_overrides();

    if settings.backend_config().is_configured() {
        info!("Using backend at {}", settings.backend_config().url);
    } else {
        info!("No backend configured yet, open Settings to add one");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Vocabook")
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Vocabook",
        options,
        Box::new(|cc| Ok(Box::new(VocabApp::new(cc, settings)?))),
    )
}

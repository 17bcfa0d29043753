mod app;
mod viewport;

use floorplan::PerformanceTier;
use floorplan_viewer_lib::host::native_device_profile;
use floorplan_viewer_lib::settings::ViewerSettings;

use app::FloorPlanApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floorplan_viewer=info,floorplan=info".into()),
        )
        .init();

    let mut settings = ViewerSettings::load();
    let args = parse_args();
    if let Some(path) = &args.config {
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| floorplan::FloorPlanConfig::from_json(&json));
        match loaded {
            Ok(config) => {
                tracing::info!("Loaded floor plan config from {path}");
                settings.floor_plan = config;
            }
            Err(e) => tracing::error!("Failed to load config from {path}: {e}"),
        }
    }

    // CLI flag, then saved preference, then device detection
    let low_performance_mode = args
        .low_performance_mode
        .or(settings.low_performance_mode)
        .unwrap_or_else(|| PerformanceTier::detect(&native_device_profile()).is_low());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Floor Plan Viewer")
            .with_inner_size(settings.window_size)
            .with_min_inner_size([480.0, 320.0]),
        multisampling: if low_performance_mode { 0 } else { 4 },
        depth_buffer: 24,
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "floorplan-viewer",
        native_options,
        Box::new(move |cc| Ok(Box::new(FloorPlanApp::new(cc, settings, low_performance_mode)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

#[derive(Debug, Default)]
struct Args {
    low_performance_mode: Option<bool>,
    config: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--low-performance" => args.low_performance_mode = Some(true),
            "--high-performance" => args.low_performance_mode = Some(false),
            "--config" => args.config = it.next(),
            other => tracing::warn!("Ignoring unknown argument {other}"),
        }
    }
    args
}

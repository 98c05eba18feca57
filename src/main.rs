use anyhow::Result;
use eframe::egui;
use log::{error, info};

use keybridge::app::KeyboardApp;
use keybridge::config::BridgeConfig;
use keybridge::ui::keyboard;

fn main() -> Result<()> {
    env_logger::init();
    info!("[MAIN] Starting keybridge");

    let config = BridgeConfig::default();
    let size = keyboard::keyboard_size() + egui::vec2(32.0, 96.0);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(size),
        ..Default::default()
    };

    eframe::run_native(
        "keybridge",
        options,
        Box::new(move |cc| {
            let app = match KeyboardApp::new(cc, config) {
                Ok(app) => app,
                Err(e) => {
                    error!("[MAIN] Failed to create app: {:#}", e);
                    std::process::exit(1);
                }
            };
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("[MAIN] Application error: {}", e))
}

use anyhow::{Result, anyhow, bail};
use eframe::egui;
use rfd::FileDialog;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tracing::info;

mod app;
mod config;
mod labels;
mod navigator;
mod session;

use app::ViewerApp;
use config::Config;
use navigator::ImageSet;
use session::Session;

fn choose_directory() -> Result<Option<PathBuf>> {
    if let Some(arg) = std::env::args_os().nth(1) {
        let dir = PathBuf::from(arg);
        if !dir.is_dir() {
            bail!("Provided path is not a directory: {}", dir.display());
        }
        return Ok(Some(dir));
    }
    Ok(FileDialog::new()
        .set_title("Select a folder of images")
        .pick_folder())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "img_label_sorter=info".into()),
        )
        .init();

    let config = Config::from_env();

    let Some(dir) = choose_directory()? else {
        info!("No folder selected, exiting");
        return Ok(());
    };
    let images = ImageSet::discover(&dir, &config.extensions);
    info!("Found {} image(s) in {}", images.len(), dir.display());

    let session = Rc::new(RefCell::new(Session::new(dir, images)));

    let (w, h) = config.window_size;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size([w, h]),
        ..Default::default()
    };
    let app_session = Rc::clone(&session);
    eframe::run_native(
        &config.title,
        native_options,
        Box::new(move |_cc| Box::new(ViewerApp::new(app_session))),
    )
    .map_err(|e| anyhow!("window failed: {}", e))?;

    // window closed without pressing Q
    if !session.borrow().is_committed() {
        let result = session.borrow_mut().commit_once();
        if let Some(result) = result {
            app::report_commit(&result);
        }
    }
    let session = session.borrow();
    if session.labels().is_empty() {
        info!("Finished {} without labeling anything", session.base_dir().display());
    } else {
        info!(
            "Finished {} ({} labeled)",
            session.base_dir().display(),
            session.labels().len()
        );
    }

    Ok(())
}

use anyhow::Result;
use eframe::egui;
use egui::{Key, Vec2};
use image::GenericImageView;
use rfd::{MessageButtons, MessageDialog, MessageLevel};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, error, info, warn};

use crate::labels::CommitResult;
use crate::session::{Command, Outcome, Session};

pub struct ViewerApp {
    session: Rc<RefCell<Session>>,
    texture: Option<egui::TextureHandle>,
    original_size: (u32, u32),
    // path the texture was loaded from; None until the first load attempt
    shown: Option<PathBuf>,
    load_error: Option<String>,
}

impl ViewerApp {
    pub fn new(session: Rc<RefCell<Session>>) -> Self {
        Self {
            session,
            texture: None,
            original_size: (0, 0),
            shown: None,
            load_error: None,
        }
    }

    fn sync_texture(&mut self, ctx: &egui::Context) {
        let current = self.session.borrow().current().map(Path::to_path_buf);
        if current == self.shown {
            return;
        }
        self.texture = None;
        self.load_error = None;
        if let Some(p) = &current {
            if let Err(e) = self.load_texture(ctx, p) {
                warn!("Failed to load {}: {}", p.display(), e);
                self.load_error = Some(e.to_string());
            }
        }
        self.shown = current;
    }

    fn load_texture(&mut self, ctx: &egui::Context, p: &Path) -> Result<()> {
        let dynimg = image::io::Reader::open(p)?.with_guessed_format()?.decode()?;
        let (w, h) = dynimg.dimensions();
        self.original_size = (w, h);
        let rgba = dynimg.to_rgba8();
        let size = [w as usize, h as usize];
        let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        let tex = ctx.load_texture(p.to_string_lossy(), image, egui::TextureOptions::LINEAR);
        self.texture = Some(tex);
        Ok(())
    }

    fn collect_commands(ctx: &egui::Context) -> Vec<Command> {
        ctx.input(|input| {
            let mut cmds = vec![];
            if input.key_pressed(Key::ArrowRight) {
                cmds.push(Command::Next);
            }
            if input.key_pressed(Key::ArrowLeft) {
                cmds.push(Command::Previous);
            }
            for event in &input.events {
                if let egui::Event::Text(text) = event {
                    if let Some(label) = digit_label(text) {
                        cmds.push(Command::SetLabel(label));
                    }
                }
            }
            if input.key_pressed(Key::Q) {
                cmds.push(Command::Commit);
            }
            cmds
        })
    }

    fn handle(&mut self, ctx: &egui::Context, cmd: Command) {
        let outcome = self.session.borrow_mut().dispatch(cmd);
        match outcome {
            Outcome::Moved | Outcome::Ignored => {}
            Outcome::Labeled(label) => {
                if let Some(p) = self.session.borrow().current() {
                    debug!("Labeled {} as {}", p.display(), label);
                }
            }
            Outcome::Committed(result) => {
                report_commit(&result);
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            Outcome::AlreadyCommitted => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }
}

/// A single typed ASCII digit, the only text accepted as a label.
fn digit_label(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_digit() => Some(c),
        _ => None,
    }
}

/// Log the commit outcome and show it in a blocking native dialog.
pub fn report_commit(result: &CommitResult) {
    match result {
        Ok(summary) => {
            info!(
                "Moved {} file(s) into {} folder(s)",
                summary.moved, summary.directories
            );
            MessageDialog::new()
                .set_level(MessageLevel::Info)
                .set_title("Success")
                .set_description("Operation completed")
                .set_buttons(MessageButtons::Ok)
                .show();
        }
        Err(e) => {
            error!("Commit failed: {}", e);
            MessageDialog::new()
                .set_level(MessageLevel::Error)
                .set_title("Operation failed")
                .set_description(e.to_string())
                .set_buttons(MessageButtons::Ok)
                .show();
        }
    }
}

/// Largest size with the image's aspect ratio that fits inside `available`.
fn fit_size(original: (u32, u32), available: Vec2) -> Vec2 {
    let (ow, oh) = original;
    if ow == 0 || oh == 0 || available.x <= 0.0 || available.y <= 0.0 {
        return Vec2::ZERO;
    }
    let aspect = ow as f32 / oh as f32;
    let mut dw = available.x;
    let mut dh = available.y;
    if dw / dh > aspect { dw = dh * aspect; } else { dh = dw / aspect; }
    Vec2::new(dw, dh)
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for cmd in Self::collect_commands(ctx) {
            self.handle(ctx, cmd);
        }
        self.sync_texture(ctx);

        let (heading, status) = {
            let session = self.session.borrow();
            let images = session.images();
            let heading = match (images.position(), session.current()) {
                (Some(i), Some(p)) => format!(
                    "Image {}/{}: {}",
                    i + 1,
                    images.len(),
                    p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
                ),
                _ => String::new(),
            };
            (heading, session.status_text())
        };

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.label(status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.shown.is_none() {
                ui.label("No images");
                return;
            }
            ui.label(heading);
            if let Some(tex) = &self.texture {
                let available = ui.available_size() - Vec2::new(0.0, 10.0);
                let image_size = fit_size(self.original_size, available);
                ui.centered_and_justified(|ui| {
                    ui.add(egui::Image::new(tex).fit_to_exact_size(image_size));
                });
            } else if let Some(e) = &self.load_error {
                ui.label(format!("Cannot display this image: {}", e));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_single_digits_become_labels() {
        assert_eq!(digit_label("7"), Some('7'));
        assert_eq!(digit_label("0"), Some('0'));
        assert_eq!(digit_label("q"), None);
        assert_eq!(digit_label("12"), None);
        assert_eq!(digit_label(""), None);
        assert_eq!(digit_label("٣"), None);
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        let wide = fit_size((200, 100), Vec2::new(400.0, 400.0));
        assert_eq!(wide, Vec2::new(400.0, 200.0));

        let tall = fit_size((100, 200), Vec2::new(400.0, 400.0));
        assert_eq!(tall, Vec2::new(200.0, 400.0));

        assert_eq!(fit_size((0, 10), Vec2::new(10.0, 10.0)), Vec2::ZERO);
    }
}

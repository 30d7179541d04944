use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, anyhow};
use eframe::egui;
use easybox::config::DEFAULT_CONFIG_FILE;
use easybox::{AnnotateError, AnnotationSession, Config, SurfacePoint, SurfaceRect};
use egui::{Color32, Key, Pos2, Rect, RichText, Sense, Stroke, Vec2};

struct EasyBoxApp {
    session: AnnotationSession,
    texture: Option<egui::TextureHandle>,
    // image the texture was decoded from
    texture_path: Option<PathBuf>,
    message: Option<String>,
}

impl EasyBoxApp {
    fn new(session: AnnotationSession) -> Self {
        Self {
            session,
            texture: None,
            texture_path: None,
            message: None,
        }
    }

    /// User conditions are shown and forgotten; anything else is also logged as an error.
    fn report(&mut self, result: Result<(), AnnotateError>) {
        match result {
            Ok(()) => {}
            Err(err) if err.is_user_condition() => {
                log::warn!("{err}");
                self.message = Some(err.to_string());
            }
            Err(err) => {
                log::error!("{err}");
                self.message = Some(format!("Error: {err}"));
            }
        }
    }

    fn open_folder(&mut self, dir: &Path) {
        let result = self.session.open_folder(dir);
        self.report(result);
    }

    fn pick_folder(&mut self) {
        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
            self.open_folder(&dir);
        }
    }

    fn delete_selected(&mut self) {
        let selection: Vec<usize> = self.session.selected().into_iter().collect();
        let result = self.session.delete_box_at(&selection).map(|_| ());
        self.report(result);
    }

    fn sync_texture(&mut self, ctx: &egui::Context) {
        let current = self.session.page().map(|p| p.image().to_path_buf());
        if current == self.texture_path {
            return;
        }
        self.texture = None;
        self.texture_path = current.clone();
        let Some(path) = current else { return };
        match load_texture(ctx, &path) {
            Ok(tex) => self.texture = Some(tex),
            Err(err) => {
                log::error!("{err:#}");
                self.message = Some(format!("Error: {err:#}"));
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (ctrl, open, prev, next, save, undo, delete, escape) = ctx.input(|i| {
            let ctrl = i.modifiers.command;
            (
                ctrl,
                ctrl && i.key_pressed(Key::O),
                !ctrl && (i.key_pressed(Key::A) || i.key_pressed(Key::ArrowLeft)),
                !ctrl && (i.key_pressed(Key::D) || i.key_pressed(Key::ArrowRight)),
                ctrl && i.key_pressed(Key::S),
                ctrl && i.key_pressed(Key::Z),
                i.key_pressed(Key::Delete),
                i.key_pressed(Key::Escape),
            )
        });
        if escape {
            self.session.clear_selection();
        }
        if open {
            self.pick_folder();
        }
        if prev {
            let result = self.session.previous();
            self.report(result);
        }
        if next {
            let result = self.session.next();
            self.report(result);
        }
        if save {
            let result = self.session.save_current();
            self.report(result);
        }
        if undo {
            let result = self.session.delete_last_box().map(|_| ());
            self.report(result);
        }
        if delete && !ctrl {
            self.delete_selected();
        }
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open").clicked() {
                    self.pick_folder();
                }
                if ui.button("Previous").clicked() {
                    let result = self.session.previous();
                    self.report(result);
                }
                if ui.button("Next").clicked() {
                    let result = self.session.next();
                    self.report(result);
                }
                if ui.button("Save").clicked() {
                    let result = self.session.save_current();
                    self.report(result);
                }
                if ui.button("Quit").clicked() {
                    if let Err(err) = self.session.shutdown() {
                        log::error!("Final save failed: {err}");
                    }
                    std::process::exit(0);
                }
            });
        });

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.label(self.session.status_line().unwrap_or_default());
        });
    }

    fn image_list(&mut self, ctx: &egui::Context) {
        let Some(nav) = self.session.navigator() else {
            return;
        };
        let mut clicked = None;
        let current = nav.current_index();
        egui::SidePanel::left("images_panel").show(ctx, |ui| {
            ui.heading("Images");
            egui::ScrollArea::vertical().show(ui, |ui| {
                for (i, path) in nav.images().iter().enumerate() {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    if ui.selectable_label(i == current, name).clicked() && i != current {
                        clicked = Some(i);
                    }
                }
            });
        });
        if let Some(i) = clicked {
            let result = self.session.go_to(i);
            self.report(result);
        }
    }

    fn box_list(&mut self, ctx: &egui::Context) {
        let entries = self.session.list_entries();
        let mut clicked = None;
        let mut delete = false;
        let mut undo = false;
        egui::SidePanel::right("boxes_panel").show(ctx, |ui| {
            ui.label("(top, left) -> (bottom, right)");
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
                for entry in &entries {
                    let text = RichText::new(&entry.label).color(to_color(entry.color));
                    if ui.selectable_label(entry.selected, text).clicked() {
                        clicked = Some(entry.index);
                    }
                }
            });
            ui.separator();
            ui.horizontal(|ui| {
                delete = ui.button("Delete selected").clicked();
                undo = ui.button("Delete last").clicked();
            });
        });
        if let Some(i) = clicked {
            let result = self.session.select_box(i).map(|_| ());
            self.report(result);
        }
        if delete {
            self.delete_selected();
        }
        if undo {
            let result = self.session.delete_last_box().map(|_| ());
            self.report(result);
        }
    }

    fn canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(tex) = self.texture.clone() else {
                ui.label("No images loaded. Open a folder with Ctrl+O.");
                return;
            };

            let available = ui.available_size();
            let surface = self.session.surface();
            let changed = (available.x - surface.width).abs() > 0.5
                || (available.y - surface.height).abs() > 0.5;
            // a collapsed panel has no area to map to
            if changed && available.x >= 1.0 && available.y >= 1.0 {
                let result = self.session.resize(available.x, available.y);
                self.report(result);
            }
            let surface = self.session.surface();
            let image_size = Vec2::new(surface.width, surface.height);

            let image = egui::Image::new(&tex).fit_to_exact_size(image_size);
            let resp = ui.add(image.sense(Sense::click_and_drag()));
            let img_rect = resp.rect;
            let to_surface =
                |p: Pos2| SurfacePoint::new(p.x - img_rect.left(), p.y - img_rect.top());

            let pointer = ui.input(|i| i.pointer.clone());
            let pos = pointer.interact_pos().or(pointer.hover_pos());

            if pointer.button_pressed(egui::PointerButton::Primary) {
                if let Some(p) = pos.filter(|p| img_rect.contains(*p)) {
                    self.session.begin_drag(to_surface(p));
                }
            }

            let mut preview = None;
            if self.session.is_dragging() {
                if pointer.primary_released() {
                    match pos {
                        Some(p) => {
                            self.session.end_drag(to_surface(p));
                        }
                        None => self.session.cancel_drag(),
                    }
                } else if pointer.primary_down() {
                    preview = pos.and_then(|p| self.session.update_drag(to_surface(p)));
                } else {
                    // release happened outside the window
                    self.session.cancel_drag();
                }
            }

            let painter = ui.painter();
            let to_screen = |r: SurfaceRect| {
                Rect::from_min_max(
                    Pos2::new(img_rect.left() + r.left, img_rect.top() + r.top),
                    Pos2::new(img_rect.left() + r.right, img_rect.top() + r.bottom),
                )
            };
            for overlay in self.session.overlay() {
                painter.rect_stroke(
                    to_screen(overlay.rect),
                    0.0,
                    Stroke::new(overlay.stroke_width, to_color(overlay.color)),
                );
            }

            if let Some(preview) = preview {
                let width = self.session.config().box_width;
                let color = self
                    .session
                    .preview_color()
                    .map(to_color)
                    .unwrap_or(Color32::RED);
                let guide = Stroke::new(width, Color32::BLACK);
                let to_pos =
                    |p: SurfacePoint| Pos2::new(img_rect.left() + p.x, img_rect.top() + p.y);
                let (h0, h1) = preview.horizontal;
                let (v0, v1) = preview.vertical;
                painter.line_segment([to_pos(h0), to_pos(h1)], guide);
                painter.line_segment([to_pos(v0), to_pos(v1)], guide);
                painter.rect_stroke(to_screen(preview.rect), 0.0, Stroke::new(width, color));
            }
        });
    }

    fn message_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.message.clone() else {
            return;
        };
        let mut close = false;
        egui::Window::new("Info")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                close = ui.button("OK").clicked();
            });
        if close {
            self.message = None;
        }
    }
}

impl eframe::App for EasyBoxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.message.is_none() {
            self.handle_keys(ctx);
        } else if ctx.input(|i| i.key_pressed(Key::Escape) || i.key_pressed(Key::Enter)) {
            self.message = None;
        }
        self.sync_texture(ctx);

        self.top_bar(ctx);
        self.image_list(ctx);
        self.box_list(ctx);
        self.canvas(ctx);
        self.message_window(ctx);
        // a folder may have been opened this frame
        self.sync_texture(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(err) = self.session.shutdown() {
            log::error!("Final save failed: {err}");
        }
    }
}

fn to_color(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

fn load_texture(ctx: &egui::Context, path: &Path) -> Result<egui::TextureHandle> {
    let dynimg = image::io::Reader::open(path)
        .with_context(|| format!("cannot open {}", path.display()))?
        .decode()
        .with_context(|| format!("cannot decode {}", path.display()))?;
    let rgba = dynimg.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let pixels: Vec<u8> = rgba.into_vec();
    let image = egui::ColorImage::from_rgba_unmultiplied(size, &pixels);
    Ok(ctx.load_texture(path.to_string_lossy(), image, egui::TextureOptions::LINEAR))
}

struct Args {
    config: Option<PathBuf>,
    folder: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        config: None,
        folder: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or_else(|| anyhow!("--config needs a file"))?;
                parsed.config = Some(PathBuf::from(path));
            }
            _ if parsed.folder.is_none() => parsed.folder = Some(PathBuf::from(&arg)),
            _ => eprintln!("Usage: easybox [--config FILE] [FOLDER]"),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };
    let (win_w, win_h) = (config.default_win_width, config.default_win_height);

    let mut app = EasyBoxApp::new(AnnotationSession::new(config));
    if let Some(dir) = &args.folder {
        app.open_folder(dir);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("EasyBox")
            .with_inner_size([win_w, win_h]),
        ..Default::default()
    };
    eframe::run_native(
        "EasyBox",
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Box::new(app)
        }),
    )
    .map_err(|err| anyhow!("{err}"))?;

    Ok(())
}

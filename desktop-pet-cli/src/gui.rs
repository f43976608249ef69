//! Window host: the pet as a transparent, undecorated, always-on-top eframe
//! window, with one more small window per speech bubble.
//!
//! The pet is created on the first frame, once the monitor size is known,
//! and advanced from `update` on the wall clock. Everything it asks the
//! [`Surface`] to do is buffered and turned into viewport commands at the
//! end of the frame.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use desktop_pet_core::{
    Appearance, AppearanceKind, BubbleId, CharacterVisual, Config, Error, EventReceiver, Facing,
    MenuItem, Pet, PetCommand, Point, PointerInput, Result, Size, Sprite, Surface,
};
use eframe::egui;
use tracing::{debug, error, info};

const APP_NAME: &str = "Desktop Pet";

const GLYPH_FONT_SIZE: f32 = 72.0;
/// Glyph text color.
const GLYPH_COLOR: egui::Color32 = egui::Color32::BLACK;

const BUBBLE_FONT_SIZE: f32 = 12.0;
const BUBBLE_ROUNDING: f32 = 15.0;
const BUBBLE_PADDING: f32 = 10.0;
const BUBBLE_OUTLINE: f32 = 2.0;

/// Longest a frame is put off when no timer is close.
const IDLE_REPAINT: Duration = Duration::from_millis(250);

/// Open the pet window and run until the pet quits or the window closes.
pub fn run(config: Config, appearance: Appearance) -> Result<()> {
    let size = config.character_size;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size(to_vec2(size))
            .with_transparent(true)
            .with_decorations(false)
            .with_always_on_top()
            .with_taskbar(false)
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(move |cc| Box::new(PetApp::new(&cc.egui_ctx, config, &appearance))),
    )
    .map_err(|err| Error::surface_error(err.to_string()))
}

fn to_vec2(size: Size) -> egui::Vec2 {
    egui::vec2(size.width as f32, size.height as f32)
}

fn to_pos2(point: Point) -> egui::Pos2 {
    egui::pos2(point.x as f32, point.y as f32)
}

/// Portrait textures in both orientations.
struct Portrait {
    upright: egui::TextureHandle,
    mirrored: egui::TextureHandle,
    size: egui::Vec2,
}

impl Portrait {
    fn upload(ctx: &egui::Context, sprite: &Sprite) -> Self {
        let texture = |name: &str, facing: Facing| {
            let frame = sprite.frame(facing);
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [frame.width() as usize, frame.height() as usize],
                frame.as_raw(),
            );
            ctx.load_texture(name, image, egui::TextureOptions::LINEAR)
        };

        Self {
            upright: texture("pet-upright", Facing::Right),
            mirrored: texture("pet-mirrored", Facing::Left),
            size: egui::vec2(sprite.width() as f32, sprite.height() as f32),
        }
    }
}

#[derive(Debug)]
struct BubbleView {
    message: String,
    position: Point,
    size: Size,
    moved: bool,
}

/// Buffers the pet's drawing requests until the end of the frame.
#[derive(Debug)]
struct WindowSurface {
    position: Option<Point>,
    raise: bool,
    visible: Option<bool>,
    visual: CharacterVisual,
    bubbles: BTreeMap<BubbleId, BubbleView>,
    quit: bool,
}

impl WindowSurface {
    fn new(appearance: AppearanceKind) -> Self {
        Self {
            position: None,
            raise: false,
            visible: None,
            visual: appearance.visual(Facing::Right),
            bubbles: BTreeMap::new(),
            quit: false,
        }
    }

    /// Send everything buffered for the character window.
    fn flush(&mut self, ctx: &egui::Context) {
        if let Some(position) = self.position.take() {
            ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(to_pos2(position)));
        }
        if let Some(visible) = self.visible.take() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Visible(visible));
        }
        if std::mem::take(&mut self.raise) {
            ctx.send_viewport_cmd(egui::ViewportCommand::WindowLevel(
                egui::viewport::WindowLevel::AlwaysOnTop,
            ));
        }
        if self.quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    /// Show every live bubble. A bubble that is not shown in a frame is
    /// closed by egui.
    fn show_bubbles(&mut self, ctx: &egui::Context) {
        for (id, bubble) in &mut self.bubbles {
            let viewport = egui::ViewportId::from_hash_of(("bubble", id.0));
            let builder = egui::ViewportBuilder::default()
                .with_title(id.to_string())
                .with_position(to_pos2(bubble.position))
                .with_inner_size(to_vec2(bubble.size))
                .with_transparent(true)
                .with_decorations(false)
                .with_always_on_top()
                .with_taskbar(false)
                .with_resizable(false)
                .with_mouse_passthrough(true);

            if std::mem::take(&mut bubble.moved) {
                ctx.send_viewport_cmd_to(
                    viewport,
                    egui::ViewportCommand::OuterPosition(to_pos2(bubble.position)),
                );
            }

            let message = bubble.message.as_str();
            ctx.show_viewport_immediate(viewport, builder, |ctx, _class| {
                draw_bubble(ctx, message);
            });
        }
    }
}

impl Surface for WindowSurface {
    fn move_character(&mut self, position: Point) {
        self.position = Some(position);
    }

    fn raise_character(&mut self) {
        self.raise = true;
    }

    fn render_character(&mut self, visual: CharacterVisual) {
        self.visual = visual;
    }

    fn set_character_visible(&mut self, visible: bool) {
        self.visible = Some(visible);
    }

    fn open_bubble(&mut self, id: BubbleId, message: &str, position: Point, size: Size) {
        self.bubbles.insert(
            id,
            BubbleView {
                message: message.to_owned(),
                position,
                size,
                moved: false,
            },
        );
    }

    fn move_bubble(&mut self, id: BubbleId, position: Point) {
        if let Some(bubble) = self.bubbles.get_mut(&id) {
            bubble.position = position;
            bubble.moved = true;
        }
    }

    fn close_bubble(&mut self, id: BubbleId) {
        self.bubbles.remove(&id);
    }

    fn quit(&mut self) {
        self.quit = true;
    }
}

fn draw_bubble(ctx: &egui::Context, message: &str) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let rect = ui.max_rect().shrink(BUBBLE_OUTLINE);
            let painter = ui.painter();
            painter.rect(
                rect,
                egui::Rounding::same(BUBBLE_ROUNDING),
                egui::Color32::WHITE,
                egui::Stroke::new(BUBBLE_OUTLINE, egui::Color32::BLACK),
            );

            let galley = painter.layout(
                message.to_owned(),
                egui::FontId::proportional(BUBBLE_FONT_SIZE),
                egui::Color32::BLACK,
                rect.width() - 2.0 * BUBBLE_PADDING,
            );
            let origin = rect.center() - galley.size() / 2.0;
            painter.galley(origin, galley, egui::Color32::BLACK);
        });
}

struct PetApp {
    config: Config,
    appearance: AppearanceKind,
    portrait: Option<Portrait>,
    pet: Option<Pet>,
    events: Option<EventReceiver>,
    surface: WindowSurface,
    epoch: Instant,
    /// Where the context menu is open, in window coordinates.
    menu_at: Option<egui::Pos2>,
    menu_rect: Option<egui::Rect>,
    /// Commands picked from the menu, applied next frame.
    picked: Vec<PetCommand>,
}

impl PetApp {
    fn new(ctx: &egui::Context, config: Config, appearance: &Appearance) -> Self {
        let kind = appearance.kind();
        Self {
            config,
            appearance: kind,
            portrait: appearance.sprite().map(|sprite| Portrait::upload(ctx, sprite)),
            pet: None,
            events: None,
            surface: WindowSurface::new(kind),
            epoch: Instant::now(),
            menu_at: None,
            menu_rect: None,
            picked: Vec::new(),
        }
    }

    /// Create and start the pet on the current monitor.
    fn start(&mut self, ctx: &egui::Context) -> Result<()> {
        let screen = ctx
            .input(|i| i.viewport().monitor_size)
            .map(|size| Size::new(size.x.round() as i32, size.y.round() as i32))
            .filter(Size::is_positive)
            .unwrap_or(self.config.fallback_screen);

        let (mut pet, events) = Pet::new(self.config.clone(), screen, self.appearance)?;
        self.epoch = Instant::now();
        pet.start(&mut self.surface);
        info!(%screen, "pet window open");

        self.pet = Some(pet);
        self.events = Some(events);
        Ok(())
    }

    /// Turn this frame's mouse input into pet commands. Pointer positions
    /// are converted to screen coordinates.
    fn pointer_commands(&mut self, ctx: &egui::Context, character: Point) -> Vec<PetCommand> {
        let (pressed, held, moving, double, secondary, local, origin) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.is_moving(),
                i.pointer.button_double_clicked(egui::PointerButton::Primary),
                i.pointer.secondary_pressed(),
                i.pointer.interact_pos(),
                i.viewport().inner_rect.map(|rect| rect.min),
            )
        });
        let Some(local) = local else {
            return Vec::new();
        };
        if self.menu_rect.is_some_and(|rect| rect.contains(local)) {
            return Vec::new();
        }

        let origin = origin.unwrap_or_else(|| to_pos2(character));
        let screen = Point::new(
            (origin.x + local.x).round() as i32,
            (origin.y + local.y).round() as i32,
        );

        let mut commands = Vec::new();
        if secondary {
            self.menu_at = Some(local);
            commands.push(PetCommand::Pointer(PointerInput::RightPressed(screen)));
            return commands;
        }
        if pressed {
            self.menu_at = None;
            self.menu_rect = None;
            commands.push(PetCommand::Pointer(PointerInput::LeftPressed(screen)));
        }
        if double {
            commands.push(PetCommand::Pointer(PointerInput::LeftDoubleClicked));
        }
        if held && moving && !pressed {
            commands.push(PetCommand::Pointer(PointerInput::Moved {
                position: screen,
                left_held: true,
            }));
        }
        commands
    }

    fn draw_character(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let painter = ui.painter();
                match (self.surface.visual, &self.portrait) {
                    (CharacterVisual::Portrait { mirrored }, Some(portrait)) => {
                        let texture = if mirrored {
                            &portrait.mirrored
                        } else {
                            &portrait.upright
                        };
                        painter.image(
                            texture.id(),
                            egui::Rect::from_center_size(rect.center(), portrait.size),
                            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                            egui::Color32::WHITE,
                        );
                    }
                    (CharacterVisual::Portrait { .. }, None) => {}
                    (CharacterVisual::Glyph(glyph), _) => {
                        painter.text(
                            rect.center(),
                            egui::Align2::CENTER_CENTER,
                            glyph,
                            egui::FontId::proportional(GLYPH_FONT_SIZE),
                            GLYPH_COLOR,
                        );
                    }
                }
            });
    }

    fn draw_menu(&mut self, ctx: &egui::Context, items: Vec<MenuItem>) {
        let Some(anchor) = self.menu_at else {
            return;
        };

        let mut picked = None;
        let response = egui::Area::new(egui::Id::new("pet-context-menu"))
            .fixed_pos(anchor)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::menu(ui.style()).show(ui, |ui| {
                    for item in items {
                        match item {
                            MenuItem::Action { label, command } => {
                                if ui.button(label).clicked() {
                                    picked = Some(command);
                                }
                            }
                            MenuItem::Separator => {
                                ui.separator();
                            }
                        }
                    }
                });
            })
            .response;
        self.menu_rect = Some(response.rect);

        if let Some(command) = picked {
            self.picked.push(command);
            self.menu_at = None;
            self.menu_rect = None;
            ctx.request_repaint();
        }
    }
}

impl eframe::App for PetApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.pet.is_none() {
            if let Err(err) = self.start(ctx) {
                error!(error = %err, "could not start the pet");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                return;
            }
        }
        let Some(character) = self.pet.as_ref().map(Pet::position) else {
            return;
        };

        let mut commands = std::mem::take(&mut self.picked);
        commands.extend(self.pointer_commands(ctx, character));

        let now = self.epoch.elapsed();
        let (menu, next_due) = match self.pet.as_mut() {
            Some(pet) => {
                pet.step(now, commands, &mut self.surface);
                (pet.context_menu(), pet.next_due())
            }
            None => return,
        };

        if let Some(events) = self.events.as_mut() {
            while let Ok(event) = events.try_recv() {
                debug!(%event, "pet event");
            }
        }

        self.surface.flush(ctx);
        if self.surface.quit {
            return;
        }

        self.draw_character(ctx);
        self.draw_menu(ctx, menu);
        self.surface.show_bubbles(ctx);

        let wait = next_due
            .map(|due| due.saturating_sub(now))
            .unwrap_or(IDLE_REPAINT)
            .min(IDLE_REPAINT);
        ctx.request_repaint_after(wait);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }
}

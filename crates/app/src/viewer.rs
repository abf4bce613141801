//! The eframe window: a control panel beside the animated attractor.
//!
//! Each call to [`eframe::App::update`] is one animation frame. The driver
//! presents into a [`TextureSurface`] that the central panel displays.

use std::time::Duration;

use attractor_core::Parameters;
use attractor_render::{Axis, Canvas, Extent, RenderSurface, SurfaceError};
use eframe::egui;
use thiserror::Error;
use tracing::error;

use crate::{
    AppConfig,
    controller::{Controller, ReconfigureError, ReconfigureRequest},
    driver::{AnimationDriver, DriverError},
};

/// A [`RenderSurface`] backed by an egui texture.
///
/// Not ready until [`allocate`](Self::allocate) creates the texture.
pub struct TextureSurface {
    extent: Extent,
    texture: Option<egui::TextureHandle>,
}

impl TextureSurface {
    #[must_use]
    pub fn new(extent: Extent) -> Self {
        Self {
            extent,
            texture: None,
        }
    }

    /// Creates the backing texture, cleared to transparent.
    pub fn allocate(&mut self, ctx: &egui::Context) {
        let blank = egui::ColorImage::new(
            [self.extent.width, self.extent.height],
            egui::Color32::TRANSPARENT,
        );
        self.texture = Some(ctx.load_texture("attractor", blank, egui::TextureOptions::NEAREST));
    }

    #[must_use]
    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }
}

impl RenderSurface for TextureSurface {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn is_ready(&self) -> bool {
        self.texture.is_some()
    }

    fn present(&mut self, frame: &Canvas) -> Result<(), SurfaceError> {
        let Some(texture) = self.texture.as_mut() else {
            return Err(SurfaceError::Unavailable);
        };
        if frame.extent() != self.extent {
            return Err(SurfaceError::ExtentMismatch {
                expected: self.extent,
                actual: frame.extent(),
            });
        }

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [self.extent.width, self.extent.height],
            frame.as_rgba(),
        );
        texture.set(image, egui::TextureOptions::NEAREST);
        Ok(())
    }
}

/// Errors that prevent the viewer from starting.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Controller(#[from] ReconfigureError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// Values being edited in the control panel, applied on Reload.
#[derive(Debug, Clone, Copy)]
struct Controls {
    rho: f64,
    sigma: f64,
    beta: f64,
    horizontal: usize,
    vertical: usize,
}

impl Controls {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            rho: config.parameters.rho,
            sigma: config.parameters.sigma,
            beta: config.parameters.beta,
            horizontal: config.axes.horizontal.index(),
            vertical: config.axes.vertical.index(),
        }
    }
}

pub struct ViewerApp {
    controller: Controller,
    driver: AnimationDriver<TextureSurface>,
    controls: Controls,
    status: String,
    frame_interval: Duration,
}

impl ViewerApp {
    /// Generates the startup scene and starts the animation.
    ///
    /// # Errors
    ///
    /// Returns an error if the startup scene cannot be built or the driver
    /// cannot be set up.
    pub fn new(ctx: &egui::Context, config: AppConfig) -> Result<Self, ViewerError> {
        let controller = Controller::new(config)?;

        let mut surface = TextureSurface::new(config.surface);
        surface.allocate(ctx);
        let mut driver = AnimationDriver::new(surface);
        let scene = controller.scene();
        driver.setup(&scene)?;

        Ok(Self {
            controller,
            driver,
            controls: Controls::from_config(&config),
            status: format!("{} samples", scene.trajectory().len()),
            frame_interval: Duration::from_millis(config.playback.frame_interval_ms),
        })
    }

    fn reload(&mut self) {
        let Controls {
            rho,
            sigma,
            beta,
            horizontal,
            vertical,
        } = self.controls;

        let parameters = Parameters::new(rho, sigma, beta);
        let result = ReconfigureRequest::from_indices(parameters, horizontal, vertical)
            .and_then(|request| self.controller.reconfigure(request));

        self.status = match result {
            Ok(outcome) => format!(
                "generation {}: {} samples",
                outcome.generation, outcome.samples
            ),
            Err(err) => format!("reload rejected: {err}"),
        };
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Lorenz attractor");
        ui.separator();

        ui.label("Parameters");
        ui.add(egui::DragValue::new(&mut self.controls.rho).speed(0.1).prefix("ρ = "));
        ui.add(egui::DragValue::new(&mut self.controls.sigma).speed(0.1).prefix("σ = "));
        ui.add(egui::DragValue::new(&mut self.controls.beta).speed(0.01).prefix("β = "));
        ui.separator();

        axis_row(ui, "X Axis", &mut self.controls.horizontal);
        axis_row(ui, "Y Axis", &mut self.controls.vertical);
        ui.separator();

        if ui.button("Reload").clicked() {
            self.reload();
        }

        ui.label(&self.status);
        if let Some(warning) = self.controller.scene().warning() {
            ui.colored_label(egui::Color32::YELLOW, warning);
        }
    }
}

fn axis_row(ui: &mut egui::Ui, label: &str, value: &mut usize) {
    ui.horizontal(|ui| {
        ui.label(label);
        for axis in Axis::ALL {
            ui.radio_value(value, axis.index(), axis.name());
        }
    });
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls").show(ctx, |ui| self.controls_ui(ui));

        if let Err(err) = self.driver.tick(&self.controller.scene()) {
            error!(%err, "failed to draw frame");
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(texture) = self.driver.surface().texture() {
                ui.image((texture.id(), texture.size_vec2()));
            }
        });

        ctx.request_repaint_after(self.frame_interval);
    }
}

/// Opens the viewer window and blocks until it is closed.
///
/// # Errors
///
/// Returns an error if the window cannot be created or the startup scene
/// fails to build.
pub fn run(config: AppConfig) -> Result<(), eframe::Error> {
    #[allow(clippy::cast_precision_loss)]
    let size = [
        config.surface.width as f32 + 260.0,
        config.surface.height as f32 + 40.0,
    ];
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(size)
            .with_title("Lorenz attractor"),
        ..Default::default()
    };

    eframe::run_native(
        "attractor",
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(&cc.egui_ctx, config)?))),
    )
}

use std::{thread, time::Duration};

use approx::assert_relative_eq;
use attractor_app::{
    AnimationDriver, AppConfig, Controller, DriverError, Method, ReconfigureError,
    ReconfigureRequest, StopHandle,
};
use attractor_core::Parameters;
use attractor_render::{Axis, AxisSelection, Color, Extent, PixelSurface, RenderSurface, project};

fn seeded(seed: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.playback.seed = Some(seed);
    config
}

fn short(method: Method) -> AppConfig {
    let mut config = seeded(5);
    config.integration.max_t = 1.0;
    config.integration.method = method;
    config
}

fn diverging() -> Parameters {
    Parameters::new(1e308, 10.0, 8.0 / 3.0)
}

#[test]
fn default_scenario() {
    let controller = Controller::new(seeded(1)).unwrap();
    let scene = controller.scene();
    let trajectory = scene.trajectory();

    assert_eq!(scene.generation(), 0);
    assert_eq!(trajectory.len(), 10_001);
    assert_eq!(trajectory.states()[0], [1.0, 1.0, 1.0]);
    assert!(trajectory.iter().flatten().all(|v| v.is_finite()));
    assert!(scene.warning().is_none());

    let pixel = project(&trajectory.states()[0], scene.axes(), Extent::default());
    assert_relative_eq!(pixel.x, 255.0);
    assert_relative_eq!(pixel.y, 245.0);
    assert_eq!(scene.trail().segments(), 10_000);
}

#[test]
fn first_frame_shows_the_marker_at_the_start_index() {
    let controller = Controller::new(seeded(2)).unwrap();
    let scene = controller.scene();
    let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));

    driver.setup(&scene).unwrap();
    let tick = driver.tick(&scene).unwrap();

    assert_eq!(tick.index, Some(scene.start_index()));
    let expected = scene.trail().frame(scene.state(scene.start_index()));
    assert_eq!(driver.surface().last_frame(), Some(&expected));
}

#[test]
fn seeded_start_index_is_reproducible() {
    let a = Controller::new(seeded(9)).unwrap();
    let b = Controller::new(seeded(9)).unwrap();

    assert_eq!(a.scene().start_index(), b.scene().start_index());
    assert!(a.scene().start_index() < 10_001);
}

#[test]
fn cursor_returns_to_start_after_n_ticks() {
    let controller = Controller::new(short(Method::Rk4)).unwrap();
    let scene = controller.scene();
    let n = scene.trajectory().len();
    let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
    driver.setup(&scene).unwrap();
    let start = driver.cursor().index();

    for _ in 0..n {
        driver.tick(&scene).unwrap();
    }

    assert_eq!(n, 101);
    assert_eq!(driver.cursor().index(), start);
}

#[test]
fn same_configuration_still_regenerates() {
    let mut controller = Controller::new(short(Method::Dopri5)).unwrap();
    let before = controller.scene();

    let outcome = controller
        .reconfigure(ReconfigureRequest::new(before.parameters(), before.axes()))
        .unwrap();
    let after = controller.scene();

    assert_eq!(outcome.generation, before.generation() + 1);
    assert_eq!(after.generation(), outcome.generation);
    assert!(!std::sync::Arc::ptr_eq(before.trajectory(), after.trajectory()));
    assert_eq!(before.trajectory().len(), after.trajectory().len());
}

#[test]
fn degenerate_axes_render() {
    let mut controller = Controller::new(short(Method::Dopri5)).unwrap();
    let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
    driver.setup(&controller.scene()).unwrap();

    let request = ReconfigureRequest::from_indices(Parameters::default(), 0, 0).unwrap();
    controller.reconfigure(request).unwrap();
    let scene = controller.scene();

    assert_eq!(scene.axes(), AxisSelection::new(Axis::X, Axis::X));
    assert!(driver.tick(&scene).is_ok());
    assert_eq!(driver.surface().frames_presented(), 1);
}

#[test]
fn divergence_truncates_and_still_renders() {
    for method in [Method::Rk4, Method::Dopri5] {
        let mut controller = Controller::new(short(method)).unwrap();
        let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
        driver.setup(&controller.scene()).unwrap();

        let outcome = controller
            .reconfigure(ReconfigureRequest::new(diverging(), AxisSelection::default()))
            .unwrap();
        let scene = controller.scene();

        assert!(outcome.warning.is_some(), "{method} should warn");
        assert!(scene.trajectory().len() < 101, "{method} should truncate");
        assert!(scene.trajectory().iter().flatten().all(|v| v.is_finite()));
        for _ in 0..3 {
            driver.tick(&scene).unwrap();
        }
    }
}

#[test]
fn diverging_startup_parameters_are_recovered() {
    let mut config = short(Method::Rk4);
    config.parameters = diverging();

    let controller = Controller::new(config).unwrap();

    assert!(controller.scene().warning().is_some());
    assert!(controller.scene().trajectory().len() < 101);
}

#[test]
fn invalid_axis_keeps_the_previous_configuration() {
    let controller = Controller::new(short(Method::Rk4)).unwrap();

    let err = ReconfigureRequest::from_indices(Parameters::default(), 5, 2).unwrap_err();

    assert!(matches!(err, ReconfigureError::InvalidAxisSelection(5)));
    assert_eq!(controller.scene().generation(), 0);
    assert_eq!(controller.config().axes, AxisSelection::default());
}

#[test]
fn unavailable_surface_fails_setup_before_any_frame() {
    let controller = Controller::new(short(Method::Rk4)).unwrap();
    let mut driver = AnimationDriver::new(PixelSurface::detached(Extent::default()));

    let err = driver.setup(&controller.scene()).unwrap_err();

    assert!(matches!(err, DriverError::Surface(_)));
    assert_eq!(driver.surface().frames_presented(), 0);
    assert!(!driver.surface().is_ready());
}

#[test]
fn driver_follows_scenes_published_while_running() {
    let mut controller = Controller::new(short(Method::Rk4)).unwrap();
    let scenes = controller.scenes();
    let mut driver = AnimationDriver::new(PixelSurface::new(Extent::default()));
    driver.setup(&scenes.current()).unwrap();
    let stop = StopHandle::new();

    let drawn = thread::scope(|s| {
        let runner = s.spawn(|| driver.run(&scenes, None, Duration::from_millis(1), &stop));

        thread::sleep(Duration::from_millis(20));
        let parameters = Parameters::new(20.0, 10.0, 2.0);
        let request = ReconfigureRequest::from_indices(parameters, 1, 2).unwrap();
        controller.reconfigure(request).unwrap();
        thread::sleep(Duration::from_millis(100));
        stop.stop();

        runner.join().unwrap()
    })
    .unwrap();

    assert!(drawn > 0);
    assert_eq!(driver.surface().frames_presented(), drawn);

    let latest = scenes.current();
    assert_eq!(latest.generation(), 1);
    let len = latest.trajectory().len();
    let shown = (driver.cursor().index() + len - 1) % len;
    let expected = latest.trail().frame(latest.state(shown));
    assert_eq!(driver.surface().last_frame(), Some(&expected));

    // The border is a 2 px stroke inset by 2, covering pixels 1 and 2.
    let last = driver.surface().last_frame().unwrap();
    assert_eq!(last.pixel(0, 0), Some(Color::LAVENDER));
    assert_eq!(last.pixel(1, 1), Some(Color::BLACK));
    assert_eq!(last.pixel(2, 2), Some(Color::BLACK));
    assert_eq!(last.pixel(3, 3), Some(Color::LAVENDER));
}

#[test]
fn configuration_file_round_trip_through_disk() {
    let path = std::env::temp_dir().join(format!("attractor-scenario-{}.toml", std::process::id()));
    std::fs::write(
        &path,
        "[integration]\nmax_t = 5.0\ndt = 0.05\nmethod = \"rk4\"\n\n[playback]\nseed = 4\n",
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    let controller = Controller::new(config).unwrap();

    assert_eq!(controller.scene().trajectory().len(), 101);
    assert_eq!(controller.integrator().method(), Method::Rk4);
}

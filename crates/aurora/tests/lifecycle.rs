use std::cell::RefCell;
use std::rc::Rc;

use aurora::{
    drive, BackgroundRenderer, Frame, FrameInputs, HeadlessHost, Phase, SinkError, Surface,
    Viewport,
};

type Painted = Rc<RefCell<Vec<(Viewport, u64, f32)>>>;

fn recording_host(
    viewport: Viewport,
) -> (
    HeadlessHost<impl FnMut() -> Box<dyn FnMut(&Frame, &FrameInputs) -> Result<(), SinkError>>>,
    Painted,
) {
    let painted: Painted = Rc::default();
    let log = painted.clone();
    let host = HeadlessHost::new(viewport, move || {
        let log = log.clone();
        Box::new(move |frame: &Frame, inputs: &FrameInputs| {
            log.borrow_mut()
                .push((frame.viewport(), inputs.tick, inputs.time));
            Ok(())
        }) as Box<dyn FnMut(&Frame, &FrameInputs) -> Result<(), SinkError>>
    });
    (host, painted)
}

#[test]
fn mount_resize_teardown_scenario() {
    let (mut host, painted) = recording_host(Viewport::new(800, 600));
    let mut renderer = BackgroundRenderer::new();

    assert_eq!(renderer.mount(&mut host), Phase::Running);
    assert_eq!(renderer.resolution(), Viewport::new(800, 600));
    assert_eq!(renderer.clock().seconds(), 0.0);
    assert_eq!(host.surfaces_acquired(), 1);
    assert_eq!(
        renderer.surface().map(|surface| surface.size()),
        Some(Viewport::new(800, 600))
    );

    let pending_before_resize = host.pending();
    assert!(pending_before_resize.is_some());
    host.set_viewport(Viewport::new(1024, 768));
    renderer.resize(Viewport::new(1024, 768));
    assert_eq!(renderer.resolution(), Viewport::new(1024, 768));
    assert_eq!(
        renderer.surface().map(|surface| surface.size()),
        Some(Viewport::new(1024, 768))
    );
    assert_eq!(host.pending(), pending_before_resize);

    renderer.teardown(&mut host);
    assert_eq!(renderer.phase(), Phase::TornDown);
    assert!(renderer.surface().is_none());
    assert!(host.is_idle());
    assert_eq!(drive(&mut renderer, &mut host, 10), 0);
    assert!(painted.borrow().is_empty());
}

#[test]
fn tick_after_resize_paints_at_new_resolution() {
    let (mut host, painted) = recording_host(Viewport::new(8, 6));
    let mut renderer = BackgroundRenderer::new();
    renderer.mount(&mut host);

    assert_eq!(drive(&mut renderer, &mut host, 1), 1);
    assert_eq!(renderer.clock().seconds(), 0.016);

    host.set_viewport(Viewport::new(12, 9));
    renderer.resize(Viewport::new(12, 9));
    assert_eq!(drive(&mut renderer, &mut host, 1), 1);

    let painted = painted.borrow();
    assert_eq!(painted.len(), 2);
    assert_eq!(painted[0].0, Viewport::new(8, 6));
    assert_eq!(painted[1].0, Viewport::new(12, 9));
    assert_eq!(painted[1].1, 2);
}

#[test]
fn clock_advances_by_exactly_one_step_per_painted_frame() {
    let (mut host, painted) = recording_host(Viewport::new(4, 3));
    let mut renderer = BackgroundRenderer::new();
    renderer.mount(&mut host);
    drive(&mut renderer, &mut host, 25);

    let painted = painted.borrow();
    assert_eq!(painted.len(), 25);
    for (index, (_, tick, _)) in painted.iter().enumerate() {
        assert_eq!(*tick, index as u64 + 1);
    }
    assert!(painted.windows(2).all(|pair| pair[1].2 > pair[0].2));
    assert_eq!(renderer.clock().seconds(), 25.0 * 0.016);
}

#[test]
fn teardown_twice_or_before_mount_leaves_nothing_scheduled() {
    let (mut host, _) = recording_host(Viewport::new(4, 3));
    let mut renderer = BackgroundRenderer::new();
    renderer.teardown(&mut host);
    renderer.teardown(&mut host);
    assert!(host.is_idle());
    assert_eq!(host.requests_issued(), 0);

    let (mut host, _) = recording_host(Viewport::new(4, 3));
    let mut renderer = BackgroundRenderer::new();
    renderer.mount(&mut host);
    drive(&mut renderer, &mut host, 2);
    renderer.teardown(&mut host);
    renderer.teardown(&mut host);
    assert!(host.is_idle());
    assert_eq!(host.cancellations(), 1);
}

#[test]
fn identical_inputs_paint_identical_frames() {
    let mut frames = Vec::new();
    for _ in 0..2 {
        let mut host = HeadlessHost::new(Viewport::new(10, 7), || {
            |_: &Frame, _: &FrameInputs| -> Result<(), SinkError> { Ok(()) }
        });
        let mut renderer = BackgroundRenderer::new();
        renderer.mount(&mut host);
        drive(&mut renderer, &mut host, 3);
        let frame = renderer
            .surface()
            .map(|surface| surface.frame().clone())
            .expect("mounted surface");
        frames.push(frame);
    }
    assert_eq!(frames[0], frames[1]);
}

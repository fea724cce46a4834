//! Application event loop.
//!
//! Creates the window and GPU context, builds the [`SceneController`] and maps
//! winit events onto it:
//!
//! 1. Pointer and wheel input goes to the orbit controls
//! 2. `Resized` goes to [`SceneController::resize`]
//! 3. `RedrawRequested` runs one frame via [`SceneController::render`], which
//!    requests the next redraw itself
//!
//! GPU setup is asynchronous. Natively a tokio runtime blocks on it; on the web
//! it runs in `spawn_local` and the result comes back as a user event.
//!
//! On the web the canvas starts at the size of the browser viewport and is
//! resized with it, which winit reports as `Resized`.

use std::{fmt::Debug, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::{
    config::Viewport, context::Context, controller::SceneController, render::GpuRenderer,
};

const FPS_REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Counts frames and logs the frame rate every [`FPS_REPORT_INTERVAL`].
#[derive(Debug)]
struct FrameTimer {
    since: Instant,
    frames: u32,
}

impl FrameTimer {
    fn new() -> Self {
        Self {
            since: Instant::now(),
            frames: 0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed >= FPS_REPORT_INTERVAL {
            log::debug!("{:.1} fps", self.frames as f64 / elapsed.as_secs_f64());
            self.since = Instant::now();
            self.frames = 0;
        }
    }
}

fn window_attributes(initial_size: Option<LogicalSize<f64>>) -> WindowAttributes {
    let attributes = Window::default_attributes().with_title("box-grid");
    match initial_size {
        Some(size) => attributes.with_inner_size(size),
        None => attributes,
    }
}

/// A browser viewport in CSS pixels, if both dimensions are known and non-zero.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn viewport_logical_size(width: Option<f64>, height: Option<f64>) -> Option<LogicalSize<f64>> {
    match (width, height) {
        (Some(width), Some(height)) if width > 0.0 && height > 0.0 => {
            Some(LogicalSize::new(width, height))
        }
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_viewport() -> Option<LogicalSize<f64>> {
    let window = web_sys::window()?;
    viewport_logical_size(
        window.inner_width().ok()?.as_f64(),
        window.inner_height().ok()?.as_f64(),
    )
}

#[cfg(not(target_arch = "wasm32"))]
fn browser_viewport() -> Option<LogicalSize<f64>> {
    None
}

/// Resize the canvas whenever the browser viewport changes.
#[cfg(target_arch = "wasm32")]
fn follow_browser_viewport(window: Arc<Window>) {
    use wasm_bindgen::{JsCast, closure::Closure};

    let Some(browser) = web_sys::window() else {
        log::warn!("no browser window, canvas keeps its initial size");
        return;
    };
    let on_resize = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        if let Some(size) = browser_viewport() {
            let _ = window.request_inner_size(size);
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    if let Err(err) =
        browser.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
    {
        log::warn!("could not listen for browser resizes: {:?}", err);
    }
    // the listener stays registered for the lifetime of the page
    on_resize.forget();
}

pub struct AppState {
    window: Arc<Window>,
    controller: SceneController<GpuRenderer>,
}

impl Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("frames", &self.controller.frame_count())
            .finish()
    }
}

pub(crate) enum FlowEvent {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    Initialized {
        window: Arc<Window>,
        context: anyhow::Result<Context>,
    },
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { context, .. } => f
                .debug_struct("Initialized")
                .field("ok", &context.is_ok())
                .finish(),
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    state: Option<AppState>,
    // set once the window exists; guards against a second `resumed`
    started: bool,
    timer: FrameTimer,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            started: false,
            timer: FrameTimer::new(),
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{:#}", err);
        self.error = Some(err);
        event_loop.exit();
    }

    fn initialize(
        &mut self,
        event_loop: &ActiveEventLoop,
        window: Arc<Window>,
        context: anyhow::Result<Context>,
    ) {
        let context = match context {
            Ok(context) => context,
            Err(err) => return self.fail(event_loop, err.context("GPU setup failed")),
        };
        let viewport = Viewport::from(window.inner_size());
        match SceneController::init(GpuRenderer::new(context), viewport) {
            Ok(controller) => {
                window.request_redraw();
                self.timer = FrameTimer::new();
                self.state = Some(AppState { window, controller });
            }
            Err(err) => self.fail(event_loop, anyhow::Error::new(err).context("scene setup failed")),
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        let window = match event_loop.create_window(window_attributes(browser_viewport())) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let context = self.async_runtime.block_on(Context::new(window.clone()));
            self.initialize(event_loop, window, context);
        }

        #[cfg(target_arch = "wasm32")]
        {
            follow_browser_viewport(window.clone());
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let context = Context::new(window.clone()).await;
                if proxy
                    .send_event(FlowEvent::Initialized { window, context })
                    .is_err()
                {
                    log::error!("event loop closed before the GPU context was ready");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            // sent by the wasm `spawn_local` in `resumed`
            FlowEvent::Initialized { window, context } => {
                self.initialize(event_loop, window, context);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.controller.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                state.controller.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.controller.resize(size.into()),
            WindowEvent::RedrawRequested => {
                state.controller.render(state.window.as_ref());
                self.timer.tick();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            log::info!(
                "frame loop stopped after {} frames",
                state.controller.frame_count()
            );
        }
    }
}

fn init_logger() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        let env = env_logger::Env::default().default_filter_or("info");
        if let Err(e) = env_logger::Builder::from_env(env).try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger was already initialized".into());
        }
    }
}

/// Open the window (or canvas) and run the demo until it is closed.
pub fn run() -> anyhow::Result<()> {
    init_logger();

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

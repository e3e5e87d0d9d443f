// ── Native site window (Windows) ──
//
// One top-level winit window hosting a WebView2 view of the site. Runs its
// event loop on the calling thread until the user closes the window, and
// publishes every client-area resize to a `LiveWindow`.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::windows::EventLoopBuilderExtWindows;
use winit::window::{Icon, Window, WindowId};
use wry::{Rect, WebContext, WebView, WebViewBuilder};

use hobaa_core::{WindowSize, WindowSpec};

use crate::error::CliError;
use crate::shell::LiveWindow;

/// Show `spec` and block until its window closes.
///
/// Fails with [`CliError::Window`] only when nothing could be shown, so
/// the caller can still fall back to another shell.
pub fn show(spec: &WindowSpec, live: Arc<LiveWindow>) -> Result<(), CliError> {
    let event_loop = EventLoop::builder()
        .with_any_thread(true)
        .build()
        .map_err(window_error)?;

    let mut app = SiteWindow {
        spec: spec.clone(),
        live,
        webview: None,
        window: None,
        context: WebContext::new(Some(spec.data_dir.clone())),
        failure: None,
    };
    let run = event_loop.run_app(&mut app);

    if let Some(failure) = app.failure {
        return Err(failure);
    }
    if let Err(e) = run {
        if app.window.is_none() {
            return Err(window_error(e));
        }
        warn!(error = %e, "site window event loop ended with an error");
    }
    Ok(())
}

struct SiteWindow {
    spec: WindowSpec,
    live: Arc<LiveWindow>,
    // Fields drop in order: the view, then its parent window, then the
    // profile context it was built from.
    webview: Option<WebView>,
    window: Option<Window>,
    context: WebContext,
    failure: Option<CliError>,
}

impl SiteWindow {
    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), CliError> {
        let attributes = Window::default_attributes()
            .with_title(self.spec.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.spec.size.width,
                self.spec.size.height,
            ))
            .with_window_icon(load_icon(&self.spec.icon_path));
        let window = event_loop.create_window(attributes).map_err(window_error)?;

        let webview = WebViewBuilder::with_web_context(&mut self.context)
            .with_url(self.spec.url.as_str())
            .build(&window)
            .map_err(window_error)?;

        info!(
            title = %self.spec.title,
            url = %self.spec.url,
            size = %self.spec.size,
            "site window opened"
        );
        self.webview = Some(webview);
        self.window = Some(window);
        Ok(())
    }

    fn fit_webview(&self, size: PhysicalSize<u32>) {
        let Some(webview) = &self.webview else {
            return;
        };
        let bounds = Rect {
            position: PhysicalPosition::new(0, 0).into(),
            size: size.into(),
        };
        if let Err(e) = webview.set_bounds(bounds) {
            debug!(error = %e, "webview bounds not updated");
        }
    }
}

impl ApplicationHandler for SiteWindow {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.open(event_loop) {
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::Resized(size) => {
                self.fit_webview(size);
                self.live.resized(WindowSize::new(size.width, size.height));
            }
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.live.closed();
                event_loop.exit();
            }
            _ => {}
        }
    }
}

/// Decode the cached `.ico` into a window icon. A broken file only costs
/// the title-bar icon.
fn load_icon(path: &Path) -> Option<Icon> {
    let image = match image::open(path) {
        Ok(image) => image.into_rgba8(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "window icon not loaded");
            return None;
        }
    };
    let (width, height) = image.dimensions();
    Icon::from_rgba(image.into_raw(), width, height).ok()
}

fn window_error(err: impl std::fmt::Display) -> CliError {
    CliError::Window {
        message: err.to_string(),
    }
}

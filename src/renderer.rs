// GpuKit
// copyright zipxing@hotmail.com 2022~2025

//! Window + context front-end.
//!
//! Cross-platform window management based on the winit + glutin + glow
//! stack: winit owns the window and event pump, glutin owns the GL context
//! and surface, glow carries the function pointers.
//!
//! One window, one context, one event queue per process. `init` twice, or
//! `init` after `terminate`, is refused: the front-end has no
//! re-initialization contract.
//!
//! Window creation is deferred to the `resumed` callback as the windowing
//! library requires; `init` pumps the loop once so the caller gets a live
//! context back. The handler keeps a raw back-pointer to the renderer to
//! update window state during event processing; the pointer is re-armed on
//! every pump while the renderer is borrowed mutably, which keeps it valid.

use crate::error::{CoreError, Result};
use crate::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use glow::HasContext;
use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version},
    display::{Display, GetGlDisplay, GlDisplay},
    prelude::GlSurface,
    surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use log::info;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::raw_window_handle::HasWindowHandle;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::EventLoop,
    window::Window,
};

// never initialized -> alive -> terminated; no way back
const STATE_NEW: u8 = 0;
const STATE_ALIVE: u8 = 1;
const STATE_DEAD: u8 = 2;
static RENDERER_STATE: AtomicU8 = AtomicU8::new(STATE_NEW);

/// the process-wide window + context front-end
pub struct Renderer {
    pub width: u32,
    pub height: u32,
    title: String,
    gl_version: (u8, u8),

    event_loop: Option<EventLoop<()>>,
    window: Option<Arc<Window>>,
    gl_display: Option<Display>,
    gl_context: Option<PossiblyCurrentContext>,
    gl_surface: Option<Surface<WindowSurface>>,
    gl: Option<glow::Context>,

    app_handler: Option<AppHandler>,
    should_close: bool,
}

/// winit-side event handler; translates native events into the unified
/// queue, honoring the enabled-event mask
struct AppHandler {
    renderer_ref: *mut Renderer,
    cursor_position: (f64, f64),
    modifiers: KeyModifiers,
    last_maximized: bool,
}

impl AppHandler {
    fn push(&self, e: Event) {
        if event::event_mask().contains(e.mask()) {
            event::push_event(e);
        }
    }
}

impl ApplicationHandler for AppHandler {
    /// window and context are created here, on the first pump
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(renderer) = unsafe { self.renderer_ref.as_mut() } {
            if renderer.window.is_none() {
                renderer.create_window_and_context(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        ev: WindowEvent,
    ) {
        match ev {
            WindowEvent::CloseRequested => {
                self.push(Event::WindowClose);
                if let Some(renderer) = unsafe { self.renderer_ref.as_mut() } {
                    renderer.should_close = true;
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.push(Event::FramebufferResize {
                    width: size.width,
                    height: size.height,
                });
                if let Some(renderer) = unsafe { self.renderer_ref.as_mut() } {
                    if let Some(win) = &renderer.window {
                        let scale = win.scale_factor();
                        let logical = size.to_logical::<f64>(scale);
                        self.push(Event::WindowSize {
                            width: logical.width as u32,
                            height: logical.height as u32,
                        });
                        let maximized = win.is_maximized();
                        if maximized != self.last_maximized {
                            self.last_maximized = maximized;
                            self.push(Event::WindowMaximize { maximized });
                        }
                    }
                }
            }
            WindowEvent::Moved(pos) => {
                self.push(Event::WindowPos { x: pos.x, y: pos.y });
            }
            WindowEvent::ModifiersChanged(m) => {
                let s = m.state();
                let mut mods = KeyModifiers::NONE;
                if s.shift_key() {
                    mods |= KeyModifiers::SHIFT;
                }
                if s.control_key() {
                    mods |= KeyModifiers::CONTROL;
                }
                if s.alt_key() {
                    mods |= KeyModifiers::ALT;
                }
                if s.super_key() {
                    mods |= KeyModifiers::SUPER;
                }
                self.modifiers = mods;
            }
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } => {
                if let winit::keyboard::PhysicalKey::Code(code) = key_event.physical_key {
                    if let Some(kc) = map_key(code) {
                        let kind = match key_event.state {
                            winit::event::ElementState::Pressed if key_event.repeat => {
                                KeyEventKind::Repeat
                            }
                            winit::event::ElementState::Pressed => KeyEventKind::Press,
                            winit::event::ElementState::Released => KeyEventKind::Release,
                        };
                        self.push(Event::Key(KeyEvent::new_with_kind(
                            kc,
                            self.modifiers,
                            kind,
                        )));
                    }
                }
            }
            WindowEvent::CursorEntered { .. } => {
                self.push(Event::CursorEnter { entered: true });
            }
            WindowEvent::CursorLeft { .. } => {
                self.push(Event::CursorEnter { entered: false });
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = (position.x, position.y);
                self.push(Event::CursorPos {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let btn = match button {
                    winit::event::MouseButton::Left => Some(MouseButton::Left),
                    winit::event::MouseButton::Right => Some(MouseButton::Right),
                    winit::event::MouseButton::Middle => Some(MouseButton::Middle),
                    _ => None,
                };
                if let Some(btn) = btn {
                    let kind = match state {
                        winit::event::ElementState::Pressed => MouseEventKind::Down(btn),
                        winit::event::ElementState::Released => MouseEventKind::Up(btn),
                    };
                    self.push(Event::MouseButton(MouseEvent {
                        kind,
                        x: self.cursor_position.0,
                        y: self.cursor_position.1,
                        modifiers: self.modifiers,
                    }));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (dx, dy) = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => (x as f64, y as f64),
                    winit::event::MouseScrollDelta::PixelDelta(p) => (p.x, p.y),
                };
                self.push(Event::MouseScroll { dx, dy });
            }
            _ => {}
        }
    }
}

impl Renderer {
    /// Open the window and create a core-profile context of the requested
    /// version. Only callable once per process.
    pub fn init(width: u32, height: u32, title: &str, major: u8, minor: u8) -> Result<Renderer> {
        if RENDERER_STATE
            .compare_exchange(STATE_NEW, STATE_ALIVE, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CoreError::Precondition(
                "renderer already initialized in this process".into(),
            ));
        }
        let event_loop = EventLoop::new().map_err(|e| CoreError::Window(e.to_string()))?;
        let mut r = Renderer {
            width,
            height,
            title: title.to_string(),
            gl_version: (major, minor),
            event_loop: Some(event_loop),
            window: None,
            gl_display: None,
            gl_context: None,
            gl_surface: None,
            gl: None,
            app_handler: Some(AppHandler {
                renderer_ref: std::ptr::null_mut(),
                cursor_position: (0.0, 0.0),
                modifiers: KeyModifiers::NONE,
                last_maximized: false,
            }),
            should_close: false,
        };
        // drive `resumed` once so the window and context exist on return
        r.pump(Duration::ZERO);
        if r.gl.is_none() {
            return Err(CoreError::Window("window creation did not complete".into()));
        }
        info!("renderer up: {}x{} GL {}.{}", width, height, major, minor);
        Ok(r)
    }

    // The handler mutates the renderer during the pump, so its back-pointer
    // is re-armed on every call while `self` is uniquely borrowed.
    fn pump(&mut self, timeout: Duration) -> bool {
        let self_ptr = self as *mut Renderer;
        if let (Some(event_loop), Some(handler)) =
            (self.event_loop.as_mut(), self.app_handler.as_mut())
        {
            handler.renderer_ref = self_ptr;
            let status = event_loop.pump_app_events(Some(timeout), handler);
            if let PumpStatus::Exit(_) = status {
                return true;
            }
        }
        false
    }

    fn create_window_and_context(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let window_size = LogicalSize::new(self.width, self.height);
        let template = ConfigTemplateBuilder::new();
        let display_builder = DisplayBuilder::new().with_window_attributes(Some(
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(window_size),
        ));

        let (window, gl_config) = display_builder
            .build(event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .unwrap()
            })
            .unwrap();

        let window = Arc::new(window.unwrap());
        let physical_size = window.inner_size();

        let gl_display = gl_config.display();
        let raw_window_handle = window.window_handle().unwrap().as_raw();

        let (major, minor) = self.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_window_handle));

        let not_current_gl_context = unsafe {
            gl_display
                .create_context(&gl_config, &context_attributes)
                .expect("failed to create context")
        };

        let gl_surface = unsafe {
            let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
                raw_window_handle,
                NonZeroU32::new(physical_size.width.max(1)).unwrap(),
                NonZeroU32::new(physical_size.height.max(1)).unwrap(),
            );
            gl_display
                .create_window_surface(&gl_config, &attrs)
                .unwrap()
        };

        let gl_context = not_current_gl_context.make_current(&gl_surface).unwrap();

        // one vertical refresh per swap
        let _ = gl_surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::new(1).unwrap()));

        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                let s = std::ffi::CString::new(s)
                    .expect("failed to construct C string from string for gl proc address");
                gl_display.get_proc_address(&s)
            })
        };

        info!(
            "window created - logical: {}x{}, physical: {}x{}",
            self.width, self.height, physical_size.width, physical_size.height
        );

        self.window = Some(window);
        self.gl_display = Some(gl_display);
        self.gl_context = Some(gl_context);
        self.gl_surface = Some(gl_surface);
        self.gl = Some(gl);
    }

    /// the live GL context, for the resource layers
    pub fn gl(&self) -> Option<&glow::Context> {
        self.gl.as_ref()
    }

    /// Pump the native event loop for up to `timeout` seconds, translating
    /// enabled events into the queue. Returns true while the window stays
    /// open.
    pub fn poll(&mut self, timeout: f64) -> bool {
        let exited = self.pump(Duration::from_secs_f64(timeout.max(0.0)));
        if exited {
            self.should_close = true;
        }
        !self.should_close
    }

    pub fn is_open(&self) -> bool {
        !self.should_close && self.window.is_some()
    }

    /// request close; observed by the next `is_open`
    pub fn close(&mut self) {
        self.should_close = true;
    }

    /// swap front/back buffers; blocks for at most one vertical refresh
    pub fn display(&self) -> Result<()> {
        match (&self.gl_surface, &self.gl_context) {
            (Some(surface), Some(context)) => surface
                .swap_buffers(context)
                .map_err(|e| CoreError::Window(e.to_string())),
            _ => Err(CoreError::Precondition("renderer has no surface".into())),
        }
    }

    /// clear color and depth planes of the default framebuffer
    pub fn clear(&self, r: f32, g: f32, b: f32, a: f32, depth: f32) {
        if let Some(gl) = &self.gl {
            unsafe {
                gl.clear_color(r, g, b, a);
                gl.clear_depth_f32(depth);
                gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            }
        }
    }

    pub fn viewport(&self, x: i32, y: i32, w: i32, h: i32) {
        if let Some(gl) = &self.gl {
            unsafe {
                gl.viewport(x, y, w, h);
            }
        }
    }

    pub fn viewport_get(&self) -> (i32, i32, i32, i32) {
        let mut v = [0i32; 4];
        if let Some(gl) = &self.gl {
            unsafe {
                gl.get_parameter_i32_slice(glow::VIEWPORT, &mut v);
            }
        }
        (v[0], v[1], v[2], v[3])
    }

    /// drawable size in physical pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        match &self.window {
            Some(w) => {
                let s = w.inner_size();
                (s.width, s.height)
            }
            None => (0, 0),
        }
    }

    /// Tear everything down. The front-end cannot be initialized again in
    /// this process.
    pub fn terminate(self) {
        drop(self);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // context drops after the surface detaches; order matters here
        self.gl = None;
        self.gl_surface = None;
        self.gl_context = None;
        self.gl_display = None;
        self.window = None;
        self.event_loop = None;
        event::clear_events();
        RENDERER_STATE.store(STATE_DEAD, Ordering::SeqCst);
        info!("renderer terminated");
    }
}

/// map the windowing library's key codes onto the unified key set
fn map_key(code: winit::keyboard::KeyCode) -> Option<KeyCode> {
    use winit::keyboard::KeyCode as K;
    let kc = match code {
        K::KeyA => KeyCode::Char('a'),
        K::KeyB => KeyCode::Char('b'),
        K::KeyC => KeyCode::Char('c'),
        K::KeyD => KeyCode::Char('d'),
        K::KeyE => KeyCode::Char('e'),
        K::KeyF => KeyCode::Char('f'),
        K::KeyG => KeyCode::Char('g'),
        K::KeyH => KeyCode::Char('h'),
        K::KeyI => KeyCode::Char('i'),
        K::KeyJ => KeyCode::Char('j'),
        K::KeyK => KeyCode::Char('k'),
        K::KeyL => KeyCode::Char('l'),
        K::KeyM => KeyCode::Char('m'),
        K::KeyN => KeyCode::Char('n'),
        K::KeyO => KeyCode::Char('o'),
        K::KeyP => KeyCode::Char('p'),
        K::KeyQ => KeyCode::Char('q'),
        K::KeyR => KeyCode::Char('r'),
        K::KeyS => KeyCode::Char('s'),
        K::KeyT => KeyCode::Char('t'),
        K::KeyU => KeyCode::Char('u'),
        K::KeyV => KeyCode::Char('v'),
        K::KeyW => KeyCode::Char('w'),
        K::KeyX => KeyCode::Char('x'),
        K::KeyY => KeyCode::Char('y'),
        K::KeyZ => KeyCode::Char('z'),
        K::Digit0 => KeyCode::Char('0'),
        K::Digit1 => KeyCode::Char('1'),
        K::Digit2 => KeyCode::Char('2'),
        K::Digit3 => KeyCode::Char('3'),
        K::Digit4 => KeyCode::Char('4'),
        K::Digit5 => KeyCode::Char('5'),
        K::Digit6 => KeyCode::Char('6'),
        K::Digit7 => KeyCode::Char('7'),
        K::Digit8 => KeyCode::Char('8'),
        K::Digit9 => KeyCode::Char('9'),
        K::Space => KeyCode::Char(' '),
        K::ArrowUp => KeyCode::Up,
        K::ArrowDown => KeyCode::Down,
        K::ArrowLeft => KeyCode::Left,
        K::ArrowRight => KeyCode::Right,
        K::Enter => KeyCode::Enter,
        K::Escape => KeyCode::Esc,
        K::Tab => KeyCode::Tab,
        K::Backspace => KeyCode::Backspace,
        K::Delete => KeyCode::Delete,
        K::Insert => KeyCode::Insert,
        K::Home => KeyCode::Home,
        K::End => KeyCode::End,
        K::PageUp => KeyCode::PageUp,
        K::PageDown => KeyCode::PageDown,
        K::F1 => KeyCode::F(1),
        K::F2 => KeyCode::F(2),
        K::F3 => KeyCode::F(3),
        K::F4 => KeyCode::F(4),
        K::F5 => KeyCode::F(5),
        K::F6 => KeyCode::F(6),
        K::F7 => KeyCode::F(7),
        K::F8 => KeyCode::F(8),
        K::F9 => KeyCode::F(9),
        K::F10 => KeyCode::F(10),
        K::F11 => KeyCode::F(11),
        K::F12 => KeyCode::F(12),
        _ => return None,
    };
    Some(kc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_mapping_covers_the_basics() {
        use winit::keyboard::KeyCode as K;
        assert_eq!(map_key(K::KeyQ), Some(KeyCode::Char('q')));
        assert_eq!(map_key(K::Digit7), Some(KeyCode::Char('7')));
        assert_eq!(map_key(K::ArrowLeft), Some(KeyCode::Left));
        assert_eq!(map_key(K::F11), Some(KeyCode::F(11)));
        assert_eq!(map_key(K::NumLock), None);
    }
}

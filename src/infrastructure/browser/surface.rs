use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::listeners::{ListenerOptions, listener_error, window_listener};
use crate::domain::errors::SceneError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::infrastructure::rendering::{SceneRenderer, WebGpuSceneRenderer};
use crate::scene::{FrameScheduler, ListenerGuard, PointerInput, SceneSurface, SurfaceSize};

fn element_size(element: &Element) -> SurfaceSize {
    SurfaceSize::new(element.client_width().max(0) as u32, element.client_height().max(0) as u32)
}

fn js_error(stage: &str, value: wasm_bindgen::JsValue) -> SceneError {
    SceneError::SurfaceUnavailable(format!("{}: {:?}", stage, value))
}

/// Canvas created inside the mount element, with its GPU renderer.
pub struct CanvasSurface {
    root: Element,
    canvas: HtmlCanvasElement,
    renderer: Option<WebGpuSceneRenderer>,
}

impl CanvasSurface {
    /// Append a canvas to `root` and bring up the WebGPU renderer for it.
    /// The canvas is removed again if the renderer cannot be created.
    pub async fn prepare(root: Element) -> Result<Self, SceneError> {
        let size = element_size(&root);
        if size.is_empty() {
            return Err(SceneError::InvalidDimensions { width: size.width, height: size.height });
        }
        if !WebGpuSceneRenderer::is_webgpu_supported().await {
            return Err(SceneError::GraphicsInitialization("WebGPU is not supported by this browser".to_string()));
        }
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| SceneError::SurfaceUnavailable("document is not available".to_string()))?;

        let canvas = document
            .create_element("canvas")
            .map_err(|e| js_error("create canvas", e))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SceneError::SurfaceUnavailable("created element is not a canvas".to_string()))?;
        canvas
            .set_attribute("style", "display:block;width:100%;height:100%;touch-action:none")
            .map_err(|e| js_error("style canvas", e))?;
        root.append_child(&canvas).map_err(|e| js_error("append canvas", e))?;

        match WebGpuSceneRenderer::new(canvas.clone(), size).await {
            Ok(renderer) => {
                get_logger().info(
                    LogComponent::Infrastructure("CanvasSurface"),
                    &format!("WebGPU surface ready at {}x{}", size.width, size.height),
                );
                Ok(Self { root, canvas, renderer: Some(renderer) })
            }
            Err(e) => {
                canvas.remove();
                Err(e)
            }
        }
    }
}

impl SceneSurface for CanvasSurface {
    fn size(&self) -> SurfaceSize {
        element_size(&self.root)
    }

    fn attach_renderer(&mut self) -> Result<Box<dyn SceneRenderer>, SceneError> {
        self.renderer.take().map(|r| Box::new(r) as Box<dyn SceneRenderer>).ok_or(SceneError::RendererUnavailable)
    }

    fn frame_scheduler(&mut self) -> Result<Box<dyn FrameScheduler>, SceneError> {
        Ok(Box::new(AnimationFrameLoop::new()))
    }

    fn watch_resize(
        &mut self,
        mut on_resize: Box<dyn FnMut(SurfaceSize)>,
    ) -> Result<Box<dyn ListenerGuard>, SceneError> {
        let root = self.root.clone();
        let listener = window_listener::<web_sys::Event>("resize", &ListenerOptions::default(), move |_| {
            on_resize(element_size(&root));
        })
        .map_err(listener_error)?;
        Ok(Box::new(listener))
    }

    fn watch_pointer(
        &mut self,
        on_pointer: Box<dyn FnMut(PointerInput)>,
    ) -> Result<Box<dyn ListenerGuard>, SceneError> {
        let sink = Rc::new(RefCell::new(on_pointer));
        let last = Rc::new(Cell::new(None::<(i32, i32)>));

        let press = {
            let last = last.clone();
            EventListener::new(&self.canvas, "mousedown", move |event| {
                if let Some(event) = event.dyn_ref::<MouseEvent>() {
                    last.set(Some((event.client_x(), event.client_y())));
                }
            })
        };
        let drag = {
            let last = last.clone();
            let sink = sink.clone();
            EventListener::new(&self.canvas, "mousemove", move |event| {
                let (Some(event), Some((x, y))) = (event.dyn_ref::<MouseEvent>(), last.get()) else { return };
                let (nx, ny) = (event.client_x(), event.client_y());
                last.set(Some((nx, ny)));
                (&mut *sink.borrow_mut())(PointerInput::Drag { dx: (nx - x) as f32, dy: (ny - y) as f32 });
            })
        };
        let window = web_sys::window().ok_or_else(|| SceneError::SurfaceUnavailable("window is not available".to_string()))?;
        let release = {
            let last = last.clone();
            EventListener::new(&window, "mouseup", move |_| last.set(None))
        };
        let wheel = {
            let sink = sink.clone();
            EventListener::new_with_options(
                &self.canvas,
                "wheel",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    if let Some(event) = event.dyn_ref::<WheelEvent>() {
                        event.prevent_default();
                        (&mut *sink.borrow_mut())(PointerInput::Wheel { delta_y: event.delta_y() as f32 });
                    }
                },
            )
        };

        Ok(Box::new(PointerListeners { _listeners: vec![press, drag, release, wheel] }))
    }
}

struct PointerListeners {
    _listeners: Vec<EventListener>,
}

impl ListenerGuard for PointerListeners {
    fn remove(self: Box<Self>) {}
}

struct FrameLoopState {
    closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    handle: Cell<Option<i32>>,
    running: Cell<bool>,
}

/// `requestAnimationFrame` loop that reschedules itself until cancelled.
pub struct AnimationFrameLoop {
    state: Rc<FrameLoopState>,
}

impl AnimationFrameLoop {
    pub fn new() -> Self {
        Self {
            state: Rc::new(FrameLoopState {
                closure: RefCell::new(None),
                handle: Cell::new(None),
                running: Cell::new(false),
            }),
        }
    }

    fn schedule(state: &FrameLoopState) -> Result<(), SceneError> {
        let window = web_sys::window().ok_or_else(|| SceneError::FrameLoop("window is not available".to_string()))?;
        let closure = state.closure.borrow();
        let Some(callback) = closure.as_ref() else { return Ok(()) };
        let id = window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| SceneError::FrameLoop(format!("{:?}", e)))?;
        state.handle.set(Some(id));
        Ok(())
    }
}

impl Default for AnimationFrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler for AnimationFrameLoop {
    fn start(&mut self, mut on_frame: Box<dyn FnMut()>) -> Result<(), SceneError> {
        self.cancel();
        let weak: Weak<FrameLoopState> = Rc::downgrade(&self.state);
        let callback = Closure::wrap(Box::new(move |_timestamp: f64| {
            let Some(state) = weak.upgrade() else { return };
            state.handle.set(None);
            if !state.running.get() {
                return;
            }
            on_frame();
            if state.running.get() {
                if let Err(e) = AnimationFrameLoop::schedule(&state) {
                    get_logger().error(LogComponent::Infrastructure("FrameLoop"), &e.to_string());
                    state.running.set(false);
                }
            }
        }) as Box<dyn FnMut(f64)>);

        *self.state.closure.borrow_mut() = Some(callback);
        self.state.running.set(true);
        if let Err(e) = Self::schedule(&self.state) {
            self.state.running.set(false);
            self.state.closure.borrow_mut().take();
            return Err(e);
        }
        Ok(())
    }

    fn cancel(&mut self) {
        self.state.running.set(false);
        if let (Some(id), Some(window)) = (self.state.handle.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        self.state.closure.borrow_mut().take();
    }

    fn is_running(&self) -> bool {
        self.state.running.get()
    }
}

impl Drop for AnimationFrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

//! Headless doubles for the host capabilities, so the scene, panel and mount
//! lifecycle can be driven deterministically without a browser.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::application::{FullscreenHost, PreferenceStore};
use crate::domain::errors::{EnvironmentError, SceneError};
use crate::infrastructure::rendering::{FrameData, SceneRenderer};
use crate::scene::{Clock, FrameScheduler, ListenerGuard, PointerInput, SceneSurface, SurfaceSize};

/// Clock advanced by hand.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: Cell<f64>,
}

impl VirtualClock {
    pub fn new(start_ms: f64) -> Rc<Self> {
        Rc::new(Self { now: Cell::new(start_ms) })
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

/// What the headless renderer has been asked to do.
#[derive(Debug, Default)]
pub struct RendererProbe {
    pub viewport: Cell<SurfaceSize>,
    pub frames: Cell<u64>,
    pub last_triangles: Cell<usize>,
    pub last_lines: Cell<usize>,
    pub disposals: Cell<u32>,
    pub detachments: Cell<u32>,
    pub fail_frames: Cell<bool>,
}

pub struct HeadlessRenderer {
    probe: Rc<RendererProbe>,
}

impl SceneRenderer for HeadlessRenderer {
    fn viewport(&self) -> SurfaceSize {
        self.probe.viewport.get()
    }

    fn set_viewport(&mut self, size: SurfaceSize) {
        self.probe.viewport.set(size);
    }

    fn render(&mut self, frame: &FrameData) -> Result<(), SceneError> {
        if self.probe.fail_frames.get() {
            return Err(SceneError::Presentation("headless frame rejected".to_string()));
        }
        self.probe.frames.set(self.probe.frames.get() + 1);
        self.probe.last_triangles.set(frame.geometry.triangle_count());
        self.probe.last_lines.set(frame.geometry.line_count());
        Ok(())
    }

    fn dispose(&mut self) {
        self.probe.disposals.set(self.probe.disposals.get() + 1);
    }

    fn detach(&mut self) {
        self.probe.detachments.set(self.probe.detachments.get() + 1);
    }
}

#[derive(Default)]
struct FramesInner {
    callback: RefCell<Option<Box<dyn FnMut()>>>,
    running: Cell<bool>,
    starts: Cell<u32>,
    cancels: Cell<u32>,
}

/// Frame scheduler that only advances when [`ManualFrames::tick`] is called.
#[derive(Clone, Default)]
pub struct ManualFrames {
    inner: Rc<FramesInner>,
}

impl ManualFrames {
    /// Run one frame. Returns false when nothing is scheduled.
    pub fn tick(&self) -> bool {
        let callback = self.inner.callback.borrow_mut().take();
        let Some(mut callback) = callback else { return false };
        callback();
        if self.inner.running.get() && self.inner.callback.borrow().is_none() {
            *self.inner.callback.borrow_mut() = Some(callback);
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }

    pub fn starts(&self) -> u32 {
        self.inner.starts.get()
    }

    pub fn cancels(&self) -> u32 {
        self.inner.cancels.get()
    }
}

impl FrameScheduler for ManualFrames {
    fn start(&mut self, on_frame: Box<dyn FnMut()>) -> Result<(), SceneError> {
        *self.inner.callback.borrow_mut() = Some(on_frame);
        self.inner.running.set(true);
        self.inner.starts.set(self.inner.starts.get() + 1);
        Ok(())
    }

    fn cancel(&mut self) {
        self.inner.callback.borrow_mut().take();
        self.inner.running.set(false);
        self.inner.cancels.set(self.inner.cancels.get() + 1);
    }

    fn is_running(&self) -> bool {
        self.inner.running.get()
    }
}

/// One registered listener callback plus add/remove counters.
struct ListenerSlot<T> {
    callback: RefCell<Option<Box<dyn FnMut(T)>>>,
    added: Cell<u32>,
    removed: Cell<u32>,
}

impl<T> Default for ListenerSlot<T> {
    fn default() -> Self {
        Self { callback: RefCell::new(None), added: Cell::new(0), removed: Cell::new(0) }
    }
}

impl<T> ListenerSlot<T> {
    fn emit(&self, value: T) -> bool {
        let callback = self.callback.borrow_mut().take();
        let Some(mut callback) = callback else { return false };
        callback(value);
        if self.callback.borrow().is_none() {
            *self.callback.borrow_mut() = Some(callback);
        }
        true
    }
}

struct SlotGuard<T: 'static> {
    slot: Rc<ListenerSlot<T>>,
}

impl<T: 'static> ListenerGuard for SlotGuard<T> {
    fn remove(self: Box<Self>) {
        self.slot.callback.borrow_mut().take();
        self.slot.removed.set(self.slot.removed.get() + 1);
    }
}

/// In-memory display surface.
pub struct HeadlessSurface {
    size: SurfaceSize,
    renderer_taken: bool,
    probe: Rc<RendererProbe>,
    frames: ManualFrames,
    resize: Rc<ListenerSlot<SurfaceSize>>,
    pointer: Rc<ListenerSlot<PointerInput>>,
    fail_scheduler: bool,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: SurfaceSize::new(width, height),
            renderer_taken: false,
            probe: Rc::new(RendererProbe::default()),
            frames: ManualFrames::default(),
            resize: Rc::new(ListenerSlot::default()),
            pointer: Rc::new(ListenerSlot::default()),
            fail_scheduler: false,
        }
    }

    /// Make `frame_scheduler` fail, to exercise partial-setup cleanup.
    pub fn with_failing_scheduler(mut self) -> Self {
        self.fail_scheduler = true;
        self
    }

    /// Change the size and notify the resize listener, if any.
    pub fn resize_to(&mut self, width: u32, height: u32) -> bool {
        self.size = SurfaceSize::new(width, height);
        self.resize.emit(self.size)
    }

    pub fn send_pointer(&self, input: PointerInput) -> bool {
        self.pointer.emit(input)
    }

    pub fn frames(&self) -> ManualFrames {
        self.frames.clone()
    }

    pub fn probe(&self) -> Rc<RendererProbe> {
        self.probe.clone()
    }

    pub fn active_listeners(&self) -> u32 {
        (self.resize.added.get() - self.resize.removed.get()) + (self.pointer.added.get() - self.pointer.removed.get())
    }
}

impl SceneSurface for HeadlessSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn attach_renderer(&mut self) -> Result<Box<dyn SceneRenderer>, SceneError> {
        if self.renderer_taken {
            return Err(SceneError::RendererUnavailable);
        }
        self.renderer_taken = true;
        Ok(Box::new(HeadlessRenderer { probe: self.probe.clone() }))
    }

    fn frame_scheduler(&mut self) -> Result<Box<dyn FrameScheduler>, SceneError> {
        if self.fail_scheduler {
            return Err(SceneError::FrameLoop("headless scheduler disabled".to_string()));
        }
        Ok(Box::new(self.frames.clone()))
    }

    fn watch_resize(
        &mut self,
        on_resize: Box<dyn FnMut(SurfaceSize)>,
    ) -> Result<Box<dyn ListenerGuard>, SceneError> {
        *self.resize.callback.borrow_mut() = Some(on_resize);
        self.resize.added.set(self.resize.added.get() + 1);
        Ok(Box::new(SlotGuard { slot: self.resize.clone() }))
    }

    fn watch_pointer(
        &mut self,
        on_pointer: Box<dyn FnMut(PointerInput)>,
    ) -> Result<Box<dyn ListenerGuard>, SceneError> {
        *self.pointer.callback.borrow_mut() = Some(on_pointer);
        self.pointer.added.set(self.pointer.added.get() + 1);
        Ok(Box::new(SlotGuard { slot: self.pointer.clone() }))
    }
}

/// Preference store backed by a map; can be switched to fail every call.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RefCell<HashMap<String, String>>,
    failing: Cell<bool>,
    writes: Cell<u32>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn with_value(key: &str, value: &str) -> Rc<Self> {
        let store = Self::default();
        store.values.borrow_mut().insert(key.to_string(), value.to_string());
        Rc::new(store)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, EnvironmentError> {
        if self.failing.get() {
            return Err(EnvironmentError::StorageUnavailable("memory store failing".to_string()));
        }
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EnvironmentError> {
        if self.failing.get() {
            return Err(EnvironmentError::StorageUnavailable("memory store failing".to_string()));
        }
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Fullscreen host that flips immediately, or rejects when unsupported.
#[derive(Debug, Default)]
pub struct FakeFullscreen {
    active: Cell<bool>,
    unsupported: Cell<bool>,
    requests: Cell<u32>,
    exits: Cell<u32>,
}

impl FakeFullscreen {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn unsupported() -> Rc<Self> {
        let host = Self::default();
        host.unsupported.set(true);
        Rc::new(host)
    }

    pub fn requests(&self) -> u32 {
        self.requests.get()
    }

    pub fn exits(&self) -> u32 {
        self.exits.get()
    }
}

impl FullscreenHost for FakeFullscreen {
    fn is_fullscreen(&self) -> bool {
        self.active.get()
    }

    fn request(&self) -> Result<(), EnvironmentError> {
        self.requests.set(self.requests.get() + 1);
        if self.unsupported.get() {
            return Err(EnvironmentError::FullscreenRejected("not supported".to_string()));
        }
        self.active.set(true);
        Ok(())
    }

    fn exit(&self) -> Result<(), EnvironmentError> {
        self.exits.set(self.exits.get() + 1);
        self.active.set(false);
        Ok(())
    }
}

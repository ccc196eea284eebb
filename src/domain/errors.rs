use std::fmt::{Display, Formatter, Result as FmtResult};

/// Root error type for the widget.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    Scene(SceneError),
    Event(EventError),
    Environment(EnvironmentError),
    Resource(ResourceError),
    Configuration(String),
}

/// Failures while constructing or presenting the 3D scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    SurfaceUnavailable(String),
    InvalidDimensions { width: u32, height: u32 },
    EmptyDataStore,
    RendererUnavailable,
    GraphicsInitialization(String),
    FrameLoop(String),
    Presentation(String),
    InvalidConfiguration(String),
}

/// Malformed or unknown bus payloads. Always handled as a logged no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum EventError {
    UnknownEvent(String),
    MalformedPayload { event: String, reason: String },
}

/// Host capabilities that may be missing (fullscreen, storage, window).
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentError {
    WindowUnavailable,
    StorageUnavailable(String),
    FullscreenRejected(String),
    ListenerRejected(String),
}

/// Misuse of the geometry/material registry.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    UnknownGeometry(u32),
    UnknownMaterial(u32),
    AlreadyDisposed { kind: &'static str, id: u32 },
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AppError::Scene(e) => write!(f, "Scene Error: {}", e),
            AppError::Event(e) => write!(f, "Event Error: {}", e),
            AppError::Environment(e) => write!(f, "Environment Error: {}", e),
            AppError::Resource(e) => write!(f, "Resource Error: {}", e),
            AppError::Configuration(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl Display for SceneError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            SceneError::SurfaceUnavailable(msg) => write!(f, "surface unavailable: {}", msg),
            SceneError::InvalidDimensions { width, height } => {
                write!(f, "surface has invalid dimensions {}x{}", width, height)
            }
            SceneError::EmptyDataStore => write!(f, "sample data store has no candles"),
            SceneError::RendererUnavailable => write!(f, "renderer already attached or missing"),
            SceneError::GraphicsInitialization(msg) => write!(f, "graphics initialization failed: {}", msg),
            SceneError::FrameLoop(msg) => write!(f, "frame loop failed: {}", msg),
            SceneError::Presentation(msg) => write!(f, "frame presentation failed: {}", msg),
            SceneError::InvalidConfiguration(msg) => write!(f, "invalid scene configuration: {}", msg),
        }
    }
}

impl Display for EventError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EventError::UnknownEvent(name) => write!(f, "unknown event '{}'", name),
            EventError::MalformedPayload { event, reason } => {
                write!(f, "malformed '{}' payload: {}", event, reason)
            }
        }
    }
}

impl Display for EnvironmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EnvironmentError::WindowUnavailable => write!(f, "window is not available"),
            EnvironmentError::StorageUnavailable(msg) => write!(f, "storage unavailable: {}", msg),
            EnvironmentError::FullscreenRejected(msg) => write!(f, "fullscreen rejected: {}", msg),
            EnvironmentError::ListenerRejected(event) => write!(f, "could not listen for '{}'", event),
        }
    }
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ResourceError::UnknownGeometry(id) => write!(f, "unknown geometry #{}", id),
            ResourceError::UnknownMaterial(id) => write!(f, "unknown material #{}", id),
            ResourceError::AlreadyDisposed { kind, id } => write!(f, "{} #{} disposed twice", kind, id),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for SceneError {}
impl std::error::Error for EventError {}
impl std::error::Error for EnvironmentError {}
impl std::error::Error for ResourceError {}

impl From<SceneError> for AppError {
    fn from(error: SceneError) -> Self {
        AppError::Scene(error)
    }
}

impl From<EventError> for AppError {
    fn from(error: EventError) -> Self {
        AppError::Event(error)
    }
}

impl From<EnvironmentError> for AppError {
    fn from(error: EnvironmentError) -> Self {
        AppError::Environment(error)
    }
}

impl From<ResourceError> for AppError {
    fn from(error: ResourceError) -> Self {
        AppError::Resource(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Configuration(error.to_string())
    }
}

impl From<AppError> for wasm_bindgen::JsValue {
    fn from(error: AppError) -> Self {
        wasm_bindgen::JsValue::from_str(&error.to_string())
    }
}

pub type SceneResult<T> = Result<T, SceneError>;

use lumen_core::MeshError;
use thiserror::Error;

/// Errors raised while assembling a scene or configuring an integrator.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Area light bound to instance '{0}' which has no emission")]
    MissingEmission(String),

    #[error("Light selection has {weights} weights for {lights} lights")]
    LightWeightCount { weights: usize, lights: usize },

    #[error("Light selection weights carry no positive mass")]
    LightWeightMass,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid mesh: {0}")]
    Mesh(#[from] MeshError),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised by the render driver.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

pub type RenderResult<T> = Result<T, RenderError>;

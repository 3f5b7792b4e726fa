use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlMapperError {
    #[error("Registration error: {0}")]
    RegistrationError(String),

    #[error("Projection error: {0}")]
    ProjectionError(String),

    #[error("Cyclic entity graph: {0}")]
    CyclicEntity(String),

    #[error("Parameter binding error: {0}")]
    ParameterError(String),

    #[error("Translation error: {0}")]
    TranslationError(String),
}

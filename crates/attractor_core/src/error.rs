use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Unknown field `{0}`.")]
    UnknownField(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Trail engine was used after dispose.")]
    UseAfterDispose,

    #[error("Parameters for `{given}` cannot be applied to active field `{active}`.")]
    ParameterMismatch {
        active: &'static str,
        given: &'static str,
    },

    #[error("Field `{field}` has no parameter named `{name}`.")]
    UnknownParameter { field: &'static str, name: String },

    #[error("Invalid color `{0}`; expected #rrggbb.")]
    InvalidColor(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

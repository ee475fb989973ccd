use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty {
        field: &'static str,
    },
    UnsupportedOption {
        option: &'static str,
        operation: &'static str,
    },
    InvalidClientId {
        input: String,
    },
    InvalidEndpoint {
        input: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::UnsupportedOption { option, operation } => {
                write!(f, "option {option} is not accepted by {operation}")
            }
            Self::InvalidClientId { input } => write!(f, "invalid client id: {input}"),
            Self::InvalidEndpoint { input } => write!(f, "invalid endpoint url: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}

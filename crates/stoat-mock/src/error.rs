//! Error types for stoat-mock.

use stoat_value::{PropertyError, PropertyKey};
use thiserror::Error;

/// Errors that can occur during mock registry and spy operations.
#[derive(Error, Debug)]
pub enum MockError {
    /// resolve() found neither a real module nor a registered factory.
    #[error("cannot resolve module '{specifier}': not in the module graph and no factory registered")]
    UnresolvedModule {
        /// The module specifier that failed to resolve.
        specifier: String,
    },

    /// Write to a get-only or otherwise read-only mocked property.
    #[error("cannot assign to read-only property '{property}'")]
    ImmutableProperty {
        /// The property name.
        property: String,
    },

    /// The named export does not exist on the resolved namespace.
    #[error("module '{specifier}' has no export named '{name}'")]
    NoSuchExport {
        /// The module specifier.
        specifier: String,
        /// The missing export name.
        name: String,
    },

    /// The spy target has no such own property.
    #[error("no property named '{property}' to spy on")]
    NoSuchProperty {
        /// The property name.
        property: String,
    },

    /// The target property exists but is not the expected callable shape.
    #[error("property '{property}' is not callable")]
    NotCallable {
        /// The property name.
        property: String,
    },

    /// The target function is real, not a tracked mock.
    #[error("'{name}' is not a mocked function")]
    NotMocked {
        /// The function or property name.
        name: String,
    },

    /// An accessor raised while the mock layer was reading or writing
    /// through it.
    #[error("accessor for '{property}' threw: {thrown}")]
    AccessorThrew {
        /// The property name.
        property: String,
        /// Debug rendering of the thrown value.
        thrown: String,
    },
}

impl From<PropertyError> for MockError {
    fn from(e: PropertyError) -> Self {
        match e {
            PropertyError::ReadOnly(key)
            | PropertyError::GetterOnly(key)
            | PropertyError::NotExtensible(key) => Self::ImmutableProperty {
                property: key.to_string(),
            },
            PropertyError::Thrown(key, value) => Self::AccessorThrew {
                property: key.to_string(),
                thrown: format!("{:?}", value),
            },
        }
    }
}

impl MockError {
    /// Shorthand for a missing-export error.
    pub fn no_such_export(specifier: &str, name: &PropertyKey) -> Self {
        Self::NoSuchExport {
            specifier: specifier.to_string(),
            name: name.to_string(),
        }
    }
}

/// Result type alias for mock operations.
pub type MockResult<T> = Result<T, MockError>;

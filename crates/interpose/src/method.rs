//! Operation descriptors.
//!
//! A [`MethodDescriptor`] names what is being invoked. The engine never
//! interprets it; it is carried for interceptors and the terminal handler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Descriptor of the invoked operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptor {
    /// Type that declares the operation.
    pub declaring_type: String,
    /// Operation name.
    pub name: String,
    /// Parameter type names, in order.
    pub parameter_types: Vec<String>,
    /// Return type name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
}

impl MethodDescriptor {
    /// Create a descriptor with no parameters and no return type.
    #[must_use]
    pub fn new(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            name: name.into(),
            parameter_types: Vec::new(),
            return_type: None,
        }
    }

    /// Set the parameter type names.
    #[must_use]
    pub fn with_parameters<I, S>(mut self, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_types = parameter_types.into_iter().map(Into::into).collect();
        self
    }

    /// Set the return type name.
    #[must_use]
    pub fn returning(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    /// Render as `Type::name(A, B) -> R`.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut out = format!(
            "{}::{}({})",
            self.declaring_type,
            self.name,
            self.parameter_types.join(", ")
        );
        if let Some(ret) = &self.return_type {
            out.push_str(" -> ");
            out.push_str(ret);
        }
        out
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

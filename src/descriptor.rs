//! Route descriptor: explicit schema check over the raw `route` export.

use crate::error::RegisterError;
use axum::routing::MethodFilter;
use serde_json::Value;

pub const DEFAULT_METHOD: &str = "get";
pub const DEFAULT_TYPE: &str = "html";

/// Validated per-page route configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: String,
    pub method: String,
    pub response_type: String,
}

impl RouteDescriptor {
    /// Parses the raw `route` export. `file` is the module path relative to
    /// the dist directory, used only in error messages.
    pub fn from_export(route: &Value, file: &str) -> Result<Self, RegisterError> {
        let route = route.as_object().ok_or_else(|| RegisterError::MissingRoute {
            file: file.to_string(),
        })?;

        let method = match route.get("method") {
            None | Some(Value::Null) => DEFAULT_METHOD.to_string(),
            Some(Value::String(m)) => m.clone(),
            Some(_) => {
                return Err(RegisterError::MethodNotString {
                    file: file.to_string(),
                })
            }
        };

        let path = match route.get("path") {
            None | Some(Value::Null) => {
                return Err(RegisterError::MissingPath {
                    file: file.to_string(),
                })
            }
            Some(Value::String(p)) => p.clone(),
            Some(_) => {
                return Err(RegisterError::PathNotString {
                    file: file.to_string(),
                })
            }
        };
        // The router panics on relative paths; catch them here so one bad
        // descriptor stays a per-module error.
        if !path.starts_with('/') {
            return Err(RegisterError::PathNotAbsolute {
                file: file.to_string(),
            });
        }

        let response_type = match route.get("type") {
            Some(Value::String(t)) => t.clone(),
            _ => DEFAULT_TYPE.to_string(),
        };

        Ok(RouteDescriptor {
            path,
            method,
            response_type,
        })
    }

    /// Maps the lower-cased method onto the router's method filter.
    pub fn method_filter(&self, file: &str) -> Result<MethodFilter, RegisterError> {
        match self.method.to_ascii_lowercase().as_str() {
            "get" => Ok(MethodFilter::GET),
            "post" => Ok(MethodFilter::POST),
            "put" => Ok(MethodFilter::PUT),
            "delete" => Ok(MethodFilter::DELETE),
            "patch" => Ok(MethodFilter::PATCH),
            "head" => Ok(MethodFilter::HEAD),
            "options" => Ok(MethodFilter::OPTIONS),
            "trace" => Ok(MethodFilter::TRACE),
            _ => Err(RegisterError::UnsupportedMethod {
                method: self.method.clone(),
                file: file.to_string(),
            }),
        }
    }
}

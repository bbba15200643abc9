//! Typed handler arguments built from invoke messages.
//!
//! Missing optional payloads are replaced with empty values: handlers always
//! see a project, a service and a service context (with empty artifact lists).

use crate::proto::{
    InvokeProjectHandler, InvokeServiceHandler, ProjectConfig, ServiceConfig, ServiceContext,
};

/// Which registry a handler belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerCategory {
    /// Project-scoped lifecycle events.
    Project,
    /// Service-scoped lifecycle events.
    Service,
}

impl HandlerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerCategory::Project => "project",
            HandlerCategory::Service => "service",
        }
    }
}

impl std::fmt::Display for HandlerCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments passed to a project handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectEventArgs {
    pub project: ProjectConfig,
}

impl From<InvokeProjectHandler> for ProjectEventArgs {
    fn from(invoke: InvokeProjectHandler) -> Self {
        Self {
            project: invoke.project.unwrap_or_default(),
        }
    }
}

/// Arguments passed to a service handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceEventArgs {
    pub project: ProjectConfig,
    pub service: ServiceConfig,
    pub service_context: ServiceContext,
}

impl From<InvokeServiceHandler> for ServiceEventArgs {
    fn from(invoke: InvokeServiceHandler) -> Self {
        Self {
            project: invoke.project.unwrap_or_default(),
            service: invoke.service.unwrap_or_default(),
            service_context: invoke.service_context.unwrap_or_default(),
        }
    }
}

/// Filters attached to a service subscription.
///
/// Empty strings match every host/language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceEventOptions {
    pub host: String,
    pub language: String,
}

impl ServiceEventOptions {
    pub fn new(host: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            language: language.into(),
        }
    }

    /// Restricts to services deployed to `host`.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Restricts to services written in `language`.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

//! # Wire types for the host event stream.
//!
//! Protobuf messages exchanged over `/azdext.EventService/EventStream` plus the
//! hand-maintained tonic client for that RPC. The schema lives in
//! `proto/event.proto`; field tags here must match it.
//!
//! Both directions share one envelope, [`EventMessage`], whose `message_type`
//! oneof carries exactly one variant:
//!
//! ```text
//! extension ──► host : SubscribeProjectEvent | SubscribeServiceEvent
//!                      ExtensionReadyEvent
//!                      ProjectHandlerStatus  | ServiceHandlerStatus
//! host ──► extension : InvokeProjectHandler  | InvokeServiceHandler
//! ```

mod client;

use std::collections::HashMap;

use event_message::MessageType;

pub use client::EventServiceClient;

/// Status reported for a handler that returned `Ok`.
pub const STATUS_COMPLETED: &str = "completed";
/// Status reported for a handler that returned an error or panicked.
pub const STATUS_FAILED: &str = "failed";
/// Status carried by the one-time readiness message.
pub const STATUS_READY: &str = "ready";

/// Envelope for every message on the event stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventMessage {
    #[prost(oneof = "event_message::MessageType", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub message_type: ::core::option::Option<event_message::MessageType>,
}

/// Nested types for [`EventMessage`].
pub mod event_message {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum MessageType {
        #[prost(message, tag = "1")]
        SubscribeProjectEvent(super::SubscribeProjectEvent),
        #[prost(message, tag = "2")]
        InvokeProjectHandler(super::InvokeProjectHandler),
        #[prost(message, tag = "3")]
        ProjectHandlerStatus(super::ProjectHandlerStatus),
        #[prost(message, tag = "4")]
        SubscribeServiceEvent(super::SubscribeServiceEvent),
        #[prost(message, tag = "5")]
        InvokeServiceHandler(super::InvokeServiceHandler),
        #[prost(message, tag = "6")]
        ServiceHandlerStatus(super::ServiceHandlerStatus),
        #[prost(message, tag = "7")]
        ExtensionReadyEvent(super::ExtensionReadyEvent),
    }

    impl MessageType {
        /// Short stable name of the variant, used in logs.
        pub fn as_label(&self) -> &'static str {
            match self {
                MessageType::SubscribeProjectEvent(_) => "subscribe_project_event",
                MessageType::InvokeProjectHandler(_) => "invoke_project_handler",
                MessageType::ProjectHandlerStatus(_) => "project_handler_status",
                MessageType::SubscribeServiceEvent(_) => "subscribe_service_event",
                MessageType::InvokeServiceHandler(_) => "invoke_service_handler",
                MessageType::ServiceHandlerStatus(_) => "service_handler_status",
                MessageType::ExtensionReadyEvent(_) => "extension_ready_event",
            }
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExtensionReadyEvent {
    #[prost(string, tag = "1")]
    pub status: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeProjectEvent {
    #[prost(string, repeated, tag = "1")]
    pub event_names: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeServiceEvent {
    #[prost(string, repeated, tag = "1")]
    pub event_names: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    /// Only services written in this language are of interest (`""` = any).
    #[prost(string, tag = "2")]
    pub language: ::prost::alloc::string::String,
    /// Only services deployed to this host kind are of interest (`""` = any).
    #[prost(string, tag = "3")]
    pub host: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeProjectHandler {
    #[prost(string, tag = "1")]
    pub event_name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub project: ::core::option::Option<ProjectConfig>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvokeServiceHandler {
    #[prost(string, tag = "1")]
    pub event_name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub project: ::core::option::Option<ProjectConfig>,
    #[prost(message, optional, tag = "3")]
    pub service: ::core::option::Option<ServiceConfig>,
    #[prost(message, optional, tag = "4")]
    pub service_context: ::core::option::Option<ServiceContext>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectHandlerStatus {
    #[prost(string, tag = "1")]
    pub event_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub status: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceHandlerStatus {
    #[prost(string, tag = "1")]
    pub event_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub service_name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub status: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub message: ::prost::alloc::string::String,
}

/// Project configuration as resolved by the host.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProjectConfig {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub resource_group_name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub path: ::prost::alloc::string::String,
    #[prost(map = "string, message", tag = "4")]
    pub services: HashMap<::prost::alloc::string::String, ServiceConfig>,
}

/// Service configuration as resolved by the host.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceConfig {
    #[prost(string, tag = "1")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub resource_group_name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub resource_name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub api_version: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub relative_path: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub host: ::prost::alloc::string::String,
    #[prost(string, tag = "7")]
    pub language: ::prost::alloc::string::String,
    #[prost(string, tag = "8")]
    pub output_path: ::prost::alloc::string::String,
    #[prost(string, tag = "9")]
    pub image: ::prost::alloc::string::String,
}

/// Artifacts produced so far by each lifecycle phase of a service.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServiceContext {
    #[prost(message, repeated, tag = "1")]
    pub restore: ::prost::alloc::vec::Vec<Artifact>,
    #[prost(message, repeated, tag = "2")]
    pub build: ::prost::alloc::vec::Vec<Artifact>,
    #[prost(message, repeated, tag = "3")]
    pub package: ::prost::alloc::vec::Vec<Artifact>,
    #[prost(message, repeated, tag = "4")]
    pub publish: ::prost::alloc::vec::Vec<Artifact>,
    #[prost(message, repeated, tag = "5")]
    pub deploy: ::prost::alloc::vec::Vec<Artifact>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Artifact {
    #[prost(enumeration = "ArtifactKind", tag = "1")]
    pub kind: i32,
    #[prost(string, tag = "2")]
    pub location: ::prost::alloc::string::String,
    #[prost(enumeration = "LocationKind", tag = "3")]
    pub location_kind: i32,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<::prost::alloc::string::String, ::prost::alloc::string::String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ArtifactKind {
    Unspecified = 0,
    Directory = 1,
    Config = 2,
    Archive = 3,
    Container = 4,
    Endpoint = 5,
    Deployment = 6,
    Resource = 7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum LocationKind {
    Unspecified = 0,
    Local = 1,
    Remote = 2,
}

impl EventMessage {
    fn of(message_type: MessageType) -> Self {
        Self {
            message_type: Some(message_type),
        }
    }

    /// Declares interest in project-level events.
    pub fn subscribe_project(event_names: Vec<String>) -> Self {
        Self::of(MessageType::SubscribeProjectEvent(SubscribeProjectEvent {
            event_names,
        }))
    }

    /// Declares interest in service-level events, optionally filtered by host and language.
    pub fn subscribe_service(
        event_names: Vec<String>,
        host: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self::of(MessageType::SubscribeServiceEvent(SubscribeServiceEvent {
            event_names,
            language: language.into(),
            host: host.into(),
        }))
    }

    /// Signals the host that the extension is listening.
    pub fn ready() -> Self {
        Self::of(MessageType::ExtensionReadyEvent(ExtensionReadyEvent {
            status: STATUS_READY.to_string(),
            message: String::new(),
        }))
    }

    pub fn project_handler_status(
        event_name: impl Into<String>,
        status: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::of(MessageType::ProjectHandlerStatus(ProjectHandlerStatus {
            event_name: event_name.into(),
            status: status.into(),
            message: message.into(),
        }))
    }

    pub fn service_handler_status(
        event_name: impl Into<String>,
        service_name: impl Into<String>,
        status: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::of(MessageType::ServiceHandlerStatus(ServiceHandlerStatus {
            event_name: event_name.into(),
            service_name: service_name.into(),
            status: status.into(),
            message: message.into(),
        }))
    }

    /// Asks the extension to run its project handler for `event_name`.
    pub fn invoke_project(event_name: impl Into<String>, project: ProjectConfig) -> Self {
        Self::of(MessageType::InvokeProjectHandler(InvokeProjectHandler {
            event_name: event_name.into(),
            project: Some(project),
        }))
    }

    /// Asks the extension to run its service handler for `event_name`.
    pub fn invoke_service(
        event_name: impl Into<String>,
        project: ProjectConfig,
        service: ServiceConfig,
        service_context: Option<ServiceContext>,
    ) -> Self {
        Self::of(MessageType::InvokeServiceHandler(InvokeServiceHandler {
            event_name: event_name.into(),
            project: Some(project),
            service: Some(service),
            service_context,
        }))
    }

    /// Variant label, or `"empty"` when no variant is set.
    pub fn label(&self) -> &'static str {
        self.message_type
            .as_ref()
            .map(MessageType::as_label)
            .unwrap_or("empty")
    }
}

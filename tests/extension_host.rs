mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::*;
use hookstream::proto::{EventMessage, ProjectConfig, ServiceConfig};
use hookstream::{
    EventManager, EventTransport, ExtensionHost, HostError, InboundStream, ManagerState,
    MemoryTransport, OutboundStream, ServiceEventOptions,
};
use tokio_util::sync::CancellationToken;
use tonic::Status;

#[tokio::test]
async fn subscriptions_precede_ready_and_invokes_are_served() {
    let (manager, mut host) = manager();
    let ext = ExtensionHost::builder(manager.clone())
        .with_project_event_handler("preprovision", noop_project())
        .with_service_event_handler(
            "predeploy",
            noop_service(),
            Some(ServiceEventOptions::default().with_host("containerapp")),
        )
        .handle_signals(false)
        .build();

    let token = CancellationToken::new();
    let run = {
        let token = token.clone();
        tokio::spawn(async move { ext.run(token).await })
    };

    assert_eq!(
        next(&mut host).await,
        EventMessage::subscribe_project(vec!["preprovision".into()])
    );
    assert_eq!(
        next(&mut host).await,
        EventMessage::subscribe_service(vec!["predeploy".into()], "containerapp", "")
    );
    assert!(is_ready(&next(&mut host).await));

    host.send(EventMessage::invoke_service(
        "predeploy",
        ProjectConfig::default(),
        ServiceConfig {
            name: "api".into(),
            ..Default::default()
        },
        None,
    ));
    assert_eq!(
        next(&mut host).await,
        EventMessage::service_handler_status("predeploy", "api", "completed", "")
    );

    token.cancel();
    tokio::time::timeout(WAIT, run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(manager.state(), ManagerState::Terminated);
}

#[tokio::test]
async fn registrations_keep_declaration_order_across_categories() {
    let (manager, mut host) = manager();
    let ext = ExtensionHost::builder(manager.clone())
        .with_service_event_handler("prepackage", noop_service(), None)
        .with_project_event_handler("preprovision", noop_project())
        .with_service_event_handler("postdeploy", noop_service(), None)
        .handle_signals(false)
        .build();

    let token = CancellationToken::new();
    let run = {
        let token = token.clone();
        tokio::spawn(async move { ext.run(token).await })
    };

    assert_eq!(
        next(&mut host).await,
        EventMessage::subscribe_service(vec!["prepackage".into()], "", "")
    );
    assert_eq!(
        next(&mut host).await,
        EventMessage::subscribe_project(vec!["preprovision".into()])
    );
    assert_eq!(
        next(&mut host).await,
        EventMessage::subscribe_service(vec!["postdeploy".into()], "", "")
    );
    assert!(is_ready(&next(&mut host).await));

    token.cancel();
    tokio::time::timeout(WAIT, run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn run_returns_when_host_closes_stream() {
    let (manager, mut host) = manager();
    let ext = ExtensionHost::builder(manager.clone())
        .with_project_event_handler("postprovision", noop_project())
        .handle_signals(false)
        .build();

    let run = tokio::spawn(async move { ext.run(CancellationToken::new()).await });
    next(&mut host).await;
    assert!(is_ready(&next(&mut host).await));

    host.close();
    tokio::time::timeout(WAIT, run)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(manager.state(), ManagerState::Terminated);
}

#[tokio::test]
async fn run_without_handlers_returns_immediately() {
    let (transport, _host) = MemoryTransport::pair();
    let manager = EventManager::new(transport.clone(), &config());
    let ext = ExtensionHost::builder(manager.clone())
        .handle_signals(false)
        .build();

    tokio::time::timeout(Duration::from_millis(200), ext.run(CancellationToken::new()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(transport.open_count(), 0);
    assert_eq!(manager.state(), ManagerState::Uninitialized);
}

struct RefusingTransport;

#[async_trait]
impl EventTransport for RefusingTransport {
    async fn open(&self, _outbound: OutboundStream) -> Result<InboundStream, Status> {
        Err(Status::permission_denied("bad token"))
    }
}

#[tokio::test]
async fn registration_failure_names_the_event() {
    let manager = EventManager::new(Arc::new(RefusingTransport), &config());
    let ext = ExtensionHost::builder(manager.clone())
        .with_project_event_handler("preprovision", noop_project())
        .handle_signals(false)
        .build();

    let err = ext.run(CancellationToken::new()).await.unwrap_err();
    match &err {
        HostError::Registration { event_name, .. } => assert_eq!(event_name, "preprovision"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.as_label(), "host_registration_failed");
    assert_eq!(manager.state(), ManagerState::Terminated);
}

#[tokio::test]
async fn cancelled_token_disposes_manager() {
    let (manager, mut host) = manager();
    let ext = ExtensionHost::builder(manager.clone())
        .with_project_event_handler("preprovision", noop_project())
        .handle_signals(false)
        .build();

    let token = CancellationToken::new();
    token.cancel();
    tokio::time::timeout(WAIT, ext.run(token))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(manager.state(), ManagerState::Terminated);
    // Anything still queued at dispose time is discarded.
    assert!(host.drain_outbound(QUIET).await.is_empty());
}

//! Minimal extension: logs every project/service lifecycle event it is invoked for.
//!
//! Run under the host, which exports `AZD_SERVER` and `AZD_ACCESS_TOKEN`:
//! ```text
//! RUST_LOG=info cargo run --example echo_extension
//! ```

use std::sync::Arc;

use hookstream::{
    Config, EventManager, ExtensionHost, GrpcTransport, HandlerError, HandlerFn, HostChannel,
    LogWriter, ProjectEventArgs, ServiceEventArgs, ServiceEventOptions, Subscribe,
};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = Config::from_env()?;
    let channel = HostChannel::connect(&cfg).await?;
    let transport = Arc::new(GrpcTransport::new(&channel)?);

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let manager = EventManager::builder(transport, &cfg)
        .with_subscribers(subs)
        .build();

    let host = ExtensionHost::builder(manager)
        .with_project_event_handler(
            "preprovision",
            HandlerFn::arc(|_ctx: CancellationToken, args: ProjectEventArgs| async move {
                info!(
                    project = %args.project.name,
                    services = args.project.services.len(),
                    "preprovision"
                );
                Ok(())
            }),
        )
        .with_service_event_handler(
            "prepackage",
            HandlerFn::arc(|_ctx: CancellationToken, args: ServiceEventArgs| async move {
                if args.service.relative_path.is_empty() {
                    return Err(HandlerError::fail(format!(
                        "service {} has no project path",
                        args.service.name
                    )));
                }
                info!(
                    service = %args.service.name,
                    path = %args.service.relative_path,
                    "prepackage"
                );
                Ok(())
            }),
            Some(ServiceEventOptions::default().with_language("python")),
        )
        .build();

    host.run(CancellationToken::new()).await?;
    channel.close();
    Ok(())
}

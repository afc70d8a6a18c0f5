use crate::{
    core::Subsystem,
    index::Store,
    k8s::{DynamicObject, ResourceKind, Watch},
    reconcile::KindIndex,
};
use anyhow::{bail, Result};
use clap::Parser;
use kube::{api::Api, runtime::watcher};
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(name = "appprotect", about = "An App Protect resource controller")]
pub struct Args {
    #[clap(
        long,
        default_value = "appprotect=info,warn",
        env = "APPPROTECT_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// The subsystem whose resources are indexed: `app-protect` or `dos`.
    #[clap(long, default_value = "app-protect")]
    subsystem: Subsystem,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            subsystem,
        } = self;

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_admin(admin.into_builder())
            .with_client(client)
            .build()
            .await?;

        // Every watch applies its events to the same store, one event at a time.
        let store = Store::shared(subsystem);

        for &kind in ResourceKind::watched_by(subsystem) {
            let api = Api::<DynamicObject>::all_with(runtime.client(), &kind.api_resource());
            let watch = Watch::from(watcher(api, watcher::Config::default()))
                .instrument(info_span!("watch", %kind));
            let index = KindIndex::shared(kind, store.clone());
            tokio::spawn(
                kubert::index::namespaced(index, watch.into_stream())
                    .instrument(info_span!("index", %kind)),
            );
        }
        info!(%subsystem, "Watching App Protect resources");

        // Block the main thread on the shutdown signal.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

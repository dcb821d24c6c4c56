use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use k8s_openapi::{api::core::v1::Namespace, apimachinery::pkg::apis::meta::v1::ObjectMeta};
use kube_client::{
    api::{ListParams, PostParams},
    Api, Client,
};
use kube_core::ResourceExt;
use tokio_util::sync::CancellationToken;

use kube_crd_controller::{
    controller::StatusProcessor,
    crd::{example::ExampleSpec, jinghzhu::JinghzhuSpec, test0::TestSpec, Example, Jinghzhu, Kind, Test},
    definition,
    resource::LifecycleResource,
    Controller, CrdClient, Error, Poll, Settings,
};

/// Registers a CRD, runs its controller, and walks one instance through to `Processed`.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Which custom resource kind to demonstrate
    #[arg(long, default_value = "jinghzhu")]
    kind: Kind,
    /// Name of the instance to create
    #[arg(long, default_value = "demo1")]
    name: String,
    /// Namespace for the instance, overriding CRD_NAMESPACE
    #[arg(long)]
    namespace: Option<String>,
    /// Kubeconfig path, overriding KUBECONFIG
    #[arg(long)]
    kubeconfig: Option<PathBuf>,
    /// Seconds to keep running after the instance is processed
    #[arg(long, default_value_t = 5)]
    linger: u64,
    /// Leave the CRD installed on exit
    #[arg(long)]
    keep_crd: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env();
    if let Some(namespace) = &cli.namespace {
        settings.crd_namespace = namespace.clone();
    }
    if let Some(kubeconfig) = &cli.kubeconfig {
        settings.kubeconfig = kubeconfig.clone();
    }

    let client = settings.client().await.context("connecting to cluster")?;
    ensure_namespace(client.clone(), &settings.crd_namespace).await?;

    match cli.kind {
        Kind::Example => {
            let instance = Example::new(&cli.name, ExampleSpec {
                foo: "hello".into(),
                bar: true,
            });
            demo(client, &settings, &cli, instance).await
        }
        Kind::Test => {
            let instance = Test::new(&cli.name, TestSpec {
                foo: "hello".into(),
                bar: true,
            });
            demo(client, &settings, &cli, instance).await
        }
        Kind::Jinghzhu => {
            let instance = Jinghzhu::new(&cli.name, JinghzhuSpec {
                desired: 1,
                ..Default::default()
            });
            demo(client, &settings, &cli, instance).await
        }
    }
}

async fn ensure_namespace(client: Client, name: &str) -> anyhow::Result<()> {
    let namespace = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            ..ObjectMeta::default()
        },
        ..Namespace::default()
    };
    match Api::<Namespace>::all(client)
        .create(&PostParams::default(), &namespace)
        .await
        .map_err(Error::from)
    {
        Ok(_) => log::info!("created namespace {name}"),
        Err(err) if err.is_already_exists() => {}
        Err(err) => return Err(err).context("creating namespace"),
    }
    Ok(())
}

/// Installs the CRD for `K`, runs the walkthrough, and removes the CRD again.
async fn demo<K: LifecycleResource>(
    client: Client,
    settings: &Settings,
    cli: &Cli,
    instance: K,
) -> anyhow::Result<()> {
    let crd = definition::create_custom_resource_definition(
        client.clone(),
        K::crd(),
        Poll::crd_established(),
    )
    .await
    .context("registering CRD")?;

    let result = walkthrough(client.clone(), settings, cli, instance).await;

    if cli.keep_crd {
        log::info!("leaving CRD {} installed", crd.name_any());
    } else {
        log::info!("exit and clean {}", crd.name_any());
        definition::delete_custom_resource_definition(client, &crd.name_any()).await?;
    }
    result
}

async fn walkthrough<K: LifecycleResource>(
    client: Client,
    settings: &Settings,
    cli: &Cli,
    instance: K,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let _stop_controller = cancel.clone().drop_guard();
    let controller = Controller::<K, _>::new(client.clone(), StatusProcessor::new(client.clone()));
    let store = controller.store();
    let task = tokio::spawn(controller.run(cancel.clone()));

    let crds = CrdClient::<K>::new(client, settings.crd_namespace.clone());
    let name = instance.name_any();
    match crds.create(&instance).await {
        Ok(created) => log::info!("created {}", created.describe()),
        Err(err) if err.is_already_exists() => log::info!("{name} already exists"),
        Err(err) => return Err(err).context("creating instance"),
    }

    let processed = crds
        .wait_for_instance_processed(&name, Poll::instance_processed())
        .await?;
    log::info!("processed {}", processed.describe());

    let list = crds.list(&ListParams::default()).await?;
    log::info!(
        "{} {} in {}, {} cached by the controller",
        list.items.len(),
        crds.plural(),
        crds.namespace(),
        store.state().len()
    );
    for item in &list.items {
        log::info!("{}", item.describe());
    }

    let linger = Duration::from_secs(cli.linger);
    log::info!("sleep for {linger:?}...");
    tokio::time::sleep(linger).await;

    cancel.cancel();
    task.await?;
    Ok(())
}

// SPDX-License-Identifier: Apache-2.0

//! `gcfbench run` command - Deploy, probe, and record a benchmark run.
//!
//! The orchestrator creates one function instance per ordinal, drives each
//! through deployment (and optionally probing) in its own task, and hands
//! the completed set to the aggregator. Each instance is exclusively owned
//! by its task; the aggregator is populated only after all tasks join.

use std::sync::Arc;

use tokio::sync::Semaphore;

use gcfbench_core::{
    ArtifactWriter, BaseName, DeployRequest, Deployer, FunctionInstance, FunctionProber,
    ResultsAggregator, ResultsViewer, RunArtifact, RunConfig,
};

use crate::gcloud::GcloudDeployer;
use crate::prober::HttpProber;

type TaskError = Box<dyn std::error::Error + Send + Sync>;

pub async fn execute(
    config_path: &str,
    concurrency: Option<usize>,
    no_probe: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = RunConfig::load(config_path)?;
    if concurrency.is_some() {
        config.concurrency_limit = concurrency;
    }
    let base = config.validate()?;

    println!("GCF Cold Start Benchmark");
    println!("========================");
    println!("Base name:   {}", base);
    println!("Instances:   {}", config.instances);
    if config.regions.is_empty() {
        println!("Regions:     (deployer default)");
    } else {
        println!("Regions:     {}", config.regions.join(", "));
    }
    match config.concurrency_limit {
        Some(limit) => println!("Concurrency: max {limit} concurrent deployments"),
        None => println!("Concurrency: unlimited"),
    }
    println!();

    let deployer = Arc::new(GcloudDeployer::from_config(&config));
    let prober = if no_probe {
        None
    } else {
        Some(Arc::new(HttpProber::from_config(&config)?))
    };

    let aggregator = run_instances(&config, &base, deployer, prober).await?;

    let writer = ArtifactWriter::new(&config.results_dir)?;
    let artifact = RunArtifact::from_aggregator(&aggregator);
    let path = writer.save(&artifact, &config.results_file)?;
    tracing::info!(path = %path.display(), "Results artifact saved");

    println!();
    ResultsViewer::new().display(&config.results_dir, &config.results_file)?;
    Ok(())
}

/// Deploy and probe all configured instances, returning the populated
/// aggregator. Generic over the collaborators so tests can substitute stubs.
async fn run_instances<D, P>(
    config: &RunConfig,
    base: &BaseName,
    deployer: Arc<D>,
    prober: Option<Arc<P>>,
) -> Result<ResultsAggregator, Box<dyn std::error::Error>>
where
    D: Deployer + 'static,
    P: FunctionProber + 'static,
{
    let semaphore = config
        .concurrency_limit
        .map(|limit| Arc::new(Semaphore::new(limit)));

    let mut tasks = Vec::with_capacity(config.instances as usize);
    for index in 0..config.instances {
        let mut instance = FunctionInstance::new(index);
        instance.set_names(base)?;

        let request = DeployRequest {
            index,
            name: instance.name().unwrap_or_default().to_string(),
            display_name: instance.display_name().unwrap_or_default().to_string(),
            region: config.region_for(index).map(String::from),
        };

        let deployer = Arc::clone(&deployer);
        let prober = prober.clone();
        let semaphore = semaphore.clone();

        tasks.push(tokio::spawn(async move {
            let _permit = match &semaphore {
                Some(semaphore) => Some(semaphore.acquire().await?),
                None => None,
            };

            tracing::info!(index, name = %request.name, "Deploying function");
            let outcome = deployer.deploy(request).await;
            let succeeded = outcome.result.success();
            instance.record_deployment(outcome.result, outcome.details)?;

            if succeeded {
                tracing::info!(index, url = instance.url(), "Deployed");
                if let (Some(prober), Some(url)) = (&prober, instance.url().map(String::from)) {
                    tracing::info!(index, "Probing function");
                    let metrics = prober.probe(&url).await;
                    instance.record_test(metrics)?;
                }
            } else {
                tracing::warn!(index, error = instance.error(), "Deployment failed");
            }

            Ok::<FunctionInstance, TaskError>(instance)
        }));
    }

    let aggregator = ResultsAggregator::new();
    for task in tasks {
        let instance = task
            .await?
            .map_err(|err| err as Box<dyn std::error::Error>)?;
        aggregator.add(instance)?;
    }
    Ok(aggregator)
}

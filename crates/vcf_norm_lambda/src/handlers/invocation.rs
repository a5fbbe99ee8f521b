use std::path::Path;
use std::time::Instant;

use serde_json::Value;
use vcf_norm_core::config::NormaliseConfig;
use vcf_norm_core::contract::{parse_invocation, NormaliseResponse, NormaliseSummary};
use vcf_norm_core::storage_keys::object_locator;

use crate::adapters::command_runner::{CommandRunner, ProcessCommandRunner};
use crate::adapters::object_store::ObjectStore;
use crate::error::HandlerError;
use crate::handlers::normalise::Normaliser;
use crate::handlers::transfer::ObjectTransfer;
use crate::workspace::{ScratchLease, Workspace};

const COMPONENT: &str = "normalise_handler";

/// Handles one invocation end to end. The workspace is set up first and is
/// cleaned up exactly once before this returns, on success and on every
/// error; errors are returned unchanged.
pub fn handle_invocation(
    event: &Value,
    config: &NormaliseConfig,
    workspace: &impl Workspace,
    store: &impl ObjectStore,
    runner: &impl CommandRunner,
) -> Result<NormaliseResponse, HandlerError> {
    let started_at = Instant::now();

    let result = ScratchLease::acquire(workspace)
        .and_then(|lease| run_pipeline(event, config, lease.dir(), store, runner));

    let duration_ms = elapsed_ms(started_at);
    match &result {
        Ok(response) => tracing::info!(
            component = COMPONENT,
            event = "invocation_completed",
            duration_ms,
            status_code = response.status_code,
        ),
        Err(error) => tracing::error!(
            component = COMPONENT,
            event = "invocation_failed",
            duration_ms,
            error_kind = error.kind(),
            error = %error,
        ),
    }

    result
}

pub fn handle_invocation_with_process_runner(
    event: &Value,
    config: &NormaliseConfig,
    workspace: &impl Workspace,
    store: &impl ObjectStore,
) -> Result<NormaliseResponse, HandlerError> {
    handle_invocation(event, config, workspace, store, &ProcessCommandRunner)
}

fn run_pipeline(
    event: &Value,
    config: &NormaliseConfig,
    workspace_dir: &Path,
    store: &impl ObjectStore,
    runner: &impl CommandRunner,
) -> Result<NormaliseResponse, HandlerError> {
    let request = parse_invocation(event)?;
    let (bucket, key) = (request.bucket(), request.key());
    tracing::info!(
        component = COMPONENT,
        event = "invocation_started",
        source = request.source(),
        bucket,
        key,
    );

    let transfer = ObjectTransfer::new(store, config, workspace_dir);

    let step_started = Instant::now();
    let input_path = transfer.download_input(bucket, key)?;
    tracing::info!(
        component = COMPONENT,
        event = "input_downloaded",
        path = %input_path.display(),
        duration_ms = elapsed_ms(step_started),
    );

    let step_started = Instant::now();
    let genome_path = transfer.download_genome()?;
    tracing::info!(
        component = COMPONENT,
        event = "genome_downloaded",
        bucket = %config.genome_bucket,
        key = %config.genome_key,
        duration_ms = elapsed_ms(step_started),
    );

    let output_path = Normaliser::new(runner, &config.bcftools_program, workspace_dir)
        .normalise(&input_path, &genome_path)?;

    let step_started = Instant::now();
    let output_key = transfer.upload_output(bucket, key, &output_path)?;
    tracing::info!(
        component = COMPONENT,
        event = "output_uploaded",
        bucket,
        key = %output_key,
        duration_ms = elapsed_ms(step_started),
    );

    let response = NormaliseResponse::success(&NormaliseSummary {
        input: object_locator(bucket, key),
        output: object_locator(bucket, &output_key),
    })?;
    Ok(response)
}

fn elapsed_ms(started_at: Instant) -> u64 {
    started_at.elapsed().as_millis() as u64
}

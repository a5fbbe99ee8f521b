use std::path::Path;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;
use vcf_norm_core::config::NormaliseConfig;
use vcf_norm_core::contract::NormaliseResponse;
use vcf_norm_lambda::adapters::object_store::ObjectStore;
use vcf_norm_lambda::handlers::invocation::handle_invocation_with_process_runner;
use vcf_norm_lambda::workspace::LocalWorkspace;

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn download_to(&self, bucket: &str, key: &str, destination: &Path) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let destination = destination.to_path_buf();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let object = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map_err(|error| {
                        format!("failed to read object from s3: {}", DisplayErrorContext(&error))
                    })?;

                write_body_to_file(object.body, &destination).await
            })
        })
    }

    fn upload_from(&self, bucket: &str, key: &str, source: &Path) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let source = source.to_path_buf();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let body = ByteStream::from_path(&source).await.map_err(|error| {
                    format!("failed to open {} for upload: {error}", source.display())
                })?;

                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .body(body)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!("failed to write object to s3: {}", DisplayErrorContext(&error))
                    })
            })
        })
    }
}

/// Streams the object body to disk; reference genomes do not fit in memory.
async fn write_body_to_file(mut body: ByteStream, destination: &Path) -> Result<(), String> {
    let mut file = tokio::fs::File::create(destination)
        .await
        .map_err(|error| format!("failed to create {}: {error}", destination.display()))?;

    while let Some(chunk) = body
        .try_next()
        .await
        .map_err(|error| format!("failed to read object body from s3: {error}"))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|error| format!("failed to write {}: {error}", destination.display()))?;
    }

    file.flush()
        .await
        .map_err(|error| format!("failed to flush {}: {error}", destination.display()))
}

struct RuntimeDependencies {
    config: NormaliseConfig,
    workspace: LocalWorkspace,
    store: S3ObjectStore,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<NormaliseResponse, Error> {
    handle_invocation_with_process_runner(
        &event.payload,
        &deps.config,
        &deps.workspace,
        &deps.store,
    )
    .map_err(Error::from)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = NormaliseConfig::from_env()?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        workspace: LocalWorkspace::new(config.work_dir.clone()),
        store: S3ObjectStore {
            s3_client: aws_sdk_s3::Client::new(&aws_config),
        },
        config,
    };

    lambda_runtime::run(service_fn(|event| handle_request(event, &deps))).await
}

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{Client as S3Client, config::Credentials};

use crate::{config::S3Config, error::Result};

pub async fn load_s3_client(config: &S3Config) -> Result<S3Client> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    // Fall back to the default provider chain when no static keys are set.
    if let (Some(access_key), Some(secret_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        let credentials = Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None,
            None,
            "env-credentials",
        );
        loader = loader.credentials_provider(credentials);
    }

    let sdk_config = loader.load().await;

    let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
    if let Some(endpoint) = &config.endpoint {
        // LocalStack and other emulators only serve path-style requests.
        s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
    }

    let s3_client = S3Client::from_conf(s3_config.build());

    tracing::info!(
        region = %config.region,
        endpoint = config.endpoint.as_deref().unwrap_or("aws"),
        "AWS S3 client initialized"
    );

    Ok(s3_client)
}

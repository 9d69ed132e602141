//! AWS EC2 SDK implementation of [Source]

use super::{Instance, Source, State};
use crate::{Cause, Error};
use aws_config::{retry::RetryConfig, BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::error::CredentialsError;
use aws_sdk_ec2::{
    error::{ProvideErrorMetadata, SdkError},
    operation::describe_instances::DescribeInstancesError,
    types,
    types::Filter,
    Client as Ec2Client,
};
use std::{collections::BTreeMap, fmt::Debug};
use tracing::{debug, info};

/// Service error codes returned by EC2 when credentials are missing, invalid or not allowed
const AUTH_FAILURE_CODES: &[&str] = &[
    "AuthFailure",
    "UnauthorizedOperation",
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "RequestExpired",
    "OptInRequired",
    "Blocked",
];

/// Enumerates running instances through the EC2 `DescribeInstances` API.
#[derive(Clone, Debug)]
pub struct Ec2 {
    config: SdkConfig,
}

impl Ec2 {
    /// Loads credentials and settings from the environment.
    ///
    /// Requests are never retried: a failed fetch aborts the run.
    pub async fn new() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::disabled())
            .load()
            .await;
        Self { config }
    }

    fn client(&self, region: &str) -> Ec2Client {
        let config = aws_sdk_ec2::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        Ec2Client::from_conf(config)
    }
}

impl Source for Ec2 {
    async fn fetch_running(&self, region: &str) -> Result<Vec<Instance>, Error> {
        let client = self.client(region);
        let mut pages = client
            .describe_instances()
            .filters(
                Filter::builder()
                    .name("instance-state-name")
                    .values("running")
                    .build(),
            )
            .into_paginator()
            .send();

        let mut instances = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| classify(region, err))?;
            for reservation in page.reservations.unwrap_or_default() {
                for instance in reservation.instances.unwrap_or_default() {
                    let instance = convert(instance);
                    info!(
                        region,
                        id = instance.id.as_str(),
                        name = ?instance.name,
                        "found instance"
                    );
                    instances.push(instance);
                }
            }
        }
        debug!(region, count = instances.len(), "described instances");
        Ok(instances)
    }
}

/// Returns `true` if an EC2 error code indicates rejected credentials.
fn is_auth_failure(code: Option<&str>) -> bool {
    code.is_some_and(|code| AUTH_FAILURE_CODES.contains(&code))
}

/// Returns `true` if credential resolution failed somewhere in the chain of `err`.
fn is_credentials_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<CredentialsError>() {
            return true;
        }
        current = err.source();
    }
    false
}

/// Maps a failed `DescribeInstances` call to [Error::AuthFailure] when EC2 rejected the
/// credentials or none could be resolved, and to [Error::InstanceSourceUnavailable] otherwise.
fn classify<R>(region: &str, err: SdkError<DescribeInstancesError, R>) -> Error
where
    R: Debug + Send + Sync + 'static,
{
    let auth = is_auth_failure(err.as_service_error().and_then(|err| err.code()))
        || is_credentials_failure(&err);
    let region = region.to_string();
    let source: Cause = Box::new(aws_sdk_ec2::Error::from(err));
    if auth {
        Error::AuthFailure { region, source }
    } else {
        Error::InstanceSourceUnavailable { region, source }
    }
}

fn convert(instance: types::Instance) -> Instance {
    let tags: BTreeMap<String, String> = instance
        .tags
        .unwrap_or_default()
        .into_iter()
        .filter_map(|tag| Some((tag.key?, tag.value.unwrap_or_default())))
        .collect();
    let state = instance
        .state
        .and_then(|state| state.name)
        .map(|name| State::from(name.as_str()))
        .unwrap_or_else(|| State::Unknown(String::new()));
    Instance::new(
        instance.instance_id.unwrap_or_default(),
        instance.private_ip_address,
        tags,
        state,
    )
}

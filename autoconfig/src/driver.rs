//! Fetch instances, derive their topology and write it out.

use crate::{
    ec2::Source,
    emit::{Emitter, Renderer, Sink},
    topology, Error,
};
use std::{fmt, time::Duration};
use tracing::info;

/// Outcome of a successful [run].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Running instances returned by the source (named or not).
    pub instances: usize,
    /// Ids of every emitted service.
    pub services: Vec<String>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        writeln!(
            f,
            "Count of instances in the Instance List: {}",
            self.instances
        )?;
        writeln!(
            f,
            "Count of services in Service Dictionary: {}",
            self.services.len()
        )?;
        write!(
            f,
            "List of Services Found in Service Dictionary: {:?}",
            self.services
        )
    }
}

/// Regenerates the configuration of `region`.
///
/// The emitter only runs once instances were fetched successfully: a failed (or timed out)
/// fetch leaves the existing configuration untouched.
pub async fn run<S, R, K>(
    source: &S,
    region: &str,
    emitter: &Emitter<R, K>,
    timeout: Duration,
) -> Result<Summary, Error>
where
    S: Source,
    R: Renderer,
    K: Sink,
{
    info!(region, "fetching running instances");
    let instances = match tokio::time::timeout(timeout, source.fetch_running(region)).await {
        Ok(instances) => instances?,
        Err(elapsed) => {
            return Err(Error::InstanceSourceUnavailable {
                region: region.to_string(),
                source: Box::new(elapsed),
            })
        }
    };
    let running = instances
        .iter()
        .filter(|instance| instance.is_running())
        .count();
    info!(region, running, "fetched instances");

    let topology = topology::build(&instances).with_checks();
    info!(
        hosts = topology.hosts().len(),
        services = topology.service_count(),
        "built topology"
    );

    let emitted = emitter.emit(&topology)?;
    info!(
        hosts = emitted.hosts,
        services = emitted.services,
        "emitted configuration"
    );
    Ok(Summary {
        instances: running,
        services: topology
            .services()
            .map(|service| service.id().to_string())
            .collect(),
    })
}

//! Pre-flight checks: storage headroom, free-tier compute ceiling and display-name clashes.
//!
//! All of them race with the provider; they only exist to fail fast before the retry loop
//! starts burning attempts on launches that cannot be accepted.

use ampere_schema::Instance;
use tracing::info;

use super::request::{LaunchRequest, SourceDescriptor};
use crate::config::LimitsConfig;
use crate::error::{PreconditionError, SpawnError};
use crate::oci::CloudApi;

/// Account usage at the time of the pre-flight checks. Never refreshed afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotaSnapshot {
    /// Block + boot volume usage; `None` when booting from an existing volume (not checked).
    pub used_storage_gbs: Option<u64>,
    pub used_ocpus: f64,
    pub used_memory_gbs: f64,
    /// Live instances of the requested shape.
    pub matching_instances: usize,
}

impl QuotaSnapshot {
    /// Sums OCPUs and memory of live instances whose shape matches `shape`.
    pub fn tally_compute(instances: &[Instance], shape: &str) -> Self {
        instances
            .iter()
            .filter(|i| i.shape == shape && !i.lifecycle_state.is_terminated())
            .fold(Self::default(), |mut acc, instance| {
                acc.used_ocpus += f64::from(instance.ocpus());
                acc.used_memory_gbs += f64::from(instance.memory_in_gbs());
                acc.matching_instances += 1;
                acc
            })
    }
}

pub fn check_storage(
    used_gbs: u64,
    required_gbs: u64,
    limits: &LimitsConfig,
) -> Result<(), PreconditionError> {
    let free = i64::try_from(limits.storage_capacity_gbs).unwrap_or(i64::MAX)
        - i64::try_from(used_gbs).unwrap_or(i64::MAX);
    if free < i64::try_from(required_gbs).unwrap_or(i64::MAX) {
        return Err(PreconditionError::InsufficientStorage {
            free,
            required: required_gbs,
            capacity: limits.storage_capacity_gbs,
        });
    }
    Ok(())
}

pub fn check_compute(
    snapshot: &QuotaSnapshot,
    request: &LaunchRequest,
    limits: &LimitsConfig,
) -> Result<(), PreconditionError> {
    let over_ocpus = snapshot.used_ocpus + f64::from(request.ocpus) > f64::from(limits.max_ocpus);
    let over_memory = snapshot.used_memory_gbs + f64::from(request.memory_in_gbs)
        > f64::from(limits.max_memory_gbs);

    if over_ocpus || over_memory {
        return Err(PreconditionError::QuotaExceeded {
            used_ocpus: snapshot.used_ocpus,
            used_memory_gbs: snapshot.used_memory_gbs,
            requested_ocpus: request.ocpus,
            requested_memory_gbs: request.memory_in_gbs,
            max_ocpus: limits.max_ocpus,
            max_memory_gbs: limits.max_memory_gbs,
        });
    }
    Ok(())
}

pub fn check_display_name(
    instances: &[Instance],
    display_name: &str,
) -> Result<(), PreconditionError> {
    let clash = instances.iter().any(|i| {
        !i.lifecycle_state.is_terminated() && i.display_name.as_deref() == Some(display_name)
    });
    if clash {
        return Err(PreconditionError::DuplicateDisplayName(
            display_name.to_string(),
        ));
    }
    Ok(())
}

/// Runs every check once, in order, against live account data.
pub struct PreconditionChecker<'a, C: ?Sized> {
    cloud: &'a C,
    request: &'a LaunchRequest,
    limits: LimitsConfig,
}

impl<'a, C> PreconditionChecker<'a, C>
where
    C: CloudApi + ?Sized,
{
    pub fn new(cloud: &'a C, request: &'a LaunchRequest, limits: LimitsConfig) -> Self {
        Self {
            cloud,
            request,
            limits,
        }
    }

    pub async fn run(&self) -> Result<QuotaSnapshot, SpawnError> {
        let used_storage_gbs = match &self.request.source {
            SourceDescriptor::FromImage {
                boot_volume_size_gbs,
                ..
            } => {
                info!("Checking available storage in account");
                let used = self.used_storage_gbs().await?;
                let required = boot_volume_size_gbs
                    .map_or(self.limits.default_boot_volume_gbs, u64::from);
                check_storage(used, required, &self.limits)?;
                info!(
                    used_gbs = used,
                    required_gbs = required,
                    capacity_gbs = self.limits.storage_capacity_gbs,
                    "Storage check passed"
                );
                Some(used)
            }
            SourceDescriptor::FromBootVolume { .. } => None,
        };

        info!("Checking current instances");
        let instances = self
            .cloud
            .list_instances(&self.request.compartment_id)
            .await
            .map_err(SpawnError::Inventory)?;
        log_instances(&instances);

        let snapshot = QuotaSnapshot {
            used_storage_gbs,
            ..QuotaSnapshot::tally_compute(&instances, &self.request.shape)
        };
        info!(
            used_ocpus = snapshot.used_ocpus,
            used_memory_gbs = snapshot.used_memory_gbs,
            free_ocpus = f64::from(self.limits.max_ocpus) - snapshot.used_ocpus,
            free_memory_gbs = f64::from(self.limits.max_memory_gbs) - snapshot.used_memory_gbs,
            "Free-tier usage for {}",
            self.request.shape
        );

        check_compute(&snapshot, self.request, &self.limits)?;
        check_display_name(&instances, &self.request.display_name)?;

        Ok(snapshot)
    }

    /// Live block volumes plus live boot volumes of every configured availability domain.
    async fn used_storage_gbs(&self) -> Result<u64, SpawnError> {
        let compartment_id = &self.request.compartment_id;

        let volumes = self
            .cloud
            .list_volumes(compartment_id)
            .await
            .map_err(SpawnError::Inventory)?;
        let mut used: u64 = volumes
            .iter()
            .filter(|v| !v.lifecycle_state.is_terminated())
            .filter_map(|v| v.size_in_gbs)
            .sum();

        for availability_domain in &self.request.availability_domains {
            let boot_volumes = self
                .cloud
                .list_boot_volumes(availability_domain, compartment_id)
                .await
                .map_err(SpawnError::Inventory)?;
            used += boot_volumes
                .iter()
                .filter(|v| !v.lifecycle_state.is_terminated())
                .filter_map(|v| v.size_in_gbs)
                .sum::<u64>();
        }
        Ok(used)
    }
}

fn log_instances(instances: &[Instance]) {
    if instances.is_empty() {
        info!("No instances found!");
        return;
    }
    info!("{} instance(s) found!", instances.len());
    for instance in instances {
        info!(
            name = instance.display_name.as_deref().unwrap_or("<unnamed>"),
            shape = %instance.shape,
            ocpus = instance.ocpus(),
            memory_gbs = instance.memory_in_gbs(),
            state = ?instance.lifecycle_state,
            "Existing instance"
        );
    }
}

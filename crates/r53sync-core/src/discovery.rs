//! Instance discovery
//!
//! Resolves one instance group (filters + region + address policy) into the
//! IP addresses that will back a record set.

use crate::definition::Filter;
use crate::error::Result;
use crate::traits::{Instance, InstanceInventory};
use tracing::{debug, warn};

/// Query `inventory` and flatten every reservation into one instance list
///
/// Order is backend return order. `region` is resolved by the caller before
/// the query is issued.
pub async fn discover(
    inventory: &dyn InstanceInventory,
    filters: &[Filter],
    region: Option<&str>,
) -> Result<Vec<Instance>> {
    let reservations = inventory.describe_instances(region, filters).await?;

    let instances: Vec<Instance> = reservations
        .into_iter()
        .flat_map(|reservation| reservation.instances)
        .collect();

    debug!(
        backend = inventory.backend_name(),
        region = region.unwrap_or("<default>"),
        filters = filters.len(),
        instances = instances.len(),
        "Instances discovered"
    );

    Ok(instances)
}

/// Address an instance contributes, if any
///
/// The private address when `private_ip` is set and present, otherwise the
/// public address when present, otherwise nothing.
pub fn ip_for(instance: &Instance, private_ip: bool) -> Option<&str> {
    if private_ip {
        if let Some(ip) = instance.private_ip_address.as_deref() {
            return Some(ip);
        }
    }
    instance.public_ip_address.as_deref()
}

/// Discover instances and select one address per instance
///
/// Instances without the requested kind of address are skipped, not failed.
pub async fn discover_ips(
    inventory: &dyn InstanceInventory,
    filters: &[Filter],
    private_ip: bool,
    region: Option<&str>,
) -> Result<Vec<String>> {
    let instances = discover(inventory, filters, region).await?;

    let mut ips = Vec::with_capacity(instances.len());
    for instance in &instances {
        match ip_for(instance, private_ip) {
            Some(ip) => ips.push(ip.to_string()),
            None => warn!(
                instance = instance.instance_id.as_deref().unwrap_or("<unknown>"),
                private_ip, "Instance has no usable address, skipping"
            ),
        }
    }

    Ok(ips)
}

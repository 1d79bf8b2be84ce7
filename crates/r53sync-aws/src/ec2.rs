//! EC2 instance inventory

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::Client;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types as sdk;
use r53sync_core::definition::Filter;
use r53sync_core::traits::{Instance, InstanceInventory, Reservation};
use r53sync_core::{Error, Result};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// `InstanceInventory` backed by EC2 `DescribeInstances`
///
/// Keeps one client per region. Clients for an explicit region are derived
/// from the base configuration, so credentials are resolved only once.
pub struct Ec2Inventory {
    base: SdkConfig,
    default_client: Client,
    regional: Mutex<HashMap<String, Client>>,
}

impl Ec2Inventory {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            base: config.clone(),
            default_client: Client::new(config),
            regional: Mutex::new(HashMap::new()),
        }
    }

    async fn client_for(&self, region: Option<&str>) -> Client {
        let Some(region) = region else {
            return self.default_client.clone();
        };

        let mut regional = self.regional.lock().await;
        regional
            .entry(region.to_string())
            .or_insert_with(|| {
                debug!(region, "Creating regional EC2 client");
                let config = aws_sdk_ec2::config::Builder::from(&self.base)
                    .region(Region::new(region.to_string()))
                    .build();
                Client::from_conf(config)
            })
            .clone()
    }
}

#[async_trait]
impl InstanceInventory for Ec2Inventory {
    async fn describe_instances(
        &self,
        region: Option<&str>,
        filters: &[Filter],
    ) -> Result<Vec<Reservation>> {
        let client = self.client_for(region).await;
        let filters = to_sdk_filters(filters);

        let mut reservations = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let output = client
                .describe_instances()
                .set_filters(filters.clone())
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| Error::provider("ec2", DisplayErrorContext(&e).to_string()))?;
            pages += 1;

            reservations.extend(output.reservations().iter().map(from_sdk_reservation));

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        debug!(
            region = region.unwrap_or("<default>"),
            pages,
            reservations = reservations.len(),
            "DescribeInstances complete"
        );

        Ok(reservations)
    }

    fn backend_name(&self) -> &'static str {
        "ec2"
    }
}

/// Empty filters mean an unfiltered query
fn to_sdk_filters(filters: &[Filter]) -> Option<Vec<sdk::Filter>> {
    if filters.is_empty() {
        return None;
    }
    Some(
        filters
            .iter()
            .map(|f| {
                sdk::Filter::builder()
                    .name(&f.name)
                    .set_values(Some(f.values.clone()))
                    .build()
            })
            .collect(),
    )
}

fn from_sdk_reservation(reservation: &sdk::Reservation) -> Reservation {
    Reservation::new(
        reservation
            .instances()
            .iter()
            .map(|i| Instance {
                instance_id: i.instance_id().map(str::to_string),
                public_ip_address: i.public_ip_address().map(str::to_string),
                private_ip_address: i.private_ip_address().map(str::to_string),
            })
            .collect(),
    )
}

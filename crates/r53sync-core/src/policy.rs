//! IAM policy generation
//!
//! Produces the least-privilege policy document a principal needs to run
//! `update-record-sets` against one definition: instance discovery, record
//! changes on the definition's hosted zone and, when the definition is kept
//! remotely, read access to that one object.

use crate::definition::ResourceDefinition;
use crate::location::S3Location;
use serde::Serialize;

pub const POLICY_VERSION: &str = "2012-10-17";

/// An IAM policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

/// One `Allow` statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: String,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

impl Statement {
    fn allow(action: &str, resource: String) -> Self {
        Self {
            effect: "Allow".to_string(),
            action: vec![action.to_string()],
            resource: vec![resource],
        }
    }
}

/// Build the policy for `definition`
///
/// Statements are ordered ec2, route53, then s3 when `location` is given.
pub fn policy_document(
    definition: &ResourceDefinition,
    location: Option<&S3Location>,
) -> PolicyDocument {
    let mut statement = vec![
        // DescribeInstances does not support resource-level permissions
        Statement::allow("ec2:DescribeInstances", "*".to_string()),
        Statement::allow(
            "route53:ChangeResourceRecordSets",
            hosted_zone_arn(&definition.hosted_zone),
        ),
    ];

    if let Some(location) = location {
        statement.push(Statement::allow("s3:Get*", object_arn(location)));
    }

    PolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement,
    }
}

/// Accepts either a bare zone id or the `/hostedzone/<id>` form
fn hosted_zone_arn(hosted_zone: &str) -> String {
    let id = hosted_zone.trim_start_matches("/hostedzone/");
    format!("arn:aws:route53:::hostedzone/{id}")
}

fn object_arn(location: &S3Location) -> String {
    format!("arn:aws:s3:::{}/{}", location.bucket, location.key)
}

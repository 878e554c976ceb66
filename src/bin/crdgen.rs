//! Prints the CustomResourceDefinitions of every managed kind as YAML.
//!
//! ```sh
//! cargo run --bin crdgen > config/crd/all.yaml
//! ```

use anyhow::{Context, Result};
use kube::CustomResourceExt;
use prometheus_service_controller::crd::{
    AlertManagerDefinition, LoggingConfiguration, RuleGroupsNamespace, Workspace,
};

fn main() -> Result<()> {
    let crds = [
        Workspace::crd(),
        RuleGroupsNamespace::crd(),
        AlertManagerDefinition::crd(),
        LoggingConfiguration::crd(),
    ];
    for crd in crds {
        let yaml = serde_yaml::to_string(&crd).context("Failed to serialize CRD to YAML")?;
        println!("---\n{yaml}");
    }
    Ok(())
}

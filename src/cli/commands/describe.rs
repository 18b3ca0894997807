use std::path::PathBuf;

use clap::Args;
use serde_json::{json, Value};

use crate::cli::utils::{labeled, output};
use crate::cli::OutputFormat;
use crate::fixture::Fixture;

#[derive(Args, Debug)]
pub struct DescribeArgs {
    #[arg(help = "Fixture YAML file")]
    pub fixture: PathBuf,

    #[arg(help = "Resource type to describe; lists all types when omitted")]
    pub resource_type: Option<String>,
}

pub fn describe(fixture: &Fixture, resource_type: Option<&str>) -> anyhow::Result<Value> {
    let Some(resource_type) = resource_type else {
        return Ok(json!({ "types": fixture.registry.types() }));
    };
    let metadata = fixture
        .registry
        .get(resource_type)
        .ok_or_else(|| anyhow::anyhow!("Resource type '{}' not found", resource_type))?;
    Ok(json!({
        "resource": metadata,
        "whitelist": fixture.whitelists.get(resource_type),
        "rules": fixture.registry.rules_for(resource_type),
        "records": fixture.store.count(resource_type),
    }))
}

pub fn handle(args: DescribeArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let fixture = Fixture::load(&args.fixture)?;
    let description = describe(&fixture, args.resource_type.as_deref())?;

    output(output_format, &description, || match args.resource_type.as_deref() {
        None => fixture.registry.types().to_vec(),
        Some(resource_type) => {
            let mut lines = vec![format!("type: {}", resource_type)];
            if let Some(meta) = fixture.registry.get(resource_type) {
                lines.push(format!("id key: {}", meta.id_key));
                for attr in &meta.attributes {
                    let note = if attr.excluded { " (excluded)" } else { "" };
                    lines.push(format!("  attribute {} <- {}{}", attr.exposed_name, attr.source_key, note));
                }
                for rel in &meta.relationships {
                    lines.push(format!("  relationship {} -> {} ({:?})", rel.exposed_name, rel.target_type, rel.cardinality));
                }
            }
            lines.push(labeled("whitelist", &description["whitelist"]));
            lines.push(labeled("rules", &description["rules"]));
            lines
        }
    })
}

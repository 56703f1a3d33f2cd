//! Output rendering.
//!
//! The core returns structured data; everything user-visible is formatted
//! here into strings for the binary to print. Table layout is intentionally
//! plain (space-padded columns), JSON and YAML go through the resources'
//! kind-agnostic projections.

use clap::ValueEnum;

use crate::error::Result;
use crate::platform::DetectedPlatform;
use crate::registry::Resource;

/// The requested output shape for list/get commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

/// Render one resource.
pub fn render_resource(resource: &Resource, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(std::slice::from_ref(resource))),
        OutputFormat::Json => resource.to_json(),
        OutputFormat::Yaml => resource.to_yaml(),
    }
}

/// Render a list of resources.
pub fn render_resources(resources: &[Resource], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(resources)),
        OutputFormat::Json => {
            let values = resources
                .iter()
                .map(Resource::to_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(serde_json::to_string_pretty(&values)?)
        }
        OutputFormat::Yaml => {
            let values = resources
                .iter()
                .map(Resource::to_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(serde_yaml::to_string(&values)?)
        }
    }
}

/// Render detected platforms with their capability flags.
pub fn render_platforms(platforms: &[DetectedPlatform], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            if platforms.is_empty() {
                return Ok("no container platforms detected".to_string());
            }
            let mut rows = vec![[
                "PLATFORM".to_string(),
                "CONTAINERD".to_string(),
                "DOCKER-API".to_string(),
                "CURRENT".to_string(),
            ]];
            for p in platforms {
                rows.push([
                    p.platform.display_name().to_string(),
                    yes_no(p.containerd),
                    yes_no(p.docker_compatible),
                    yes_no(p.is_current_context),
                ]);
            }
            Ok(layout_columns(&rows))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(platforms)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(platforms)?),
    }
}

fn render_table(resources: &[Resource]) -> String {
    if resources.is_empty() {
        return "no resources found".to_string();
    }
    let mut rows = vec![[
        "NAME".to_string(),
        "KIND".to_string(),
        "DESCRIPTION".to_string(),
    ]];
    for r in resources {
        rows.push([
            r.name().to_string(),
            r.kind().as_str().to_string(),
            r.description().unwrap_or("").to_string(),
        ]);
    }
    layout_columns(&rows)
}

fn layout_columns<const N: usize>(rows: &[[String; N]]) -> String {
    let mut widths = [0usize; N];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut out = String::new();
    for row in rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i + 1 == N {
                line.push_str(cell);
            } else {
                line.push_str(&format!("{:<width$}  ", cell, width = widths[i]));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.pop();
    out
}

fn yes_no(b: bool) -> String {
    if b { "yes" } else { "no" }.to_string()
}

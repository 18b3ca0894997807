use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::cli::utils::{labeled, output};
use crate::cli::OutputFormat;
use crate::query::{
    apply_whitelist, translate, PageDefaults, ParsedQuery, QueryError, QueryParser, Violation, WhitelistOptions,
};

#[derive(Args, Debug)]
pub struct ParseArgs {
    #[arg(help = "Raw query string, e.g. 'filter[status]=published&sort=-created_at'")]
    pub query: String,

    #[arg(long, help = "YAML file with whitelist options for the resource")]
    pub whitelist: Option<PathBuf>,

    #[arg(long, default_value_t = 20, help = "Limit used when page[limit] is absent")]
    pub default_limit: u64,

    #[arg(long, default_value_t = 100, help = "Upper bound for page[limit]")]
    pub max_limit: u64,
}

#[derive(Debug, Serialize)]
pub struct ParseReport {
    pub parsed: ParsedQuery,
    pub warnings: Vec<Violation>,
    pub errors: Vec<Violation>,
    #[serde(rename = "where")]
    pub where_clause: Value,
}

/// Parse, whitelist and translate in one pass, as the server would
pub fn report(
    query: &str,
    whitelist: Option<&WhitelistOptions>,
    defaults: PageDefaults,
) -> Result<ParseReport, QueryError> {
    let parsed = QueryParser::new(defaults).parse_str(query)?;
    let (parsed, warnings, errors) = match whitelist {
        Some(options) => {
            let result = apply_whitelist(&parsed, options);
            (result.parsed, result.warnings, result.errors)
        }
        None => (parsed, Vec::new(), Vec::new()),
    };
    let where_clause = translate(&parsed.filter);
    Ok(ParseReport { parsed, warnings, errors, where_clause })
}

pub fn handle(args: ParseArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let whitelist = match &args.whitelist {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read whitelist '{}'", path.display()))?;
            let options: WhitelistOptions =
                serde_yaml::from_str(&raw).with_context(|| format!("Invalid whitelist '{}'", path.display()))?;
            Some(options)
        }
        None => None,
    };

    let defaults = PageDefaults { default_limit: args.default_limit, max_limit: args.max_limit };
    let report = report(&args.query, whitelist.as_ref(), defaults)?;

    output(output_format, &report, || {
        let mut lines = vec![
            labeled("filter", &report.parsed.filter),
            labeled("sort", &report.parsed.sort),
            labeled("page", &report.parsed.page),
            labeled("include", &report.parsed.include),
            labeled("fields", &report.parsed.fields),
            labeled("where", &report.where_clause),
        ];
        lines.extend(report.warnings.iter().map(|v| format!("warning: {}", v)));
        lines.extend(report.errors.iter().map(|v| format!("error: {}", v)));
        lines
    })?;

    if !report.errors.is_empty() {
        anyhow::bail!("query rejected with {} violation(s)", report.errors.len());
    }
    Ok(())
}

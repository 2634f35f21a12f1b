use crate::{commands::TableArgs, dry_run::DryRun, error::CliError};
use clap::Parser;
use commands::Commands;
use connectors::{DatabaseKind, QueryBackend};
use model::records::row::RowData;
use query_builder::{format::format_sql, renderer::render};
use std::sync::Arc;
use table_view::{TableView, reshape::nest_by_alias, spec::TableFile};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod dry_run;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "tableview",
    version = "0.1.0",
    about = "Paginated, aliased table views over SQL databases"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Page {
            target,
            url,
            output,
        } => {
            let backend = connectors::connect(&url).await?;
            let view = load_view(&target, backend)?;

            let page = view.paginate(&target.filter()?, target.request()?).await?;
            info!(
                table = %target.table,
                page = page.pages.current,
                total = page.total,
                "Fetched page"
            );

            output::write_json(&page, output.as_deref()).await?;
        }
        Commands::Query { target, url } => {
            let kind = url.parse::<DatabaseKind>()?;
            let backend = Arc::new(DryRun::new(kind));
            let view = load_view(&target, backend.clone())?;

            let select = view.page_statement(&target.filter()?, &target.request()?)?;
            let (sql, params) = render(&select, backend.dialect());

            println!("{}", format_sql(&sql));
            let params: Vec<_> = params.iter().map(|p| p.to_json()).collect();
            println!("-- params: {}", serde_json::to_string(&params)?);
        }
    }

    Ok(())
}

/// Builds the view for `--table`, reshaping rows into one object per alias.
fn load_view(
    target: &TableArgs,
    backend: Arc<dyn QueryBackend>,
) -> Result<TableView<serde_json::Value>, CliError> {
    let tables = TableFile::from_file(&target.config)?;

    let spec = tables.table(&target.table)?;
    let mut aliases = vec![spec.alias.clone()];
    for join in &spec.joins {
        aliases.push(tables.table(&join.table)?.alias.clone());
    }

    let config = tables.config(&target.table, move |row: &RowData| {
        nest_by_alias(row, &aliases)
    })?;
    Ok(TableView::new(config, backend))
}

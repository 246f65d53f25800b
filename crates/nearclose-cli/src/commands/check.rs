use nearclose_core::{write_spreadsheet_file, LookupRequest, LookupService};

use crate::cli::{CheckArgs, Cli};
use crate::error::CliError;
use crate::output;

use super::resolve_as_of;

pub async fn run(cli: &Cli, args: &CheckArgs, service: &LookupService) -> Result<(), CliError> {
    let request = LookupRequest::parse(&args.ticker, &args.target_price, resolve_as_of(cli)?)?;
    let report = service.lookup(request).await?;

    if let Some(path) = &args.export {
        write_spreadsheet_file(&report.series, path)?;
        tracing::info!(path = %path.display(), records = report.series.len(), "raw history exported");
    }

    output::render_report(&report, cli.format, cli.pretty)
}

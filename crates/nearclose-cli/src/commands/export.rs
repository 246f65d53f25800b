//! Write the raw daily history of one ticker to a spreadsheet file.

use nearclose_core::{write_spreadsheet_file, LookupService, Symbol};

use crate::cli::{Cli, ExportArgs};
use crate::error::CliError;
use crate::output;

use super::resolve_as_of;

pub async fn run(cli: &Cli, args: &ExportArgs, service: &LookupService) -> Result<(), CliError> {
    let symbol = Symbol::parse(&args.ticker)?;
    let series = service.history(&symbol, resolve_as_of(cli)?).await?;

    write_spreadsheet_file(&series, &args.output)?;
    output::render_export(&args.output, series.len(), cli.format, cli.pretty)
}

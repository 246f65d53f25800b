use nearclose_core::LookupService;
use nearclose_web::AppState;
use tokio::net::TcpListener;

use crate::cli::ServeArgs;
use crate::error::CliError;

pub async fn run(args: &ServeArgs, service: LookupService) -> Result<(), CliError> {
    let listener = TcpListener::bind(args.bind).await?;
    nearclose_web::serve(listener, AppState::new(service)).await?;
    Ok(())
}

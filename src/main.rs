use std::{io, process::ExitCode};

use clap::Parser;
use tracing::{error, Level};

use easyfund::{
    cli::{init_state, run, Cli},
    error::Error,
    provider::SessionEvent,
};

const SESSION_EXPIRED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("{}", err);
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    let app_state = match init_state() {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("{}", Error::ConfigurationError(e.to_string()));
            return ExitCode::FAILURE;
        },
    };

    let result = run(cli.command, app_state.clone()).await;
    let expired = app_state.session.last_event() == SessionEvent::Expired;

    match result {
        Ok(()) if !expired => ExitCode::SUCCESS,
        Ok(()) | Err(Error::Unauthorized()) => {
            error!("Session expired, run `easyfund login` again");
            ExitCode::from(SESSION_EXPIRED)
        },
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        },
    }
}

fn init_tracing() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level({
            #[cfg(debug_assertions)]
            {
                Level::DEBUG
            }

            #[cfg(not(debug_assertions))]
            {
                Level::INFO
            }
        })
        .with_file(true)
        .with_line_number(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

use actix_web::{middleware::ErrorHandlers, web, HttpServer};
use clap::Parser;
use error_stack::{Result, ResultExt};
use std::net::IpAddr;
use std::num::NonZeroUsize;
use thiserror::Error;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use snipboard::http::util::{handle_actix_web_error, QuieterRootSpanBuilder};
use snipboard::{config, App};

/// Expose the Snipboard HTTP API
#[derive(Debug, Parser)]
pub struct ServerCommand {
  #[clap(long)]
  pub address: Option<IpAddr>,
  #[clap(long)]
  pub port: Option<u16>,
  #[clap(long)]
  pub workers: Option<NonZeroUsize>,
}

#[derive(Debug, Error)]
#[error("Failed to start the API server")]
pub struct StartServerError;

pub fn run(args: ServerCommand) -> Result<(), StartServerError> {
  let mut config = config::Server::load().change_context(StartServerError)?;
  args.override_config(&mut config);

  install_tracing();

  tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
    .change_context(StartServerError)
    .attach_printable("could not build tokio runtime")?
    .block_on(serve(config))
}

async fn serve(config: config::Server) -> Result<(), StartServerError> {
  let address = (config.address, config.port);
  let workers = config.workers;

  let app = App::new(config).await.change_context(StartServerError)?;

  let mut server = HttpServer::new(move || {
    actix_web::App::new()
      .app_data(web::Data::new(app.clone()))
      .wrap(TracingLogger::<QuieterRootSpanBuilder>::new())
      .wrap(ErrorHandlers::new().default_handler(handle_actix_web_error))
      .configure(snipboard::http::controllers::configure)
  })
  .bind(address)
  .change_context(StartServerError)
  .attach_printable("could not bind the configured address")?;

  if let Some(workers) = workers {
    server = server.workers(workers.get());
  }

  tracing::info!("listening on {}:{}", address.0, address.1);
  server.run().await.change_context(StartServerError)
}

/// The `ErrorLayer` is what lets failed requests carry the span they
/// died in; without it every captured trace would be empty.
fn install_tracing() {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("info,snipboard=debug"));

  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer())
    .with(tracing_error::ErrorLayer::default())
    .init();
}

impl ServerCommand {
  // command line flags beat file and environment configuration
  fn override_config(&self, config: &mut config::Server) {
    if let Some(address) = self.address {
      config.address = address;
    }

    if let Some(port) = self.port {
      config.port = port;
    }

    if let Some(workers) = self.workers {
      config.workers = Some(workers);
    }
  }
}

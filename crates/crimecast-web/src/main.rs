use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use clap::Parser;
use crimecast_model::Predictor;
use crimecast_web::{Args, configure};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    tracing::info!("crimecast-web v{}", env!("CARGO_PKG_VERSION"));

    let paths = args.artifact_paths();
    let predictor = Predictor::load(&paths)
        .with_context(|| format!("loading artifacts from {}", args.artifacts.display()))?;
    let predictor = web::Data::new(predictor);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(predictor.clone())
            .configure(configure)
    });
    if let Some(workers) = args.workers {
        server = server.workers(workers);
    }

    tracing::info!(bind = %args.bind, "listening");
    server
        .bind(&args.bind)
        .with_context(|| format!("binding {}", args.bind))?
        .run()
        .await?;
    Ok(())
}

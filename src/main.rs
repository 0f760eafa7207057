use std::{net::TcpListener, sync::Arc};

use actix_web::web;
use anyhow::Context;
use env_logger::Env;
use narrator::{
    configuration::get_configuration,
    domain::RuleSet,
    services::{Droid, Extractor, RenderPool, Renderer},
    startup::run,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    let rules = RuleSet::from_settings(&configuration.extraction.rules)
        .context("Failed to build extraction rules.")?;
    log::info!(
        "Registered {} extraction rules: {:?}",
        rules.rules().len(),
        rules.rules().iter().map(|r| r.name.as_str()).collect::<Vec<_>>()
    );

    let droid = Droid::new(configuration.renderer.clone());
    let pool = RenderPool::new(
        configuration.pool.max_sessions,
        configuration.pool.queue_depth,
    );
    let renderer = Renderer::new(Arc::new(droid), pool, configuration.pool.request_timeout());
    let extractor = web::Data::new(Extractor::new(
        rules,
        renderer,
        configuration.extraction.unmatched,
    ));

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
    log::info!("Listening on {}", address);

    run(listener, extractor.clone())?.await?;

    extractor.renderer().pool().close();
    log::info!("Server stopped, render pool closed");

    Ok(())
}

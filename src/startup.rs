use std::net::TcpListener;

use actix_web::{
    dev::Server,
    error::InternalError,
    middleware::Logger,
    web::{self, Data},
    App, HttpResponse, HttpServer,
};

use crate::{
    error::ExtractionError,
    routes::{default_route, scrap_route, scrap_route::ScrapResponse},
    services::Extractor,
};

fn invalid_input_response(reason: String) -> HttpResponse {
    log::info!("Rejected malformed request: {}", reason);
    HttpResponse::Ok().json(ScrapResponse::failure(&ExtractionError::InvalidInput(reason)))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = invalid_input_response(format!("request body is not valid json: {}", err));
        InternalError::from_response(err, response).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = invalid_input_response(format!("query string is malformed: {}", err));
        InternalError::from_response(err, response).into()
    })
}

pub fn configure_app(extractor: Data<Extractor>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(extractor)
            .app_data(json_config())
            .app_data(query_config())
            .service(default_route::default)
            .service(default_route::health)
            .service(
                web::scope("/api")
                    .service(scrap_route::scrap)
                    .service(scrap_route::scrap_query)
                    .service(scrap_route::rules),
            );
    }
}

pub fn run(listener: TcpListener, extractor: Data<Extractor>) -> Result<Server, std::io::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure_app(extractor.clone()))
    })
    .listen(listener)?
    .run();

    Ok(server)
}

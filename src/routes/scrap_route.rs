use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::{domain::ExtractionResult, error::ExtractionError, services::Extractor};

#[derive(Deserialize)]
pub struct ScrapBody {
    pub url: Option<String>,
}

#[derive(Deserialize)]
pub struct ScrapQuery {
    pub url: Option<String>,
}

/// Callers must look at `success`, the status code is always 200.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum ScrapResponse {
    Success {
        success: bool,
        result: String,
        site: Option<String>,
        partial: bool,
    },
    Failure {
        success: bool,
        kind: &'static str,
        message: String,
    },
}

impl ScrapResponse {
    pub fn failure(err: &ExtractionError) -> Self {
        ScrapResponse::Failure {
            success: false,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ExtractionResult> for ScrapResponse {
    fn from(result: ExtractionResult) -> Self {
        match result {
            Ok(extraction) => ScrapResponse::Success {
                success: true,
                partial: extraction.is_partial(),
                result: extraction.text,
                site: extraction.site,
            },
            Err(e) => ScrapResponse::failure(&e),
        }
    }
}

#[post("/scrap")]
pub async fn scrap(extractor: web::Data<Extractor>, body: web::Json<ScrapBody>) -> HttpResponse {
    let result = extractor.extract_url(body.url.as_deref()).await;

    HttpResponse::Ok().json(ScrapResponse::from(result))
}

#[get("/scrap")]
pub async fn scrap_query(
    extractor: web::Data<Extractor>,
    query: web::Query<ScrapQuery>,
) -> HttpResponse {
    let result = extractor.extract_url(query.url.as_deref()).await;

    HttpResponse::Ok().json(ScrapResponse::from(result))
}

#[derive(Serialize)]
struct RuleView {
    name: String,
    prefix: String,
}

#[get("/rules")]
pub async fn rules(extractor: web::Data<Extractor>) -> HttpResponse {
    let rules: Vec<RuleView> = extractor
        .rules()
        .rules()
        .iter()
        .map(|r| RuleView {
            name: r.name.clone(),
            prefix: r.prefix.clone(),
        })
        .collect();

    HttpResponse::Ok().json(rules)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    use crate::{
        domain::{RuleSet, UnmatchedPolicy},
        error::RenderError,
        services::{fake_browser::FakeBrowser, Extractor, RenderPool, Renderer},
        startup::configure_app,
    };

    fn extractor(browser: &FakeBrowser) -> web::Data<Extractor> {
        let renderer = Renderer::new(
            Arc::new(browser.clone()),
            RenderPool::new(1, 1),
            Duration::from_millis(200),
        );
        web::Data::new(Extractor::new(
            RuleSet::builtin().unwrap(),
            renderer,
            UnmatchedPolicy::Empty,
        ))
    }

    #[actix_web::test]
    async fn post_reads_a_medium_article() {
        let browser = FakeBrowser::serving(
            r#"<p class="pw-post-body-paragraph">One.</p><p class="pw-post-body-paragraph">Two.</p>"#,
        );
        let app = test::init_service(App::new().configure(configure_app(extractor(&browser)))).await;

        let req = test::TestRequest::post()
            .uri("/api/scrap")
            .set_json(json!({ "url": "https://medium.com/@someone/post" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            json!({ "success": true, "result": "One.Two.", "site": "medium", "partial": false })
        );
    }

    #[actix_web::test]
    async fn get_accepts_url_as_query_parameter() {
        let browser = FakeBrowser::serving(
            r#"<h1 class="cover_title">T</h1><div class="wrap_body"><p class="item_type_text">B</p></div>"#,
        );
        let app = test::init_service(App::new().configure(configure_app(extractor(&browser)))).await;

        let req = test::TestRequest::get()
            .uri("/api/scrap?url=https%3A%2F%2Fbrunch.co.kr%2F%40writer%2F1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], json!(true));
        assert_eq!(body["result"], json!("제목: TB"));
    }

    #[actix_web::test]
    async fn missing_url_is_a_200_failure_without_rendering() {
        let browser = FakeBrowser::serving("<p>unused</p>");
        let app = test::init_service(App::new().configure(configure_app(extractor(&browser)))).await;

        let req = test::TestRequest::post()
            .uri("/api/scrap")
            .set_json(json!({}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["kind"], json!("invalid_input"));
        assert_eq!(browser.launches(), 0);
    }

    #[actix_web::test]
    async fn malformed_json_is_reported_as_invalid_input() {
        let browser = FakeBrowser::serving("<p>unused</p>");
        let app = test::init_service(App::new().configure(configure_app(extractor(&browser)))).await;

        let req = test::TestRequest::post()
            .uri("/api/scrap")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"url\": ")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert!(res.status().is_success());

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["kind"], json!("invalid_input"));
    }

    #[actix_web::test]
    async fn render_failure_carries_its_cause() {
        let browser = FakeBrowser::failing(RenderError::Navigation {
            url: "https://medium.com/@a/b".to_string(),
            reason: "net::ERR_TIMED_OUT".to_string(),
        });
        let app = test::init_service(App::new().configure(configure_app(extractor(&browser)))).await;

        let req = test::TestRequest::post()
            .uri("/api/scrap")
            .set_json(json!({ "url": "https://medium.com/@a/b" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["kind"], json!("render_failure"));
        assert!(body["message"].as_str().unwrap().contains("net::ERR_TIMED_OUT"));
        assert_eq!(browser.closes(), 1);
    }

    #[actix_web::test]
    async fn rules_are_listed_in_priority_order() {
        let browser = FakeBrowser::serving("");
        let app = test::init_service(App::new().configure(configure_app(extractor(&browser)))).await;

        let req = test::TestRequest::get().uri("/api/rules").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            json!([
                { "name": "brunch", "prefix": "https://brunch.co.kr/" },
                { "name": "medium", "prefix": "https://medium.com/" }
            ])
        );
    }

    #[actix_web::test]
    async fn health_reports_renderer_state() {
        let browser = FakeBrowser::unlaunchable("no driver");
        let app = test::init_service(App::new().configure(configure_app(extractor(&browser)))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body,
            json!({ "status": "ok", "renderer_ready": false, "sessions_available": 1, "queued": 0 })
        );
    }
}

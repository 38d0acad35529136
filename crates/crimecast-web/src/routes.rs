//! Request handlers.
//!
//! - `GET /` renders the empty form.
//! - `GET|POST /test` validates and echoes the collected fields.
//! - `POST /results` validates, classifies and renders the prediction.
//!
//! Invalid input re-renders the form with HTTP 400; model faults render an
//! error page with HTTP 500.

use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, web};
use crimecast_core::RawForm;
use crimecast_model::{ModelError, Predictor};
use tracing::{error, info};

use crate::render;

/// Register every route on an app or scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/test", web::get().to(test_query))
        .route("/test", web::post().to(test_form))
        .route("/results", web::post().to(results));
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

async fn index() -> HttpResponse {
    html(StatusCode::OK, render::index_page(&RawForm::default(), &[]))
}

async fn test_query(form: web::Query<RawForm>) -> HttpResponse {
    echo(form.into_inner())
}

async fn test_form(form: web::Form<RawForm>) -> HttpResponse {
    echo(form.into_inner())
}

fn echo(form: RawForm) -> HttpResponse {
    match form.validate() {
        Ok(submission) => html(StatusCode::OK, render::test_page(&submission)),
        Err(errors) => html(StatusCode::BAD_REQUEST, render::index_page(&form, &errors)),
    }
}

async fn results(predictor: web::Data<Predictor>, form: web::Form<RawForm>) -> HttpResponse {
    let form = form.into_inner();
    let submission = match form.validate() {
        Ok(s) => s,
        Err(errors) => {
            return html(StatusCode::BAD_REQUEST, render::index_page(&form, &errors));
        }
    };

    match predictor.classify(&submission) {
        Ok(prediction) => {
            info!(
                month = %submission.month,
                neighborhood = %submission.neighborhood,
                hour = submission.hour.get(),
                label = %prediction.label,
                percent = prediction.percent(),
                "prediction served"
            );
            html(
                StatusCode::OK,
                render::results_page(&submission, &prediction),
            )
        }
        Err(e) => model_fault(&e),
    }
}

/// `Predictor::new` cross-checks the artifacts, so this is reached only on an
/// internal inconsistency.
fn model_fault(e: &ModelError) -> HttpResponse {
    error!(error = %e, "classification failed");
    html(
        StatusCode::INTERNAL_SERVER_ERROR,
        render::error_page("The model could not score this input."),
    )
}

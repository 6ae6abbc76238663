//! Summary pass-through
//!
//! Each route forwards the session's bearer token to the backend and wraps the
//! reply as `{success: true, data}`. The backend's own `data` field is
//! unwrapped when present. Transcripts always come back as `{title, transcript}`.

use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::{json, Value};

use super::helpers::{access_token, backend_failure, session_store};
use crate::backend::{BackendClient, BackendError, SummaryQuery};
use crate::settings::KnuggetSettings;
use crate::utils::responses::ResponseBuilder;

#[derive(Clone, Copy)]
enum SummaryCall {
    Get,
    Delete,
    Transcript,
}

/// `GET /api/summary?page=1&limit=10&search=`
pub async fn list_summaries(
    req: HttpRequest,
    query: web::Query<SummaryQuery>,
    backend: web::Data<BackendClient>,
    settings: web::Data<KnuggetSettings>,
) -> HttpResponse {
    let mut store = session_store(&req, &settings);
    let Some(token) = access_token(&req, &store) else {
        return ResponseBuilder::not_authenticated();
    };

    match backend.list_summaries(&token, &query).await {
        Ok(mut reply) => success(take_data(&mut reply).unwrap_or(reply)),
        Err(error) => backend_failure(&req, error, &mut store),
    }
}

/// `GET /api/summary/{id}`
pub async fn get_summary(
    req: HttpRequest,
    path: web::Path<String>,
    backend: web::Data<BackendClient>,
    settings: web::Data<KnuggetSettings>,
) -> HttpResponse {
    by_id(&req, &path, &backend, &settings, SummaryCall::Get).await
}

/// `DELETE /api/summary/{id}`
pub async fn delete_summary(
    req: HttpRequest,
    path: web::Path<String>,
    backend: web::Data<BackendClient>,
    settings: web::Data<KnuggetSettings>,
) -> HttpResponse {
    by_id(&req, &path, &backend, &settings, SummaryCall::Delete).await
}

/// `GET /api/summary/{id}/transcript`
pub async fn get_transcript(
    req: HttpRequest,
    path: web::Path<String>,
    backend: web::Data<BackendClient>,
    settings: web::Data<KnuggetSettings>,
) -> HttpResponse {
    by_id(&req, &path, &backend, &settings, SummaryCall::Transcript).await
}

async fn by_id(
    req: &HttpRequest,
    id: &str,
    backend: &BackendClient,
    settings: &KnuggetSettings,
    call: SummaryCall,
) -> HttpResponse {
    let id = id.trim();
    if id.is_empty() {
        return ResponseBuilder::missing_field("Summary ID");
    }

    let mut store = session_store(req, settings);
    let Some(token) = access_token(req, &store) else {
        return ResponseBuilder::not_authenticated();
    };

    let result: Result<Value, BackendError> = match call {
        SummaryCall::Get => backend.get_summary(&token, id).await,
        SummaryCall::Delete => backend.delete_summary(&token, id).await,
        SummaryCall::Transcript => backend.get_transcript(&token, id).await,
    };

    match result {
        Ok(mut reply) => {
            let data = take_data(&mut reply);
            success(match call {
                SummaryCall::Get => data.unwrap_or(reply),
                // Deletion replies often carry no body worth returning
                SummaryCall::Delete => data.unwrap_or_else(|| json!({"id": id})),
                SummaryCall::Transcript => transcript_view(&data.unwrap_or(reply)),
            })
        }
        Err(error) => backend_failure(req, error, &mut store),
    }
}

/// The backend's `data` field, `None` when missing or null
fn take_data(reply: &mut Value) -> Option<Value> {
    reply
        .as_object_mut()?
        .remove("data")
        .filter(|data| !data.is_null())
}

/// The transcript page always gets both fields, empty when unknown
fn transcript_view(data: &Value) -> Value {
    let field = |key: &str| data.get(key).and_then(Value::as_str).unwrap_or("").to_string();
    json!({"title": field("title"), "transcript": field("transcript")})
}

fn success(data: Value) -> HttpResponse {
    ResponseBuilder::ok().json(&json!({"success": true, "data": data}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestFixtures, TestRequests};
    use actix_web::{http::StatusCode, test as actix_test, App};

    #[test]
    fn test_take_data() {
        let mut reply = json!({"success": true, "data": {"id": "s1"}});
        assert_eq!(take_data(&mut reply), Some(json!({"id": "s1"})));

        let mut reply = json!({"success": true, "data": null});
        assert_eq!(take_data(&mut reply), None);

        let mut reply = json!({"success": true, "message": "Summary deleted"});
        assert_eq!(take_data(&mut reply), None);
        assert_eq!(reply["message"], "Summary deleted");

        assert_eq!(take_data(&mut json!([1, 2])), None);
    }

    #[test]
    fn test_transcript_view_fills_missing_fields() {
        assert_eq!(transcript_view(&json!({})), json!({"title": "", "transcript": ""}));
        assert_eq!(
            transcript_view(&json!({"title": "Video", "transcript": "hello", "extra": 1})),
            json!({"title": "Video", "transcript": "hello"})
        );
        assert_eq!(
            transcript_view(&json!({"title": null, "transcript": "hello"})),
            json!({"title": "", "transcript": "hello"})
        );
    }

    #[actix_web::test]
    async fn test_blank_id_is_rejected_before_backend() {
        let settings = TestFixtures::settings("http://127.0.0.1:9/api");
        let backend = BackendClient::new(&settings.backend).unwrap();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(settings))
                .app_data(web::Data::new(backend))
                .route("/api/summary/{id}", web::get().to(get_summary)),
        )
        .await;

        let req = TestRequests::with_session(TestRequests::api("/api/summary/%20"), "t1", "r1")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["code"], "missing_field");
        assert_eq!(body["field"], "Summary ID");
    }
}

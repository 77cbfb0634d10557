//! Request routing and dispatch for the preset API, independent of any HTTP
//! framework. A host decodes the request line and query string, hands the
//! pieces to [`ApiRequest::route`], and writes back the [`ApiResponse`].
//!
//! | method | path                          | handler          |
//! |--------|-------------------------------|------------------|
//! | POST   | `/api/StrudelPreset`          | save             |
//! | GET    | `/api/StrudelPreset`          | list all         |
//! | GET    | `/api/StrudelPreset/search`   | search by `q`    |
//! | GET    | `/api/StrudelPreset/{id}`     | get by id        |

use log::{debug, error};
use serde::Serialize;
use serde_json::json;

use crate::error::{PresetError, ValidationError};
use crate::preset::{PresetId, PresetStore, SavePresetRequest};

const API_SEGMENT: &str = "api";
const CONTROLLER_SEGMENT: &str = "StrudelPreset";

#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    Save(SavePresetRequest),
    ListAll,
    Search { q: Option<String> },
    Get { id: PresetId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON body, if any.
    pub body: Option<String>,
}

impl ApiResponse {
    pub fn ok_empty() -> Self {
        ApiResponse { status: 200, body: None }
    }

    pub fn ok_json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => ApiResponse { status: 200, body: Some(body) },
            Err(e) => Self::server_error(&e.to_string()),
        }
    }

    pub fn bad_request(err: &ValidationError) -> Self {
        let mut errors = serde_json::Map::new();
        errors.insert(err.field().to_string(), json!([err.to_string()]));
        let body = json!({
            "title": "One or more validation errors occurred.",
            "status": 400,
            "errors": errors,
        });
        ApiResponse { status: 400, body: Some(body.to_string()) }
    }

    pub fn not_found() -> Self {
        ApiResponse { status: 404, body: None }
    }

    pub fn method_not_allowed() -> Self {
        ApiResponse { status: 405, body: None }
    }

    pub fn server_error(detail: &str) -> Self {
        let body = json!({ "title": "Preset store unavailable.", "status": 500, "detail": detail });
        ApiResponse { status: 500, body: Some(body.to_string()) }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl ApiRequest {
    /// Match a request against the preset routes.
    ///
    /// `path` excludes the query string; `q` is the already-decoded `q`
    /// query parameter. Path segments match case-insensitively. A non-integer
    /// id does not match any route.
    pub fn route(
        method: &str,
        path: &str,
        q: Option<&str>,
        body: Option<&str>,
    ) -> Result<ApiRequest, ApiResponse> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let tail = match segments.as_slice() {
            [api, controller, tail @ ..]
                if api.eq_ignore_ascii_case(API_SEGMENT)
                    && controller.eq_ignore_ascii_case(CONTROLLER_SEGMENT) =>
            {
                tail
            }
            _ => return Err(ApiResponse::not_found()),
        };
        let method = method.to_ascii_uppercase();

        match (tail, method.as_str()) {
            ([], "POST") => {
                let request: SavePresetRequest = serde_json::from_str(body.unwrap_or(""))
                    .map_err(|e| {
                        ApiResponse::bad_request(&ValidationError::Rejected(format!(
                            "request body is not a valid preset: {e}"
                        )))
                    })?;
                Ok(ApiRequest::Save(request))
            }
            ([], "GET") => Ok(ApiRequest::ListAll),
            ([], _) => Err(ApiResponse::method_not_allowed()),
            ([search], "GET") if search.eq_ignore_ascii_case("search") => Ok(ApiRequest::Search {
                q: q.map(str::to_string),
            }),
            ([id], "GET") => id
                .parse::<PresetId>()
                .map(|id| ApiRequest::Get { id })
                .map_err(|_| ApiResponse::not_found()),
            ([_], _) => Err(ApiResponse::method_not_allowed()),
            _ => Err(ApiResponse::not_found()),
        }
    }
}

/// Run one request against `store`.
pub fn dispatch<S: PresetStore + ?Sized>(store: &S, request: ApiRequest) -> ApiResponse {
    debug!("dispatching {request:?}");
    let result = match request {
        ApiRequest::Save(body) => store.save(&body).map(|_| ApiResponse::ok_empty()),
        ApiRequest::ListAll => store.list_all().map(|list| ApiResponse::ok_json(&list)),
        ApiRequest::Search { q } => store
            .search_by_name(q.as_deref().unwrap_or(""))
            .map(|list| ApiResponse::ok_json(&list)),
        ApiRequest::Get { id } => store.get_by_id(id).map(|preset| ApiResponse::ok_json(&preset)),
    };
    result.unwrap_or_else(|err| error_response(&err))
}

/// Route and dispatch in one step.
pub fn handle<S: PresetStore + ?Sized>(
    store: &S,
    method: &str,
    path: &str,
    q: Option<&str>,
    body: Option<&str>,
) -> ApiResponse {
    match ApiRequest::route(method, path, q, body) {
        Ok(request) => dispatch(store, request),
        Err(response) => response,
    }
}

fn error_response(err: &PresetError) -> ApiResponse {
    match err {
        PresetError::Validation(e) => ApiResponse::bad_request(e),
        PresetError::NotFound { .. } => ApiResponse::not_found(),
        PresetError::Transport { .. } | PresetError::MalformedStoredData(_) => {
            error!("preset store failure: {err}");
            ApiResponse::server_error(&err.to_string())
        }
    }
}

// ── Tests ───────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{MemoryPresetStore, Preset, PresetSummary};
    use pretty_assertions::assert_eq;

    const SAVE_BODY: &str = r#"{"name":"Default Beat","raw":"setcps(<CPS>)","controlsJson":"{\"cps\":\"120/60/4\"}"}"#;

    fn summaries(response: &ApiResponse) -> Vec<PresetSummary> {
        serde_json::from_str(response.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn routes() {
        assert_eq!(
            ApiRequest::route("GET", "/api/StrudelPreset", None, None),
            Ok(ApiRequest::ListAll)
        );
        assert_eq!(
            ApiRequest::route("get", "/API/strudelpreset/12", None, None),
            Ok(ApiRequest::Get { id: 12 })
        );
        assert_eq!(
            ApiRequest::route("GET", "/api/StrudelPreset/search", Some("beat"), None),
            Ok(ApiRequest::Search { q: Some("beat".into()) })
        );
        assert!(matches!(
            ApiRequest::route("POST", "/api/StrudelPreset/", None, Some(SAVE_BODY)),
            Ok(ApiRequest::Save(_))
        ));
    }

    #[test]
    fn route_failures() {
        let status = |m: &str, p: &str| ApiRequest::route(m, p, None, None).unwrap_err().status;
        assert_eq!(status("GET", "/api/Other"), 404);
        assert_eq!(status("GET", "/api/StrudelPreset/abc"), 404);
        assert_eq!(status("GET", "/api/StrudelPreset/1/2"), 404);
        assert_eq!(status("DELETE", "/api/StrudelPreset/1"), 405);
        assert_eq!(status("PUT", "/api/StrudelPreset"), 405);
        assert_eq!(status("POST", "/api/StrudelPreset"), 400);
    }

    #[test]
    fn save_list_get_flow() {
        let store = MemoryPresetStore::new();
        let saved = handle(&store, "POST", "/api/StrudelPreset", None, Some(SAVE_BODY));
        assert_eq!(saved, ApiResponse::ok_empty());

        let list = handle(&store, "GET", "/api/StrudelPreset", None, None);
        assert_eq!(list.status, 200);
        let list = summaries(&list);
        assert_eq!(list.len(), 1);

        let got = handle(&store, "GET", &format!("/api/StrudelPreset/{}", list[0].id), None, None);
        let preset: Preset = serde_json::from_str(got.body.as_deref().unwrap()).unwrap();
        assert_eq!(preset.raw_code, "setcps(<CPS>)");
        assert_eq!(preset.controls_json, r#"{"cps":"120/60/4"}"#);
    }

    #[test]
    fn validation_detail_names_the_field() {
        let store = MemoryPresetStore::new();
        let body = r#"{"name":"","raw":"x","controlsJson":"{}"}"#;
        let response = handle(&store, "POST", "/api/StrudelPreset", None, Some(body));
        assert_eq!(response.status, 400);
        let detail: serde_json::Value = serde_json::from_str(response.body.as_deref().unwrap()).unwrap();
        assert!(detail["errors"]["name"].is_array());
        assert!(store.is_empty());
    }

    #[test]
    fn search_endpoint() {
        let store = MemoryPresetStore::new();
        handle(&store, "POST", "/api/StrudelPreset", None, Some(SAVE_BODY));

        let all = handle(&store, "GET", "/api/StrudelPreset", None, None);
        let absent = handle(&store, "GET", "/api/StrudelPreset/search", None, None);
        let blank = handle(&store, "GET", "/api/StrudelPreset/search", Some("  "), None);
        assert_eq!(absent, all);
        assert_eq!(blank, all);

        let hit = handle(&store, "GET", "/api/StrudelPreset/search", Some("fault"), None);
        assert_eq!(summaries(&hit).len(), 1);
        let miss = handle(&store, "GET", "/api/StrudelPreset/search", Some("zzz-nomatch"), None);
        assert!(summaries(&miss).is_empty());
    }

    #[test]
    fn unknown_id_is_404() {
        let store = MemoryPresetStore::new();
        assert_eq!(
            handle(&store, "GET", "/api/StrudelPreset/5", None, None),
            ApiResponse::not_found()
        );
    }
}

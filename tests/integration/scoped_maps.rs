//! Integration tests for scoped attribute maps

use super::test_utils::{application, request_context};
use faces_core::config::ProjectStage;
use faces_core::scope::{Cookie, ScopeKind};
use faces_core::{ExternalContext, RequestData, ScopeError};
use serde_json::json;

fn data() -> RequestData {
    RequestData::new("POST", "/form.xhtml")
        .with_header("Accept", "text/html")
        .with_header("accept", "application/xml")
        .with_parameter("id", "7")
        .with_cookie(Cookie::new("JSESSIONID", "abc"))
}

fn assert_read_only(result: Result<(), ScopeError>, scope: ScopeKind) {
    match result {
        Err(ScopeError::ReadOnly { scope: actual, .. }) => assert_eq!(actual, scope),
        other => panic!("expected read-only failure, got {:?}", other),
    }
}

#[test]
fn test_read_only_maps_reject_every_mutation() {
    let (ctx, _) = request_context(application(ProjectStage::Production), data());
    let external = ctx.external_context().unwrap();

    let mut cookies = external.request_cookie_map().unwrap().clone();
    assert_eq!(cookies.get("JSESSIONID").unwrap().value, "abc");
    assert_read_only(
        cookies.put("x", Cookie::new("x", "y")).map(|_| ()),
        ScopeKind::Cookie,
    );
    assert_read_only(cookies.remove("JSESSIONID").map(|_| ()), ScopeKind::Cookie);
    assert_read_only(cookies.remove("absent").map(|_| ()), ScopeKind::Cookie);
    assert_read_only(cookies.clear(), ScopeKind::Cookie);
    assert_read_only(
        cookies.put_all(Vec::<(String, Cookie)>::new()),
        ScopeKind::Cookie,
    );
    assert_eq!(cookies.len(), 1);

    let mut headers = external.request_header_map().unwrap().clone();
    assert_eq!(headers.get("ACCEPT").as_deref(), Some("text/html"));
    assert_read_only(
        headers.put("X-New", "v".to_string()).map(|_| ()),
        ScopeKind::Header,
    );
    assert_read_only(headers.remove("Accept").map(|_| ()), ScopeKind::Header);
    assert_read_only(
        headers.put_all(vec![("X-New", "v".to_string())]),
        ScopeKind::Header,
    );
    assert_read_only(headers.clear(), ScopeKind::Header);
    assert_eq!(headers.iter().count(), 1);

    let mut init = external.init_parameter_map();
    assert_read_only(init.put("k", "v".to_string()).map(|_| ()), ScopeKind::InitParameter);
    assert_read_only(init.remove("k").map(|_| ()), ScopeKind::InitParameter);
    assert_read_only(
        init.put_all(Vec::<(String, String)>::new()),
        ScopeKind::InitParameter,
    );
    assert_read_only(init.clear(), ScopeKind::InitParameter);
}

#[test]
fn test_header_values_keep_every_value() {
    let (ctx, _) = request_context(application(ProjectStage::Production), data());
    let values = ctx
        .external_context()
        .unwrap()
        .request_header_values_map()
        .unwrap()
        .get("Accept")
        .unwrap();
    assert_eq!(values, vec!["text/html".to_string(), "application/xml".to_string()]);
}

#[test]
fn test_application_map_shared_between_requests() {
    let app = application(ProjectStage::Production);
    let (first, _) = request_context(app.clone(), RequestData::new("GET", "/a"));
    let (second, _) = request_context(app, RequestData::new("GET", "/b"));

    first
        .external_context()
        .unwrap()
        .application_map()
        .put("counter", json!(1))
        .unwrap();
    assert_eq!(
        second.external_context().unwrap().application_map().get("counter"),
        Some(json!(1))
    );
}

#[test]
fn test_session_shared_across_requests() {
    let app = application(ProjectStage::Production);
    let (mut first, _) = request_context(app.clone(), RequestData::new("GET", "/a"));
    let mut map = first
        .external_context_mut()
        .unwrap()
        .session_map(true)
        .unwrap()
        .unwrap();
    map.put("user", json!("grace")).unwrap();
    let session = first
        .external_context()
        .unwrap()
        .session()
        .unwrap()
        .cloned()
        .unwrap();
    first.release().unwrap();

    let (mut second, _) = request_context(
        app,
        RequestData::new("GET", "/b").with_session(session),
    );
    let map = second
        .external_context_mut()
        .unwrap()
        .session_map(false)
        .unwrap()
        .unwrap();
    assert_eq!(map.get("user"), Some(json!("grace")));
    second.release().unwrap();
}

#[test]
fn test_cursor_remove_contract() {
    let mut external = ExternalContext::for_request(
        application(ProjectStage::Production),
        RequestData::new("GET", "/"),
        Default::default(),
    );
    let map = external.request_map().unwrap();
    map.put("a", json!(1)).unwrap();
    map.put("b", json!(2)).unwrap();

    let mut cursor = map.cursor();
    assert_eq!(cursor.remove(), Err(ScopeError::IllegalIteratorState));
    assert!(cursor.next().is_some());
    assert!(cursor.remove().is_ok());
    assert_eq!(cursor.remove(), Err(ScopeError::IllegalIteratorState));
    assert!(cursor.next().is_some());
    assert!(cursor.next().is_none());
    assert_eq!(map.len(), 1);
}

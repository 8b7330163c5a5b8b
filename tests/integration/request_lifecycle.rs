//! Integration tests for the request context lifecycle

use super::test_utils::{application, request_context};
use faces_core::config::ProjectStage;
use faces_core::context::{FacesMessage, Severity, ViewRoot};
use faces_core::exception::{PhaseError, PhaseId, PhaseOutcome};
use faces_core::lifecycle::Lifecycle;
use faces_core::writer::ResponseWriter;
use faces_core::{ContextError, ExternalContext, FacesContext, FacesError, RequestData};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_second_release_fails_and_accessors_fail_after_release() {
    let (mut ctx, _) = request_context(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml"),
    );
    ctx.release().unwrap();

    assert_eq!(ctx.release(), Err(ContextError::Released));
    assert_eq!(ctx.application().err(), Some(ContextError::Released));
    assert_eq!(ctx.external_context().err(), Some(ContextError::Released));
    assert_eq!(ctx.maximum_severity().err(), Some(ContextError::Released));
    assert_eq!(ctx.is_render_response().err(), Some(ContextError::Released));
    assert_eq!(
        ctx.partial_view_context().err(),
        Some(ContextError::Released)
    );
}

#[test]
fn test_release_notifies_external_context_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let external = ExternalContext::for_request(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml"),
        Default::default(),
    )
    .with_release_hook(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut ctx = FacesContext::new(external);
    ctx.release().unwrap();
    let _ = ctx.release();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dropping_live_context_releases_it() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let external = ExternalContext::for_request(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml"),
        Default::default(),
    )
    .with_release_hook(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    drop(FacesContext::new(external));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_startup_context_distinguishes_unsupported_from_released() {
    let mut ctx = FacesContext::startup(application(ProjectStage::Development));
    assert_eq!(ctx.view_root().unwrap().unwrap().locale, "en");
    assert!(ctx
        .external_context()
        .unwrap()
        .init_parameter("missing")
        .is_none());

    let unsupported = ctx.add_message(None, FacesMessage::info("x")).unwrap_err();
    assert!(matches!(unsupported, ContextError::UnsupportedDuringStartup(_)));
    assert!(ctx.external_context().unwrap().request_path().is_err());

    ctx.release().unwrap();
    assert_eq!(ctx.messages().err(), Some(ContextError::Released));
}

#[test]
fn test_client_ids_with_messages_first_occurrence_order() {
    let (mut ctx, _) = request_context(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml"),
    );
    for id in [Some("B"), Some("A"), Some("B"), None, Some("A")] {
        ctx.add_message(id, FacesMessage::info("m")).unwrap();
    }
    assert_eq!(
        ctx.client_ids_with_messages().unwrap(),
        vec![Some("B".to_string()), Some("A".to_string()), None]
    );
    assert_eq!(ctx.messages_for(Some("B")).unwrap().len(), 2);
    assert_eq!(ctx.messages_for(None).unwrap().len(), 1);
    ctx.release().unwrap();
}

#[test]
fn test_maximum_severity_ignores_missing_severity() {
    let (mut ctx, _) = request_context(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml"),
    );
    assert_eq!(ctx.maximum_severity().unwrap(), None);
    ctx.add_message(
        None,
        FacesMessage {
            severity: None,
            summary: "plain".to_string(),
            detail: String::new(),
        },
    )
    .unwrap();
    assert_eq!(ctx.maximum_severity().unwrap(), None);
    ctx.add_message(Some("f:a"), FacesMessage::new(Severity::Warn, "w", "w"))
        .unwrap();
    ctx.add_message(Some("f:b"), FacesMessage::info("i")).unwrap();
    assert_eq!(ctx.maximum_severity().unwrap(), Some(Severity::Warn));
    ctx.release().unwrap();
}

#[test]
fn test_service_full_request() {
    let (ctx, body) = request_context(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml").with_parameter("name", "ada"),
    );
    let mut lifecycle = Lifecycle::new();
    let mut handler = |phase: PhaseId, ctx: &mut FacesContext| -> PhaseOutcome {
        let result = (|| -> anyhow::Result<()> {
            match phase {
                PhaseId::RestoreView => ctx.set_view_root(ViewRoot::new("/index.xhtml", "en"))?,
                PhaseId::UpdateModelValues => {
                    let name = ctx.external_context()?.request_parameter("name")?;
                    ctx.external_context_mut()?
                        .request_map()?
                        .put("name", json!(name))?;
                }
                PhaseId::RenderResponse => {
                    let name = ctx
                        .external_context_mut()?
                        .request_map()?
                        .get("name")
                        .unwrap_or_default();
                    let stream = ctx.response_stream()?;
                    let mut writer = faces_core::writer::MarkupWriter::html(Box::new(stream));
                    writer.start_element("p", None)?;
                    writer.write_text(&format!("Hello {}", name.as_str().unwrap_or("?")), None)?;
                    writer.end_element("p")?;
                }
                _ => {}
            }
            Ok(())
        })();
        result.map_err(PhaseError::from).into()
    };
    let report = lifecycle.service(ctx, &mut handler).unwrap();
    assert_eq!(report.status, 200);
    assert_eq!(body.contents(), "<p>Hello ada</p>");
}

#[test]
fn test_service_releases_when_handler_rethrows() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let external = ExternalContext::for_request(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml"),
        Default::default(),
    )
    .with_release_hook(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut lifecycle = Lifecycle::new();
    let mut handler = |phase: PhaseId, _ctx: &mut FacesContext| {
        if phase == PhaseId::RestoreView {
            PhaseOutcome::failure(PhaseError::view_not_found("/index.xhtml"))
        } else {
            PhaseOutcome::Continue
        }
    };
    let err = lifecycle
        .service(FacesContext::new(external), &mut handler)
        .unwrap_err();
    assert!(matches!(
        err,
        FacesError::Unhandled {
            phase: PhaseId::RestoreView,
            status: 404,
            ..
        }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

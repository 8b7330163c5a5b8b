//! Integration tests for the exception queue and dispatcher

use super::test_utils::{ajax_request, application, request_context};
use faces_core::config::{ProjectStage, ERROR_HANDLING_PARAM, ERROR_PAGE_PARAM};
use faces_core::config::FacesConfig;
use faces_core::exception::{
    root_cause, AbortSignal, ExceptionHandler, ExceptionQueuedEvent, PhaseError, PhaseId,
    QueuedException, QueuedExceptionHandler, SubPhase,
};
use faces_core::{Application, FacesError, RequestData};

fn failure(message: &str, phase: PhaseId) -> ExceptionQueuedEvent {
    ExceptionQueuedEvent::failure(
        PhaseError::wrap("wrapper", PhaseError::msg(message.to_string())),
        phase,
    )
}

#[test]
fn test_abort_then_failure_classification() {
    let (mut ctx, _) = request_context(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml"),
    );
    ctx.queue_exception(
        ExceptionQueuedEvent::abort(AbortSignal::new("stop listeners"), PhaseId::ApplyRequestValues)
            .with_sub_phase(SubPhase::Before)
            .with_component("form:cmd"),
    )
    .unwrap();
    ctx.queue_exception(failure("root problem", PhaseId::InvokeApplication))
        .unwrap();

    let err = ctx.handle_exceptions().unwrap_err();
    assert!(matches!(
        &err,
        FacesError::Unhandled { message, status: 500, .. } if message == "root problem"
    ));

    let handler = ctx.exception_handler().unwrap();
    assert!(handler.unhandled_exception_events().is_empty());
    let handled = handler.handled_exception_events();
    assert_eq!(handled.len(), 2);
    assert!(handled[0].exception().is_abort());
    assert!(!handled[1].exception().is_abort());
    let thrown = handler.handled_exception_event().unwrap();
    assert_eq!(thrown.phase(), PhaseId::InvokeApplication);
    ctx.release().unwrap();
}

#[test]
fn test_default_strategy_escalates_first_failure_only() {
    let (mut ctx, body) = request_context(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml"),
    );
    ctx.queue_exception(failure("first", PhaseId::ProcessValidations))
        .unwrap();
    ctx.queue_exception(failure("second", PhaseId::UpdateModelValues))
        .unwrap();

    let err = ctx.handle_exceptions().unwrap_err();
    match err {
        FacesError::Unhandled {
            phase,
            status,
            message,
        } => {
            assert_eq!(phase, PhaseId::ProcessValidations);
            assert_eq!(status, 500);
            assert_eq!(message, "first");
        }
        other => panic!("unexpected error {:?}", other),
    }

    let handler = ctx.exception_handler().unwrap();
    assert_eq!(handler.handled_exception_events().len(), 2);
    assert!(handler.unhandled_exception_events().is_empty());
    assert_eq!(
        handler.handled_exception_event().unwrap().phase(),
        PhaseId::ProcessValidations
    );
    assert!(body.is_empty());
    ctx.release().unwrap();
}

#[test]
fn test_root_cause_round_trip() {
    let nested = PhaseError::wrap("a", PhaseError::wrap("b", PhaseError::msg("c")));
    assert_eq!(root_cause(&nested).to_string(), "c");

    let plain = PhaseError::msg("runtime");
    assert!(std::ptr::eq(root_cause(&plain), &plain));
}

#[test]
fn test_builtin_handling_reports_every_failure_of_a_drain() {
    let (mut ctx, body) = request_context(
        application(ProjectStage::Development),
        RequestData::new("GET", "/index.xhtml"),
    );
    ctx.queue_exception(failure("first failure", PhaseId::ProcessValidations))
        .unwrap();
    ctx.queue_exception(ExceptionQueuedEvent::abort(
        AbortSignal::new("ignored"),
        PhaseId::ProcessValidations,
    ))
    .unwrap();
    ctx.queue_exception(failure("second failure", PhaseId::UpdateModelValues))
        .unwrap();

    ctx.handle_exceptions().unwrap();

    let page = body.contents();
    assert!(page.contains("Multiple Errors Occurred:"));
    assert!(page.contains("first failure"));
    assert!(page.contains("second failure"));
    assert!(!page.contains("ignored"));

    let handler = ctx.exception_handler().unwrap();
    assert_eq!(handler.handled_exception_events().len(), 3);
    assert_eq!(
        handler.handled_exception_event().unwrap().phase(),
        PhaseId::ProcessValidations
    );
    assert_eq!(
        ctx.external_context().unwrap().response().unwrap().status(),
        500
    );
    ctx.release().unwrap();
}

#[test]
fn test_builtin_handling_for_ajax_writes_error_block() {
    let (mut ctx, body) = request_context(
        application(ProjectStage::Development),
        ajax_request("/index.xhtml"),
    );
    ctx.queue_exception(failure("ajax failure", PhaseId::InvokeApplication))
        .unwrap();
    ctx.handle_exceptions().unwrap();
    let xml = body.contents();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><partial-response>"));
    assert!(xml.contains(
        "<error><error-name>ApplicationException</error-name>\
         <error-message><![CDATA[ajax failure]]></error-message></error>"
    ));
    ctx.release().unwrap();
}

#[test]
fn test_error_page_param_disables_builtin_handling() {
    let mut config = FacesConfig {
        project_stage: ProjectStage::Development,
        ..FacesConfig::default()
    };
    config
        .init_params
        .insert(ERROR_PAGE_PARAM.to_string(), "/error.xhtml".to_string());
    let (mut ctx, body) = request_context(
        Application::shared(config),
        RequestData::new("GET", "/index.xhtml"),
    );
    ctx.queue_exception(failure("boom", PhaseId::RenderResponse)).unwrap();
    assert!(ctx.handle_exceptions().is_err());
    assert!(body.is_empty());
    ctx.release().unwrap();
}

#[test]
fn test_error_handling_param_enables_builtin_in_production() {
    let mut config = FacesConfig::default();
    config
        .init_params
        .insert(ERROR_HANDLING_PARAM.to_string(), "true".to_string());
    let (mut ctx, body) = request_context(
        Application::shared(config),
        RequestData::new("GET", "/index.xhtml"),
    );
    ctx.queue_exception(failure("boom", PhaseId::RenderResponse)).unwrap();
    ctx.handle_exceptions().unwrap();
    assert!(body.contents().contains("An Error Occurred:"));
    ctx.release().unwrap();
}

#[test]
fn test_handler_used_directly_across_cycles() {
    let (mut ctx, _) = request_context(
        application(ProjectStage::Production),
        RequestData::new("GET", "/index.xhtml"),
    );
    let mut handler = QueuedExceptionHandler::new();
    handler.process_event(failure("one", PhaseId::RestoreView));
    assert!(handler.handle(&mut ctx).is_err());
    handler.process_event(ExceptionQueuedEvent::abort(
        AbortSignal::new("noop"),
        PhaseId::RenderResponse,
    ));
    assert!(handler.handle(&mut ctx).is_ok());

    assert_eq!(handler.handled_exception_events().len(), 2);
    let thrown = handler.handled_exception_event().unwrap();
    assert!(matches!(thrown.exception(), QueuedException::Failure(_)));
    ctx.release().unwrap();
}

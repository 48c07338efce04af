//! Per-delivery pipeline: token resolution, client construction, enforcers.

mod common;

use std::sync::Arc;

use common::{pr_event, Call, FakeExchange, FakeFactory, FakeGitHub, GUIDE, SIGNED};
use scm::{AuthError, TokenResolver};
use signoff::dco::NO_DCO_LABEL;
use signoff::{
    Config, DescriptionOutcome, HandlerError, HandlerReport, LabelAction, PullRequestHandler,
};

fn config() -> Config {
    Config {
        port: 0,
        application_id: Some(7),
        private_key: Some("pem".to_string()),
        private_key_path: None,
        contributing_url: Some(GUIDE.to_string()),
        description_label: "invalid".to_string(),
        api_url: "http://127.0.0.1:9".to_string(),
        dco_check: true,
        description_check: true,
    }
}

struct Harness {
    api: Arc<FakeGitHub>,
    factory: Arc<FakeFactory>,
    exchange: Arc<FakeExchange>,
    handler: PullRequestHandler,
}

fn harness(api: FakeGitHub, exchange: FakeExchange, override_token: Option<&str>, config: Config) -> Harness {
    let api = Arc::new(api);
    let factory = Arc::new(FakeFactory::new(api.clone()));
    let exchange = Arc::new(exchange);
    let tokens = TokenResolver::new(override_token.map(str::to_string), exchange.clone());
    let handler = PullRequestHandler::new(config, tokens, factory.clone());
    Harness {
        api,
        factory,
        exchange,
        handler,
    }
}

#[tokio::test]
async fn test_opened_pr_runs_both_enforcers() {
    let h = harness(FakeGitHub::new(&["fix bug"], &[]), FakeExchange::ok(), None, config());
    let event = pr_event("opened", Some("  "), "FIRST_TIME_CONTRIBUTOR");

    let report = h.handler.handle(&event).await.unwrap();

    let HandlerReport::Processed {
        signoff,
        description,
    } = report
    else {
        panic!("expected processed report");
    };
    let signoff = signoff.unwrap();
    assert!(signoff.new_contributor_labelled);
    assert_eq!(signoff.action, LabelAction::AddLabelAndComment);
    assert!(matches!(description, Some(DescriptionOutcome::Flagged { .. })));

    assert_eq!(*h.exchange.calls.lock().unwrap(), vec![(7, 99)]);
    assert_eq!(*h.factory.tokens.lock().unwrap(), vec!["ghs_installation"]);
    assert_eq!(h.api.count(|c| matches!(c, Call::CreateComment(_))), 2);
    assert_eq!(h.api.labels(), vec!["new-contributor", NO_DCO_LABEL, "invalid"]);
}

#[tokio::test]
async fn test_override_token_skips_exchange() {
    let h = harness(
        FakeGitHub::new(&[SIGNED], &[NO_DCO_LABEL]),
        FakeExchange::ok(),
        Some("abc123"),
        config(),
    );
    let event = pr_event("synchronize", None, "CONTRIBUTOR");

    h.handler.handle(&event).await.unwrap();

    assert!(h.exchange.calls.lock().unwrap().is_empty());
    assert_eq!(*h.factory.tokens.lock().unwrap(), vec!["abc123"]);
    assert_eq!(
        h.api.calls(),
        vec![
            Call::ListCommits { page: 1 },
            Call::GetIssue,
            Call::RemoveLabel(NO_DCO_LABEL.to_string()),
        ]
    );
}

#[tokio::test]
async fn test_auth_failure_makes_no_api_calls() {
    let h = harness(FakeGitHub::new(&["fix bug"], &[]), FakeExchange::failing(), None, config());
    let event = pr_event("opened", None, "CONTRIBUTOR");

    let err = h.handler.handle(&event).await.unwrap_err();

    assert!(matches!(err, HandlerError::Auth(AuthError::Rejected { .. })));
    assert!(h.factory.tokens.lock().unwrap().is_empty());
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_unreadable_key_file_is_auth_error() {
    let mut config = config();
    config.private_key = None;
    config.private_key_path = Some("/nonexistent/signoff/key.pem".into());
    let h = harness(FakeGitHub::new(&[], &[]), FakeExchange::ok(), None, config);

    let err = h
        .handler
        .handle(&pr_event("opened", None, "CONTRIBUTOR"))
        .await
        .unwrap_err();

    assert!(matches!(err, HandlerError::Auth(AuthError::KeyFile { .. })));
    assert!(h.exchange.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_override_ignores_key_file() {
    let mut config = config();
    config.private_key = None;
    config.private_key_path = Some("/nonexistent/signoff/key.pem".into());
    let h = harness(FakeGitHub::new(&[SIGNED], &[]), FakeExchange::ok(), Some("abc123"), config);

    assert!(h
        .handler
        .handle(&pr_event("synchronize", None, "CONTRIBUTOR"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_closed_pr_is_ignored() {
    let h = harness(FakeGitHub::new(&["fix bug"], &[]), FakeExchange::ok(), None, config());

    let report = h
        .handler
        .handle(&pr_event("closed", None, "CONTRIBUTOR"))
        .await
        .unwrap();

    assert!(matches!(report, HandlerReport::Ignored { .. }));
    assert!(h.exchange.calls.lock().unwrap().is_empty());
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_disabled_checks_are_skipped() {
    let mut config = config();
    config.dco_check = false;
    let h = harness(FakeGitHub::new(&["fix bug"], &[]), FakeExchange::ok(), None, config);

    let report = h
        .handler
        .handle(&pr_event("opened", Some("fixes #4"), "CONTRIBUTOR"))
        .await
        .unwrap();

    assert_eq!(
        report,
        HandlerReport::Processed {
            signoff: None,
            description: Some(DescriptionOutcome::Present),
        }
    );
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn test_signoff_failure_skips_description_check() {
    let h = harness(
        FakeGitHub::new(&["fix bug"], &[]).failing_on(scm::Operation::GetIssue),
        FakeExchange::ok(),
        None,
        config(),
    );

    let err = h
        .handler
        .handle(&pr_event("opened", None, "CONTRIBUTOR"))
        .await
        .unwrap_err();

    assert!(matches!(err, HandlerError::Api(_)));
    assert_eq!(h.api.count(|c| matches!(c, Call::CreateComment(_))), 0);
    assert_eq!(h.api.count(|c| matches!(c, Call::AddLabels(_))), 0);
}

#[tokio::test]
async fn test_contributing_url_derived_from_repository() {
    let mut config = config();
    config.contributing_url = None;
    config.description_check = false;
    let h = harness(FakeGitHub::new(&["fix bug"], &[]), FakeExchange::ok(), None, config);

    h.handler
        .handle(&pr_event("synchronize", None, "CONTRIBUTOR"))
        .await
        .unwrap();

    let calls = h.api.calls();
    let comment = calls
        .iter()
        .find_map(|call| match call {
            Call::CreateComment(body) => Some(body),
            _ => None,
        })
        .unwrap();
    assert!(comment.contains("https://github.com/octo/widgets/blob/master/CONTRIBUTING.md"));
}

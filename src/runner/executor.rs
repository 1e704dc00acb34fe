//! Scenario runner implementation
//!
//! Executes endpoints strictly one after another: each endpoint may depend on
//! variables captured by the ones before it.

use serde_json::Value;

use crate::common::{MatchPolicy, Result};
use crate::http::{build, Transport};
use crate::scenario::{EndpointTest, TestScenario};
use crate::verify::{check_status, decode_document, verify};
use crate::vars::{capture, substitute_endpoint, substitute_map, Bindings, VariableStore};

use super::report::{EndpointOutcome, Reporter, ScenarioReport, Stage, Summary};

/// Options for a scenario run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Abort the remaining endpoints after the first failure
    pub stop_on_failure: bool,
    /// How expected responses are compared
    pub match_policy: MatchPolicy,
    /// Variables bound before the first endpoint, after the scenario's own
    pub seed_variables: Vec<(String, Value)>,
}

/// Drives a scenario through a transport
pub struct ScenarioRunner<T> {
    transport: T,
    options: RunOptions,
}

impl<T: Transport> ScenarioRunner<T> {
    pub fn new(transport: T, options: RunOptions) -> Self {
        Self { transport, options }
    }

    /// Run every endpoint in order and report the outcome
    ///
    /// Always produces a report; per-endpoint errors are recorded in it
    /// rather than returned.
    pub async fn run(&self, scenario: &TestScenario, reporter: &mut dyn Reporter) -> ScenarioReport {
        let mut store = self.initial_store(scenario);
        let total = scenario.endpoints.len();

        tracing::info!(endpoints = total, seeds = store.len(), "starting scenario");
        reporter.scenario_started(scenario);

        let mut outcomes = Vec::with_capacity(total);
        let mut aborted = false;

        for endpoint in &scenario.endpoints {
            let outcome = self.run_endpoint(endpoint, &mut store, reporter).await;
            let failed = !outcome.is_passed();
            reporter.endpoint_finished(&outcome);
            outcomes.push(outcome);

            if failed && self.options.stop_on_failure {
                aborted = true;
                break;
            }
        }

        let summary = Summary::tally(&outcomes, total, aborted);
        tracing::info!(
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "scenario finished"
        );
        reporter.summary(&summary);

        ScenarioReport { summary, outcomes }
    }

    fn initial_store(&self, scenario: &TestScenario) -> VariableStore {
        let mut store: VariableStore = scenario
            .variables
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        for (name, value) in &self.options.seed_variables {
            store.insert(name.clone(), value.clone());
        }
        store
    }

    /// Run one endpoint, turning the first error into a failed outcome
    async fn run_endpoint(
        &self,
        endpoint: &EndpointTest,
        store: &mut VariableStore,
        reporter: &mut dyn Reporter,
    ) -> EndpointOutcome {
        let mut reached = Stage::Pending;
        match self.execute(endpoint, store, reporter, &mut reached).await {
            Ok(()) => EndpointOutcome::passed(&endpoint.name),
            Err(e) => {
                tracing::debug!(endpoint = %endpoint.name, stage = ?reached, error = %e, "endpoint failed");
                EndpointOutcome::failed(&endpoint.name, reached, e)
            }
        }
    }

    async fn execute(
        &self,
        endpoint: &EndpointTest,
        store: &mut VariableStore,
        reporter: &mut dyn Reporter,
        reached: &mut Stage,
    ) -> Result<()> {
        let resolved = substitute_endpoint(endpoint, store);
        *reached = Stage::Substituted;

        let request = build(&resolved)?;
        tracing::debug!(endpoint = %endpoint.name, method = %request.method, url = %request.url, "sending request");
        reporter.request_prepared(&endpoint.name, &request);

        let response = self.transport.send(request).await?;
        *reached = Stage::Requested;
        reporter.response_received(&endpoint.name, &response);

        check_status(endpoint.expected_status, response.status)?;
        *reached = Stage::StatusChecked;

        if !endpoint.inspects_body() {
            return Ok(());
        }

        // Captures are taken before the body check so the expectation can
        // refer to values this very response produced
        let bindings = match &endpoint.response_variables {
            Some(vars) => capture(&decode_document(&response.body)?, vars)?,
            None => Bindings::new(),
        };
        let expected = endpoint.expected_response.as_ref().map(|expected| {
            if bindings.is_empty() {
                substitute_map(expected, store)
            } else {
                let mut staged = store.clone();
                for (name, value) in &bindings {
                    staged.insert(name.clone(), value.clone());
                }
                substitute_map(expected, &staged)
            }
        });

        verify(
            endpoint.expected_status,
            response.status,
            expected.as_ref(),
            &response.body,
            self.options.match_policy,
        )?;
        *reached = Stage::BodyChecked;

        store.extend(bindings);
        *reached = Stage::VariablesCaptured;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::http::{HttpResponse, PreparedRequest, RequestBody};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A request as the stub transport saw it
    #[derive(Debug, Clone)]
    struct Sent {
        method: String,
        url: String,
        body: Option<String>,
    }

    /// Replays canned responses in order and records requests
    #[derive(Default)]
    struct StubTransport {
        responses: Mutex<VecDeque<HttpResponse>>,
        sent: Mutex<Vec<Sent>>,
    }

    impl StubTransport {
        fn with_responses(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                sent: Mutex::default(),
            }
        }

        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<'a> Transport for &'a StubTransport {
        async fn send(&self, request: PreparedRequest) -> Result<HttpResponse> {
            let body = match &request.body {
                RequestBody::Empty => None,
                RequestBody::Json(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                RequestBody::Multipart { fields, .. } => Some(format!("{:?}", fields)),
            };
            self.sent.lock().unwrap().push(Sent {
                method: request.method.to_string(),
                url: request.url.to_string(),
                body,
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Error::Transport("connection refused".into()))
        }
    }

    /// Records which endpoints finished and the final summary
    #[derive(Default)]
    struct Recorder {
        finished: Vec<String>,
        summary: Option<Summary>,
    }

    impl Reporter for Recorder {
        fn endpoint_finished(&mut self, outcome: &EndpointOutcome) {
            self.finished.push(outcome.name.clone());
        }

        fn summary(&mut self, summary: &Summary) {
            self.summary = Some(summary.clone());
        }
    }

    fn scenario(yaml: &str) -> TestScenario {
        TestScenario::from_yaml(yaml).unwrap()
    }

    #[tokio::test]
    async fn test_captured_variable_flows_into_later_url() {
        let transport = StubTransport::with_responses(vec![
            HttpResponse::new(201, r#"{"id": 42, "name": "alice"}"#),
            HttpResponse::new(200, r#"{"id": 42}"#),
        ]);
        let runner = ScenarioRunner::new(&transport, RunOptions::default());
        let scenario = scenario(
            r#"
endpoints:
  - name: create
    url: http://api/users
    method: POST
    body:
      name: alice
    expectedStatus: 201
    responseVariables:
      uid: id
  - name: fetch
    url: "http://api/users/{{uid}}"
    method: GET
    expectedStatus: 200
    expectedResponse:
      id: "{{uid}}"
"#,
        );

        let mut recorder = Recorder::default();
        let report = runner.run(&scenario, &mut recorder).await;

        assert_eq!(report.summary.passed, 2, "{:?}", report.outcomes);
        let sent = transport.sent();
        assert_eq!(sent[0].method, "POST");
        assert_eq!(sent[0].body.as_deref(), Some(r#"{"name":"alice"}"#));
        assert_eq!(sent[1].url, "http://api/users/42");
        assert_eq!(sent[1].body, None);
        assert_eq!(recorder.finished, vec!["create", "fetch"]);
        assert_eq!(recorder.summary.unwrap().coverage, Some(100.0));
    }

    #[tokio::test]
    async fn test_expectation_sees_own_captures() {
        let transport = StubTransport::with_responses(vec![HttpResponse::new(
            200,
            r#"{"id": 7, "self": "/items/7"}"#,
        )]);
        let runner = ScenarioRunner::new(&transport, RunOptions::default());
        let scenario = scenario(
            r#"
endpoints:
  - name: item
    url: http://api/items
    method: GET
    expectedStatus: 200
    responseVariables:
      itemId: id
    expectedResponse:
      self: "/items/{{itemId}}"
"#,
        );
        let report = runner.run(&scenario, &mut Recorder::default()).await;
        assert!(report.outcomes[0].is_passed(), "{:?}", report.outcomes[0]);
        assert_eq!(report.outcomes[0].reached, Stage::Passed);
    }

    #[tokio::test]
    async fn test_status_mismatch_stops_endpoint_checks() {
        let transport =
            StubTransport::with_responses(vec![HttpResponse::new(500, "<html>boom</html>")]);
        let runner = ScenarioRunner::new(&transport, RunOptions::default());
        let scenario = scenario(
            r#"
endpoints:
  - name: broken
    url: http://api/x
    method: GET
    expectedStatus: 200
    expectedResponse:
      status: ok
"#,
        );
        let report = runner.run(&scenario, &mut Recorder::default()).await;
        let outcome = &report.outcomes[0];
        assert!(matches!(
            outcome.error,
            Some(Error::StatusMismatch {
                expected: 200,
                actual: 500
            })
        ));
        assert_eq!(outcome.reached, Stage::Requested);
    }

    #[tokio::test]
    async fn test_undecodable_body_fails_after_status_check() {
        let transport = StubTransport::with_responses(vec![
            HttpResponse::new(200, "<html>maintenance</html>"),
            HttpResponse::new(200, "<html>maintenance</html>"),
        ]);
        let runner = ScenarioRunner::new(&transport, RunOptions::default());
        let scenario = scenario(
            r#"
endpoints:
  - name: checked
    url: http://api/status
    method: GET
    expectedStatus: 200
    expectedResponse:
      status: ok
  - name: unchecked
    url: http://api/status
    method: GET
    expectedStatus: 200
"#,
        );
        let report = runner.run(&scenario, &mut Recorder::default()).await;

        let checked = &report.outcomes[0];
        assert!(matches!(checked.error, Some(Error::ResponseDecode(_))));
        assert_eq!(checked.reached, Stage::StatusChecked);
        // Without expectations or captures the body is never decoded
        assert!(report.outcomes[1].is_passed(), "{:?}", report.outcomes[1]);
    }

    #[tokio::test]
    async fn test_invalid_multipart_fails_before_sending() {
        let transport = StubTransport::with_responses(vec![HttpResponse::new(200, "{}")]);
        let runner = ScenarioRunner::new(&transport, RunOptions::default());
        let scenario = scenario(
            r#"
endpoints:
  - name: upload
    url: http://api/upload
    method: POST
    multipartFields:
      meta:
        nested: true
    expectedStatus: 200
"#,
        );
        let report = runner.run(&scenario, &mut Recorder::default()).await;
        assert!(matches!(
            report.outcomes[0].error,
            Some(Error::InvalidFieldType { .. })
        ));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_stop_on_failure_skips_remaining() {
        let transport = StubTransport::with_responses(vec![
            HttpResponse::new(200, "{}"),
            HttpResponse::new(404, "{}"),
            HttpResponse::new(200, "{}"),
        ]);
        let options = RunOptions {
            stop_on_failure: true,
            ..RunOptions::default()
        };
        let runner = ScenarioRunner::new(&transport, options);
        let scenario = scenario(
            r#"
endpoints:
  - {name: one, url: "http://api/1", method: GET, expectedStatus: 200}
  - {name: two, url: "http://api/2", method: GET, expectedStatus: 200}
  - {name: three, url: "http://api/3", method: GET, expectedStatus: 200}
"#,
        );

        let mut recorder = Recorder::default();
        let report = runner.run(&scenario, &mut recorder).await;

        assert_eq!(transport.sent().len(), 2);
        assert_eq!(recorder.finished, vec!["one", "two"]);
        let summary = report.summary;
        assert_eq!((summary.passed, summary.failed, summary.skipped), (1, 1, 1));
        assert!(summary.aborted);
    }

    #[tokio::test]
    async fn test_failures_continue_without_stop_flag() {
        let transport = StubTransport::with_responses(vec![
            HttpResponse::new(404, "{}"),
            HttpResponse::new(200, "{}"),
        ]);
        let runner = ScenarioRunner::new(&transport, RunOptions::default());
        let scenario = scenario(
            r#"
endpoints:
  - {name: one, url: "http://api/1", method: GET, expectedStatus: 200}
  - {name: two, url: "http://api/2", method: GET, expectedStatus: 200}
"#,
        );
        let report = runner.run(&scenario, &mut Recorder::default()).await;
        let summary = report.summary;
        assert_eq!((summary.passed, summary.failed, summary.skipped), (1, 1, 0));
        assert!(!summary.aborted);
    }

    #[tokio::test]
    async fn test_failed_body_check_does_not_commit_captures() {
        let transport = StubTransport::with_responses(vec![
            HttpResponse::new(200, r#"{"id": 1, "state": "pending"}"#),
            HttpResponse::new(200, "{}"),
        ]);
        let runner = ScenarioRunner::new(&transport, RunOptions::default());
        let scenario = scenario(
            r#"
endpoints:
  - name: first
    url: http://api/a
    method: GET
    expectedStatus: 200
    responseVariables: {uid: id}
    expectedResponse: {state: done}
  - name: second
    url: "http://api/b/{{uid}}"
    method: GET
    expectedStatus: 200
"#,
        );
        let report = runner.run(&scenario, &mut Recorder::default()).await;
        assert!(matches!(
            report.outcomes[0].error,
            Some(Error::ValueMismatch { .. })
        ));
        assert_eq!(report.outcomes[0].reached, Stage::StatusChecked);
        assert_eq!(transport.sent()[1].url, "http://api/b/");
    }

    #[tokio::test]
    async fn test_missing_response_field_and_seeds() {
        let transport = StubTransport::with_responses(vec![HttpResponse::new(200, r#"{"a": 1}"#)]);
        let options = RunOptions {
            seed_variables: vec![("host".to_string(), json!("api.test"))],
            ..RunOptions::default()
        };
        let runner = ScenarioRunner::new(&transport, options);
        let scenario = scenario(
            r#"
variables:
  host: ignored.test
  version: v2
endpoints:
  - name: only
    url: "http://{{host}}/{{version}}/x"
    method: GET
    expectedStatus: 200
    responseVariables: {token: token}
"#,
        );
        let report = runner.run(&scenario, &mut Recorder::default()).await;
        assert_eq!(transport.sent()[0].url, "http://api.test/v2/x");
        assert!(matches!(
            &report.outcomes[0].error,
            Some(Error::MissingResponseField { field }) if field == "token"
        ));
    }

    #[tokio::test]
    async fn test_empty_scenario() {
        let transport = StubTransport::default();
        let runner = ScenarioRunner::new(&transport, RunOptions::default());
        let report = runner
            .run(&TestScenario::default(), &mut Recorder::default())
            .await;
        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.coverage, None);
    }

    #[tokio::test]
    async fn test_transport_error_is_local() {
        // No canned responses: every send fails
        let transport = StubTransport::default();
        let runner = ScenarioRunner::new(&transport, RunOptions::default());
        let scenario = scenario(
            r#"
endpoints:
  - {name: one, url: "http://api/1", method: GET, expectedStatus: 200}
  - {name: two, url: "http://api/2", method: GET, expectedStatus: 200}
"#,
        );
        let report = runner.run(&scenario, &mut Recorder::default()).await;
        assert_eq!(report.summary.failed, 2);
        assert!(matches!(report.outcomes[1].error, Some(Error::Transport(_))));
        assert_eq!(report.outcomes[1].reached, Stage::Substituted);
    }
}

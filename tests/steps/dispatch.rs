//! Step definitions for sending requests against a wiremock server

use crate::common::world::HttpWorld;
use cucumber::{gherkin::Step, given, then, when};
use httui::repl::events::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[given(regex = r#"^a mock server answering "(\w+) ([^"]+)" with status (\d+) and JSON body:$"#)]
async fn given_mock_server(
    world: &mut HttpWorld,
    verb: String,
    route: String,
    status: u16,
    step: &Step,
) {
    if world.server.is_none() {
        world.server = Some(MockServer::start().await);
    }
    let body = step
        .docstring
        .as_deref()
        .expect("step needs a docstring")
        .trim()
        .to_string();

    let server = world.server.as_ref().expect("server started above");
    Mock::given(method(verb.as_str()))
        .and(path(route.as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body, "application/json"))
        .mount(server)
        .await;
}

#[when("the dispatched requests complete")]
async fn when_dispatches_complete(world: &mut HttpWorld) {
    world.complete_dispatches().await;
}

#[then("a request is in flight")]
async fn then_in_flight(world: &mut HttpWorld) {
    assert!(world.state().is_awaiting());
    assert!(world.state().spinner().is_some());
}

#[then("no request is in flight")]
async fn then_not_in_flight(world: &mut HttpWorld) {
    assert!(!world.state().is_awaiting());
}

#[then(regex = r"^(\d+) requests? (?:was|were) dispatched$")]
async fn then_dispatched(world: &mut HttpWorld, count: usize) {
    assert_eq!(world.dispatched.len(), count);
}

#[then(regex = r"^(\d+) results? (?:was|were) delivered$")]
async fn then_results(world: &mut HttpWorld, count: usize) {
    assert_eq!(world.results.len(), count);
    assert!(world.results.iter().all(Message::is_dispatch_result));
}

#[then(regex = r#"^the response status is "([^"]+)"$"#)]
async fn then_status(world: &mut HttpWorld, status: String) {
    let response = world
        .state()
        .last_response()
        .expect("no response is shown");
    assert_eq!(response.status.as_string(), status);
}

fn assert_response_pane_contains(world: &HttpWorld, text: &str) {
    let lines = world.state().response_lines();
    assert!(
        lines.iter().any(|line| line.contains(text)),
        "response pane was {lines:?}"
    );
}

#[then(regex = r#"^the response pane shows "([^"]+)"$"#)]
async fn then_response_pane_shows(world: &mut HttpWorld, text: String) {
    assert_response_pane_contains(world, &text);
}

#[then(regex = r"^the response pane shows '([^']+)'$")]
async fn then_response_pane_shows_quoted(world: &mut HttpWorld, text: String) {
    assert_response_pane_contains(world, &text);
}

#[then(regex = r#"^the response pane shows an error mentioning "([^"]+)"$"#)]
async fn then_response_error(world: &mut HttpWorld, text: String) {
    let error = world.state().last_error().expect("no error is shown");
    assert!(error.contains(&text), "error was {error}");
    assert_response_pane_contains(world, &text);
}

#[then("no response is shown")]
async fn then_no_response(world: &mut HttpWorld) {
    assert!(world.state().last_response().is_none());
    assert!(world.state().last_error().is_none());
    assert!(world.state().response_lines().is_empty());
}

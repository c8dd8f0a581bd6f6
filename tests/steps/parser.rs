//! Step definitions for parsing single sources and loading directories

use crate::common::world::HttpWorld;
use cucumber::{gherkin::Step, given, then, when};
use httui::repl::models::BodyKind;
use httui::repl::utils::parse_with;

fn docstring(step: &Step) -> &str {
    step.docstring.as_deref().expect("step needs a docstring")
}

#[given("the Host line is required")]
async fn given_host_required(world: &mut HttpWorld) {
    world.options.require_host = true;
}

#[given("a directory with files:")]
async fn given_directory(world: &mut HttpWorld, step: &Step) {
    let dir = tempfile::tempdir().expect("temp dir");
    let table = step.table.as_ref().expect("step needs a table");
    for row in table.rows.iter().skip(1) {
        std::fs::write(dir.path().join(&row[0]), format!("{}\n", row[1])).expect("write file");
    }
    world.dir = Some(dir);
}

#[when("I parse:")]
async fn when_parse(world: &mut HttpWorld, step: &Step) {
    world.parse(docstring(step));
}

#[when("I load the directory")]
async fn when_load_directory(world: &mut HttpWorld) {
    world.load_directory();
}

#[then(regex = r"^(\d+) requests? (?:is|are) parsed$")]
async fn then_request_count(world: &mut HttpWorld, count: usize) {
    assert_eq!(world.requests().len(), count);
}

#[then(regex = r#"^request (\d+) has method "([^"]+)" and target "([^"]+)"$"#)]
async fn then_method_and_target(world: &mut HttpWorld, index: usize, method: String, target: String) {
    let request = &world.requests()[index - 1];
    assert_eq!(request.method.as_str(), method);
    assert_eq!(request.target, target);
}

#[then(regex = r#"^request (\d+) is named "([^"]+)"$"#)]
async fn then_named(world: &mut HttpWorld, index: usize, name: String) {
    assert_eq!(world.requests()[index - 1].name.as_deref(), Some(name.as_str()));
}

#[then(regex = r#"^request (\d+) uses HTTP version "([^"]+)"$"#)]
async fn then_version(world: &mut HttpWorld, index: usize, version: String) {
    assert_eq!(world.requests()[index - 1].http_version, version);
}

#[then(regex = r"^request (\d+) has no headers$")]
async fn then_no_headers(world: &mut HttpWorld, index: usize) {
    assert!(world.requests()[index - 1].headers.is_empty());
}

#[then(regex = r#"^request (\d+) has header "([^"]+)" with value "([^"]*)"$"#)]
async fn then_header(world: &mut HttpWorld, index: usize, key: String, value: String) {
    assert_eq!(
        world.requests()[index - 1].headers.get(&key),
        Some(value.as_str())
    );
}

#[then(regex = r#"^request (\d+) has host "([^"]+)"$"#)]
async fn then_host(world: &mut HttpWorld, index: usize, host: String) {
    assert_eq!(world.requests()[index - 1].host.as_deref(), Some(host.as_str()));
}

#[then(regex = r"^request (\d+) has no body$")]
async fn then_no_body(world: &mut HttpWorld, index: usize) {
    assert_eq!(world.requests()[index - 1].body, None);
}

#[then(regex = r#"^request (\d+) has a "(\w+)" body "(.*)"$"#)]
async fn then_body(world: &mut HttpWorld, index: usize, kind: String, content: String) {
    let body = world.requests()[index - 1]
        .body
        .as_ref()
        .expect("request has no body");
    let expected_kind = match kind.as_str() {
        "Json" => BodyKind::Json,
        "PlainText" => BodyKind::PlainText,
        "FormUrlEncoded" => BodyKind::FormUrlEncoded,
        "MultipartFormData" => BodyKind::MultipartFormData,
        other => panic!("unknown body kind {other}"),
    };
    assert_eq!(body.kind, expected_kind);
    assert_eq!(body.content, content);
}

#[then(regex = r#"^parsing fails with "([^"]+)"$"#)]
async fn then_parse_fails(world: &mut HttpWorld, fragment: String) {
    let message = world.parse_error().to_string();
    assert!(
        message.contains(&fragment),
        "error '{message}' does not mention '{fragment}'"
    );
}

#[then(regex = r"^the parse error is on line (\d+)$")]
async fn then_error_line(world: &mut HttpWorld, line: usize) {
    assert_eq!(world.parse_error().line(), line);
}

#[then("re-parsing the serialised requests gives the same requests")]
async fn then_round_trip(world: &mut HttpWorld) {
    let text: String = world
        .requests()
        .iter()
        .map(|request| request.to_http_text())
        .collect::<Vec<_>>()
        .join("\n");
    let reparsed = parse_with(&text, world.options).expect("serialised text should parse");
    assert_eq!(reparsed, world.requests());
}

#[then(regex = r#"^the directory load yields files "([^"]+)"$"#)]
async fn then_directory_files(world: &mut HttpWorld, names: String) {
    let loaded = match &world.loaded {
        Some(Ok(loaded)) => loaded,
        Some(Err(e)) => panic!("directory load failed: {e}"),
        None => panic!("no directory was loaded"),
    };
    let expected: Vec<&str> = names.split(',').map(str::trim).collect();
    let actual: Vec<&str> = loaded.keys().map(String::as_str).collect();
    assert_eq!(actual, expected);
}

#[then(regex = r#"^file "([^"]+)" has (\d+) requests?$"#)]
async fn then_file_requests(world: &mut HttpWorld, name: String, count: usize) {
    let Some(Ok(loaded)) = &world.loaded else {
        panic!("directory load did not succeed");
    };
    assert_eq!(loaded[&name].len(), count);
}

#[then(regex = r#"^the directory load fails mentioning "([^"]+)"$"#)]
async fn then_directory_fails(world: &mut HttpWorld, fragment: String) {
    match &world.loaded {
        Some(Err(e)) => assert!(e.to_string().contains(&fragment), "error was: {e}"),
        Some(Ok(loaded)) => panic!("expected failure, loaded {} files", loaded.len()),
        None => panic!("no directory was loaded"),
    }
}

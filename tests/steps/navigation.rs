//! Step definitions for list selection, sections, expand and scrolling

use crate::common::world::HttpWorld;
use cucumber::{gherkin::Step, given, then, when};
use httui::repl::view_models::scrolling::max_offset;
use httui::repl::view_models::{ExpandedPane, Section};

#[given("the requests:")]
async fn given_requests(world: &mut HttpWorld, step: &Step) {
    world.parse(step.docstring.as_deref().expect("step needs a docstring"));
}

#[given(regex = r"^a terminal of (\d+) by (\d+)$")]
async fn given_terminal(world: &mut HttpWorld, cols: u16, rows: u16) {
    world.terminal_size = (cols, rows);
}

#[given("the browser is open")]
async fn given_browser_open(world: &mut HttpWorld) {
    world.open_browser();
}

#[when(regex = r#"^I press "([^"]+)"$"#)]
async fn when_press(world: &mut HttpWorld, key: String) {
    world.press(&key);
}

#[when(regex = r#"^I press "([^"]+)" (\d+) times$"#)]
async fn when_press_times(world: &mut HttpWorld, key: String, times: usize) {
    for _ in 0..times {
        world.press(&key);
    }
}

#[when(regex = r"^the terminal is resized to (\d+) by (\d+)$")]
async fn when_resized(world: &mut HttpWorld, cols: u16, rows: u16) {
    assert!(world.state_mut().resize((cols, rows)));
}

#[then(regex = r"^request (\d+) is selected$")]
async fn then_selected(world: &mut HttpWorld, index: usize) {
    assert_eq!(world.state().selected_index(), index - 1);
}

#[then(regex = r#"^the "(\w+)" section is active$"#)]
async fn then_section_active(world: &mut HttpWorld, section: String) {
    let expected = match section.as_str() {
        "List" => Section::List,
        "Request" => Section::RequestPane,
        "Response" => Section::ResponsePane,
        other => panic!("unknown section {other}"),
    };
    assert_eq!(world.state().active_section(), expected);
}

#[then(regex = r#"^the "(\w+)" pane is expanded$"#)]
async fn then_expanded(world: &mut HttpWorld, pane: String) {
    let expected = match pane.as_str() {
        "Request" => ExpandedPane::Request,
        "Response" => ExpandedPane::Response,
        other => panic!("unknown pane {other}"),
    };
    assert_eq!(world.state().expanded_pane(), expected);
}

#[then("no pane is expanded")]
async fn then_not_expanded(world: &mut HttpWorld) {
    assert_eq!(world.state().expanded_pane(), ExpandedPane::None);
}

#[then("all pane scroll offsets are 0")]
async fn then_pane_offsets_zero(world: &mut HttpWorld) {
    assert_eq!(world.state().request_offset(), 0);
    assert_eq!(world.state().response_offset(), 0);
}

#[then(regex = r"^the list scroll offset is (\d+)$")]
async fn then_list_offset(world: &mut HttpWorld, offset: usize) {
    assert_eq!(world.state().list_offset(), offset);
}

#[then(regex = r"^the request scroll offset is (\d+)$")]
async fn then_request_offset(world: &mut HttpWorld, offset: usize) {
    assert_eq!(world.state().request_offset(), offset);
}

#[then("the request scroll offset is at its maximum")]
async fn then_request_offset_max(world: &mut HttpWorld) {
    let state = world.state();
    let expected = max_offset(
        state.request_lines().len(),
        state.request_rect().viewport_height(),
    );
    assert!(expected > 0, "content should be longer than the pane");
    assert_eq!(state.request_offset(), expected);
}

#[then(regex = r#"^the request pane shows "([^"]+)"$"#)]
async fn then_request_pane_shows(world: &mut HttpWorld, text: String) {
    let lines = world.state().visible_request_lines();
    assert!(
        lines.iter().any(|line| line.contains(&text)),
        "request pane was {lines:?}"
    );
}

#[when(regex = r#"^I run the application pressing "([^"]+)"$"#)]
async fn when_run_application(world: &mut HttpWorld, keys: String) {
    let keys: Vec<&str> = keys.split(',').map(str::trim).collect();
    world.run_application(&keys).await;
}

#[when("I run the application pressing nothing")]
async fn when_run_application_idle(world: &mut HttpWorld) {
    world.run_application(&[]).await;
}

#[then("the application exits cleanly")]
async fn then_exits_cleanly(world: &mut HttpWorld) {
    assert_eq!(world.run_error, None);
}

#[then(regex = r#"^the screen shows "(.+)"$"#)]
async fn then_screen_shows(world: &mut HttpWorld, text: String) {
    let screen = world.screen.as_ref().expect("the application has not run");
    assert!(
        screen.screen_contains(&text),
        "screen was:\n{}",
        screen.screen_text()
    );
}

#[then("the terminal is restored")]
async fn then_terminal_restored(world: &mut HttpWorld) {
    let screen = world.screen.as_ref().expect("the application has not run");
    assert!(!screen.is_raw_mode());
    assert!(!screen.is_alternate_screen());
    assert!(screen.is_cursor_visible());
}

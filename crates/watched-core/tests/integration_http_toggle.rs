//! Integration test: a local stand-in for the watched CGI, driven through the
//! HTTP loader and the toggler.

mod common;

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use watched_core::config::WatchedConfig;
use watched_core::http_loader::HttpLoader;
use watched_core::reply::CallbackReply;
use watched_core::request::Action;
use watched_core::surface::TextLabel;
use watched_core::target::Focus;
use watched_core::toggler::{Dispatch, WatchedToggler};

const MARKER: &str = "/srv/media/watched/Blood Diamond.watched";

fn config_for(server: &common::cgi_server::CgiServer) -> WatchedConfig {
    WatchedConfig {
        script_host: server.base_url.clone(),
        script_location: "cgi-bin/".to_string(),
        file_root: "/srv/media/".to_string(),
        location: "watched/".to_string(),
        connect_timeout_secs: 2,
        request_timeout_secs: 5,
        ..WatchedConfig::default()
    }
}

fn focus() -> Focus {
    Focus::link("http://127.0.0.1/Video/Blood%20Diamond.mkv")
}

async fn next_reply(rx: &mut UnboundedReceiver<CallbackReply>) -> CallbackReply {
    timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("reply within timeout")
        .expect("channel open")
}

#[tokio::test]
async fn toggle_creates_then_deletes_marker() {
    let server = common::cgi_server::start();
    let cfg = config_for(&server);
    let (loader, mut rx) = HttpLoader::new(&cfg);
    let mut toggler = WatchedToggler::new(cfg, "Blood_Diamond", loader, TextLabel::default());

    let dispatch = toggler.request_toggle(Action::Toggle, &focus());
    assert!(matches!(dispatch, Dispatch::Dispatched { seq: 1, .. }));
    let reply = next_reply(&mut rx).await;
    assert_eq!(reply, CallbackReply { seq: 1, action: 1, status: 1 });
    assert!(toggler.on_reply(reply));
    assert_eq!(toggler.last_known_status(), 1);
    assert_eq!(toggler.label().text(), Some("Yes"));
    assert_eq!(toggler.loader().source(), Some("empty.js"));
    assert!(server.markers().contains(MARKER));

    toggler.request_toggle(Action::Toggle, &focus());
    let reply = next_reply(&mut rx).await;
    assert!(toggler.on_reply(reply));
    assert_eq!(toggler.last_known_status(), 0);
    assert_eq!(toggler.label().text(), Some("No"));
    assert!(server.markers().is_empty());
    assert_eq!(
        server.hits(),
        vec![
            format!("{MARKER}&1&watchedCallback"),
            format!("{MARKER}&1&watchedCallback"),
        ]
    );
}

#[tokio::test]
async fn create_only_after_check_is_suppressed() {
    let server = common::cgi_server::start();
    server.add_marker("/srv/media/watched/Heat.watched");
    let cfg = config_for(&server);
    let (loader, mut rx) = HttpLoader::new(&cfg);
    let mut toggler = WatchedToggler::new(cfg, "Heat", loader, TextLabel::default());

    toggler.request_toggle(Action::Check, &Focus::Unset);
    let reply = next_reply(&mut rx).await;
    assert_eq!(reply.action, 0);
    assert_eq!(reply.status, 1);
    assert!(toggler.on_reply(reply));

    assert_eq!(
        toggler.request_toggle(Action::CreateOnly, &Focus::Unset),
        Dispatch::Suppressed
    );
    assert_eq!(server.hits().len(), 1);
    assert!(server.markers().contains("/srv/media/watched/Heat.watched"));
}

#[tokio::test]
async fn create_only_dispatches_when_not_watched() {
    let server = common::cgi_server::start();
    let cfg = config_for(&server);
    let (loader, mut rx) = HttpLoader::new(&cfg);
    let mut toggler = WatchedToggler::new(cfg, "Heat", loader, TextLabel::default());

    toggler.request_toggle(Action::CreateOnly, &Focus::Unset);
    let reply = next_reply(&mut rx).await;
    assert!(toggler.on_reply(reply));
    assert_eq!(toggler.last_known_status(), 1);
    assert_eq!(
        server.hits(),
        vec!["/srv/media/watched/Heat.watched&1&watchedCallback".to_string()]
    );
}

#[tokio::test]
async fn malformed_reply_never_calls_back() {
    let server = common::cgi_server::start_with_options(common::cgi_server::CgiServerOptions {
        body_override: Some("<html>Not Found</html>".to_string()),
        ..Default::default()
    });
    let cfg = config_for(&server);
    let (loader, mut rx) = HttpLoader::new(&cfg);
    let mut toggler = WatchedToggler::new(cfg, "Heat", loader, TextLabel::default());

    toggler.request_toggle(Action::Toggle, &Focus::Unset);
    let waited = timeout(Duration::from_millis(1500), rx.recv()).await;
    assert!(waited.is_err(), "no reply expected");
    assert_eq!(toggler.last_known_status(), 0);
    assert_eq!(toggler.label().text(), None);
    assert_eq!(server.hits().len(), 1);
}

#[tokio::test]
async fn http_error_never_calls_back() {
    let server = common::cgi_server::start_with_options(common::cgi_server::CgiServerOptions {
        status_override: Some("500 Internal Server Error"),
        ..Default::default()
    });
    let cfg = config_for(&server);
    let (loader, mut rx) = HttpLoader::new(&cfg);
    let mut toggler = WatchedToggler::new(cfg, "Heat", loader, TextLabel::default());

    toggler.request_toggle(Action::Check, &Focus::Unset);
    let waited = timeout(Duration::from_millis(1500), rx.recv()).await;
    assert!(waited.is_err(), "no reply expected");
    assert_eq!(toggler.last_known_status(), 0);
}

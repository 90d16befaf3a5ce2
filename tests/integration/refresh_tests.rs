//! These tests use wiremock to serve listing and profile pages and run
//! complete refresh cycles against them.

use hn_glance::config::Config;
use hn_glance::scrape::CycleStage;
use hn_glance::{GlanceError, Orchestrator};
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.source.base_url = format!("{}/", server.uri());
    config.schedule.min_fetch_interval_secs = 0;
    config.schedule.fetch_timeout_secs = 5;
    config
}

/// (id, rank, author)
fn listing_page(rows: &[(u64, u32, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(id, rank, author)| {
            format!(
                r#"<tr class="athing" id="{id}">
                  <td class="title"><span class="rank">{rank}.</span></td>
                  <td class="title"><span class="titleline"><a href="https://example.com/{id}">Story {id}</a></span></td>
                </tr>
                <tr><td colspan="2"></td><td class="subtext"><span class="subline">
                  <span class="score">{points} points</span> by <a class="hnuser" href="user?id={author}">{author}</a>
                  <span class="age"><a href="item?id={id}">1 hour ago</a></span>
                  | <a href="item?id={id}">{id}&nbsp;comments</a>
                </span></td></tr>"#,
                id = id,
                rank = rank,
                points = id * 10,
                author = author,
            )
        })
        .collect();
    format!("<html><body><table>{}</table></body></html>", body)
}

fn profile_page(username: &str, karma: i64) -> String {
    format!(
        r#"<html><body><table>
            <tr class="athing"><td>user:</td><td><a class="hnuser">{}</a></td></tr>
            <tr><td>created:</td><td>June 1, 2012</td></tr>
            <tr><td>karma:</td><td>{}</td></tr>
        </table></body></html>"#,
        username, karma
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_listing(server: &MockServer, rows: &[(u64, u32, &str)]) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(rows)))
        .mount(server)
        .await;
}

async fn mount_profile(server: &MockServer, username: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(query_param("id", username))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_refresh_cycle() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(101, 3, "alice"), (102, 1, "bob"), (103, 2, "alice")]).await;
    mount_profile(&server, "alice", html(profile_page("alice", 1200))).await;
    mount_profile(&server, "bob", html(profile_page("bob", 35))).await;

    let mut orchestrator = Orchestrator::new(create_test_config(&server)).unwrap();
    let store = orchestrator.store();
    let mut published = store.subscribe();

    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.generation, 1);
    assert_eq!(report.posts, 3);
    assert_eq!(report.profiles_requested, 2);
    assert_eq!(report.profiles_refreshed, 2);
    assert_eq!(report.profiles_failed, 0);
    assert_eq!(orchestrator.stage(), CycleStage::Idle);

    published.changed().await.unwrap();
    assert_eq!(*published.borrow(), 1);

    let snapshot = store.load();
    let ids: Vec<u64> = snapshot.posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![102, 103, 101]);
    assert_eq!(snapshot.posts[0].points, 1020);
    assert_eq!(snapshot.posts[0].comment_count, 102);
    assert_eq!(snapshot.users["alice"].karma, 1200);
    assert_eq!(snapshot.users["alice"].created_string, "June 1, 2012");
    assert_eq!(snapshot.users["bob"].karma, 35);
}

#[tokio::test]
async fn test_second_cycle_is_throttled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&[(1, 1, "alice")])))
        .expect(1)
        .mount(&server)
        .await;
    mount_profile(&server, "alice", html(profile_page("alice", 5))).await;

    let mut config = create_test_config(&server);
    config.schedule.min_fetch_interval_secs = 540;
    let mut orchestrator = Orchestrator::new(config).unwrap();

    orchestrator.run_cycle().await.unwrap();
    let result = orchestrator.run_cycle().await;

    assert!(matches!(result, Err(GlanceError::Throttled { .. })));
    assert_eq!(orchestrator.store().load().generation, 1);
    assert_eq!(orchestrator.stage(), CycleStage::Idle);
}

#[tokio::test]
async fn test_transport_failure_keeps_previous_snapshot() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(1, 1, "alice")]).await;
    mount_profile(&server, "alice", html(profile_page("alice", 5))).await;

    let mut orchestrator = Orchestrator::new(create_test_config(&server)).unwrap();
    orchestrator.run_cycle().await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = orchestrator.run_cycle().await;
    assert!(matches!(result, Err(GlanceError::Transport { .. })));

    let snapshot = orchestrator.store().load();
    assert_eq!(snapshot.generation, 1);
    assert_eq!(snapshot.posts.len(), 1);
    assert_eq!(snapshot.users["alice"].karma, 5);
}

#[tokio::test]
async fn test_empty_body_is_document_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(String::new()))
        .mount(&server)
        .await;

    let mut orchestrator = Orchestrator::new(create_test_config(&server)).unwrap();
    let result = orchestrator.run_cycle().await;

    assert!(matches!(result, Err(GlanceError::DocumentParse { .. })));
    assert_eq!(orchestrator.store().load().generation, 0);
}

#[tokio::test]
async fn test_page_without_rows_is_published() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(1, 1, "alice")]).await;
    mount_profile(&server, "alice", html(profile_page("alice", 5))).await;

    let mut orchestrator = Orchestrator::new(create_test_config(&server)).unwrap();
    orchestrator.run_cycle().await.unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<html><body>Sorry.</body></html>".to_string()))
        .mount(&server)
        .await;

    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.posts, 0);
    assert_eq!(report.profiles_requested, 0);

    let snapshot = orchestrator.store().load();
    assert_eq!(snapshot.generation, 2);
    assert!(snapshot.posts.is_empty());
    // Users are never pruned
    assert!(snapshot.users.contains_key("alice"));
}

#[tokio::test]
async fn test_profile_failures_do_not_abort_cycle() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        &[(1, 1, "alice"), (2, 2, "bob"), (3, 3, "carol")],
    )
    .await;
    mount_profile(&server, "alice", html(profile_page("alice", 10))).await;
    mount_profile(&server, "bob", ResponseTemplate::new(500)).await;
    mount_profile(
        &server,
        "carol",
        html("<html><body><table><tr class=\"athing\"><td>user:</td></tr><tr><td>created: 2019</td></tr><tr><td>karma: hidden</td></tr></table></body></html>".to_string()),
    )
    .await;

    let mut orchestrator = Orchestrator::new(create_test_config(&server)).unwrap();
    let report = orchestrator.run_cycle().await.unwrap();

    assert_eq!(report.posts, 3);
    assert_eq!(report.profiles_refreshed, 1);
    assert_eq!(report.profiles_failed, 2);

    let snapshot = orchestrator.store().load();
    assert_eq!(snapshot.posts.len(), 3);
    assert_eq!(snapshot.users.len(), 1);
    assert_eq!(snapshot.users["alice"].karma, 10);
}

#[tokio::test]
async fn test_failed_profile_keeps_cached_user() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(1, 1, "alice")]).await;
    mount_profile(&server, "alice", html(profile_page("alice", 10))).await;

    let mut orchestrator = Orchestrator::new(create_test_config(&server)).unwrap();
    orchestrator.run_cycle().await.unwrap();

    server.reset().await;
    mount_listing(&server, &[(1, 1, "alice")]).await;
    mount_profile(&server, "alice", ResponseTemplate::new(500)).await;

    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.profiles_failed, 1);

    let snapshot = orchestrator.store().load();
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.users["alice"].karma, 10);
}

#[tokio::test]
async fn test_profiles_disabled() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(1, 1, "alice")]).await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(html(profile_page("alice", 1)))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.profiles.enabled = false;
    let mut orchestrator = Orchestrator::new(config).unwrap();

    let report = orchestrator.run_cycle().await.unwrap();
    assert_eq!(report.posts, 1);
    assert_eq!(report.profiles_requested, 0);
    assert_eq!(report.profiles_refreshed, 0);
    assert_eq!(report.profiles_failed, 0);
    assert!(orchestrator.store().load().users.is_empty());
}

#[tokio::test]
async fn test_shutdown_interrupts_running_cycle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(listing_page(&[(1, 1, "alice")])).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.schedule.fetch_timeout_secs = 30;
    let orchestrator = Orchestrator::new(config).unwrap();
    let store = orchestrator.store();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let refresher = tokio::spawn(orchestrator.run(shutdown_rx));

    // Let the first cycle get stuck on the slow listing
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown_tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(2), refresher)
        .await
        .expect("refresh loop did not stop while a cycle was in flight")
        .unwrap();
    assert_eq!(store.load().generation, 0);
}

#[tokio::test]
async fn test_readers_never_see_partial_cycle() {
    let server = MockServer::start().await;
    mount_listing(&server, &[(1, 1, "alice")]).await;
    mount_profile(&server, "alice", html(profile_page("alice", 10))).await;

    let mut orchestrator = Orchestrator::new(create_test_config(&server)).unwrap();
    let store = orchestrator.store();
    orchestrator.run_cycle().await.unwrap();

    server.reset().await;
    mount_listing(&server, &[(2, 1, "alice"), (3, 2, "dave")]).await;
    mount_profile(
        &server,
        "alice",
        html(profile_page("alice", 20)).set_delay(Duration::from_millis(800)),
    )
    .await;
    mount_profile(&server, "dave", html(profile_page("dave", 7))).await;

    let cycle = tokio::spawn(async move {
        let result = orchestrator.run_cycle().await;
        (orchestrator, result)
    });

    // The listing has been parsed and dave's profile fetched by now, but
    // alice's profile is still in flight.
    tokio::time::sleep(Duration::from_millis(300)).await;
    let mid = store.load();
    assert_eq!(mid.generation, 1);
    assert_eq!(mid.posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(mid.users["alice"].karma, 10);
    assert!(!mid.users.contains_key("dave"));

    let (_orchestrator, result) = cycle.await.unwrap();
    assert_eq!(result.unwrap().generation, 2);

    let done = store.load();
    assert_eq!(done.posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(done.users["alice"].karma, 20);
    assert_eq!(done.users["dave"].karma, 7);
}

// tests/background_test.rs

mod common;

use common::context_for;
use ilias_dl::{
    constants,
    crawler::{cleanup_jobs, poll_and_resolve},
    error::AppError,
    models::Placeholder,
};
use mockito::Server;
use std::path::PathBuf;

fn placeholder(name: &str) -> Placeholder {
    Placeholder {
        course: "Course".into(),
        name: name.into(),
        size_mb: f64::NAN,
        mod_time: constants::unknown_mod_time(),
        path: PathBuf::from("Course/Aufgaben").join(name.trim_end_matches(".zip")),
    }
}

const DESKTOP: &str = r##"<html><body>
<a id="mm_desktop" href="#">Desktop</a>
<div id="mm_tb_background_tasks" refresh-uri="/bar?cmd=refresh"></div>
</body></html>"##;

const BAR: &str = r#"
<div class="il-item-task">
  <div class="il-item-task-title">
Übungsblatt Größen</div>
  <button class="btn btn-default" data-action="/bt/1/download">Download</button>
  <button class="btn btn-default" data-action="/bt/1/remove">Entfernen</button>
</div>"#;

#[tokio::test]
async fn test_exports_are_matched_with_folded_names() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/ilias.php?baseClass=ilPersonalDesktopGUI")
        .with_body(DESKTOP)
        .create_async()
        .await;
    server
        .mock("GET", "/bar?cmd=refresh")
        .with_body(BAR)
        .create_async()
        .await;
    let remove = server
        .mock("GET", "/bt/1/remove")
        .expect(1)
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let url = server.url();
    let context = context_for(&url, dir.path(), |c| c.tutor_mode = true);

    // Titles read from the grades page spell umlauts as digraphs.
    let resolution = poll_and_resolve(
        &context,
        vec![placeholder("Uebungsblatt Groessen.zip"), placeholder("Blatt 9.zip")],
    )
    .await
    .unwrap();

    assert_eq!(resolution.files.len(), 1);
    let file = &resolution.files[0];
    assert_eq!(file.name, "Übungsblatt Größen.zip");
    assert_eq!(file.url, format!("{}/bt/1/download", url));
    assert_eq!(file.path, PathBuf::from("Course/Aufgaben/Uebungsblatt Groessen"));

    assert_eq!(resolution.unresolved.len(), 1);
    assert_eq!(resolution.unresolved[0].name, "Blatt 9.zip");

    assert_eq!(cleanup_jobs(&context, &resolution.cleanup_urls).await, 1);
    remove.assert_async().await;
}

#[tokio::test]
async fn test_missing_task_bar_is_an_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/ilias.php?baseClass=ilPersonalDesktopGUI")
        .with_body("<html><body>No tasks</body></html>")
        .create_async()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let url = server.url();
    let context = context_for(&url, dir.path(), |_| {});

    let result = poll_and_resolve(&context, vec![placeholder("A.zip")]).await;
    assert!(matches!(
        result,
        Err(AppError::Markup { what: "background task bar", .. })
    ));
}

#[tokio::test]
async fn test_failed_cleanup_is_not_fatal() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/bt/2/remove").with_status(500).create_async().await;
    let dir = tempfile::tempdir().unwrap();
    let url = server.url();
    let context = context_for(&url, dir.path(), |_| {});

    let urls = vec![url::Url::parse(&format!("{}/bt/2/remove", url)).unwrap()];
    assert_eq!(cleanup_jobs(&context, &urls).await, 0);
}

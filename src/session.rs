// src/session.rs

use crate::{client::RobustClient, config::credentials::Credentials, error::*};
use log::{debug, error, info};
use scraper::{Html, Selector};
use std::sync::LazyLock;

static LOGIN_INPUT_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"form[action*="/login"] input[name]"#).unwrap());
static DESKTOP_ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a#mm_desktop").unwrap());

/// Hidden fields of the single sign-on form that must be sent back with the credentials.
pub fn parse_login_form(html: &str) -> Vec<(String, String)> {
    let doc = Html::parse_document(html);
    doc.select(&LOGIN_INPUT_SEL)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Only logged in users see the link to their personal desktop.
pub fn is_logged_in(html: &str) -> bool {
    Html::parse_document(html)
        .select(&DESKTOP_ANCHOR_SEL)
        .next()
        .is_some()
}

/// Logs into the portal through the CAS form. The session cookies stay in the
/// client. Returns the start page, which lists the user's courses.
pub async fn login(client: &RobustClient, credentials: &Credentials) -> AppResult<String> {
    let config = client.config();
    let login_url = config.login_url.clone();
    info!("Logging in at {}", login_url);

    let login_page = client.get_page(login_url.clone()).await?;
    let mut form: Vec<(String, String)> = vec![
        ("username".to_string(), credentials.user.clone()),
        ("password".to_string(), credentials.password.clone()),
    ];
    for (name, value) in parse_login_form(&login_page) {
        if !form.iter().any(|(n, _)| *n == name) {
            form.push((name, value));
        }
    }
    debug!(
        "Login form fields: {:?}",
        form.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>()
    );

    let fields: Vec<(&str, &str)> = form.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect();
    // CAS answers rejected credentials with 401; the start page decides.
    let response = client.client.post(login_url).form(&fields).send().await?;
    debug!("Login form answered {}", response.status());

    let start_page = client.get_page(config.base_url.clone()).await?;
    if !is_logged_in(&start_page) {
        error!("Login as '{}' failed, no desktop link on the start page", credentials.user);
        return Err(AppError::LoginFailed);
    }
    info!("Logged in as '{}'", credentials.user);
    Ok(start_page)
}

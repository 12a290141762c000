// tests/common/mod.rs

#![allow(dead_code)]

use ilias_dl::{CrawlContext, config::AppConfig, models::Course};
use std::path::Path;
use url::Url;

/// A context whose portal is the mock server and whose downloads land in `download_dir`.
pub fn context_for(server_url: &str, download_dir: &Path, tweak: impl FnOnce(&mut AppConfig)) -> CrawlContext {
    let mut config = AppConfig {
        base_url: Url::parse(&format!("{}/", server_url)).unwrap(),
        login_url: Url::parse(&format!("{}/cas/login", server_url)).unwrap(),
        download_path: download_dir.to_path_buf(),
        ..Default::default()
    };
    tweak(&mut config);
    CrawlContext::new(config).unwrap()
}

pub fn course(server_url: &str, path: &str) -> Course {
    Course {
        ref_id: 1,
        name: "Course".into(),
        url: format!("{}{}", server_url, path),
    }
}

/// A folder listing with the usual three breadcrumb entries above the course.
pub fn folder_page(location: &[&str], folders: &[(&str, &str)], files: &[(&str, &str)]) -> String {
    let mut html = String::from("<html><body><div id=\"mainscrolldiv\"><ol class=\"breadcrumb\">");
    for crumb in ["Magazin", "Fakultät", "Course"].iter().chain(location) {
        html.push_str(&format!("<li><a href=\"#\">{}</a></li>", crumb));
    }
    html.push_str("</ol></div>");
    for (name, href) in folders {
        html.push_str(&format!(
            "<div class=\"il_ContainerListItem\"><a class=\"il_ContainerItemTitle\" href=\"{}\">{}</a></div>",
            href, name
        ));
    }
    for (name, href) in files {
        html.push_str(&format!(
            r#"<div class="il_ContainerListItem">
  <a class="il_ContainerItemTitle" href="{}">{}</a>
  <div class="il_ItemProperties">
    <span class="il_ItemProperty">pdf&nbsp;</span>
    <span class="il_ItemProperty">1,5 MB&nbsp;</span>
    <span class="il_ItemProperty">17. Sep 2020, 14:59&nbsp;</span>
  </div>
</div>"#,
            href, name
        ));
    }
    html.push_str("</body></html>");
    html
}

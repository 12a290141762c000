// src/portal/pages.rs

//! Turns fetched portal pages into owned data. Parsed documents never leave
//! these functions, so callers can hold the results across `.await` points.

use super::{
    classifier::classify,
    media::{MediaItem, parse_media_containers},
    properties::{FileProperties, extract_file_properties, parse_portal_date},
};
use crate::{constants, error::*, models::ItemKind, utils};
use chrono::{NaiveDate, NaiveDateTime};
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

selector!(BREADCRUMB_SEL, "body ol");
selector!(LI_SEL, "li");
selector!(LIST_ITEM_SEL, "div.il_ContainerListItem");
selector!(LINK_SEL, "a[href]");
selector!(TASK_TITLE_SEL, "a.ilAccAnchor");
selector!(TASK_FILES_SEL, "div#infoscreen_section_1 div.form-group");
selector!(INFO_PROPERTY_SEL, "div.il_InfoScreenProperty");
selector!(
    DEADLINE_SEL,
    "#infoscreen_section_2 > div:nth-child(2) > div.il_InfoScreenPropertyValue"
);
selector!(GRADES_TAB_SEL, "#tab_grades > a[href]");
selector!(TOOLBAR_FORM_SEL, "form#ilToolbar[action]");
selector!(HEADER_TITLE_SEL, "#il_mhead_t_focus");
selector!(BACKGROUND_BAR_SEL, "#mm_tb_background_tasks[refresh-uri]");
selector!(TASK_ITEM_SEL, "div.il-item-task");
selector!(TASK_ITEM_TITLE_SEL, "div.il-item-task-title");
selector!(TASK_BUTTON_SEL, "button.btn.btn-default[data-action]");

fn element_text(element: scraper::ElementRef<'_>) -> String {
    utils::clean_text(&element.text().collect::<String>())
}

/// One row of a folder listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub name: String,
    pub url: Url,
    pub kind: ItemKind,
    /// Only read for files.
    pub properties: Option<FileProperties>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderPage {
    /// Breadcrumb entries below the course.
    pub location: Vec<String>,
    pub entries: Vec<ListingEntry>,
    pub media: Vec<MediaItem>,
}

pub fn parse_folder_page(html: &str, base_url: &Url, today: NaiveDate) -> FolderPage {
    let doc = Html::parse_document(html);

    let location = doc
        .select(&BREADCRUMB_SEL)
        .next()
        .map(|ol| {
            ol.select(&LI_SEL)
                .map(element_text)
                .filter(|s| !s.is_empty())
                .skip(constants::BREADCRUMB_COURSE_DEPTH)
                .collect()
        })
        .unwrap_or_default();

    let entries = doc
        .select(&LIST_ITEM_SEL)
        .filter_map(|row| {
            let link = row.select(&LINK_SEL).next()?;
            let url = base_url.join(link.value().attr("href")?).ok()?;
            let kind = classify(url.as_str());
            let properties = (kind == ItemKind::File).then(|| extract_file_properties(row, today));
            Some(ListingEntry {
                name: element_text(link),
                url,
                kind,
                properties,
            })
        })
        .collect();

    FolderPage {
        location,
        entries,
        media: parse_media_containers(&doc, base_url),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskPage {
    pub title: String,
    /// Name and link of every file handed out with the task.
    pub files: Vec<(String, Url)>,
    pub deadline: Option<NaiveDateTime>,
    pub grades_url: Option<Url>,
}

pub fn parse_task_page(html: &str, page_url: &str, base_url: &Url, today: NaiveDate) -> AppResult<TaskPage> {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TASK_TITLE_SEL)
        .next()
        .map(element_text)
        .ok_or_else(|| AppError::Markup {
            what: "task title",
            url: page_url.to_string(),
        })?;

    let files = doc
        .select(&TASK_FILES_SEL)
        .filter_map(|group| {
            let href = group.select(&LINK_SEL).next()?.value().attr("href")?;
            let url = base_url.join(href).ok()?;
            let name = group.select(&INFO_PROPERTY_SEL).next().map(element_text)?;
            Some((name, url))
        })
        .collect();

    let deadline = doc
        .select(&DEADLINE_SEL)
        .next()
        .and_then(|d| parse_portal_date(&element_text(d), today));

    let grades_url = doc
        .select(&GRADES_TAB_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| base_url.join(href).ok());

    Ok(TaskPage {
        title,
        files,
        deadline,
        grades_url,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradesPage {
    pub form_action: Url,
    pub title: String,
}

pub fn parse_grades_page(html: &str, page_url: &str, base_url: &Url) -> AppResult<GradesPage> {
    let doc = Html::parse_document(html);
    let form_action = doc
        .select(&TOOLBAR_FORM_SEL)
        .next()
        .and_then(|f| f.value().attr("action"))
        .and_then(|action| base_url.join(action).ok())
        .ok_or_else(|| AppError::Markup {
            what: "submission toolbar",
            url: page_url.to_string(),
        })?;
    let title = doc
        .select(&HEADER_TITLE_SEL)
        .next()
        .map(|t| t.text().collect::<String>().replace('\n', "").trim().to_string())
        .ok_or_else(|| AppError::Markup {
            what: "page title",
            url: page_url.to_string(),
        })?;
    Ok(GradesPage { form_action, title })
}

/// A finished export listed in the background task bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundJob {
    pub name: String,
    pub download_url: Url,
    pub cleanup_url: Url,
}

/// Finds the endpoint that renders the background task bar.
pub fn parse_background_bar_url(html: &str, base_url: &Url) -> Option<Url> {
    let doc = Html::parse_document(html);
    doc.select(&BACKGROUND_BAR_SEL)
        .next()
        .and_then(|bar| bar.value().attr("refresh-uri"))
        .and_then(|uri| base_url.join(uri).ok())
}

pub fn parse_background_jobs(html: &str, base_url: &Url) -> Vec<BackgroundJob> {
    let doc = Html::parse_document(html);
    doc.select(&TASK_ITEM_SEL)
        .filter_map(|item| {
            let mut actions = item
                .select(&TASK_BUTTON_SEL)
                .filter_map(|b| b.value().attr("data-action"))
                .filter_map(|action| base_url.join(action).ok());
            let download_url = actions.next()?;
            let cleanup_url = actions.next()?;
            let title = item
                .select(&TASK_ITEM_TITLE_SEL)
                .next()?
                .text()
                .collect::<String>()
                .replace('\n', "");
            Some(BackgroundJob {
                name: format!("{}.zip", title.trim()),
                download_url,
                cleanup_url,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://ilias.example.org/").unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 10, 25).unwrap()
    }

    const FOLDER: &str = r##"
<html><body>
<div id="mainscrolldiv">
<ol class="breadcrumb">
  <li><a href="#">Magazin</a></li>
  <li><a href="#">Fakultät</a></li>
  <li><a href="#">OPM 561</a></li>
  <li><a href="#">Vorlesung</a></li>
  <li><span>Woche 1: Grundlagen</span></li>
</ol>
</div>
<div class="il_ContainerListItem">
  <a class="il_ContainerItemTitle" href="goto.php?target=file_11_download">Folien Kapitel 1</a>
  <div class="il_ItemProperties">
    <span class="il_ItemProperty">pdf&nbsp;</span>
    <span class="il_ItemProperty">1,5 MB&nbsp;</span>
    <span class="il_ItemProperty">17. Sep 2020, 14:59&nbsp;</span>
  </div>
</div>
<div class="il_ContainerListItem">
  <a class="il_ContainerItemTitle" href="ilias.php?ref_id=12&amp;cmdClass=ilrepositorygui">Übungen</a>
</div>
<div class="il_ContainerListItem">
  <a class="il_ContainerItemTitle" href="ilias.php?ref_id=13&amp;cmd=showThreads">Forum</a>
</div>
<div class="il_ContainerListItem"><span>No link here</span></div>
</body></html>"##;

    #[test]
    fn test_parse_folder_page() {
        let page = parse_folder_page(FOLDER, &base(), today());
        assert_eq!(page.location, vec!["Vorlesung", "Woche 1: Grundlagen"]);
        assert_eq!(page.entries.len(), 3);
        assert!(page.media.is_empty());

        let file = &page.entries[0];
        assert_eq!(file.kind, ItemKind::File);
        assert_eq!(file.name, "Folien Kapitel 1");
        assert_eq!(file.url.as_str(), "https://ilias.example.org/goto.php?target=file_11_download");
        assert_eq!(file.properties.as_ref().unwrap().extension, ".pdf");

        assert_eq!(page.entries[1].kind, ItemKind::Folder);
        assert!(page.entries[1].properties.is_none());
        assert_eq!(page.entries[2].kind, ItemKind::Forum);
    }

    #[test]
    fn test_parse_task_page() {
        let html = r##"
<html><body>
<a class="ilAccAnchor" href="#">Blatt 3</a>
<div id="infoscreen_section_1">
  <div class="form-group"><div class="il_InfoScreenProperty">blatt3.pdf</div>
    <div><a href="ilias.php?cmd=downloadFile&amp;file=1">Download</a></div></div>
  <div class="form-group"><div class="il_InfoScreenProperty">daten.csv</div>
    <div><a href="ilias.php?cmd=downloadFile&amp;file=2">Download</a></div></div>
</div>
<div id="infoscreen_section_2">
  <div class="il_InfoScreenSection">Termine</div>
  <div class="form-group">
    <div class="il_InfoScreenProperty col-xs-3">Abgabetermin</div>
    <div class="il_InfoScreenPropertyValue col-xs-9">17. Sep 2020, 14:59</div>
  </div>
</div>
<ul><li id="tab_grades"><a href="ilias.php?cmd=members">Abgaben</a></li></ul>
</body></html>"##;
        let page = parse_task_page(html, "task", &base(), today()).unwrap();
        assert_eq!(page.title, "Blatt 3");
        assert_eq!(page.files.len(), 2);
        assert_eq!(page.files[1].0, "daten.csv");
        assert_eq!(
            page.deadline,
            NaiveDate::from_ymd_opt(2020, 9, 17).unwrap().and_hms_opt(14, 59, 0)
        );
        assert_eq!(
            page.grades_url.unwrap().as_str(),
            "https://ilias.example.org/ilias.php?cmd=members"
        );
    }

    #[test]
    fn test_task_page_without_title_is_an_error() {
        let result = parse_task_page("<html><body></body></html>", "task-url", &base(), today());
        assert!(matches!(result, Err(AppError::Markup { what: "task title", .. })));
    }

    #[test]
    fn test_parse_background_jobs() {
        let html = r#"
<div class="il-item-task">
  <div class="il-item-task-title">
Übung Blatt 3</div>
  <button class="btn btn-default" data-action="ilias.php?bt=1&amp;cmd=download">Download</button>
  <button class="btn btn-default" data-action="ilias.php?bt=1&amp;cmd=remove">Entfernen</button>
</div>
<div class="il-item-task">
  <div class="il-item-task-title">Still running</div>
  <button class="btn btn-default" data-action="ilias.php?bt=2&amp;cmd=cancel">Abbrechen</button>
</div>"#;
        let jobs = parse_background_jobs(html, &base());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "Übung Blatt 3.zip");
        assert!(jobs[0].download_url.as_str().ends_with("cmd=download"));
        assert!(jobs[0].cleanup_url.as_str().ends_with("cmd=remove"));
    }

    #[test]
    fn test_parse_background_bar_url() {
        let html = r#"<div id="mm_tb_background_tasks" refresh-uri="ilias.php?cmd=refresh&amp;x=1"></div>"#;
        assert_eq!(
            parse_background_bar_url(html, &base()).unwrap().as_str(),
            "https://ilias.example.org/ilias.php?cmd=refresh&x=1"
        );
        assert!(parse_background_bar_url("<div></div>", &base()).is_none());
    }
}

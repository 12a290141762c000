// src/portal/classifier.rs

use crate::{constants::portal::markers, models::ItemKind};

/// Ordered rules, the first marker found in a url decides its kind.
const RULES: &[(&str, ItemKind)] = &[
    (markers::FILE, ItemKind::File),
    (markers::DIRECT_LINK, ItemKind::Link),
    (markers::THREADS, ItemKind::Forum),
    (markers::OVERVIEW, ItemKind::Task),
    (markers::LEARNING_MATERIAL, ItemKind::LearningMaterial),
];

/// Maps a link to the kind of object behind it. Unknown shapes are treated as
/// folders so that the crawler still looks inside them.
pub fn classify(url: &str) -> ItemKind {
    RULES
        .iter()
        .find(|(marker, _)| url.contains(marker))
        .map(|(_, kind)| *kind)
        .unwrap_or(ItemKind::Folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_shapes() {
        let base = "https://ilias.uni-mannheim.de/";
        assert_eq!(
            classify(&format!("{base}goto.php?target=file_1234_download&client_id=ILIAS")),
            ItemKind::File
        );
        assert_eq!(
            classify(&format!("{base}ilias.php?ref_id=5&cmd=calldirectlink&baseClass=ilLinkResourceHandlerGUI")),
            ItemKind::Link
        );
        assert_eq!(
            classify(&format!("{base}ilias.php?ref_id=6&cmd=showThreads&cmdClass=ilobjforumgui")),
            ItemKind::Forum
        );
        assert_eq!(
            classify(&format!("{base}ilias.php?ref_id=7&cmd=showOverview&cmdClass=ilobjexercisegui")),
            ItemKind::Task
        );
        assert_eq!(
            classify(&format!("{base}ilias.php?baseClass=ilHTLMPresentationGUI&ref_id=8")),
            ItemKind::LearningMaterial
        );
    }

    #[test]
    fn test_unknown_shapes_fall_back_to_folder() {
        assert_eq!(classify(""), ItemKind::Folder);
        assert_eq!(classify("not even a url"), ItemKind::Folder);
        assert_eq!(
            classify("https://ilias.uni-mannheim.de/ilias.php?ref_id=9&cmdClass=ilrepositorygui"),
            ItemKind::Folder
        );
    }

    #[test]
    fn test_first_rule_wins() {
        // A file download that happens to come from an overview page is still a file.
        assert_eq!(classify("x?cmd=showOverview&target=file_1"), ItemKind::File);
        assert_eq!(classify("x?cmd=showThreads&calldirectlink"), ItemKind::Link);
    }
}

use wayfarer_core::naming::{command_id, display_title, normalize_id, parent_region_id, title_case};
use wayfarer_core::region::RegionKind;

#[test]
fn command_ids_follow_heart_and_of_rules() {
    assert_eq!(command_id("cherrybrook"), "discoverCherrybrook");
    assert_eq!(command_id("heart_of_warriotos"), "discoverHeartOfWarriotos");
    assert_eq!(command_id("ebon_of_wither"), "discoverEbonofWither");
    assert_eq!(command_id("of_the_deep"), "discoverOfTheDeep");
    assert_eq!(command_id("whispering_pines"), "discoverWhisperingPines");
}

#[test]
fn display_titles_name_hearts_after_their_parent() {
    assert_eq!(
        display_title("heart_of_cherrybrook", RegionKind::Heart),
        "Heart of Cherrybrook"
    );
    assert_eq!(
        display_title("heart_of_whispering_pines", RegionKind::Heart),
        "Heart of Whispering Pines"
    );
    assert_eq!(
        display_title("ebon_of_wither", RegionKind::Region),
        "Ebon of Wither"
    );
    assert_eq!(display_title("cherrybrook", RegionKind::Village), "Cherrybrook");
}

#[test]
fn title_case_keeps_inner_of_lowercase() {
    assert_eq!(title_case("ebon_of_wither"), "Ebon of Wither");
    assert_eq!(title_case("of_mice_OF_men"), "Of Mice of Men");
    assert_eq!(title_case("LOUD_name"), "Loud Name");
    assert_eq!(title_case("double__underscore"), "Double Underscore");
    assert_eq!(title_case(""), "");
}

#[test]
fn normalize_id_collapses_separators() {
    assert_eq!(normalize_id("  Whispering-Pines "), "whispering_pines");
    assert_eq!(normalize_id("Old  Mill - Road"), "old_mill_road");
    assert_eq!(normalize_id("__leading"), "leading");
    assert_eq!(normalize_id("trailing__"), "trailing");
    assert_eq!(normalize_id("Spawn"), "spawn");
}

#[test]
fn parent_region_only_for_hearts() {
    assert_eq!(parent_region_id("heart_of_cherrybrook"), Some("cherrybrook"));
    assert_eq!(parent_region_id("heart_of_"), None);
    assert_eq!(parent_region_id("cherrybrook"), None);
}

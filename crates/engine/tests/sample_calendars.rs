//! The calendar documents shipped in `calendars/` load and agree with the
//! built-in definitions.

use std::path::PathBuf;

use almanac_domain::CalendarDefinition;
use almanac_engine::infrastructure::importers::CalendarImporter;
use almanac_engine::CalendarService;

fn calendar_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("calendars")
}

#[tokio::test]
async fn every_document_loads() {
    let defs = CalendarImporter::new(calendar_dir()).load_all().await.unwrap();
    let ids: Vec<_> = defs.iter().map(|d| d.id().as_str().to_string()).collect();
    assert_eq!(ids, vec!["gregorian", "harptos"]);
}

#[tokio::test]
async fn documents_match_builtins_on_the_timeline() {
    let importer = CalendarImporter::new(calendar_dir());
    for (file, builtin) in [
        ("gregorian.json", CalendarDefinition::gregorian()),
        ("harptos.json", CalendarDefinition::harptos()),
    ] {
        let loaded = importer.load_file(calendar_dir().join(file)).await.unwrap();
        for year in 1488..1500 {
            assert_eq!(loaded.month_lengths(year), builtin.month_lengths(year), "{file} {year}");
            assert_eq!(loaded.year_length(year), builtin.year_length(year), "{file} {year}");
        }
        assert_eq!(loaded.year(), builtin.year());
    }
}

#[tokio::test]
async fn variants_are_activatable() {
    let service = CalendarService::new();
    assert_eq!(service.load_from_dir(calendar_dir()).await.unwrap(), 2);

    let common = service.activate("harptos-common").await.unwrap();
    let date = common.clock_to_date(0);
    assert_eq!(date.month_name(common.definition()), Some("Deepwinter"));

    let campaign = service.activate("harptos-campaign").await.unwrap();
    let date = campaign.clock_to_date(0);
    assert_eq!(date.display_year(campaign.definition()), "Year 1");

    assert!(service.get("gregorian-roman-months").is_some());
}

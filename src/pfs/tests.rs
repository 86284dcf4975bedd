//! Tests for the configuration document and simulation file accessors

use std::path::{Path, PathBuf};

use super::*;

const SAMPLE: &str = "\
// Created     : 2024-05-02 10:11:12
// Version     : 22.0.0

[FemEngineHD]
   [DOMAIN]
      file_name = |.\\mesh\\NorthSea.mesh|
   EndSect  // DOMAIN

   [TIME]
      start_time = 2022, 1, 1, 0, 0, 0
      time_step_interval = 1800
      number_of_time_steps = 1488
   EndSect  // TIME

   [HYDRODYNAMIC_MODULE]
      mode = 2
      [BED_RESISTANCE]
         type = 1
         [MANNING_NUMBER]
            format = 0
            constant_value = 32
            file_name = ||
            item_number = 1
            item_name = ''
         EndSect  // MANNING_NUMBER
      EndSect  // BED_RESISTANCE
   EndSect  // HYDRODYNAMIC_MODULE
EndSect  // FemEngineHD
";

#[test]
fn test_parse_nested_sections() {
    let doc = PfsDocument::parse(SAMPLE).unwrap();
    assert_eq!(doc.sections().len(), 1);

    let time = doc.section("FemEngineHD/TIME").unwrap();
    assert_eq!(time.get("time_step_interval"), Some("1800"));
    assert_eq!(time.get_parsed::<u64>("number_of_time_steps").unwrap(), 1488);

    assert!(doc.section("femenginehd/hydrodynamic_module/bed_resistance").is_some());
    assert!(doc.section("FemEngineHD/NOPE").is_none());
}

#[test]
fn test_write_then_parse_preserves_tree() {
    let doc = PfsDocument::parse(SAMPLE).unwrap();
    let reparsed = PfsDocument::parse(&doc.to_string()).unwrap();
    assert_eq!(doc, reparsed);
}

#[test]
fn test_syntax_errors() {
    assert!(matches!(
        PfsDocument::parse("EndSect\n"),
        Err(PfsError::Syntax { line: 1, .. })
    ));
    assert!(matches!(
        PfsDocument::parse("[A]\n   x = 1\n"),
        Err(PfsError::Syntax { .. })
    ));
    assert!(matches!(
        PfsDocument::parse("x = 1\n"),
        Err(PfsError::Syntax { line: 1, .. })
    ));
    assert!(matches!(
        PfsDocument::parse("[A]\n   what is this\nEndSect\n"),
        Err(PfsError::Syntax { line: 2, .. })
    ));
}

#[test]
fn test_set_replaces_and_appends() {
    let mut section = PfsSection::new("S");
    section.push(PfsNode::Entry {
        key: "a".to_string(),
        value: "1".to_string(),
    });
    section.push(PfsNode::Section(PfsSection::new("CHILD")));

    section.set("A", "2");
    section.set("b", "3");

    assert_eq!(section.get("a"), Some("2"));
    assert_eq!(section.get("b"), Some("3"));
    // new entries are kept ahead of child sections
    assert!(matches!(section.children()[1], PfsNode::Entry { .. }));
    assert!(matches!(section.children()[2], PfsNode::Section(_)));
}

#[test]
fn test_unquote() {
    assert_eq!(unquote("|C:\\model\\m.txt|"), "C:\\model\\m.txt");
    assert_eq!(unquote("'manning'"), "manning");
    assert_eq!(unquote(" 42 "), "42");
    assert_eq!(quote_file(Path::new("/a/b.txt")), "|/a/b.txt|");
    assert_eq!(quote_str("manning"), "'manning'");
}

#[test]
fn test_simfile_time_steps() {
    let sim = SimFile::from_document(PfsDocument::parse(SAMPLE).unwrap());
    assert_eq!(sim.number_of_time_steps().unwrap(), 1488);
}

#[test]
fn test_simfile_missing_time_section() {
    let sim = SimFile::from_document(PfsDocument::parse("[FemEngineHD]\nEndSect\n").unwrap());
    assert!(matches!(
        sim.number_of_time_steps(),
        Err(PfsError::SectionNotFound(_))
    ));
}

#[test]
fn test_simfile_set_manning_map() {
    let mut sim = SimFile::from_document(PfsDocument::parse(SAMPLE).unwrap());
    let target = PathBuf::from("/runs/manning_trial_3.txt");
    sim.set_manning_map(&target, "manning").unwrap();

    let map = sim.manning_map().unwrap();
    assert_eq!(map.file_name, target);
    assert_eq!(map.item_number, 1);
    assert_eq!(map.item_name, "manning");

    let section = sim.document().section(MANNING_SECTION).unwrap();
    assert_eq!(section.get("format"), Some("2"));
    // untouched entries survive
    assert_eq!(section.get("constant_value"), Some("32"));
    assert_eq!(
        sim.document().section("FemEngineHD/DOMAIN").unwrap().get("file_name"),
        Some("|.\\mesh\\NorthSea.mesh|")
    );
}

#[test]
fn test_simfile_roundtrip_on_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("NorthSea.m21fm");
    std::fs::write(&path, SAMPLE).unwrap();

    let sim = SimFile::read(&path).unwrap();
    let out = dir.path().join("copy.m21fm");
    sim.write(&out).unwrap();
    assert_eq!(SimFile::read(&out).unwrap(), sim);
}

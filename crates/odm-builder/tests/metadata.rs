//! Integration tests for study metadata.

use odm_builder::model::{
    ActionType, CodeListDataType, DataType, ProjectType, RangeCheckComparator, RangeCheckType,
    StepFunction, StudyEventType,
};
use odm_builder::{
    BasicDefinitions, CheckValue, CodeList, CodeListItem, CodeListRef, Element, ErrorKind,
    EventLog, FormDef, FormRef, GlobalVariables, ItemDef, ItemGroupDef, ItemGroupRef, ItemRef,
    MdsolCheckAction, MdsolCheckStep, MdsolConfirmationMessage, MdsolDerivationDef,
    MdsolDerivationStep, MdsolEditCheckDef, MdsolLabelDef, MeasurementUnit, MetaDataVersion,
    Protocol, RangeCheck, Study, StudyEventDef, StudyEventRef, to_xml_string,
};

fn start_tags(node: &impl Element) -> Vec<String> {
    let mut log = EventLog::new();
    node.build(&mut log).unwrap();
    log.start_tags().into_iter().map(String::from).collect()
}

fn position(tags: &[String], tag: &str) -> usize {
    tags.iter()
        .position(|candidate| candidate == tag)
        .unwrap_or_else(|| panic!("{tag} not written"))
}

#[test]
fn test_repeating_scheduled_event() {
    let event = StudyEventDef::new("VISIT", "Visit", true, StudyEventType::Scheduled);
    let xml = to_xml_string(&event).unwrap();
    assert_eq!(
        xml,
        r#"<StudyEventDef OID="VISIT" Name="Visit" Repeating="Yes" Type="Scheduled" />"#
    );
}

#[test]
fn test_parsed_event_type_is_written_verbatim() {
    let event_type: StudyEventType = "Scheduled".parse().unwrap();
    let mut event = StudyEventDef::new("SCREEN", "Screening", false, event_type).with_window(-3, 0, 3);
    event.attach(FormRef::new("DM", 1, true)).unwrap();
    insta::assert_snapshot!(to_xml_string(&event).unwrap(), @r#"<StudyEventDef OID="SCREEN" Name="Screening" Repeating="No" Type="Scheduled" mdsol:StartWinDays="-3" mdsol:TargetDays="0" mdsol:EndWinDays="3"><FormRef FormOID="DM" OrderNumber="1" Mandatory="Yes" /></StudyEventDef>"#);
}

#[test]
fn test_extensions_follow_core_definitions() {
    let mut mdv = MetaDataVersion::new("MDV1", "Draft 1");
    mdv.attach(MdsolLabelDef::new("LBL1", "Header"))
        .unwrap()
        .attach(MdsolConfirmationMessage::new("Saved"))
        .unwrap()
        .attach(FormDef::new("DM", "Demography"))
        .unwrap()
        .attach(MdsolEditCheckDef::new("CHK1"))
        .unwrap()
        .attach(ItemGroupDef::new("DM", "Demography"))
        .unwrap();

    let tags = start_tags(&mdv);
    let last_core = position(&tags, "FormDef").max(position(&tags, "ItemGroupDef"));
    for extension in [
        "mdsol:ConfirmationMessage",
        "mdsol:LabelDef",
        "mdsol:EditCheckDef",
    ] {
        assert!(position(&tags, extension) > last_core, "{extension} written early");
    }
    assert!(position(&tags, "mdsol:ConfirmationMessage") < position(&tags, "mdsol:LabelDef"));
}

#[test]
fn test_second_confirmation_message_is_rejected() {
    let mut mdv = MetaDataVersion::new("MDV1", "Draft 1");
    mdv.attach(MdsolConfirmationMessage::new("Saved")).unwrap();
    let err = mdv
        .attach(MdsolConfirmationMessage::new("Saved again"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Containment);
    assert_eq!(
        err.to_string(),
        "MetaDataVersion already has a mdsol:ConfirmationMessage"
    );
}

#[test]
fn test_complete_study_build() {
    let mut units = BasicDefinitions::new();
    units
        .attach(MeasurementUnit::new("KG", "Kilograms").with_standard_unit(true))
        .unwrap();

    let mut protocol = Protocol::new();
    protocol
        .attach(StudyEventRef::new("SCREEN", 1, true))
        .unwrap();

    let mut event = StudyEventDef::new("SCREEN", "Screening", false, StudyEventType::Scheduled);
    event.attach(FormRef::new("VS", 1, true)).unwrap();

    let mut form = FormDef::new("VS", "Vital Signs").with_order_number(1);
    form.attach(ItemGroupRef::new("VS", Some(1), true)).unwrap();

    let mut group = ItemGroupDef::new("VS", "Vital Signs").with_domain("VS");
    group
        .attach(ItemRef::new("WEIGHT", Some(1), true))
        .unwrap()
        .attach(ItemRef::new("POSITION", Some(2), false))
        .unwrap();

    let mut range = RangeCheck::new(RangeCheckComparator::LessThanEqualTo, RangeCheckType::Soft);
    range.attach(CheckValue::new("300")).unwrap();
    let mut weight = ItemDef::new("WEIGHT", "Weight", DataType::Float).with_length(5);
    weight.attach(range).unwrap();

    let mut body_position = ItemDef::new("POSITION", "Position", DataType::Text);
    body_position.attach(CodeListRef::new("CL_POSITION")).unwrap();

    let mut codelist = CodeList::new("CL_POSITION", "Position", CodeListDataType::Text);
    codelist
        .attach(CodeListItem::with_decode_text("SUPINE", "Supine"))
        .unwrap();

    let mut check = MdsolEditCheckDef::new("CHK_WEIGHT");
    check
        .attach(MdsolCheckStep::data_point("SCREEN", "VS", "WEIGHT", "WEIGHT"))
        .unwrap()
        .attach(MdsolCheckStep::function(StepFunction::IsEmpty))
        .unwrap()
        .attach(
            MdsolCheckAction::new(ActionType::OpenQuery)
                .on_field("SCREEN", "VS", "WEIGHT", "WEIGHT")
                .with_string("Weight is required"),
        )
        .unwrap();

    let mut derivation = MdsolDerivationDef::new("DRV_BMI").with_target("SCREEN", "VS", "BMI", "BMI");
    derivation
        .attach(MdsolDerivationStep::data_point("SCREEN", "VS", "WEIGHT", "WEIGHT"))
        .unwrap()
        .attach(MdsolDerivationStep::with_function(StepFunction::Divide).unwrap())
        .unwrap();

    let mut mdv = MetaDataVersion::new("MDV1", "Draft 1").with_primary_form_oid("VS");
    mdv.attach(derivation)
        .unwrap()
        .attach(check)
        .unwrap()
        .attach(codelist)
        .unwrap()
        .attach(body_position)
        .unwrap()
        .attach(weight)
        .unwrap()
        .attach(group)
        .unwrap()
        .attach(form)
        .unwrap()
        .attach(event)
        .unwrap()
        .attach(protocol)
        .unwrap();

    let mut study = Study::new("Mediflex(Prod)").with_project_type(ProjectType::Project);
    study
        .attach(mdv)
        .unwrap()
        .attach(units)
        .unwrap()
        .attach(GlobalVariables::new("Mediflex"))
        .unwrap();

    let tags = start_tags(&study);
    let expected = [
        "Study",
        "GlobalVariables",
        "StudyName",
        "StudyDescription",
        "ProtocolName",
        "BasicDefinitions",
        "MeasurementUnit",
        "MetaDataVersion",
        "Protocol",
        "StudyEventRef",
        "StudyEventDef",
        "FormRef",
        "FormDef",
        "ItemGroupRef",
        "ItemGroupDef",
        "ItemRef",
        "ItemRef",
        "ItemDef",
        "CodeListRef",
        "ItemDef",
        "RangeCheck",
        "CheckValue",
        "CodeList",
        "CodeListItem",
        "Decode",
        "TranslatedText",
        "mdsol:EditCheckDef",
        "mdsol:CheckStep",
        "mdsol:CheckStep",
        "mdsol:CheckAction",
        "mdsol:DerivationDef",
        "mdsol:DerivationStep",
        "mdsol:DerivationStep",
    ];
    assert_eq!(tags, expected);

    let mut log = EventLog::new();
    study.build(&mut log).unwrap();
    assert_eq!(
        log.attributes_of("RangeCheck").unwrap().get("Comparator"),
        Some("LE")
    );
    assert_eq!(
        log.attributes_of("mdsol:EditCheckDef").unwrap().get("Active"),
        Some("TRUE")
    );
    assert_eq!(
        log.attributes_of("Study").unwrap().get("mdsol:ProjectType"),
        Some("Project")
    );
}

//! Integration tests for clinical data documents.

use chrono::{NaiveDate, NaiveDateTime};
use odm_builder::model::{EditPoint, QueryStatus, TransactionType};
use odm_builder::{
    AuditRecord, ClinicalData, DateTimeStamp, Element, ErrorKind, EventLog, FormData, HasMilestones,
    ItemData, ItemGroupData, LocationRef, MdsolQuery, Odm, OdmError, ReasonForChange,
    RenderOptions, StudyEventData, SubjectData, Transactional, UserRef, to_xml_string,
};

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_opt(7, 8, 9)
        .unwrap()
}

fn subject_with_items(subject_key: &str, items: &[(&str, &str)]) -> SubjectData {
    let mut group = ItemGroupData::new();
    for (oid, value) in items {
        group.attach(ItemData::new(*oid, *value)).unwrap();
    }
    let mut form = FormData::new("DM");
    form.attach(group).unwrap();
    let mut event = StudyEventData::new("SCREENING");
    event.attach(form).unwrap();
    let mut subject = SubjectData::new("SITE01", subject_key);
    subject.attach(event).unwrap();
    subject
}

fn document(subjects: Vec<SubjectData>) -> Odm {
    let mut odm = Odm::new("tests")
        .with_file_oid("FILE-1")
        .with_creation_date_time(timestamp());
    for subject in subjects {
        let mut clinical = ClinicalData::new("Mediflex", "Prod");
        clinical.attach(subject).unwrap();
        odm.attach(clinical).unwrap();
    }
    odm
}

#[test]
fn test_item_with_value_has_no_is_null() {
    let xml = to_xml_string(&ItemData::new("SUBJINIT", "AAA")).unwrap();
    assert_eq!(xml, r#"<ItemData ItemOID="SUBJINIT" Value="AAA" />"#);
    assert!(!xml.contains("IsNull"));
}

#[test]
fn test_empty_item_has_no_value_attribute() {
    let xml = to_xml_string(&ItemData::new("SUBJINIT", "")).unwrap();
    assert_eq!(xml, r#"<ItemData ItemOID="SUBJINIT" IsNull="Yes" />"#);
    assert!(!xml.contains("Value="));
}

#[test]
fn test_second_subject_is_rejected() {
    let mut clinical = ClinicalData::new("Mediflex", "Prod");
    clinical
        .attach(subject_with_items("001", &[("AGE", "40")]))
        .unwrap();
    let err = clinical
        .attach(subject_with_items("002", &[("AGE", "41")]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Containment);
    assert_eq!(clinical.subject_data().unwrap().subject_key, "001");
}

#[test]
fn test_two_clinical_data_serialize_in_attachment_order() {
    let odm = document(vec![
        subject_with_items("002", &[("AGE", "41")]),
        subject_with_items("001", &[("AGE", "40")]),
    ]);
    let xml = odm.to_xml(&RenderOptions::compact()).unwrap();
    let second = xml.find(r#"SubjectKey="002""#).unwrap();
    let first = xml.find(r#"SubjectKey="001""#).unwrap();
    assert!(second < first);
    assert_eq!(xml.matches("<ClinicalData ").count(), 2);
}

#[test]
fn test_full_subject_document() {
    let odm = document(vec![subject_with_items(
        "001",
        &[("SUBJINIT", "AAA"), ("AGE", "")],
    )]);
    insta::assert_snapshot!(odm.to_xml(&RenderOptions::compact()).unwrap(), @r#"<ODM ODMVersion="1.3" FileType="Transactional" CreationDateTime="2024-05-06T07:08:09" Originator="tests" FileOID="FILE-1" xmlns="http://www.cdisc.org/ns/odm/v1.3" xmlns:mdsol="http://www.mdsol.com/ns/odm/metadata"><ClinicalData StudyOID="Mediflex(Prod)" MetaDataVersionOID="1"><SubjectData SubjectKey="001" mdsol:SubjectKeyType="SubjectName"><SiteRef LocationOID="SITE01" /><StudyEventData StudyEventOID="SCREENING"><FormData FormOID="DM"><ItemGroupData ItemGroupOID="DM" mdsol:Submission="SpecifiedItemsOnly"><ItemData ItemOID="SUBJINIT" Value="AAA" /><ItemData ItemOID="AGE" IsNull="Yes" /></ItemGroupData></FormData></StudyEventData></SubjectData></ClinicalData></ODM>"#);
}

#[test]
fn test_incomplete_audit_record_fails_when_document_is_rendered() {
    let mut record = AuditRecord::default();
    record.attach(UserRef::new("isparks")).unwrap();

    let mut item = ItemData::new("AGE", "40");
    item.attach(record).unwrap();
    let mut group = ItemGroupData::new().with_item_group_oid("DM");
    group.attach(item).unwrap();

    let err = to_xml_string(&group).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Completeness);
    assert_eq!(err.to_string(), "AuditRecord is missing required LocationRef");
}

#[test]
fn test_audited_query_on_item() {
    let mut record = AuditRecord::new(
        UserRef::new("isparks"),
        LocationRef::new("SITE01"),
        DateTimeStamp::new(timestamp()),
    )
    .with_edit_point(EditPoint::DataManagement);
    record
        .attach(ReasonForChange::new("Transcription error"))
        .unwrap();

    let mut item = ItemData::new("AGE", "40");
    item.set_transaction_type(TransactionType::Update).unwrap();
    item.attach(
        MdsolQuery::new()
            .with_value("Please confirm age")
            .with_status(QueryStatus::Open),
    )
    .unwrap()
    .attach(record)
    .unwrap();

    let mut log = EventLog::new();
    item.build(&mut log).unwrap();
    assert_eq!(
        log.start_tags(),
        [
            "ItemData",
            "AuditRecord",
            "UserRef",
            "LocationRef",
            "DateTimeStamp",
            "ReasonForChange",
            "mdsol:Query",
        ]
    );
    let attributes = log.attributes_of("ItemData").unwrap();
    assert_eq!(attributes.get("TransactionType"), Some("Update"));
    assert_eq!(
        log.attributes_of("AuditRecord").unwrap().get("EditPoint"),
        Some("DataManagement")
    );
}

#[test]
fn test_milestones_are_per_instance() {
    let mut first = SubjectData::new("SITE01", "001");
    let second = SubjectData::new("SITE01", "002");
    first.add_milestone("Enrolled", None);
    first.add_milestone("Enrolled", None);

    assert_eq!(first.milestones().iter().count(), 1);
    assert_eq!(second.milestones().iter().count(), 0);
    assert!(
        to_xml_string(&first)
            .unwrap()
            .contains(r#"<FlagValue CodeListOID="MILESTONES">Enrolled</FlagValue>"#)
    );
    assert!(!to_xml_string(&second).unwrap().contains("Annotation"));
}

#[test]
fn test_duplicate_item_reports_container_and_key() {
    let mut group = ItemGroupData::new();
    group.attach(ItemData::new("AGE", "40")).unwrap();
    let err = group.attach(ItemData::new("AGE", "41")).unwrap_err();
    match err {
        OdmError::DuplicateKey {
            container,
            child,
            key,
        } => {
            assert_eq!(container, "ItemGroupData");
            assert_eq!(child, "ItemData");
            assert_eq!(key, "AGE");
        }
        other => panic!("unexpected error: {other}"),
    }
}

//! Integration tests for whole documents and dynamic attachment.

use chrono::NaiveDate;
use odm_builder::model::{FileType, Granularity, LocationType};
use odm_builder::{
    AdminData, AnyElement, ClinicalData, ErrorKind, FormData, ItemData, ItemGroupData, Location,
    LocationRef, MetaDataVersion, MetaDataVersionRef, Odm, OdmError, RenderOptions, Study,
    StudyEventData, SubjectData, User,
};

fn admin_document() -> Odm {
    let effective = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut site = Location::new("SITE01", "Leeds General").with_location_type(LocationType::Site);
    site.attach(MetaDataVersionRef::new("Mediflex(Prod)", "MDV1", effective))
        .unwrap();

    let mut user = User::new("U1")
        .with_login_name("jdoe")
        .with_name("Jane", "Doe")
        .with_email("jane@example.org");
    user.attach(LocationRef::new("SITE01")).unwrap();

    let mut admin = AdminData::new().with_study_oid("Mediflex(Prod)");
    admin.attach(user).unwrap().attach(site).unwrap();

    let mut odm = Odm::new("admin-loader")
        .with_file_oid("ADMIN-1")
        .with_file_type(FileType::Snapshot)
        .with_granularity(Granularity::AdminData)
        .with_creation_date_time(effective.and_hms_opt(0, 0, 0).unwrap());
    odm.attach(admin).unwrap();
    odm
}

#[test]
fn test_pretty_document_starts_with_declaration() {
    let xml = admin_document().to_xml(&RenderOptions::default()).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<ODM "));
    assert!(xml.contains("\n  <AdminData StudyOID=\"Mediflex(Prod)\">"));
    assert!(xml.contains("\n    <User OID=\"U1\">"));
    assert!(xml.contains("<LoginName>jdoe</LoginName>"));
    assert!(xml.trim_end().ends_with("</ODM>"));
}

#[test]
fn test_compact_admin_document() {
    let xml = admin_document()
        .to_xml(&RenderOptions::compact())
        .unwrap();
    insta::assert_snapshot!(xml, @r#"<ODM ODMVersion="1.3" FileType="Snapshot" CreationDateTime="2024-06-01T00:00:00" Originator="admin-loader" FileOID="ADMIN-1" Granularity="AdminData" xmlns="http://www.cdisc.org/ns/odm/v1.3" xmlns:mdsol="http://www.mdsol.com/ns/odm/metadata"><AdminData StudyOID="Mediflex(Prod)"><User OID="U1"><LoginName>jdoe</LoginName><FirstName>Jane</FirstName><LastName>Doe</LastName><Email>jane@example.org</Email><LocationRef LocationOID="SITE01" /></User><Location OID="SITE01" Name="Leeds General" LocationType="Site"><MetaDataVersionRef StudyOID="Mediflex(Prod)" MetaDataVersionOID="MDV1" EffectiveDate="2024-06-01" /></Location></AdminData></ODM>"#);
}

#[test]
fn test_bytes_and_string_rendering_agree() {
    let odm = admin_document();
    let options = RenderOptions::compact().with_declaration("utf-8");
    let bytes = odm.to_xml_bytes(&options).unwrap();
    assert_eq!(String::from_utf8(bytes).unwrap(), odm.to_xml(&options).unwrap());
}

#[test]
fn test_rendering_twice_is_byte_identical() {
    let odm = admin_document();
    let options = RenderOptions::default();
    assert_eq!(odm.to_xml(&options).unwrap(), odm.to_xml(&options).unwrap());
}

#[test]
fn test_dynamic_tree_assembly() {
    let mut group = AnyElement::from(ItemGroupData::new());
    group.attach(ItemData::new("AGE", "40")).unwrap();
    let mut form = AnyElement::from(FormData::new("DM"));
    form.attach(group).unwrap();
    let mut event = AnyElement::from(StudyEventData::new("SCREENING"));
    event.attach(form).unwrap();
    let mut subject = AnyElement::from(SubjectData::new("SITE01", "001"));
    subject.attach(event).unwrap();
    let mut clinical = AnyElement::from(ClinicalData::new("Mediflex", "Prod"));
    clinical.attach(subject).unwrap();

    let xml = clinical.to_xml(&RenderOptions::compact()).unwrap();
    assert!(xml.starts_with(r#"<ClinicalData StudyOID="Mediflex(Prod)" MetaDataVersionOID="1">"#));
    assert!(xml.contains(r#"<ItemGroupData ItemGroupOID="DM" mdsol:Submission="SpecifiedItemsOnly"><ItemData ItemOID="AGE" Value="40" /></ItemGroupData>"#));
}

#[test]
fn test_dynamic_attach_names_both_types() {
    let mut study = AnyElement::from(Study::new("Mediflex(Prod)"));
    let err = study
        .attach(ItemData::new("AGE", "40"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Containment);
    assert!(matches!(
        err,
        OdmError::NotAccepted {
            container: "Study",
            child: "ItemData"
        }
    ));

    study
        .attach(MetaDataVersion::new("MDV1", "Draft 1"))
        .unwrap();
    let err = study
        .attach(MetaDataVersion::new("MDV2", "Draft 2"))
        .unwrap_err();
    assert!(matches!(
        err,
        OdmError::SlotOccupied {
            container: "Study",
            child: "MetaDataVersion"
        }
    ));
}

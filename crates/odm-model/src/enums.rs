//! Closed value sets for core ODM 1.3 attributes and the mdsol attributes
//! that sit on core elements.
//!
//! Wire values are case-sensitive; parsing is an exact match.

use serde::{Deserialize, Serialize};

odm_enum! {
    /// `ODM/@FileType`.
    pub enum FileType as "FileType" {
        Transactional => "Transactional",
        Snapshot => "Snapshot",
    }
}

odm_enum! {
    /// `ODM/@Granularity`.
    pub enum Granularity as "Granularity" {
        All => "All",
        Metadata => "Metadata",
        AdminData => "AdminData",
        ReferenceData => "ReferenceData",
        AllClinicalData => "AllClinicalData",
        SingleSite => "SingleSite",
        SingleSubject => "SingleSubject",
    }
}

odm_enum! {
    /// How a data element is merged into an existing data store.
    ///
    /// Each element type accepts its own subset; see the builder crate.
    pub enum TransactionType as "TransactionType" {
        Insert => "Insert",
        Update => "Update",
        Upsert => "Upsert",
        Context => "Context",
        Remove => "Remove",
    }
}

odm_enum! {
    /// `ItemDef/@DataType`.
    pub enum DataType as "DataType" {
        Text => "text",
        Integer => "integer",
        Float => "float",
        Date => "date",
        DateTime => "datetime",
        Time => "time",
        String => "string",
        Boolean => "boolean",
        Double => "double",
        HexBinary => "hexBinary",
        Base64Binary => "base64Binary",
        HexFloat => "hexFloat",
        Base64Float => "base64Float",
        PartialDate => "partialDate",
        PartialTime => "partialTime",
        PartialDatetime => "partialDatetime",
        DurationDatetime => "durationDatetime",
        IntervalDatetime => "intervalDatetime",
        IncompleteDatetime => "incompleteDatetime",
        IncompleteDate => "incompleteDate",
        IncompleteTime => "incompleteTime",
        Uri => "URI",
    }
}

odm_enum! {
    /// `CodeList/@DataType`, a narrower set than [`DataType`].
    pub enum CodeListDataType as "CodeList DataType" {
        Integer => "integer",
        Float => "float",
        Text => "text",
        String => "string",
    }
}

odm_enum! {
    /// `ItemDef/@mdsol:ControlType`.
    pub enum ControlType as "ControlType" {
        CheckBox => "CheckBox",
        Text => "Text",
        DateTime => "DateTime",
        DropDownList => "DropDownList",
        SearchList => "SearchList",
        RadioButton => "RadioButton",
        RadioButtonVertical => "RadioButton (Vertical)",
        FileUpload => "File Upload",
        LongText => "LongText",
        SignaturePage => "Signature page",
        SignatureFolder => "Signature folder",
        SignatureSubject => "Signature subject",
    }
}

odm_enum! {
    /// `StudyEventDef/@Type`.
    pub enum StudyEventType as "StudyEventDef Type" {
        Scheduled => "Scheduled",
        Unscheduled => "Unscheduled",
        Common => "Common",
    }
}

odm_enum! {
    /// `mdsol:Query/@Status`.
    pub enum QueryStatus as "Query Status" {
        Open => "Open",
        Cancelled => "Cancelled",
        Answered => "Answered",
        Forwarded => "Forwarded",
        Closed => "Closed",
    }
}

odm_enum! {
    /// `mdsol:ProtocolDeviation/@Status`.
    pub enum ProtocolDeviationStatus as "ProtocolDeviation Status" {
        Open => "Open",
        Removed => "Removed",
    }
}

odm_enum! {
    /// `RangeCheck/@Comparator`.
    pub enum RangeCheckComparator as "RangeCheck Comparator" {
        LessThan => "LT",
        LessThanEqualTo => "LE",
        GreaterThan => "GT",
        GreaterThanEqualTo => "GE",
        EqualTo => "EQ",
        NotEqualTo => "NE",
        In => "IN",
        NotIn => "NOTIN",
    }
}

odm_enum! {
    /// `RangeCheck/@SoftHard`.
    pub enum RangeCheckType as "RangeCheck SoftHard" {
        Soft => "Soft",
        Hard => "Hard",
    }
}

odm_enum! {
    /// `AuditRecord/@EditPoint`.
    pub enum EditPoint as "EditPoint" {
        Monitoring => "Monitoring",
        DataManagement => "DataManagement",
        DbAudit => "DBAudit",
    }
}

odm_enum! {
    /// `Comment/@SponsorOrSite`.
    pub enum SponsorOrSite as "SponsorOrSite" {
        Sponsor => "Sponsor",
        Site => "Site",
    }
}

odm_enum! {
    /// `SubjectData/@mdsol:SubjectKeyType`.
    pub enum SubjectKeyType as "SubjectKeyType" {
        SubjectName => "SubjectName",
        SubjectUuid => "SubjectUUID",
    }
}

odm_enum! {
    /// `SiteRef/@mdsol:LocationOIDType`.
    pub enum LocationOidType as "LocationOIDType" {
        SiteUuid => "SiteUUID",
    }
}

odm_enum! {
    /// `Study/@mdsol:ProjectType`.
    pub enum ProjectType as "ProjectType" {
        Project => "Project",
        GlobalLibraryVolume => "GlobalLibrary Volume",
    }
}

odm_enum! {
    /// `FormDef/@mdsol:ConfirmationStyle`.
    pub enum ConfirmationStyle as "ConfirmationStyle" {
        None => "None",
        NotLink => "NotLink",
        LinkNext => "LinkNext",
        LinkCustom => "LinkCustom",
    }
}

odm_enum! {
    /// `User/@UserType`.
    pub enum UserType as "UserType" {
        Sponsor => "Sponsor",
        Investigator => "Investigator",
        Lab => "Lab",
        Other => "Other",
    }
}

odm_enum! {
    /// `Location/@LocationType`.
    pub enum LocationType as "LocationType" {
        Sponsor => "Sponsor",
        Site => "Site",
        Cro => "CRO",
        Lab => "Lab",
        Other => "Other",
    }
}

/// How an element family renders boolean attributes.
///
/// Core ODM and most mdsol attributes use `Yes`/`No`; the edit check and
/// derivation family uses `TRUE`/`FALSE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolStyle {
    YesNo,
    TrueFalse,
}

impl BoolStyle {
    pub fn render(self, value: bool) -> &'static str {
        match (self, value) {
            (BoolStyle::YesNo, true) => "Yes",
            (BoolStyle::YesNo, false) => "No",
            (BoolStyle::TrueFalse, true) => "TRUE",
            (BoolStyle::TrueFalse, false) => "FALSE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueSet;

    #[test]
    fn parses_exact_wire_values() {
        assert_eq!("Upsert".parse::<TransactionType>().unwrap(), TransactionType::Upsert);
        assert_eq!("datetime".parse::<DataType>().unwrap(), DataType::DateTime);
        assert_eq!(
            "RadioButton (Vertical)".parse::<ControlType>().unwrap(),
            ControlType::RadioButtonVertical
        );
        assert_eq!("CRO".parse::<LocationType>().unwrap(), LocationType::Cro);
    }

    #[test]
    fn rejects_values_outside_the_set() {
        let err = "upsert".parse::<TransactionType>().unwrap_err();
        assert_eq!(err.field, "TransactionType");
        assert_eq!(err.value, "upsert");
        assert_eq!(err.to_string(), "'upsert' is not a valid TransactionType");

        assert!("Bogus".parse::<Granularity>().is_err());
        assert!("date".parse::<CodeListDataType>().is_err());
    }

    #[test]
    fn every_member_round_trips_through_its_wire_value() {
        for value in DataType::all() {
            assert_eq!(value.as_str().parse::<DataType>().unwrap(), *value);
        }
        assert_eq!(Granularity::all().len(), 7);
        assert_eq!(TransactionType::all().len(), 5);
    }

    #[test]
    fn serde_uses_wire_values() {
        let json = serde_json::to_string(&ProjectType::GlobalLibraryVolume).unwrap();
        assert_eq!(json, "\"GlobalLibrary Volume\"");
        let parsed: EditPoint = serde_json::from_str("\"DBAudit\"").unwrap();
        assert_eq!(parsed, EditPoint::DbAudit);
    }

    #[test]
    fn bool_styles_differ_by_family() {
        assert_eq!(BoolStyle::YesNo.render(true), "Yes");
        assert_eq!(BoolStyle::YesNo.render(false), "No");
        assert_eq!(BoolStyle::TrueFalse.render(true), "TRUE");
        assert_eq!(BoolStyle::TrueFalse.render(false), "FALSE");
    }
}

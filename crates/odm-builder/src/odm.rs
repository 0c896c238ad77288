//! The `ODM` document root.

use std::io::Write;

use chrono::{NaiveDateTime, Utc};
use odm_model::{FileType, Granularity, MDSOL_NS, ODM_NS, ODM_VERSION};
use tracing::debug;
use uuid::Uuid;

use crate::admin::AdminData;
use crate::any::AnyElement;
use crate::clinical::ClinicalData;
use crate::element::{
    Attributes, Composite, Element, emit_all, emit_children, emit_opt, fill_slot, format_datetime,
};
use crate::error::Result;
use crate::metadata::Study;
use crate::sink::{self, RenderOptions, XmlSink};

children! {
    /// Children accepted by [`Odm`].
    pub enum OdmChild for Odm {
        Study(Study),
        ClinicalData(ClinicalData),
        AdminData(AdminData),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OdmSlot {
    Study,
    ClinicalData,
    AdminData,
}

/// The document root.
///
/// Owns at most one [`Study`], any number of [`ClinicalData`] entries kept in
/// attachment order, and at most one [`AdminData`]. The envelope always
/// declares the ODM and mdsol namespaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Odm {
    pub originator: String,
    pub file_oid: String,
    pub file_type: FileType,
    pub creation_date_time: NaiveDateTime,
    pub granularity: Option<Granularity>,
    pub source_system: Option<String>,
    pub source_system_version: Option<String>,
    pub description: Option<String>,
    study: Option<Study>,
    clinical_data: Vec<ClinicalData>,
    admin_data: Option<AdminData>,
}

impl Odm {
    /// A transactional document created now, with a fresh random file OID.
    pub fn new(originator: impl Into<String>) -> Self {
        Self {
            originator: originator.into(),
            file_oid: Uuid::new_v4().to_string(),
            file_type: FileType::Transactional,
            creation_date_time: Utc::now().naive_utc(),
            granularity: None,
            source_system: None,
            source_system_version: None,
            description: None,
            study: None,
            clinical_data: Vec::new(),
            admin_data: None,
        }
    }

    #[must_use]
    pub fn with_file_oid(mut self, file_oid: impl Into<String>) -> Self {
        self.file_oid = file_oid.into();
        self
    }

    #[must_use]
    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = file_type;
        self
    }

    #[must_use]
    pub fn with_creation_date_time(mut self, at: NaiveDateTime) -> Self {
        self.creation_date_time = at;
        self
    }

    #[must_use]
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = Some(granularity);
        self
    }

    #[must_use]
    pub fn with_source_system(mut self, source_system: impl Into<String>) -> Self {
        self.source_system = Some(source_system.into());
        self
    }

    #[must_use]
    pub fn with_source_system_version(mut self, version: impl Into<String>) -> Self {
        self.source_system_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<OdmChild>) -> Result<&mut Self> {
        match OdmChild::traced(child.into()) {
            OdmChild::Study(node) => fill_slot(Self::TAG, &mut self.study, node)?,
            OdmChild::ClinicalData(node) => self.clinical_data.push(node),
            OdmChild::AdminData(node) => fill_slot(Self::TAG, &mut self.admin_data, node)?,
        }
        Ok(self)
    }

    pub fn study(&self) -> Option<&Study> {
        self.study.as_ref()
    }

    pub fn study_mut(&mut self) -> Option<&mut Study> {
        self.study.as_mut()
    }

    pub fn clinical_data(&self) -> &[ClinicalData] {
        &self.clinical_data
    }

    pub fn admin_data(&self) -> Option<&AdminData> {
        self.admin_data.as_ref()
    }

    /// Renders the document to a string.
    pub fn to_xml(&self, options: &RenderOptions) -> Result<String> {
        let bytes = self.to_xml_bytes(options)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Renders the document to bytes.
    pub fn to_xml_bytes(&self, options: &RenderOptions) -> Result<Vec<u8>> {
        self.write_to(Vec::new(), options)
    }

    /// Streams the document into `out` and hands the writer back.
    pub fn write_to<W: Write>(&self, out: W, options: &RenderOptions) -> Result<W> {
        debug!(
            file_oid = %self.file_oid,
            clinical_data = self.clinical_data.len(),
            pretty = options.pretty,
            "rendering ODM document"
        );
        sink::write_to(self, out, options)
    }
}

impl Element for Odm {
    const TAG: &'static str = "ODM";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("ODMVersion", ODM_VERSION)
            .with("FileType", self.file_type.as_str())
            .with("CreationDateTime", format_datetime(&self.creation_date_time))
            .with("Originator", self.originator.as_str())
            .with("FileOID", self.file_oid.as_str())
            .with_opt("Granularity", self.granularity)
            .with_opt("SourceSystem", self.source_system.as_deref())
            .with_opt("SourceSystemVersion", self.source_system_version.as_deref())
            .with_opt("Description", self.description.as_deref())
            .with("xmlns", ODM_NS)
            .with("xmlns:mdsol", MDSOL_NS)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(OdmChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for Odm {
    type Slot = OdmSlot;

    const ORDER: &'static [OdmSlot] = &[OdmSlot::Study, OdmSlot::ClinicalData, OdmSlot::AdminData];

    fn emit(&self, slot: OdmSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            OdmSlot::Study => emit_opt(self.study.as_ref(), sink),
            OdmSlot::ClinicalData => emit_all(&self.clinical_data, sink),
            OdmSlot::AdminData => emit_opt(self.admin_data.as_ref(), sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn empty_document_envelope() {
        let odm = Odm::new("tester")
            .with_file_oid("F1")
            .with_creation_date_time(fixed_time())
            .with_granularity(Granularity::AllClinicalData)
            .with_description("Nightly load");

        insta::assert_snapshot!(odm.to_xml(&RenderOptions::compact()).unwrap(), @r#"<ODM ODMVersion="1.3" FileType="Transactional" CreationDateTime="2024-01-02T03:04:05" Originator="tester" FileOID="F1" Granularity="AllClinicalData" Description="Nightly load" xmlns="http://www.cdisc.org/ns/odm/v1.3" xmlns:mdsol="http://www.mdsol.com/ns/odm/metadata" />"#);
    }

    #[test]
    fn declaration_uses_configured_encoding() {
        let odm = Odm::new("tester").with_creation_date_time(fixed_time());
        let options = RenderOptions::compact().with_declaration("ISO-8859-1");
        let xml = odm.to_xml(&options).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="ISO-8859-1" ?><ODM "#));
    }

    #[test]
    fn generated_file_oids_are_unique() {
        let first = Odm::new("tester");
        let second = Odm::new("tester");
        assert_ne!(first.file_oid, second.file_oid);
        assert_eq!(first.file_oid.len(), 36);
    }

    #[test]
    fn subtrees_are_written_study_clinical_admin() {
        let mut odm = Odm::new("tester").with_file_oid("F1");
        odm.attach(AdminData::new())
            .unwrap()
            .attach(ClinicalData::new("Mediflex", "Prod"))
            .unwrap()
            .attach(Study::new("Mediflex(Prod)"))
            .unwrap()
            .attach(ClinicalData::new("Mediflex", "UAT"))
            .unwrap();
        assert!(odm.attach(Study::new("Other")).is_err());

        let mut log = crate::sink::EventLog::new();
        odm.build(&mut log).unwrap();
        let tags = log.start_tags();
        assert_eq!(
            tags,
            ["ODM", "Study", "ClinicalData", "ClinicalData", "AdminData"]
        );
        let studies: Vec<_> = odm
            .clinical_data()
            .iter()
            .map(ClinicalData::study_oid)
            .collect();
        assert_eq!(studies, ["Mediflex(Prod)", "Mediflex(UAT)"]);
    }
}

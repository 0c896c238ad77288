//! Administrative data: users, their addresses and the locations they work
//! at.

use chrono::NaiveDate;
use odm_model::{LocationType, UserType};

use crate::any::AnyElement;
use crate::clinical::LocationRef;
use crate::element::{
    Attributes, Composite, Element, emit_all, emit_children, emit_opt_text, emit_text, format_date,
};
use crate::error::Result;
use crate::mixins::{LastUpdate, LastUpdateTime};
use crate::sink::XmlSink;

/// `Address`: postal address of a user. Every part is a text child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street_names: Vec<String>,
    pub city: Option<String>,
    pub state_prov: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub other_text: Option<String>,
}

impl Address {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_street_name(mut self, street: impl Into<String>) -> Self {
        self.street_names.push(street.into());
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn with_state_prov(mut self, state_prov: impl Into<String>) -> Self {
        self.state_prov = Some(state_prov.into());
        self
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    #[must_use]
    pub fn with_other_text(mut self, other_text: impl Into<String>) -> Self {
        self.other_text = Some(other_text.into());
        self
    }
}

impl Element for Address {
    const TAG: &'static str = "Address";

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        for street in &self.street_names {
            emit_text(sink, "StreetName", street)?;
        }
        emit_opt_text(sink, "City", self.city.as_deref())?;
        emit_opt_text(sink, "StateProv", self.state_prov.as_deref())?;
        emit_opt_text(sink, "Country", self.country.as_deref())?;
        emit_opt_text(sink, "PostalCode", self.postal_code.as_deref())?;
        emit_opt_text(sink, "OtherText", self.other_text.as_deref())
    }
}

children! {
    /// Children accepted by [`User`].
    pub enum UserChild for User {
        Address(Address),
        LocationRef(LocationRef),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSlot {
    Names,
    Addresses,
    Contacts,
    LocationRefs,
}

/// `User`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub oid: String,
    pub user_type: Option<UserType>,
    pub login_name: Option<String>,
    pub display_name: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub organization: Option<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    addresses: Vec<Address>,
    location_refs: Vec<LocationRef>,
}

impl User {
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            user_type: None,
            login_name: None,
            display_name: None,
            full_name: None,
            first_name: None,
            last_name: None,
            organization: None,
            emails: Vec::new(),
            phones: Vec::new(),
            addresses: Vec::new(),
            location_refs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = Some(user_type);
        self
    }

    #[must_use]
    pub fn with_login_name(mut self, login_name: impl Into<String>) -> Self {
        self.login_name = Some(login_name.into());
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    /// Sets first and last name.
    #[must_use]
    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.emails.push(email.into());
        self
    }

    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phones.push(phone.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<UserChild>) -> Result<&mut Self> {
        match UserChild::traced(child.into()) {
            UserChild::Address(node) => self.addresses.push(node),
            UserChild::LocationRef(node) => self.location_refs.push(node),
        }
        Ok(self)
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn location_refs(&self) -> &[LocationRef] {
        &self.location_refs
    }
}

impl Element for User {
    const TAG: &'static str = "User";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with_opt("UserType", self.user_type)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(UserChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for User {
    type Slot = UserSlot;

    const ORDER: &'static [UserSlot] = &[
        UserSlot::Names,
        UserSlot::Addresses,
        UserSlot::Contacts,
        UserSlot::LocationRefs,
    ];

    fn emit(&self, slot: UserSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            UserSlot::Names => {
                emit_opt_text(sink, "LoginName", self.login_name.as_deref())?;
                emit_opt_text(sink, "DisplayName", self.display_name.as_deref())?;
                emit_opt_text(sink, "FullName", self.full_name.as_deref())?;
                emit_opt_text(sink, "FirstName", self.first_name.as_deref())?;
                emit_opt_text(sink, "LastName", self.last_name.as_deref())?;
                emit_opt_text(sink, "Organization", self.organization.as_deref())
            }
            UserSlot::Addresses => emit_all(&self.addresses, sink),
            UserSlot::Contacts => {
                for email in &self.emails {
                    emit_text(sink, "Email", email)?;
                }
                for phone in &self.phones {
                    emit_text(sink, "Phone", phone)?;
                }
                Ok(())
            }
            UserSlot::LocationRefs => emit_all(&self.location_refs, sink),
        }
    }
}

/// `MetaDataVersionRef`: the metadata version a location uses from a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDataVersionRef {
    pub study_oid: String,
    pub metadata_version_oid: String,
    pub effective_date: NaiveDate,
}

impl MetaDataVersionRef {
    pub fn new(
        study_oid: impl Into<String>,
        metadata_version_oid: impl Into<String>,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            study_oid: study_oid.into(),
            metadata_version_oid: metadata_version_oid.into(),
            effective_date,
        }
    }
}

impl Element for MetaDataVersionRef {
    const TAG: &'static str = "MetaDataVersionRef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("StudyOID", self.study_oid.as_str())
            .with("MetaDataVersionOID", self.metadata_version_oid.as_str())
            .with("EffectiveDate", format_date(&self.effective_date))
    }
}

children! {
    /// Children accepted by [`Location`].
    pub enum LocationChild for Location {
        MetaDataVersionRef(MetaDataVersionRef),
    }
}

/// `Location`: a site, sponsor, lab or other organisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub oid: String,
    pub name: String,
    pub location_type: Option<LocationType>,
    last_update: LastUpdate,
    metadata_version_refs: Vec<MetaDataVersionRef>,
}

impl Location {
    pub fn new(oid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            name: name.into(),
            location_type: None,
            last_update: LastUpdate::default(),
            metadata_version_refs: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_location_type(mut self, location_type: LocationType) -> Self {
        self.location_type = Some(location_type);
        self
    }

    pub fn attach(&mut self, child: impl Into<LocationChild>) -> Result<&mut Self> {
        match LocationChild::traced(child.into()) {
            LocationChild::MetaDataVersionRef(node) => self.metadata_version_refs.push(node),
        }
        Ok(self)
    }

    pub fn metadata_version_refs(&self) -> &[MetaDataVersionRef] {
        &self.metadata_version_refs
    }
}

impl Element for Location {
    const TAG: &'static str = "Location";

    fn attributes(&self) -> Attributes {
        let attributes = Attributes::new()
            .with("OID", self.oid.as_str())
            .with("Name", self.name.as_str())
            .with_opt("LocationType", self.location_type);
        self.last_update.apply(attributes)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.metadata_version_refs, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(LocationChild::try_from(child)?).map(|_| ())
    }
}

impl LastUpdateTime for Location {
    fn last_update(&self) -> &LastUpdate {
        &self.last_update
    }

    fn last_update_mut(&mut self) -> &mut LastUpdate {
        &mut self.last_update
    }
}

children! {
    /// Children accepted by [`AdminData`].
    pub enum AdminDataChild for AdminData {
        User(User),
        Location(Location),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminDataSlot {
    Users,
    Locations,
}

/// `AdminData`: users and locations of a study.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminData {
    pub study_oid: Option<String>,
    users: Vec<User>,
    locations: Vec<Location>,
}

impl AdminData {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_study_oid(mut self, study_oid: impl Into<String>) -> Self {
        self.study_oid = Some(study_oid.into());
        self
    }

    pub fn attach(&mut self, child: impl Into<AdminDataChild>) -> Result<&mut Self> {
        match AdminDataChild::traced(child.into()) {
            AdminDataChild::User(node) => self.users.push(node),
            AdminDataChild::Location(node) => self.locations.push(node),
        }
        Ok(self)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }
}

impl Element for AdminData {
    const TAG: &'static str = "AdminData";

    fn attributes(&self) -> Attributes {
        Attributes::new().with_opt("StudyOID", self.study_oid.as_deref())
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(AdminDataChild::try_from(child)?).map(|_| ())
    }
}

impl Composite for AdminData {
    type Slot = AdminDataSlot;

    const ORDER: &'static [AdminDataSlot] = &[AdminDataSlot::Users, AdminDataSlot::Locations];

    fn emit(&self, slot: AdminDataSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            AdminDataSlot::Users => emit_all(&self.users, sink),
            AdminDataSlot::Locations => emit_all(&self.locations, sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::to_xml_string;

    #[test]
    fn user_writes_text_children_in_schema_order() {
        let mut user = User::new("U1")
            .with_user_type(UserType::Investigator)
            .with_phone("555-0100")
            .with_email("jane@example.org")
            .with_name("Jane", "Doe")
            .with_login_name("jdoe");
        user.attach(LocationRef::new("SITE01"))
            .unwrap()
            .attach(Address::new().with_street_name("1 Main St").with_city("Leeds"))
            .unwrap();

        insta::assert_snapshot!(to_xml_string(&user).unwrap(), @r#"<User OID="U1" UserType="Investigator"><LoginName>jdoe</LoginName><FirstName>Jane</FirstName><LastName>Doe</LastName><Address><StreetName>1 Main St</StreetName><City>Leeds</City></Address><Email>jane@example.org</Email><Phone>555-0100</Phone><LocationRef LocationOID="SITE01" /></User>"#);
    }

    #[test]
    fn location_carries_dated_metadata_refs() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut location = Location::new("SITE01", "Leeds General").with_location_type(LocationType::Site);
        location
            .set_last_update_time(date.and_hms_opt(9, 30, 0).unwrap())
            .attach(MetaDataVersionRef::new("Mediflex(Prod)", "MDV1", date))
            .unwrap();

        assert_eq!(
            to_xml_string(&location).unwrap(),
            r#"<Location OID="SITE01" Name="Leeds General" LocationType="Site" mdsol:LastUpdateTime="2024-03-01T09:30:00"><MetaDataVersionRef StudyOID="Mediflex(Prod)" MetaDataVersionOID="MDV1" EffectiveDate="2024-03-01" /></Location>"#
        );
    }

    #[test]
    fn admin_data_writes_users_before_locations() {
        let mut admin = AdminData::new().with_study_oid("Mediflex(Prod)");
        admin
            .attach(Location::new("SITE01", "Leeds"))
            .unwrap()
            .attach(User::new("U1"))
            .unwrap();
        assert_eq!(
            to_xml_string(&admin).unwrap(),
            r#"<AdminData StudyOID="Mediflex(Prod)"><User OID="U1" /><Location OID="SITE01" Name="Leeds" /></AdminData>"#
        );
    }
}

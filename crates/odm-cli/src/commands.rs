//! Document assembly for each subcommand.
//!
//! Input rows are grouped in first-seen order: subjects, then events within a
//! subject, forms within an event and item groups within a form.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use odm_builder::model::{FileType, Granularity, LocationType, TransactionType};
use odm_builder::{
    AdminData, ClinicalData, FormData, ItemData, ItemGroupData, Location, LocationRef, Odm,
    RenderOptions, StudyEventData, SubjectData, Transactional, User,
};
use serde::Deserialize;
use tracing::{debug, info, info_span, trace};

use crate::cli::{AdminArgs, ClinicalArgs, EnumName};
use crate::logging::redact_value;

/// One item value in a clinical CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct ClinicalRow {
    pub subject: String,
    pub event: String,
    #[serde(default)]
    pub event_repeat_key: Option<String>,
    pub form: String,
    pub item_group: String,
    #[serde(default)]
    pub item_group_repeat_key: Option<String>,
    pub item: String,
    #[serde(default)]
    pub value: String,
}

/// One user/site pairing in an administrative CSV.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminRow {
    pub user_oid: String,
    #[serde(default)]
    pub login_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub location_oid: String,
    pub location_name: String,
}

/// Where clinical rows are loaded into.
#[derive(Debug, Clone)]
pub struct ClinicalTarget {
    pub project: String,
    pub environment: String,
    pub site: String,
    pub transaction_type: Option<TransactionType>,
}

impl From<&ClinicalArgs> for ClinicalTarget {
    fn from(args: &ClinicalArgs) -> Self {
        Self {
            project: args.project.clone(),
            environment: args.environment.clone(),
            site: args.site.clone(),
            transaction_type: args.transaction_type,
        }
    }
}

/// Reads rows from a headed CSV. Whitespace around fields is trimmed.
pub fn read_rows<T, R>(reader: R) -> Result<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
    R: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<T>().enumerate() {
        // Header is line 1.
        let row = result.with_context(|| format!("parse CSV line {}", index + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Builds one `ClinicalData` per subject.
pub fn build_clinical(rows: &[ClinicalRow], target: &ClinicalTarget) -> Result<Vec<ClinicalData>> {
    let mut subjects: Vec<SubjectData> = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        add_clinical_row(&mut subjects, row, target)
            .with_context(|| format!("row {} (subject {})", index + 1, row.subject))?;
    }
    debug!(subjects = subjects.len(), rows = rows.len(), "grouped clinical rows");

    subjects
        .into_iter()
        .map(|subject| {
            let mut clinical = ClinicalData::new(&target.project, &target.environment);
            clinical.attach(subject)?;
            Ok(clinical)
        })
        .collect()
}

fn add_clinical_row(
    subjects: &mut Vec<SubjectData>,
    row: &ClinicalRow,
    target: &ClinicalTarget,
) -> Result<()> {
    let subject = match subjects
        .iter()
        .position(|subject| subject.subject_key == row.subject)
    {
        Some(index) => &mut subjects[index],
        None => {
            let mut subject = SubjectData::new(&target.site, &row.subject);
            if let Some(transaction_type) = target.transaction_type {
                subject.set_transaction_type(transaction_type)?;
            }
            subjects.push(subject);
            let last = subjects.len() - 1;
            &mut subjects[last]
        }
    };

    let event_index = match subject.study_events().iter().position(|event| {
        event.study_event_oid == row.event
            && event.study_event_repeat_key.as_deref() == row.event_repeat_key.as_deref()
    }) {
        Some(index) => index,
        None => {
            let mut event = StudyEventData::new(&row.event);
            if let Some(key) = &row.event_repeat_key {
                event = event.with_repeat_key(key);
            }
            subject.attach(event)?;
            subject.study_events().len() - 1
        }
    };
    let event = &mut subject.study_events_mut()[event_index];

    let form_index = match event
        .forms()
        .iter()
        .position(|form| form.form_oid == row.form)
    {
        Some(index) => index,
        None => {
            event.attach(FormData::new(&row.form))?;
            event.forms().len() - 1
        }
    };
    let form = &mut event.forms_mut()[form_index];

    let group_index = match form.item_groups().iter().position(|group| {
        group.item_group_oid.as_deref() == Some(row.item_group.as_str())
            && group.item_group_repeat_key.as_deref() == row.item_group_repeat_key.as_deref()
    }) {
        Some(index) => index,
        None => {
            let mut group = ItemGroupData::new().with_item_group_oid(&row.item_group);
            if let Some(key) = &row.item_group_repeat_key {
                group = group.with_repeat_key(key);
            }
            form.attach(group)?;
            form.item_groups().len() - 1
        }
    };

    trace!(
        subject = %row.subject,
        item = %row.item,
        value = redact_value(&row.value),
        "adding item"
    );
    form.item_groups_mut()[group_index].attach(ItemData::new(&row.item, &row.value))?;
    Ok(())
}

/// Builds an `AdminData` of users and the distinct sites they are assigned to.
pub fn build_admin(rows: &[AdminRow], study_oid: Option<&str>) -> Result<AdminData> {
    let mut users: Vec<User> = Vec::new();
    let mut locations: Vec<Location> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let context = || format!("row {} (user {})", index + 1, row.user_oid);
        let user_index = match users.iter().position(|user| user.oid == row.user_oid) {
            Some(position) => position,
            None => {
                users.push(user_from_row(row));
                users.len() - 1
            }
        };
        let user = &mut users[user_index];
        if !user
            .location_refs()
            .iter()
            .any(|location| location.location_oid == row.location_oid)
        {
            user.attach(LocationRef::new(&row.location_oid))
                .with_context(context)?;
        }
        if !locations
            .iter()
            .any(|location| location.oid == row.location_oid)
        {
            locations.push(
                Location::new(&row.location_oid, &row.location_name)
                    .with_location_type(LocationType::Site),
            );
        }
    }
    debug!(
        users = users.len(),
        locations = locations.len(),
        "grouped admin rows"
    );

    let mut admin = AdminData::new();
    if let Some(study_oid) = study_oid {
        admin = admin.with_study_oid(study_oid);
    }
    for user in users {
        admin.attach(user)?;
    }
    for location in locations {
        admin.attach(location)?;
    }
    Ok(admin)
}

fn user_from_row(row: &AdminRow) -> User {
    let mut user = User::new(&row.user_oid);
    if let Some(login) = &row.login_name {
        user = user.with_login_name(login);
    }
    user.first_name = row.first_name.clone();
    user.last_name = row.last_name.clone();
    if let Some(email) = &row.email {
        user = user.with_email(email);
    }
    user
}

/// Streams `odm` to `output`, or stdout when no path is given.
pub fn write_document(odm: &Odm, output: Option<&Path>, options: &RenderOptions) -> Result<()> {
    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut writer = odm
                .write_to(BufWriter::new(file), options)
                .with_context(|| format!("write {}", path.display()))?;
            writer.flush()?;
            info!(path = %path.display(), file_oid = %odm.file_oid, "wrote ODM document");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = odm
                .write_to(stdout.lock(), options)
                .context("write to stdout")?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

pub fn run_clinical(args: &ClinicalArgs) -> Result<()> {
    let span = info_span!("clinical", project = %args.project, environment = %args.environment);
    let _guard = span.enter();

    let file = File::open(&args.input)
        .with_context(|| format!("open {}", args.input.display()))?;
    let rows: Vec<ClinicalRow> = read_rows(file)?;
    info!(rows = rows.len(), "read clinical rows");

    let mut odm = Odm::new(&args.output.originator)
        .with_file_type(FileType::Transactional)
        .with_granularity(Granularity::AllClinicalData);
    for clinical in build_clinical(&rows, &ClinicalTarget::from(args))? {
        odm.attach(clinical)?;
    }
    write_document(
        &odm,
        args.output.output.as_deref(),
        &args.output.render_options(),
    )
}

pub fn run_admin(args: &AdminArgs) -> Result<()> {
    let span = info_span!("admin");
    let _guard = span.enter();

    let file = File::open(&args.input)
        .with_context(|| format!("open {}", args.input.display()))?;
    let rows: Vec<AdminRow> = read_rows(file)?;
    info!(rows = rows.len(), "read admin rows");

    let mut odm = Odm::new(&args.output.originator)
        .with_file_type(FileType::Snapshot)
        .with_granularity(Granularity::AdminData);
    odm.attach(build_admin(&rows, args.study_oid.as_deref())?)?;
    write_document(
        &odm,
        args.output.output.as_deref(),
        &args.output.render_options(),
    )
}

pub fn run_enums(name: EnumName) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}:", name.field())?;
    for value in name.values() {
        writeln!(out, "  {value}")?;
    }
    Ok(())
}

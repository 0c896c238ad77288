//! CLI argument definitions for the `odm` document builder.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use odm_builder::{RenderOptions, SubjectData, Transactional};
use odm_builder::model::{
    ActionType, CodeListDataType, ConfirmationStyle, ControlType, CustomFunctionLanguage,
    DataType, EditPoint, FileType, Granularity, InvalidValue, LocationOidType, LocationType,
    LogicalRecordPosition, ProjectType, ProtocolDeviationStatus, QueryStatus,
    RangeCheckComparator, RangeCheckType, SponsorOrSite, StepFunction, StudyEventType,
    SubjectKeyType, TransactionType, UserType, ValueSet,
};

#[derive(Parser)]
#[command(
    name = "odm",
    version,
    about = "Build CDISC ODM 1.3 documents from tabular input",
    long_about = "Build CDISC ODM 1.3 documents, including the mdsol vendor extensions,\n\
                  from CSV input. Clinical data, administrative data and the closed\n\
                  value sets of every enumerated attribute are supported."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow item values to appear in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a ClinicalData document, one ClinicalData per subject.
    Clinical(ClinicalArgs),

    /// Build an AdminData document of users and their sites.
    Admin(AdminArgs),

    /// List the permitted values of an enumerated attribute.
    Enums {
        #[arg(value_enum)]
        name: EnumName,
    },
}

#[derive(Args)]
pub struct ClinicalArgs {
    /// CSV with columns subject,event,form,item_group,item,value.
    ///
    /// Optional columns `event_repeat_key` and `item_group_repeat_key`
    /// address repeating events and item groups.
    #[arg(long = "input", value_name = "CSV")]
    pub input: PathBuf,

    /// Project name; combined with the environment into the study OID.
    #[arg(long = "project")]
    pub project: String,

    /// Environment name, e.g. Prod or UAT.
    #[arg(long = "environment")]
    pub environment: String,

    /// Location OID of the site every subject belongs to.
    #[arg(long = "site", value_name = "OID")]
    pub site: String,

    /// Transaction type written on each SubjectData.
    #[arg(long = "transaction-type", value_name = "TYPE", value_parser = parse_transaction_type)]
    pub transaction_type: Option<TransactionType>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct AdminArgs {
    /// CSV with columns user_oid,login_name,first_name,last_name,email,location_oid,location_name.
    #[arg(long = "input", value_name = "CSV")]
    pub input: PathBuf,

    /// Study OID written on AdminData.
    #[arg(long = "study-oid", value_name = "OID")]
    pub study_oid: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Options shared by every command that writes a document.
#[derive(Args)]
pub struct OutputArgs {
    /// Originator written on the ODM root.
    #[arg(long = "originator", default_value = "odm-cli")]
    pub originator: String,

    /// Output file (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write the document on one line without indentation.
    #[arg(long = "compact")]
    pub compact: bool,

    /// Omit the XML declaration.
    #[arg(long = "no-declaration")]
    pub no_declaration: bool,

    /// Encoding named in the XML declaration.
    #[arg(long = "encoding", default_value = "utf-8")]
    pub encoding: String,
}

impl OutputArgs {
    pub fn render_options(&self) -> RenderOptions {
        let options = if self.compact {
            RenderOptions::compact()
        } else {
            RenderOptions::default()
        };
        if self.no_declaration {
            options.without_declaration()
        } else {
            options.with_declaration(self.encoding.as_str())
        }
    }
}

/// Accepts only the transaction types `SubjectData` allows.
fn parse_transaction_type(value: &str) -> Result<TransactionType, String> {
    let parsed: TransactionType = value.parse().map_err(|err: InvalidValue| err.to_string())?;
    if <SubjectData as Transactional>::TRANSACTION_TYPES.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("SubjectData does not allow TransactionType '{parsed}'"))
    }
}

/// Enumerations listed by `odm enums`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EnumName {
    ActionType,
    CodeListDataType,
    ConfirmationStyle,
    ControlType,
    CustomFunctionLanguage,
    DataType,
    EditPoint,
    FileType,
    Granularity,
    LocationOidType,
    LocationType,
    LogicalRecordPosition,
    ProjectType,
    ProtocolDeviationStatus,
    QueryStatus,
    RangeCheckComparator,
    RangeCheckType,
    SponsorOrSite,
    StepFunction,
    StudyEventType,
    SubjectKeyType,
    TransactionType,
    UserType,
}

impl EnumName {
    /// Field name the value set is checked against.
    pub fn field(self) -> &'static str {
        match self {
            Self::ActionType => ActionType::FIELD,
            Self::CodeListDataType => CodeListDataType::FIELD,
            Self::ConfirmationStyle => ConfirmationStyle::FIELD,
            Self::ControlType => ControlType::FIELD,
            Self::CustomFunctionLanguage => CustomFunctionLanguage::FIELD,
            Self::DataType => DataType::FIELD,
            Self::EditPoint => EditPoint::FIELD,
            Self::FileType => FileType::FIELD,
            Self::Granularity => Granularity::FIELD,
            Self::LocationOidType => LocationOidType::FIELD,
            Self::LocationType => LocationType::FIELD,
            Self::LogicalRecordPosition => LogicalRecordPosition::FIELD,
            Self::ProjectType => ProjectType::FIELD,
            Self::ProtocolDeviationStatus => ProtocolDeviationStatus::FIELD,
            Self::QueryStatus => QueryStatus::FIELD,
            Self::RangeCheckComparator => RangeCheckComparator::FIELD,
            Self::RangeCheckType => RangeCheckType::FIELD,
            Self::SponsorOrSite => SponsorOrSite::FIELD,
            Self::StepFunction => StepFunction::FIELD,
            Self::StudyEventType => StudyEventType::FIELD,
            Self::SubjectKeyType => SubjectKeyType::FIELD,
            Self::TransactionType => TransactionType::FIELD,
            Self::UserType => UserType::FIELD,
        }
    }

    /// Wire values in declaration order.
    pub fn values(self) -> Vec<&'static str> {
        match self {
            Self::ActionType => ActionType::wire_values(),
            Self::CodeListDataType => CodeListDataType::wire_values(),
            Self::ConfirmationStyle => ConfirmationStyle::wire_values(),
            Self::ControlType => ControlType::wire_values(),
            Self::CustomFunctionLanguage => CustomFunctionLanguage::wire_values(),
            Self::DataType => DataType::wire_values(),
            Self::EditPoint => EditPoint::wire_values(),
            Self::FileType => FileType::wire_values(),
            Self::Granularity => Granularity::wire_values(),
            Self::LocationOidType => LocationOidType::wire_values(),
            Self::LocationType => LocationType::wire_values(),
            Self::LogicalRecordPosition => LogicalRecordPosition::wire_values(),
            Self::ProjectType => ProjectType::wire_values(),
            Self::ProtocolDeviationStatus => ProtocolDeviationStatus::wire_values(),
            Self::QueryStatus => QueryStatus::wire_values(),
            Self::RangeCheckComparator => RangeCheckComparator::wire_values(),
            Self::RangeCheckType => RangeCheckType::wire_values(),
            Self::SponsorOrSite => SponsorOrSite::wire_values(),
            Self::StepFunction => StepFunction::wire_values(),
            Self::StudyEventType => StudyEventType::wire_values(),
            Self::SubjectKeyType => SubjectKeyType::wire_values(),
            Self::TransactionType => TransactionType::wire_values(),
            Self::UserType => UserType::wire_values(),
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

//! mdsol edit checks and derivations.
//!
//! An edit check is a sequence of steps evaluated as a stack program followed
//! by the actions fired when it holds; a derivation is a sequence of steps
//! computing a value. Booleans in this family are written `TRUE`/`FALSE`.

use odm_model::{ActionType, BoolStyle, LogicalRecordPosition, StepFunction};

use crate::any::AnyElement;
use crate::element::{Attributes, Composite, Element, emit_all, emit_children};
use crate::error::{OdmError, Result};
use crate::sink::XmlSink;

const TRUE_FALSE: BoolStyle = BoolStyle::TrueFalse;

/// A step calling `CustomFunction` must name the function it calls.
fn check_custom_function(
    element: &'static str,
    function: Option<StepFunction>,
    custom_function: Option<&str>,
) -> Result<()> {
    if function == Some(StepFunction::CustomFunction) && custom_function.is_none() {
        return Err(OdmError::incomplete(element, "CustomFunction"));
    }
    Ok(())
}

/// `mdsol:CheckStep`: pushes a data point or static value, or applies a
/// function to the values already on the stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdsolCheckStep {
    pub variable_oid: Option<String>,
    pub data_format: Option<String>,
    pub form_oid: Option<String>,
    pub folder_oid: Option<String>,
    pub field_oid: Option<String>,
    pub record_position: Option<i32>,
    pub form_repeat_number: Option<i32>,
    pub folder_repeat_number: Option<i32>,
    pub logical_record_position: Option<LogicalRecordPosition>,
    pub static_value: Option<String>,
    pub function: Option<StepFunction>,
    pub custom_function: Option<String>,
}

impl MdsolCheckStep {
    /// A step pushing a constant.
    pub fn static_value(value: impl Into<String>) -> Self {
        Self {
            static_value: Some(value.into()),
            ..Self::default()
        }
    }

    /// A step applying `function`.
    pub fn function(function: StepFunction) -> Self {
        Self {
            function: Some(function),
            ..Self::default()
        }
    }

    /// A step calling the named custom function.
    pub fn custom_function(name: impl Into<String>) -> Self {
        Self {
            function: Some(StepFunction::CustomFunction),
            custom_function: Some(name.into()),
            ..Self::default()
        }
    }

    /// A step pushing the value of a field.
    pub fn data_point(
        folder_oid: impl Into<String>,
        form_oid: impl Into<String>,
        field_oid: impl Into<String>,
        variable_oid: impl Into<String>,
    ) -> Self {
        Self {
            folder_oid: Some(folder_oid.into()),
            form_oid: Some(form_oid.into()),
            field_oid: Some(field_oid.into()),
            variable_oid: Some(variable_oid.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_record_position(mut self, record_position: i32) -> Self {
        self.record_position = Some(record_position);
        self
    }

    #[must_use]
    pub fn with_logical_record_position(mut self, position: LogicalRecordPosition) -> Self {
        self.logical_record_position = Some(position);
        self
    }

    #[must_use]
    pub fn with_data_format(mut self, data_format: impl Into<String>) -> Self {
        self.data_format = Some(data_format.into());
        self
    }
}

impl Element for MdsolCheckStep {
    const TAG: &'static str = "mdsol:CheckStep";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with_opt("VariableOID", self.variable_oid.as_deref())
            .with_opt("DataFormat", self.data_format.as_deref())
            .with_opt("FormOID", self.form_oid.as_deref())
            .with_opt("FolderOID", self.folder_oid.as_deref())
            .with_opt("FieldOID", self.field_oid.as_deref())
            .with_opt("RecordPosition", self.record_position)
            .with_opt("FormRepeatNumber", self.form_repeat_number)
            .with_opt("FolderRepeatNumber", self.folder_repeat_number)
            .with_opt("LogicalRecordPosition", self.logical_record_position)
            .with_opt("StaticValue", self.static_value.as_deref())
            .with_opt("Function", self.function)
            .with_opt("CustomFunction", self.custom_function.as_deref())
    }

    fn validate(&self) -> Result<()> {
        check_custom_function(Self::TAG, self.function, self.custom_function.as_deref())
    }
}

/// `mdsol:CheckAction`: what happens when the check's condition holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdsolCheckAction {
    pub variable_oid: Option<String>,
    pub field_oid: Option<String>,
    pub form_oid: Option<String>,
    pub folder_oid: Option<String>,
    pub record_position: Option<i32>,
    pub form_repeat_number: Option<i32>,
    pub folder_repeat_number: Option<i32>,
    pub action_type: Option<ActionType>,
    pub string: Option<String>,
    pub options: Option<String>,
    pub script: Option<String>,
}

impl MdsolCheckAction {
    pub fn new(action_type: ActionType) -> Self {
        Self {
            action_type: Some(action_type),
            ..Self::default()
        }
    }

    /// Targets the action at a field.
    #[must_use]
    pub fn on_field(
        mut self,
        folder_oid: impl Into<String>,
        form_oid: impl Into<String>,
        field_oid: impl Into<String>,
        variable_oid: impl Into<String>,
    ) -> Self {
        self.folder_oid = Some(folder_oid.into());
        self.form_oid = Some(form_oid.into());
        self.field_oid = Some(field_oid.into());
        self.variable_oid = Some(variable_oid.into());
        self
    }

    #[must_use]
    pub fn with_record_position(mut self, record_position: i32) -> Self {
        self.record_position = Some(record_position);
        self
    }

    #[must_use]
    pub fn with_string(mut self, string: impl Into<String>) -> Self {
        self.string = Some(string.into());
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }
}

impl Element for MdsolCheckAction {
    const TAG: &'static str = "mdsol:CheckAction";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with_opt("VariableOID", self.variable_oid.as_deref())
            .with_opt("FieldOID", self.field_oid.as_deref())
            .with_opt("FormOID", self.form_oid.as_deref())
            .with_opt("FolderOID", self.folder_oid.as_deref())
            .with_opt("RecordPosition", self.record_position)
            .with_opt("FormRepeatNumber", self.form_repeat_number)
            .with_opt("FolderRepeatNumber", self.folder_repeat_number)
            .with_opt("Type", self.action_type)
            .with_opt("String", self.string.as_deref())
            .with_opt("Options", self.options.as_deref())
            .with_opt("Script", self.script.as_deref())
    }
}

children! {
    /// Children accepted by [`MdsolEditCheckDef`].
    pub enum MdsolEditCheckDefChild for MdsolEditCheckDef {
        MdsolCheckStep(MdsolCheckStep),
        MdsolCheckAction(MdsolCheckAction),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdsolEditCheckDefSlot {
    Steps,
    Actions,
}

/// `mdsol:EditCheckDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolEditCheckDef {
    pub oid: String,
    pub active: bool,
    pub bypass_during_migration: bool,
    pub needs_retesting: bool,
    steps: Vec<MdsolCheckStep>,
    actions: Vec<MdsolCheckAction>,
}

impl MdsolEditCheckDef {
    /// An active check.
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            active: true,
            bypass_during_migration: false,
            needs_retesting: false,
            steps: Vec::new(),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[must_use]
    pub fn with_bypass_during_migration(mut self, bypass: bool) -> Self {
        self.bypass_during_migration = bypass;
        self
    }

    #[must_use]
    pub fn with_needs_retesting(mut self, needs_retesting: bool) -> Self {
        self.needs_retesting = needs_retesting;
        self
    }

    pub fn attach(&mut self, child: impl Into<MdsolEditCheckDefChild>) -> Result<&mut Self> {
        match MdsolEditCheckDefChild::traced(child.into()) {
            MdsolEditCheckDefChild::MdsolCheckStep(node) => self.steps.push(node),
            MdsolEditCheckDefChild::MdsolCheckAction(node) => self.actions.push(node),
        }
        Ok(self)
    }

    pub fn steps(&self) -> &[MdsolCheckStep] {
        &self.steps
    }

    pub fn actions(&self) -> &[MdsolCheckAction] {
        &self.actions
    }
}

impl Element for MdsolEditCheckDef {
    const TAG: &'static str = "mdsol:EditCheckDef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with_bool("Active", self.active, TRUE_FALSE)
            .with_bool("BypassDuringMigration", self.bypass_during_migration, TRUE_FALSE)
            .with_bool("NeedsRetesting", self.needs_retesting, TRUE_FALSE)
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_children(self, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(MdsolEditCheckDefChild::try_from(child)?)
            .map(|_| ())
    }
}

impl Composite for MdsolEditCheckDef {
    type Slot = MdsolEditCheckDefSlot;

    const ORDER: &'static [MdsolEditCheckDefSlot] =
        &[MdsolEditCheckDefSlot::Steps, MdsolEditCheckDefSlot::Actions];

    fn emit(&self, slot: MdsolEditCheckDefSlot, sink: &mut dyn XmlSink) -> Result<()> {
        match slot {
            MdsolEditCheckDefSlot::Steps => emit_all(&self.steps, sink),
            MdsolEditCheckDefSlot::Actions => emit_all(&self.actions, sink),
        }
    }
}

/// `mdsol:DerivationStep`: a check step restricted to the derivation
/// functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdsolDerivationStep {
    pub variable_oid: Option<String>,
    pub data_format: Option<String>,
    pub form_oid: Option<String>,
    pub folder_oid: Option<String>,
    pub field_oid: Option<String>,
    pub record_position: Option<i32>,
    pub form_repeat_number: Option<i32>,
    pub folder_repeat_number: Option<i32>,
    pub logical_record_position: Option<LogicalRecordPosition>,
    pub custom_function: Option<String>,
    function: Option<StepFunction>,
}

impl MdsolDerivationStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// A step applying `function`, which must be a derivation function.
    pub fn with_function(function: StepFunction) -> Result<Self> {
        let mut step = Self::new();
        step.set_function(function)?;
        Ok(step)
    }

    /// A step pushing the value of a field.
    pub fn data_point(
        folder_oid: impl Into<String>,
        form_oid: impl Into<String>,
        field_oid: impl Into<String>,
        variable_oid: impl Into<String>,
    ) -> Self {
        Self {
            folder_oid: Some(folder_oid.into()),
            form_oid: Some(form_oid.into()),
            field_oid: Some(field_oid.into()),
            variable_oid: Some(variable_oid.into()),
            ..Self::default()
        }
    }

    pub fn function(&self) -> Option<StepFunction> {
        self.function
    }

    /// Sets the function; functions outside the derivation subset are
    /// rejected and leave the step unchanged.
    pub fn set_function(&mut self, function: StepFunction) -> Result<&mut Self> {
        if !function.is_derivation_function() {
            return Err(OdmError::FunctionNotAllowed {
                element: Self::TAG,
                value: function,
            });
        }
        self.function = Some(function);
        Ok(self)
    }

    pub fn set_function_str(&mut self, function: &str) -> Result<&mut Self> {
        let parsed: StepFunction = function.parse()?;
        self.set_function(parsed)
    }

    #[must_use]
    pub fn with_custom_function(mut self, name: impl Into<String>) -> Self {
        self.custom_function = Some(name.into());
        self
    }
}

impl Element for MdsolDerivationStep {
    const TAG: &'static str = "mdsol:DerivationStep";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with_opt("VariableOID", self.variable_oid.as_deref())
            .with_opt("DataFormat", self.data_format.as_deref())
            .with_opt("FormOID", self.form_oid.as_deref())
            .with_opt("FolderOID", self.folder_oid.as_deref())
            .with_opt("FieldOID", self.field_oid.as_deref())
            .with_opt("RecordPosition", self.record_position)
            .with_opt("FormRepeatNumber", self.form_repeat_number)
            .with_opt("FolderRepeatNumber", self.folder_repeat_number)
            .with_opt("LogicalRecordPosition", self.logical_record_position)
            .with_opt("Function", self.function)
            .with_opt("CustomFunction", self.custom_function.as_deref())
    }

    fn validate(&self) -> Result<()> {
        check_custom_function(Self::TAG, self.function, self.custom_function.as_deref())
    }
}

children! {
    /// Children accepted by [`MdsolDerivationDef`].
    pub enum MdsolDerivationDefChild for MdsolDerivationDef {
        MdsolDerivationStep(MdsolDerivationStep),
    }
}

/// `mdsol:DerivationDef`: computes the value of its target field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolDerivationDef {
    pub oid: String,
    pub active: bool,
    pub bypass_during_migration: bool,
    pub needs_retesting: bool,
    pub variable_oid: Option<String>,
    pub field_oid: Option<String>,
    pub form_oid: Option<String>,
    pub folder_oid: Option<String>,
    pub record_position: Option<i32>,
    pub form_repeat_number: Option<i32>,
    pub folder_repeat_number: Option<i32>,
    pub logical_record_position: Option<LogicalRecordPosition>,
    pub all_variables_in_folders: Option<bool>,
    pub all_variables_in_fields: Option<bool>,
    steps: Vec<MdsolDerivationStep>,
}

impl MdsolDerivationDef {
    /// An active derivation.
    pub fn new(oid: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            active: true,
            bypass_during_migration: false,
            needs_retesting: false,
            variable_oid: None,
            field_oid: None,
            form_oid: None,
            folder_oid: None,
            record_position: None,
            form_repeat_number: None,
            folder_repeat_number: None,
            logical_record_position: None,
            all_variables_in_folders: None,
            all_variables_in_fields: None,
            steps: Vec::new(),
        }
    }

    /// Sets the field the derived value is written to.
    #[must_use]
    pub fn with_target(
        mut self,
        folder_oid: impl Into<String>,
        form_oid: impl Into<String>,
        field_oid: impl Into<String>,
        variable_oid: impl Into<String>,
    ) -> Self {
        self.folder_oid = Some(folder_oid.into());
        self.form_oid = Some(form_oid.into());
        self.field_oid = Some(field_oid.into());
        self.variable_oid = Some(variable_oid.into());
        self
    }

    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn attach(&mut self, child: impl Into<MdsolDerivationDefChild>) -> Result<&mut Self> {
        match MdsolDerivationDefChild::traced(child.into()) {
            MdsolDerivationDefChild::MdsolDerivationStep(node) => self.steps.push(node),
        }
        Ok(self)
    }

    pub fn steps(&self) -> &[MdsolDerivationStep] {
        &self.steps
    }
}

impl Element for MdsolDerivationDef {
    const TAG: &'static str = "mdsol:DerivationDef";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("OID", self.oid.as_str())
            .with_bool("Active", self.active, TRUE_FALSE)
            .with_bool("BypassDuringMigration", self.bypass_during_migration, TRUE_FALSE)
            .with_bool("NeedsRetesting", self.needs_retesting, TRUE_FALSE)
            .with_opt("VariableOID", self.variable_oid.as_deref())
            .with_opt("FieldOID", self.field_oid.as_deref())
            .with_opt("FormOID", self.form_oid.as_deref())
            .with_opt("FolderOID", self.folder_oid.as_deref())
            .with_opt("RecordPosition", self.record_position)
            .with_opt("FormRepeatNumber", self.form_repeat_number)
            .with_opt("FolderRepeatNumber", self.folder_repeat_number)
            .with_opt("LogicalRecordPosition", self.logical_record_position)
            .with_opt_bool(
                "AllVariablesInFolders",
                self.all_variables_in_folders,
                TRUE_FALSE,
            )
            .with_opt_bool(
                "AllVariablesInFields",
                self.all_variables_in_fields,
                TRUE_FALSE,
            )
    }

    fn build_children(&self, sink: &mut dyn XmlSink) -> Result<()> {
        emit_all(&self.steps, sink)
    }

    fn accept(&mut self, child: AnyElement) -> Result<()> {
        self.attach(MdsolDerivationDefChild::try_from(child)?)
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sink::to_xml_string;

    #[test]
    fn edit_check_writes_steps_before_actions_with_true_false() {
        let mut check = MdsolEditCheckDef::new("CHK_AGE").with_needs_retesting(true);
        check
            .attach(
                MdsolCheckAction::new(ActionType::OpenQuery)
                    .on_field("SCREEN", "DM", "AGE", "AGE")
                    .with_string("Age is empty")
                    .with_options("Site from System,RequiresResponse"),
            )
            .unwrap()
            .attach(MdsolCheckStep::data_point("SCREEN", "DM", "AGE", "AGE").with_record_position(0))
            .unwrap()
            .attach(MdsolCheckStep::function(StepFunction::IsEmpty))
            .unwrap();

        insta::assert_snapshot!(to_xml_string(&check).unwrap(), @r#"<mdsol:EditCheckDef OID="CHK_AGE" Active="TRUE" BypassDuringMigration="FALSE" NeedsRetesting="TRUE"><mdsol:CheckStep VariableOID="AGE" FormOID="DM" FolderOID="SCREEN" FieldOID="AGE" RecordPosition="0" /><mdsol:CheckStep Function="IsEmpty" /><mdsol:CheckAction VariableOID="AGE" FieldOID="AGE" FormOID="DM" FolderOID="SCREEN" Type="OpenQuery" String="Age is empty" Options="Site from System,RequiresResponse" /></mdsol:EditCheckDef>"#);
    }

    #[test]
    fn custom_function_step_needs_a_name() {
        let step = MdsolCheckStep::function(StepFunction::CustomFunction);
        let err = to_xml_string(&step).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Completeness);

        let step = MdsolCheckStep::custom_function("CF_CHECK");
        assert_eq!(
            to_xml_string(&step).unwrap(),
            r#"<mdsol:CheckStep Function="CustomFunction" CustomFunction="CF_CHECK" />"#
        );
    }

    #[test]
    fn derivation_step_rejects_logical_functions() {
        let mut step = MdsolDerivationStep::with_function(StepFunction::Add).unwrap();
        let err = step.set_function(StepFunction::IsEmpty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            err.to_string(),
            "mdsol:DerivationStep does not allow Function 'IsEmpty'"
        );
        assert_eq!(step.function(), Some(StepFunction::Add));

        assert!(step.set_function_str("Bogus").is_err());
        assert!(MdsolDerivationStep::with_function(StepFunction::Or).is_err());
    }

    #[test]
    fn derivation_def_renders_target_and_steps() {
        let mut derivation = MdsolDerivationDef::new("DRV_AGE")
            .with_target("SCREEN", "DM", "AGE", "AGE");
        derivation.all_variables_in_fields = Some(false);
        derivation
            .attach(MdsolDerivationStep::data_point("SCREEN", "DM", "BRTHDAT", "BRTHDAT"))
            .unwrap()
            .attach(MdsolDerivationStep::with_function(StepFunction::Age).unwrap())
            .unwrap();

        let xml = to_xml_string(&derivation).unwrap();
        assert!(xml.starts_with(
            r#"<mdsol:DerivationDef OID="DRV_AGE" Active="TRUE" BypassDuringMigration="FALSE" NeedsRetesting="FALSE" VariableOID="AGE" FieldOID="AGE" FormOID="DM" FolderOID="SCREEN" AllVariablesInFields="FALSE">"#
        ));
        assert!(xml.ends_with(r#"<mdsol:DerivationStep Function="Age" /></mdsol:DerivationDef>"#));
    }
}

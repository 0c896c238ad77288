//! Value sets for the mdsol edit check and derivation extension family.

odm_enum! {
    /// Function a check step or derivation step applies.
    pub enum StepFunction as "Function" {
        CustomFunction => "CustomFunction",
        IsEmpty => "IsEmpty",
        IsNotEmpty => "IsNotEmpty",
        Contains => "Contains",
        StartsWith => "StartsWith",
        IsLessThan => "IsLessThan",
        IsLessThanOrEqualTo => "IsLessThanOrEqualTo",
        IsGreaterThan => "IsGreaterThan",
        IsGreaterThanOrEqualTo => "IsGreaterThanOrEqualTo",
        IsEqualTo => "IsEqualTo",
        IsNonConformant => "IsNonConformant",
        IsNotEqualTo => "IsNotEqualTo",
        InLabRange => "InLabRange",
        LengthIsLessThan => "LengthIsLessThan",
        LengthIsLessThanOrEqualTo => "LengthIsLessThanOrEqualTo",
        LengthIsGreaterThan => "LengthIsGreaterThan",
        LengthIsGreaterThanOrEqualTo => "LengthIsGreaterThanOrEqualTo",
        LengthIsEqualTo => "LengthIsEqualTo",
        Or => "Or",
        And => "And",
        Not => "Not",
        Now => "Now",
        IsPresent => "IsPresent",
        IsActive => "IsActive",
        Add => "Add",
        Subtract => "Subtract",
        Multiply => "Multiply",
        Divide => "Divide",
        AddDay => "AddDay",
        AddMonth => "AddMonth",
        AddYear => "AddYear",
        AddSec => "AddSec",
        AddMin => "AddMin",
        AddHour => "AddHour",
        DaySpan => "DaySpan",
        TimeSpan => "TimeSpan",
        Age => "Age",
        StringAdd => "StringAdd",
        Space => "Space",
    }
}

/// Functions a derivation step may use.
pub const DERIVATION_STEP_FUNCTIONS: &[StepFunction] = &[
    StepFunction::Age,
    StepFunction::Subtract,
    StepFunction::Multiply,
    StepFunction::Divide,
    StepFunction::AddDay,
    StepFunction::AddMonth,
    StepFunction::AddYear,
    StepFunction::AddSec,
    StepFunction::AddMin,
    StepFunction::AddHour,
    StepFunction::DaySpan,
    StepFunction::TimeSpan,
    StepFunction::Now,
    StepFunction::StringAdd,
    StepFunction::CustomFunction,
    StepFunction::Space,
    StepFunction::Add,
];

impl StepFunction {
    /// Returns true if a derivation step may use this function.
    pub fn is_derivation_function(&self) -> bool {
        DERIVATION_STEP_FUNCTIONS.contains(self)
    }
}

odm_enum! {
    /// `mdsol:CheckAction/@Type`.
    pub enum ActionType as "CheckAction Type" {
        OpenQuery => "OpenQuery",
        RequireReview => "RequireReview",
        RequireVerification => "RequireVerification",
        AddComment => "AddComment",
        AddDeviation => "AddDeviation",
        CustomFunction => "CustomFunction",
        PlaceSticky => "PlaceSticky",
        AddForm => "AddForm",
        AddMatrix => "AddMatrix",
        MrgMatrix => "MrgMatrix",
        OldMrgMatrix => "OldMrgMatrix",
        SetNonconformant => "SetNonconformant",
        SendMessage => "SendMessage",
        SetDataPoint => "SetDataPoint",
        SetTimeZero => "SetTimeZero",
        SetTimeForward => "SetTimeForward",
        SetSubjectStatus => "SetSubjectStatus",
        SetSubjectName => "SetSubjectName",
        UpdateFormName => "UpdateFormName",
        UpdateFolderName => "UpdateFolderName",
        SetRecordDate => "SetRecordDate",
        SetDataPageDate => "SetDataPageDate",
        SetInstanceDate => "SetInstanceDate",
        SetSubjectDate => "SetSubjectDate",
        SetDataPointVisible => "SetDataPointVisible",
        SetSecondarySubjectName => "SetSecondarySubjectName",
        SetFormRequiresSignature => "SetFormRequiresSignature",
        SetFolderRequiresSignature => "SetFolderRequiresSignature",
        SetSubjectRequiresSignature => "SetSubjectRequiresSignature",
        SetDynamicSearchList => "SetDynamicSearchList",
    }
}

odm_enum! {
    /// Which record of a log form a step or action addresses.
    pub enum LogicalRecordPosition as "LogicalRecordPosition" {
        MaxBySeq => "MaxBySeq",
        MinBySeq => "MinBySeq",
        Last => "Last",
        Next => "Next",
        Previous => "Previous",
        First => "First",
        Global => "Global",
    }
}

odm_enum! {
    /// `mdsol:CustomFunctionDef/@Language`.
    #[derive(Default)]
    pub enum CustomFunctionLanguage as "CustomFunctionDef Language" {
        #[default]
        CSharp => "C#",
        Sql => "SQL",
        Pb => "PB",
        Vb => "VB",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueSet;

    #[test]
    fn step_and_action_sets_are_complete() {
        assert_eq!(StepFunction::all().len(), 39);
        assert_eq!(ActionType::all().len(), 30);
    }

    #[test]
    fn derivation_subset_is_narrower() {
        assert!(StepFunction::Age.is_derivation_function());
        assert!(StepFunction::CustomFunction.is_derivation_function());
        assert!(!StepFunction::IsEmpty.is_derivation_function());
        assert!(!StepFunction::Or.is_derivation_function());
        assert!(DERIVATION_STEP_FUNCTIONS.len() < StepFunction::all().len());
    }

    #[test]
    fn language_wire_value() {
        assert_eq!(CustomFunctionLanguage::default().as_str(), "C#");
        assert_eq!("SQL".parse::<CustomFunctionLanguage>().unwrap(), CustomFunctionLanguage::Sql);
    }
}

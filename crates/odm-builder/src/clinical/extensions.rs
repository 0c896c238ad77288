//! Vendor extension elements carried by `ItemData`.

use odm_model::{BoolStyle, ProtocolDeviationStatus, QueryStatus, TransactionType};

use crate::element::{Attributes, Element};
use crate::transaction::{INSERT_ONLY, Transactional};

/// `mdsol:Query`: a data query raised against an item value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdsolQuery {
    pub value: Option<String>,
    pub query_repeat_key: Option<String>,
    pub recipient: Option<String>,
    pub status: Option<QueryStatus>,
    pub requires_response: Option<bool>,
    pub response: Option<String>,
}

impl MdsolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_query_repeat_key(mut self, key: impl Into<String>) -> Self {
        self.query_repeat_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: QueryStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_requires_response(mut self, requires_response: bool) -> Self {
        self.requires_response = Some(requires_response);
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }
}

impl Element for MdsolQuery {
    const TAG: &'static str = "mdsol:Query";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with_opt("Value", self.value.as_deref())
            .with_opt("QueryRepeatKey", self.query_repeat_key.as_deref())
            .with_opt("Recipient", self.recipient.as_deref())
            .with_opt("Status", self.status)
            .with_opt_bool("RequiresResponse", self.requires_response, BoolStyle::YesNo)
            .with_opt("Response", self.response.as_deref())
    }
}

/// `mdsol:ProtocolDeviation`. Only `Insert` transactions are supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdsolProtocolDeviation {
    pub value: String,
    pub status: ProtocolDeviationStatus,
    pub repeat_key: u32,
    pub code: Option<String>,
    pub class: Option<String>,
    transaction_type: Option<TransactionType>,
}

impl MdsolProtocolDeviation {
    pub fn new(value: impl Into<String>, status: ProtocolDeviationStatus) -> Self {
        Self {
            value: value.into(),
            status,
            repeat_key: 1,
            code: None,
            class: None,
            transaction_type: None,
        }
    }

    #[must_use]
    pub fn with_repeat_key(mut self, repeat_key: u32) -> Self {
        self.repeat_key = repeat_key;
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl Element for MdsolProtocolDeviation {
    const TAG: &'static str = "mdsol:ProtocolDeviation";

    fn attributes(&self) -> Attributes {
        Attributes::new()
            .with("Value", self.value.as_str())
            .with("Status", self.status.as_str())
            .with("ProtocolDeviationRepeatKey", self.repeat_key.to_string())
            .with_opt("Code", self.code.as_deref())
            .with_opt("Class", self.class.as_deref())
            .with_opt("TransactionType", self.transaction_type)
    }
}

impl Transactional for MdsolProtocolDeviation {
    const TRANSACTION_TYPES: &'static [TransactionType] = INSERT_ONLY;

    fn transaction_type(&self) -> Option<TransactionType> {
        self.transaction_type
    }

    fn transaction_type_slot(&mut self) -> &mut Option<TransactionType> {
        &mut self.transaction_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, OdmError};
    use crate::sink::to_xml_string;

    #[test]
    fn query_writes_only_set_attributes() {
        let query = MdsolQuery::new()
            .with_value("Please confirm")
            .with_status(QueryStatus::Open)
            .with_requires_response(true)
            .with_recipient("Site from System");
        assert_eq!(
            to_xml_string(&query).unwrap(),
            r#"<mdsol:Query Value="Please confirm" Recipient="Site from System" Status="Open" RequiresResponse="Yes" />"#
        );
    }

    #[test]
    fn protocol_deviation_defaults_repeat_key() {
        let mut deviation = MdsolProtocolDeviation::new("Out of window", ProtocolDeviationStatus::Open)
            .with_code("E01")
            .with_class("Deviation");
        deviation.set_transaction_type(TransactionType::Insert).unwrap();
        assert_eq!(
            to_xml_string(&deviation).unwrap(),
            r#"<mdsol:ProtocolDeviation Value="Out of window" Status="Open" ProtocolDeviationRepeatKey="1" Code="E01" Class="Deviation" TransactionType="Insert" />"#
        );
    }

    #[test]
    fn protocol_deviation_rejects_update() {
        let mut deviation = MdsolProtocolDeviation::new("Late", ProtocolDeviationStatus::Removed);
        let err = deviation
            .set_transaction_type(TransactionType::Update)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(
            err,
            OdmError::TransactionTypeNotAllowed {
                element: "mdsol:ProtocolDeviation",
                value: TransactionType::Update
            }
        ));
        assert_eq!(deviation.transaction_type(), None);
    }
}

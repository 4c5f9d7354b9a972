//! Checkout Form
//!
//! The five customer/payment fields collected before a checkout attempt,
//! plus the submission-time constraints the form enforces (required fields,
//! e-mail shape, amount pattern).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CheckoutError;

/// Pattern the amount input carries on the page
pub const AMOUNT_PATTERN: &str = r"^\d+(\.\d{1,2})?$";

/// Title shown by the browser when the amount pattern fails
pub const AMOUNT_TITLE: &str = "Please enter a valid amount";

/// Named form fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    CustomerId,
    CustomerPhone,
    CustomerName,
    CustomerEmail,
    Amount,
}

impl FormField {
    /// All fields in form order
    pub const ALL: [FormField; 5] = [
        FormField::CustomerId,
        FormField::CustomerPhone,
        FormField::CustomerName,
        FormField::CustomerEmail,
        FormField::Amount,
    ];

    /// Wire/input name
    pub fn as_str(self) -> &'static str {
        match self {
            FormField::CustomerId => "customer_id",
            FormField::CustomerPhone => "customer_phone",
            FormField::CustomerName => "customer_name",
            FormField::CustomerEmail => "customer_email",
            FormField::Amount => "amount",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FormField::CustomerId => "Customer ID",
            FormField::CustomerPhone => "Customer Phone",
            FormField::CustomerName => "Customer Name",
            FormField::CustomerEmail => "Customer Email",
            FormField::Amount => "Amount",
        }
    }

    /// HTML input type
    pub fn input_type(self) -> &'static str {
        match self {
            FormField::CustomerEmail => "email",
            _ => "text",
        }
    }

    /// HTML `pattern` attribute, if the field has one
    pub fn pattern(self) -> Option<&'static str> {
        match self {
            FormField::Amount => Some(AMOUNT_PATTERN),
            _ => None,
        }
    }

    /// HTML `title` attribute, if the field has one
    pub fn title(self) -> Option<&'static str> {
        match self {
            FormField::Amount => Some(AMOUNT_TITLE),
            _ => None,
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormField {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| CheckoutError::UnknownField(s.to_string()))
    }
}

/// Form state, serialized as-is for the session request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub customer_id: String,
    pub customer_phone: String,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: String,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field, leaving the others untouched
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Builder-style [`FormData::set`]
    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::CustomerId => &self.customer_id,
            FormField::CustomerPhone => &self.customer_phone,
            FormField::CustomerName => &self.customer_name,
            FormField::CustomerEmail => &self.customer_email,
            FormField::Amount => &self.amount,
        }
    }

    fn slot_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::CustomerId => &mut self.customer_id,
            FormField::CustomerPhone => &mut self.customer_phone,
            FormField::CustomerName => &mut self.customer_name,
            FormField::CustomerEmail => &mut self.customer_email,
            FormField::Amount => &mut self.amount,
        }
    }

    /// Parsed amount, only when it satisfies [`AMOUNT_PATTERN`]
    pub fn amount(&self) -> Option<Decimal> {
        if is_valid_amount(&self.amount) {
            Decimal::from_str(&self.amount).ok()
        } else {
            None
        }
    }

    /// Check every submission constraint, collecting all failures
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for field in FormField::ALL {
            let value = self.get(field);
            if value.trim().is_empty() {
                issues.push(FieldIssue::new(field, IssueKind::Missing));
                continue;
            }
            match field {
                FormField::CustomerEmail if !is_valid_email(value.trim()) => {
                    issues.push(FieldIssue::new(field, IssueKind::InvalidEmail));
                }
                FormField::Amount if !is_valid_amount(value) => {
                    issues.push(FieldIssue::new(field, IssueKind::InvalidAmount));
                }
                _ => {}
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// What is wrong with a field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    InvalidEmail,
    InvalidAmount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: FormField,
    pub kind: IssueKind,
}

impl FieldIssue {
    fn new(field: FormField, kind: IssueKind) -> Self {
        Self { field, kind }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::Missing => write!(f, "{} is required", self.field.placeholder()),
            IssueKind::InvalidEmail => f.write_str("Please enter a valid email address"),
            IssueKind::InvalidAmount => f.write_str(AMOUNT_TITLE),
        }
    }
}

/// Form rejected at submission time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    pub fn has_issue(&self, field: FormField) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// `^\d+(\.\d{1,2})?$` over ASCII digits
pub fn is_valid_amount(value: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match value.split_once('.') {
        Some((whole, fraction)) => digits(whole) && digits(fraction) && fraction.len() <= 2,
        None => digits(value),
    }
}

/// Browser `type="email"` rule: `local@label(.label)*`
pub fn is_valid_email(value: &str) -> bool {
    const LOCAL_EXTRA: &str = ".!#$%&'*+/=?^_`{|}~-";

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || LOCAL_EXTRA.contains(c));

    let domain_ok = domain.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    local_ok && domain_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn filled() -> FormData {
        FormData::new()
            .with(FormField::CustomerId, "C1")
            .with(FormField::CustomerPhone, "9999999999")
            .with(FormField::CustomerName, "Jane")
            .with(FormField::CustomerEmail, "j@x.com")
            .with(FormField::Amount, "100.50")
    }

    #[test]
    fn test_set_only_touches_named_field() {
        let mut form = filled();
        form.set(FormField::CustomerName, "J");
        form.set(FormField::CustomerName, "Jan");

        assert_eq!(form.get(FormField::CustomerName), "Jan");
        assert_eq!(form.customer_id, "C1");
        assert_eq!(form.customer_phone, "9999999999");
        assert_eq!(form.customer_email, "j@x.com");
        assert_eq!(form.amount, "100.50");
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in FormField::ALL {
            assert_eq!(field.as_str().parse::<FormField>().unwrap(), field);
        }
        assert!("card_number".parse::<FormField>().is_err());
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let json = serde_json::to_value(filled()).unwrap();
        assert_eq!(json["customer_id"], "C1");
        assert_eq!(json["amount"], "100.50");
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_amount_pattern() {
        for ok in ["0", "100", "100.5", "100.50"] {
            assert!(is_valid_amount(ok), "{ok} should pass");
        }
        for bad in ["", ".5", "100.", "100.505", "-1", "1e3", "10,00", " 10", "١٢"] {
            assert!(!is_valid_amount(bad), "{bad} should fail");
        }
    }

    #[test]
    fn test_amount_parses_to_decimal() {
        assert_eq!(filled().amount(), Some(dec!(100.50)));
        assert_eq!(filled().with(FormField::Amount, "abc").amount(), None);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("j@x.com"));
        assert!(is_valid_email("first.last+tag@sub-domain.example"));
        assert!(!is_valid_email("jx.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("j@-x.com"));
        assert!(!is_valid_email("j@x..com"));
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        assert!(filled().validate().is_ok());
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let form = filled()
            .with(FormField::CustomerName, "   ")
            .with(FormField::Amount, "12.345");

        let err = form.validate().unwrap_err();
        assert_eq!(err.issues().len(), 2);
        assert!(err.has_issue(FormField::CustomerName));
        assert!(err.has_issue(FormField::Amount));
        assert!(err.to_string().contains(AMOUNT_TITLE));
    }
}

//! PHI category tags and their reconciliation priority

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of PHI categories the engine can tag. Extending the set
/// means adding a matcher, not editing a monolithic classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhiCategory {
    Name,
    PossibleName,
    DateOfBirth,
    Date,
    ServiceDate,
    Ssn,
    Mrn,
    InsuranceId,
    Account,
    License,
    Phone,
    Fax,
    Email,
    Url,
    IpAddress,
    Address,
    ZipCode,
    Gender,
    Pronouns,
    Age,
    #[serde(rename = "AGE_90_PLUS")]
    Age90Plus,
    Occupation,
    Location,
}

impl PhiCategory {
    /// Stable uppercase label used in placeholders and reports
    pub fn label(&self) -> &'static str {
        match self {
            PhiCategory::Name => "NAME",
            PhiCategory::PossibleName => "POSSIBLE_NAME",
            PhiCategory::DateOfBirth => "DATE_OF_BIRTH",
            PhiCategory::Date => "DATE",
            PhiCategory::ServiceDate => "SERVICE_DATE",
            PhiCategory::Ssn => "SSN",
            PhiCategory::Mrn => "MRN",
            PhiCategory::InsuranceId => "INSURANCE_ID",
            PhiCategory::Account => "ACCOUNT",
            PhiCategory::License => "LICENSE",
            PhiCategory::Phone => "PHONE",
            PhiCategory::Fax => "FAX",
            PhiCategory::Email => "EMAIL",
            PhiCategory::Url => "URL",
            PhiCategory::IpAddress => "IP_ADDRESS",
            PhiCategory::Address => "ADDRESS",
            PhiCategory::ZipCode => "ZIP_CODE",
            PhiCategory::Gender => "GENDER",
            PhiCategory::Pronouns => "PRONOUNS",
            PhiCategory::Age => "AGE",
            PhiCategory::Age90Plus => "AGE_90_PLUS",
            PhiCategory::Occupation => "OCCUPATION",
            PhiCategory::Location => "LOCATION",
        }
    }

    /// Placeholder token substituted for redacted text spans
    pub fn placeholder(&self) -> String {
        format!("[{}]", self.label())
    }

    /// Reconciliation rank; lower wins when matches overlap. Specific
    /// identifier shapes outrank the looser grammars that could shadow
    /// them (an MRN is also a digit run, an address contains a name).
    pub fn priority(&self) -> u8 {
        match self {
            PhiCategory::Ssn
            | PhiCategory::Email
            | PhiCategory::Url
            | PhiCategory::IpAddress => 0,
            PhiCategory::DateOfBirth
            | PhiCategory::Mrn
            | PhiCategory::InsuranceId
            | PhiCategory::Account
            | PhiCategory::License
            | PhiCategory::ServiceDate
            | PhiCategory::Fax => 1,
            PhiCategory::Phone
            | PhiCategory::Date
            | PhiCategory::Address
            | PhiCategory::ZipCode
            | PhiCategory::Pronouns => 2,
            PhiCategory::Name
            | PhiCategory::Gender
            | PhiCategory::Age
            | PhiCategory::Age90Plus
            | PhiCategory::Occupation
            | PhiCategory::Location => 3,
            PhiCategory::PossibleName => 4,
        }
    }
}

impl fmt::Display for PhiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//! Identity fixture: the account created once per suite run

use std::time::SystemTime;

use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::params::RequestParams;

/// Per-run identifier that keeps generated accounts from colliding
/// with leftovers of earlier runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RunTag(String);

impl RunTag {
    /// Nanoseconds since epoch (hex) plus four random hex digits.
    #[must_use]
    pub fn generate(rng: &mut impl Rng) -> Self {
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self(format!("{nanos:x}{:04x}", rng.r#gen::<u16>()))
    }

    /// Fixed tag, for replaying a run or for tests.
    #[must_use]
    pub fn fixed(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account payload accepted by `/createAccount` and `/updateAccount`.
///
/// Every field is sent; validation is left to the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    pub title: String,
    pub birth_date: String,
    pub birth_month: String,
    pub birth_year: u16,
    pub firstname: String,
    pub lastname: String,
    pub company: String,
    pub address1: String,
    pub address2: String,
    pub country: String,
    pub zipcode: String,
    pub state: String,
    pub city: String,
    pub mobile_number: String,
}

/// Field selector used by expectations that compare against the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountField {
    Name,
    Email,
    Title,
    Firstname,
    Lastname,
    Company,
    Address1,
    Address2,
    Country,
    Zipcode,
    State,
    City,
}

impl UserAccount {
    /// The suite's account for one run.
    #[must_use]
    pub fn for_run(tag: &RunTag) -> Self {
        Self {
            name: format!("Conta {tag}"),
            email: format!("conta.{tag}@email.com"),
            password: "12345".to_string(),
            title: "Mrs".to_string(),
            birth_date: "10".to_string(),
            birth_month: "11".to_string(),
            birth_year: 2001,
            firstname: "Alana".to_string(),
            lastname: "Alves".to_string(),
            company: "accltda".to_string(),
            address1: "rua dos bobos".to_string(),
            address2: "Casa Amarela".to_string(),
            country: "Brasil".to_string(),
            zipcode: "53876590".to_string(),
            state: "Pernambuco".to_string(),
            city: "Recife".to_string(),
            mobile_number: "819999999999".to_string(),
        }
    }

    #[must_use]
    pub fn with_lastname(&self, lastname: impl Into<String>) -> Self {
        Self {
            lastname: lastname.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn field(&self, field: AccountField) -> &str {
        match field {
            AccountField::Name => &self.name,
            AccountField::Email => &self.email,
            AccountField::Title => &self.title,
            AccountField::Firstname => &self.firstname,
            AccountField::Lastname => &self.lastname,
            AccountField::Company => &self.company,
            AccountField::Address1 => &self.address1,
            AccountField::Address2 => &self.address2,
            AccountField::Country => &self.country,
            AccountField::Zipcode => &self.zipcode,
            AccountField::State => &self.state,
            AccountField::City => &self.city,
        }
    }

    /// Flatten into form parameters, in the order the service documents them.
    #[must_use]
    pub fn to_params(&self) -> RequestParams {
        RequestParams::new()
            .with("name", &self.name)
            .with("email", &self.email)
            .with("password", &self.password)
            .with("title", &self.title)
            .with("birth_date", &self.birth_date)
            .with("birth_month", &self.birth_month)
            .with("birth_year", self.birth_year.to_string())
            .with("firstname", &self.firstname)
            .with("lastname", &self.lastname)
            .with("company", &self.company)
            .with("address1", &self.address1)
            .with("address2", &self.address2)
            .with("country", &self.country)
            .with("zipcode", &self.zipcode)
            .with("state", &self.state)
            .with("city", &self.city)
            .with("mobile_number", &self.mobile_number)
    }
}

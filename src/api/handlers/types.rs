//! Request/response types for the account endpoints.
//!
//! Request fields default to empty so a missing field fails validation with a
//! 400 instead of surfacing as a JSON decoding error.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::accounts::{Account, Credentials, NewAccount};

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

#[derive(ToSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
    #[serde(default)]
    pub email: String,
}

impl From<RegisterRequest> for NewAccount {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.username,
            full_name: request.full_name,
            email: request.email,
            password: request.password,
        }
    }
}

/// Stored account as returned to clients. Never carries the password hash.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub username: String,
    pub full_name: String,
    pub email: String,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            username: account.username,
            full_name: account.full_name,
            email: account.email,
        }
    }
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    #[schema(value_type = String, format = Password)]
    pub password: SecretString,
}

impl From<LoginRequest> for Credentials {
    fn from(request: LoginRequest) -> Self {
        Self {
            username: request.username,
            password: request.password,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: Option<LoginUser>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub username: String,
    pub email: String,
    pub login_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Greeting {
    pub success: bool,
    pub message: String,
}

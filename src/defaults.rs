//! Built-in endpoints for distributed builds.
//!
//! NOTE:
//! - These are public endpoints; security is enforced by the Cognito ID token
//!   on the write endpoint.
//! - The Cognito app client id has no default; set BP_COGNITO_CLIENT_ID.

pub const API_BASE_URL: &str = "https://3eno4n6y1d.execute-api.ap-northeast-1.amazonaws.com/prod/api";
pub const ADD_RECORD_PATH: &str = "/add-blood-pressure-record";
pub const RECORDS_URL: &str = "https://s3-ap-northeast-1.amazonaws.com/uwaguchi/blood-pressure/blood-pressure.txt";
pub const COGNITO_REGION: &str = "ap-northeast-1";

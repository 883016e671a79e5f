//! Built-in demonstration roster.
//!
//! [`RecordDirectory::load`](crate::RecordDirectory::load) substitutes this
//! document when the real one can't be read, so the demo login page always
//! has someone to log in as. That trades correctness for availability and is
//! reported through [`Mode::Fallback`](crate::Mode::Fallback); it is not
//! suitable for anything holding real accounts.

use crate::Document;
use serde_json::json;

/// The fixed fallback document. First three entries double as the login
/// hints returned by `sample_credentials`.
pub fn demo_users() -> Document {
    vec![
        json!({
            "email": "admin@rugbyajojo.fr",
            "password": "admin123",
            "role": "admin",
            "status": "active",
            "firstName": "Jojo",
            "lastName": "Martin",
            "team": "Staff",
            "joinDate": "2023-09-01"
        }),
        json!({
            "email": "player@rugbyajojo.fr",
            "password": "player123",
            "role": "player",
            "status": "active",
            "firstName": "Lucas",
            "lastName": "Bernard",
            "team": "Seniors",
            "joinDate": "2024-01-15"
        }),
        json!({
            "email": "camille@rugbyajojo.fr",
            "password": "camille123",
            "role": "player",
            "status": "active",
            "firstName": "Camille",
            "lastName": "Dubois",
            "team": "Juniors",
            "joinDate": "2024-03-02"
        }),
        json!({
            "email": "ancien@rugbyajojo.fr",
            "password": "ancien123",
            "role": "player",
            "status": "inactive",
            "firstName": "Paul",
            "lastName": "Moreau",
            "team": "Seniors",
            "joinDate": "2021-05-20"
        }),
    ]
}

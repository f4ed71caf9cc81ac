use serde::Deserialize;

/// Form body of `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub name: String,
}

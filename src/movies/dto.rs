use serde::Deserialize;

use crate::store::MovieUpdate;

/// Form body of `POST /users/:user_id/movies`.
#[derive(Debug, Deserialize)]
pub struct AddMovieForm {
    #[serde(default)]
    pub title: String,
}

/// Form body of the edit page. Fields missing from the body stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct EditMovieForm {
    pub title: Option<String>,
    pub year: Option<String>,
    pub director: Option<String>,
    pub poster: Option<String>,
}

impl EditMovieForm {
    pub fn has_blank_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| t.trim().is_empty())
    }
}

impl From<EditMovieForm> for MovieUpdate {
    fn from(f: EditMovieForm) -> Self {
        MovieUpdate {
            title: f.title,
            year: f.year,
            director: f.director,
            poster: f.poster,
        }
    }
}

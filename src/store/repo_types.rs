use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Owner of a movie list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[sqlx(skip)]
    pub movies: Vec<Movie>,
}

impl User {
    pub fn movie(&self, movie_id: i64) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == movie_id)
    }
}

/// Movie record, unique by id within its owner.
///
/// `name` and `poster_url` are accepted on read for data files written by
/// older versions of the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: i64,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub director: String,
    #[serde(default, alias = "poster_url")]
    pub poster: String,
}

/// Fields of a movie about to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub year: String,
    pub director: String,
    pub poster: String,
}

impl NewMovie {
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            year: self.year.trim().to_string(),
            director: self.director.trim().to_string(),
            poster: self.poster.trim().to_string(),
        }
    }
}

/// Partial movie edit. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub year: Option<String>,
    pub director: Option<String>,
    pub poster: Option<String>,
}

impl MovieUpdate {
    pub fn trimmed(self) -> Self {
        let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
        Self {
            title: trim(self.title),
            year: trim(self.year),
            director: trim(self.director),
            poster: trim(self.poster),
        }
    }

    pub fn apply(self, movie: &mut Movie) {
        let MovieUpdate {
            title,
            year,
            director,
            poster,
        } = self.trimmed();
        if let Some(title) = title {
            movie.title = title;
        }
        if let Some(year) = year {
            movie.year = year;
        }
        if let Some(director) = director {
            movie.director = director;
        }
        if let Some(poster) = poster {
            movie.poster = poster;
        }
    }
}

//! TVDB endpoint templates.

use std::time::Duration;

use traktor_core::{AuthRequirement, Endpoint, Namespace};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// The TVDB endpoint tree.
pub fn tvdb_api() -> Namespace {
    Namespace::new()
        .endpoint(
            "login",
            Endpoint::post("/login")
                .body_field("apikey", true)
                .body_field("pin", false),
        )
        .namespace("series", series())
        .namespace(
            "movies",
            Namespace::new().endpoint(
                "base",
                Endpoint::get("/movies/:id")
                    .required_path("id")
                    .auth(AuthRequirement::Required)
                    .cached(),
            ),
        )
        .endpoint(
            "search",
            Endpoint::get("/search?query=&type=&year=&language=&offset=&limit=")
                .required_query("query")
                .auth(AuthRequirement::Required)
                .paginated(),
        )
        .endpoint(
            "artwork",
            Endpoint::get("/artwork/:id/extended")
                .required_path("id")
                .auth(AuthRequirement::Required)
                .retention(DAY),
        )
        .endpoint(
            "languages",
            Endpoint::get("/languages")
                .auth(AuthRequirement::Required)
                .retention(DAY),
        )
}

fn series() -> Namespace {
    Namespace::new()
        .endpoint(
            "base",
            Endpoint::get("/series/:id")
                .required_path("id")
                .auth(AuthRequirement::Required)
                .cached(),
        )
        .endpoint(
            "extended",
            Endpoint::get("/series/:id/extended?meta=&short=")
                .required_path("id")
                .auth(AuthRequirement::Required)
                .cached(),
        )
        .endpoint(
            "episodes",
            Endpoint::get("/series/:id/episodes/:season_type/:lang?page=0&season=&episodeNumber=")
                .required_path("id")
                .required_path("season_type")
                .optional_path("lang")
                .auth(AuthRequirement::Required)
                .paginated()
                .cached(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_consistent() {
        tvdb_api().check().unwrap();
    }

    #[test]
    fn test_only_login_is_public() {
        for (path, endpoint) in tvdb_api().endpoints() {
            let public = endpoint.opts().auth == AuthRequirement::None;
            assert_eq!(public, path == "login", "unexpected auth on {path}");
        }
    }
}

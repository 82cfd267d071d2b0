//! TMDB endpoint templates.

use std::time::Duration;

use traktor_core::{AuthRequirement, Endpoint, Namespace};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// The TMDB endpoint tree.
pub fn tmdb_api() -> Namespace {
    Namespace::new()
        .endpoint("configuration", Endpoint::get("/configuration").retention(DAY))
        .namespace("movies", movies())
        .namespace("tv", tv())
        .namespace(
            "search",
            Namespace::new().endpoint(
                "multi",
                Endpoint::get("/search/multi?query=&include_adult=false&language=&page=")
                    .required_query("query")
                    .paginated(),
            ),
        )
        .namespace("account", account())
        .namespace(
            "authentication",
            Namespace::new()
                .endpoint("token", Endpoint::get("/authentication/token/new"))
                .endpoint(
                    "session",
                    Endpoint::post("/authentication/session/new").body_field("request_token", true),
                ),
        )
}

fn movies() -> Namespace {
    Namespace::new()
        .endpoint(
            "details",
            Endpoint::get("/movie/:id?language=&append_to_response=")
                .required_path("id")
                .cached(),
        )
        .endpoint(
            "popular",
            Endpoint::get("/movie/popular?language=&page=&region=")
                .paginated()
                .cached(),
        )
        .endpoint(
            "images",
            Endpoint::get("/movie/:id/images?include_image_language=")
                .required_path("id")
                .retention(DAY),
        )
        .endpoint(
            "rate",
            Endpoint::post("/movie/:id/rating")
                .required_path("id")
                .body_field("value", true)
                .auth(AuthRequirement::Required),
        )
}

fn tv() -> Namespace {
    Namespace::new()
        .endpoint(
            "details",
            Endpoint::get("/tv/:id?language=&append_to_response=")
                .required_path("id")
                .cached(),
        )
        .endpoint(
            "season",
            Endpoint::get("/tv/:id/season/:season?language=")
                .required_path("id")
                .required_path("season")
                .cached(),
        )
        .endpoint(
            "episode",
            Endpoint::get("/tv/:id/season/:season/episode/:episode?language=")
                .required_path("id")
                .required_path("season")
                .required_path("episode")
                .cached(),
        )
}

fn account() -> Namespace {
    Namespace::new()
        .endpoint(
            "details",
            Endpoint::get("/account/:account_id")
                .optional_path("account_id")
                .auth(AuthRequirement::Required),
        )
        .endpoint(
            "rated_movies",
            Endpoint::get("/account/:account_id/rated/movies?language=&page=&sort_by=")
                .required_path("account_id")
                .auth(AuthRequirement::Required)
                .paginated(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_consistent() {
        tmdb_api().check().unwrap();
    }

    #[test]
    fn test_search_default_query_value() {
        let api = tmdb_api();
        let Some(traktor_core::ApiNode::Endpoint(search)) = api.lookup("search.multi") else {
            panic!("search.multi missing");
        };
        let defaults: Vec<(&str, &str)> = search.query_placeholders().collect();
        assert!(defaults.contains(&("include_adult", "false")));
    }
}

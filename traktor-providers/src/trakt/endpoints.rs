//! Trakt endpoint templates.

use std::time::Duration;

use traktor_core::{AuthRequirement, CachePolicy, Endpoint, Namespace};

use super::provider::VIP_CONDITION;

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// The Trakt endpoint tree.
pub fn trakt_api() -> Namespace {
    Namespace::new()
        .namespace("movies", movies())
        .namespace("shows", shows())
        .endpoint(
            "search",
            Endpoint::get("/search/:type?query=&fields=&page=&limit=&extended=")
                .required_path("type")
                .required_query("query")
                .validate(|params| !params.is_blank("query"))
                .paginated()
                .retention(HOUR),
        )
        .namespace("sync", sync())
        .namespace("users", users())
        .namespace(
            "certifications",
            Namespace::new().endpoint(
                "list",
                Endpoint::get("/certifications/:type")
                    .required_path("type")
                    .retention(DAY),
            ),
        )
}

fn movies() -> Namespace {
    Namespace::new()
        .endpoint(
            "trending",
            Endpoint::get("/movies/trending?page=&limit=&extended=")
                .paginated()
                .retention(HOUR),
        )
        .endpoint(
            "popular",
            Endpoint::get("/movies/popular?page=&limit=&extended=")
                .paginated()
                .retention(HOUR),
        )
        .endpoint(
            "summary",
            Endpoint::get("/movies/:id?extended=")
                .required_path("id")
                .cached(),
        )
        .endpoint(
            "watching",
            Endpoint::get("/movies/:id/watching?extended=").required_path("id"),
        )
}

fn shows() -> Namespace {
    Namespace::new()
        .endpoint(
            "summary",
            Endpoint::get("/shows/:id?extended=")
                .required_path("id")
                .cached(),
        )
        .endpoint(
            "seasons",
            Endpoint::get("/shows/:id/seasons?extended=")
                .required_path("id")
                .cached(),
        )
        .endpoint(
            "progress",
            Endpoint::get("/shows/:id/progress/watched?hidden=&specials=&count_specials=")
                .required_path("id")
                .auth(AuthRequirement::Required),
        )
}

fn sync() -> Namespace {
    let history_body = |endpoint: traktor_core::EndpointBuilder| {
        endpoint
            .body_field("movies", false)
            .body_field("shows", false)
            .body_field("seasons", false)
            .body_field("episodes", false)
            .auth(AuthRequirement::Required)
    };

    Namespace::new()
        .endpoint(
            "last_activities",
            Endpoint::get("/sync/last_activities").auth(AuthRequirement::Required),
        )
        .namespace(
            "history",
            Namespace::new()
                .endpoint(
                    "get",
                    Endpoint::get("/sync/history/:type/:id?page=&limit=&start_at=&end_at=")
                        .optional_path("type")
                        .optional_path("id")
                        .auth(AuthRequirement::Required)
                        .paginated()
                        .cache(CachePolicy::Detailed {
                            retention: None,
                            evict_on_error: Some(true),
                        }),
                )
                .endpoint("add", history_body(Endpoint::post("/sync/history")))
                .endpoint("remove", history_body(Endpoint::post("/sync/history/remove"))),
        )
        .namespace(
            "watchlist",
            Namespace::new().endpoint(
                "get",
                Endpoint::get("/sync/watchlist/:type/:sort?page=&limit=")
                    .optional_path("type")
                    .optional_path("sort")
                    .query_when("limit", VIP_CONDITION)
                    .auth(AuthRequirement::Required)
                    .paginated()
                    .cached(),
            ),
        )
}

fn users() -> Namespace {
    Namespace::new()
        .endpoint(
            "settings",
            Endpoint::get("/users/settings").auth(AuthRequirement::Required),
        )
        .endpoint(
            "profile",
            Endpoint::get("/users/:id?extended=")
                .required_path("id")
                .auth(AuthRequirement::Optional),
        )
        .endpoint(
            "lists",
            Endpoint::get("/users/:id/lists")
                .required_path("id")
                .auth(AuthRequirement::Optional)
                .cached(),
        )
}

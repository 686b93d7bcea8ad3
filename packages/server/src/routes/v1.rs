use utoipa_axum::{router::OpenApiRouter, routes};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(auth_routes())
        .merge(cut_out_routes(config))
        .routes(routes!(handlers::assets::serve_asset))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::signup))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn cut_out_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(
            handlers::cut_out::list_cut_outs,
            handlers::cut_out::register_cut_out,
            handlers::cut_out::update_cut_out,
            handlers::cut_out::delete_cut_out
        ))
        .routes(routes!(handlers::cut_out::catalog_options))
        .routes(routes!(handlers::cut_out::preview_cut_outs))
        .routes(routes!(handlers::cut_out::get_cut_out));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::cut_out::upload_image))
        .layer(handlers::cut_out::upload_body_limit(
            config.storage.max_asset_size,
        ));

    crud.merge(upload)
}

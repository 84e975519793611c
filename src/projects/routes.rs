// src/projects/routes.rs

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use super::handlers;
use crate::common::config::MAX_UPLOAD_BYTES;

pub fn projects_routes() -> Router {
    // Project forms carry image files
    let admin_projects = Router::new()
        .route(
            "/admin/projects",
            get(handlers::admin_list_projects).post(handlers::admin_create_project),
        )
        .route(
            "/admin/projects/:id",
            get(handlers::admin_get_project)
                .put(handlers::admin_update_project)
                .delete(handlers::admin_delete_project),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        // Public routes
        .route("/projects", get(handlers::list_projects))
        .route("/projects/:slug", get(handlers::project_by_slug))
        // Admin routes
        .route("/admin", get(handlers::admin_dashboard))
        .merge(admin_projects)
}

use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/calendar", get(handlers::calendar_page))
        .route("/chart", get(handlers::chart_page))
        .route("/expenses", get(handlers::list_page))
        .route("/expense/new", get(handlers::new_expense_page))
        .route("/expense", post(handlers::submit_expense))
        .route("/api/calendar", get(handlers::get_calendar))
        .route("/api/chart", get(handlers::get_chart))
        .route("/api/expenses", get(handlers::get_expenses))
        .route("/api/expense", post(handlers::create_expense))
        .with_state(state)
}

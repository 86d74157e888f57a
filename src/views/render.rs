use serde_json::json;

use crate::AppState;

pub fn render_full(state: &AppState, title: &str, body_html: String) -> Result<String, String> {
    let ctx = json!({
        "title": title,
        "body": body_html,
    });

    state
        .hbs
        .render("layouts/base", &ctx)
        .map_err(|e| e.to_string())
}

pub fn render_page(
    state: &AppState,
    title: &str,
    tpl: &str,
    ctx: &serde_json::Value,
) -> Result<String, String> {
    let body = state.hbs.render(tpl, ctx).map_err(|e| e.to_string())?;
    render_full(state, title, body)
}

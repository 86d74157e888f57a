use handlebars::{Handlebars, TemplateError};
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

// Compiled into the binary so the service starts from any working directory.
const TEMPLATES: [(&str, &str); 6] = [
    ("layouts/base", include_str!("../../templates/layouts/base.hbs")),
    ("pages/home", include_str!("../../templates/pages/home.hbs")),
    ("pages/preview", include_str!("../../templates/pages/preview.hbs")),
    ("pages/probe", include_str!("../../templates/pages/probe.hbs")),
    ("pages/notice", include_str!("../../templates/pages/notice.hbs")),
    ("pages/not_found", include_str!("../../templates/pages/not_found.hbs")),
];

pub fn build_handlebars() -> Result<Hbs, TemplateError> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(false);

    for (name, source) in TEMPLATES {
        hb.register_template_string(name, source)?;
    }

    Ok(Arc::new(hb))
}

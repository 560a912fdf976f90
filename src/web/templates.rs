use minijinja::{Environment, Value};
use tracing::error;

// .html names get minijinja's HTML auto-escaping
pub fn init_templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();

    env.add_template("index.html", include_str!("../../templates/index.html"))?;
    env.add_template(
        "chat_response.html",
        include_str!("../../templates/chat_response.html"),
    )?;

    Ok(env)
}

pub fn render_template(env: &Environment, template_name: &str, context: Value) -> String {
    match env.get_template(template_name) {
        Ok(tmpl) => match tmpl.render(context) {
            Ok(result) => result,
            Err(e) => {
                error!("Template render error: {}", e);
                format!("<h1>Template Error</h1><p>{}</p>", e)
            }
        },
        Err(e) => {
            error!("Template not found: {} ({})", template_name, e);
            format!("<h1>Template Not Found</h1><p>{}: {}</p>", template_name, e)
        }
    }
}

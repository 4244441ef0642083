use askama::Template;

use crate::domain::blog_config::SettingsForm;
use crate::domain::forms::FieldErrors;

use super::{AdminLayout, AdminSelectOption};

#[derive(Clone)]
pub struct AdminSettingsView {
    pub heading: String,
    pub form_action: String,
    pub form: SettingsForm,
    pub errors: FieldErrors,
    pub lang_options: Vec<AdminSelectOption>,
    pub email_options: Vec<AdminSelectOption>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/conf.html")]
pub struct AdminSettingsTemplate {
    pub view: AdminLayout<AdminSettingsView>,
}

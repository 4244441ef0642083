//! Blog settings form.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::{
    admin::settings::{AdminSettingsError, SettingsOutcome},
    error::HttpError,
};
use crate::domain::{
    blog_config::{EmailPolicy, Locale, SettingsForm},
    forms::FieldErrors,
};
use crate::presentation::{
    admin::views::{
        self as admin_views, AdminChrome, AdminSection, AdminSelectOption, AdminSettingsView,
    },
    views::render_template_response,
};

use crate::infra::http::extract::{AdminSession, CurrentBlog};
use crate::infra::http::state::HttpState;

const SOURCE: &str = "infra::http::admin::settings";

pub(super) async fn admin_settings(
    _session: AdminSession,
    CurrentBlog(blog): CurrentBlog,
) -> Response {
    let form = SettingsForm::from_config(&blog.config);
    render_form(&blog.config.title, form, FieldErrors::new(), None)
}

pub(super) async fn admin_settings_update(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Form(form): Form<SettingsForm>,
) -> Response {
    match state.admin.settings.update(&blog, &form).await {
        Ok(SettingsOutcome::Invalid(errors)) => {
            let form = SettingsForm {
                password: String::new(),
                ..form
            };
            render_form(&blog.config.title, form, errors, None)
        }
        Ok(SettingsOutcome::Saved(config)) => render_form(
            &config.title,
            SettingsForm::from_config(&config),
            FieldErrors::new(),
            Some("Settings saved.".to_string()),
        ),
        Err(err) => settings_failure(err),
    }
}

fn settings_failure(err: AdminSettingsError) -> Response {
    let message = match &err {
        AdminSettingsError::Repo(_) => "Failed to save settings",
        AdminSettingsError::Auth(_) => "Failed to store the new password",
    };
    HttpError::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, message, &err).into_response()
}

fn render_form(
    blog_title: &str,
    form: SettingsForm,
    errors: FieldErrors,
    notice: Option<String>,
) -> Response {
    let content = AdminSettingsView {
        heading: "Settings".to_string(),
        form_action: AdminSection::Settings.href().to_string(),
        lang_options: lang_options(&form.lang),
        email_options: email_options(&form.email),
        form,
        errors,
        notice,
    };

    let chrome = AdminChrome::new(blog_title, AdminSection::Settings);
    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminSettingsTemplate { view }, StatusCode::OK)
}

fn lang_options(selected: &str) -> Vec<AdminSelectOption> {
    Locale::ALL
        .into_iter()
        .map(|locale| AdminSelectOption {
            value: locale.as_str().to_string(),
            label: match locale {
                Locale::Unset => "(none)".to_string(),
                other => other.to_string(),
            },
            selected: locale.as_str() == selected,
        })
        .collect()
}

fn email_options(selected: &str) -> Vec<AdminSelectOption> {
    EmailPolicy::ALL
        .into_iter()
        .map(|policy| AdminSelectOption {
            value: policy.code().to_string(),
            label: policy.label().to_string(),
            selected: policy.code() == selected,
        })
        .collect()
}

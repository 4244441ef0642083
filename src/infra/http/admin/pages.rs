//! Page list, bulk delete and editor.

use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form as SelectionForm;

use crate::application::admin::{SaveOutcome, pages::NEW_PAGE_ID};
use crate::domain::{
    archive::human_date,
    entities::{BlogRecord, PageRecord},
    forms::{FieldErrors, PageDraft},
};
use crate::presentation::{
    admin::views::{
        self as admin_views, AdminChrome, AdminPageEditView, AdminPageListView, AdminPageRowView,
        AdminSection,
    },
    views::{PagerView, page_href, render_template_response},
};

use crate::infra::http::extract::{AdminSession, CurrentBlog};
use crate::infra::http::public::PageQuery;
use crate::infra::http::state::HttpState;

use super::{BulkDeleteForm, content_failure, deleted_notice, not_found, repo_failure};

const SOURCE: &str = "infra::http::admin::pages";

pub(super) async fn admin_pages(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Query(query): Query<PageQuery>,
) -> Response {
    render_list(&state, &blog, query.number(), None).await
}

pub(super) async fn admin_pages_delete(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    SelectionForm(form): SelectionForm<BulkDeleteForm>,
) -> Response {
    let removed = match state.admin.pages.delete(&blog, &form.ids).await {
        Ok(removed) => removed,
        Err(err) => return repo_failure(SOURCE, "Failed to delete pages", err),
    };
    render_list(&state, &blog, 1, deleted_notice(removed, "page")).await
}

pub(super) async fn admin_page_edit(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Path(id): Path<i64>,
) -> Response {
    if id == NEW_PAGE_ID {
        let draft = PageDraft::blank();
        return render_editor(&blog, NEW_PAGE_ID, draft, None, FieldErrors::new(), None);
    }

    match state.admin.pages.find(&blog, id).await {
        Ok(Some(page)) => render_editor(
            &blog,
            id,
            PageDraft::from_record(&page),
            Some(page_href(&page.slug)),
            FieldErrors::new(),
            None,
        ),
        Ok(None) => not_found(SOURCE),
        Err(err) => repo_failure(SOURCE, "Failed to load page", err),
    }
}

pub(super) async fn admin_page_save(
    _session: AdminSession,
    State(state): State<HttpState>,
    CurrentBlog(blog): CurrentBlog,
    Path(id): Path<i64>,
    Form(draft): Form<PageDraft>,
) -> Response {
    match state.admin.pages.save(&blog, id, &draft).await {
        Ok(SaveOutcome::Invalid(errors)) => {
            let public_href = existing_href(&state, &blog, id).await;
            render_editor(&blog, id, draft, public_href, errors, None)
        }
        Ok(SaveOutcome::Created(page)) => Redirect::to(&edit_href(page.id)).into_response(),
        Ok(SaveOutcome::Updated(page)) => {
            let saved = PageDraft {
                slug: page.slug.clone(),
                ..draft
            };
            render_editor(
                &blog,
                page.id,
                saved,
                Some(page_href(&page.slug)),
                FieldErrors::new(),
                Some("Page saved.".to_string()),
            )
        }
        Err(err) => content_failure(SOURCE, "Failed to save page", err),
    }
}

/// Public link of a stored page, for redisplaying a rejected edit.
async fn existing_href(state: &HttpState, blog: &BlogRecord, id: i64) -> Option<String> {
    match state.admin.pages.find(blog, id).await {
        Ok(Some(page)) => Some(page_href(&page.slug)),
        _ => None,
    }
}

async fn render_list(
    state: &HttpState,
    blog: &BlogRecord,
    page_number: i64,
    notice: Option<String>,
) -> Response {
    let page = match state.admin.pages.list(blog, page_number).await {
        Ok(page) => page,
        Err(err) => return repo_failure(SOURCE, "Failed to list pages", err),
    };

    let pager = PagerView::for_page(&page, AdminSection::Pages.href());
    let content = AdminPageListView {
        heading: "Pages".to_string(),
        pages: page.items.iter().map(row_view).collect(),
        pager,
        new_page_href: edit_href(NEW_PAGE_ID),
        notice,
    };

    let chrome = AdminChrome::new(blog.config.title.clone(), AdminSection::Pages);
    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminPagesTemplate { view }, StatusCode::OK)
}

fn render_editor(
    blog: &BlogRecord,
    id: i64,
    draft: PageDraft,
    public_href: Option<String>,
    errors: FieldErrors,
    notice: Option<String>,
) -> Response {
    let heading = if id == NEW_PAGE_ID {
        "New page".to_string()
    } else {
        "Edit page".to_string()
    };
    let content = AdminPageEditView {
        heading,
        id,
        form_action: edit_href(id),
        draft,
        errors,
        notice,
        public_href,
    };

    let chrome = AdminChrome::new(blog.config.title.clone(), AdminSection::Pages);
    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminPageEditTemplate { view }, StatusCode::OK)
}

fn row_view(page: &PageRecord) -> AdminPageRowView {
    AdminPageRowView {
        id: page.id,
        title: page.title.clone(),
        slug: page.slug.clone(),
        status_label: if page.published { "Published" } else { "Draft" },
        date: human_date(page.created_at),
        public_href: page_href(&page.slug),
        edit_href: edit_href(page.id),
    }
}

pub(crate) fn edit_href(id: i64) -> String {
    format!("/admin/pages/edit/{id}")
}

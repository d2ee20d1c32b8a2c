use minijinja::{context, Environment};

use super::markdown::{source_lines, to_html};
use super::{
    PageState, BUSY_TEXT, DESCRIPTION, INPUT_LABEL, INPUT_PLACEHOLDER, PAGE_ICON, PAGE_TITLE,
    SUBMIT_LABEL,
};
use crate::agent::RenderResult;

const TEMPLATE_NAME: &str = "page.html";
const TEMPLATE: &str = include_str!("templates/page.html");

/// The single HTML page. The `.html` template name turns on autoescaping.
pub struct Page {
    env: Environment<'static>,
}

impl Page {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render(&self, state: &PageState) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(TEMPLATE_NAME)?;

        let mut halted = None;
        let mut query = "";
        let mut warning = None;
        let mut error = None;
        let mut answer_html = None;
        let mut sources_html = Vec::new();

        match state {
            PageState::Idle => {}
            PageState::Halted { message } => halted = Some(message.as_str()),
            PageState::Completed { query: q, result } => {
                query = q.as_str();
                match result {
                    RenderResult::Warning { message } => warning = Some(message.as_str()),
                    RenderResult::Error { message } => error = Some(message.as_str()),
                    RenderResult::Success { answer, sources } => {
                        answer_html = Some(to_html(answer));
                        sources_html = source_lines(sources).iter().map(|l| to_html(l)).collect();
                    }
                }
            }
        }

        template.render(context! {
            page_title => PAGE_TITLE,
            page_icon => PAGE_ICON,
            description => DESCRIPTION,
            input_label => INPUT_LABEL,
            placeholder => INPUT_PLACEHOLDER,
            submit_label => SUBMIT_LABEL,
            busy_text => BUSY_TEXT,
            halted => halted,
            query => query,
            warning => warning,
            error => error,
            success => answer_html.is_some(),
            answer_html => answer_html,
            sources_html => sources_html,
        })
    }
}

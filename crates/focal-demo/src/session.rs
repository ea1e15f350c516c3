//! Scripted keyboard session

use std::time::Duration;

use anyhow::{Context, bail};

use focal_dom::KeyboardEvent;

use crate::page::TodoPage;

/// One user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Tab,
    ShiftTab,
    Escape,
    Enter,
    Type(String),
    /// Click the first element matching a selector
    Click(String),
    /// Let time pass, then run a frame
    Wait(u64),
    Frame,
}

impl Step {
    /// Tour of the page: skip link, add todos, complete one, clear it
    /// through the dialog, then dismiss the dialog with Escape.
    pub fn default_script() -> Vec<Step> {
        use Step::*;
        vec![
            Tab,
            Enter,
            Click("#new-todo".into()),
            Type("Buy milk".into()),
            Click("#add-todo".into()),
            Type("Walk the dog".into()),
            Click("#add-todo".into()),
            Wait(1000),
            Click("#todo-list li button".into()),
            Click("#clear-completed".into()),
            Tab,
            Tab,
            ShiftTab,
            Click("#modal-primary-action".into()),
            Frame,
            Click("#clear-completed".into()),
            Escape,
            Frame,
            Wait(1000),
        ]
    }
}

/// Run `steps`, returning one log line per step
pub fn run_session(page: &mut TodoPage, steps: &[Step]) -> anyhow::Result<Vec<String>> {
    let mut log = Vec::with_capacity(steps.len());

    for (n, step) in steps.iter().enumerate() {
        match step {
            Step::Tab => page.press(KeyboardEvent::tab()),
            Step::ShiftTab => page.press(KeyboardEvent::shift_tab()),
            Step::Escape => page.press(KeyboardEvent::escape()),
            Step::Enter => page.press(KeyboardEvent::new("Enter")),
            Step::Type(text) => page.type_text(text),
            Step::Click(selector) => {
                let target = page
                    .document()
                    .try_query_selector(selector)
                    .with_context(|| format!("step {}: bad selector", n + 1))?;
                let Some(target) = target else {
                    bail!("step {}: nothing matches {}", n + 1, selector);
                };
                page.click(target);
            }
            Step::Wait(ms) => {
                page.tick(Duration::from_millis(*ms));
            }
            Step::Frame => {
                page.frame();
            }
        }

        let step_name = format!("{:?}", step);
        let line = format!("{:>2}. {:<32} focus: {}", n + 1, step_name, page.focused_label());
        tracing::info!("{}", line);
        let live = page.live_text();
        if !live.is_empty() {
            tracing::info!("    live region: {}", live);
        }
        log.push(line);
    }

    Ok(log)
}

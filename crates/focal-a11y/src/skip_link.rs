//! Skip Links

use serde::Deserialize;

use focal_dom::NodeId;

use crate::A11yError;
use crate::aria::AriaRole;
use crate::host::RegionHost;

/// One "skip to" anchor
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SkipLink {
    pub label: String,
    /// Id of the landmark, without `#`
    pub target_id: String,
}

impl SkipLink {
    pub fn new(label: &str, target: &str) -> Self {
        Self {
            label: label.to_string(),
            target_id: target.trim_start_matches('#').to_string(),
        }
    }

    pub fn href(&self) -> String {
        format!("#{}", self.target_id)
    }
}

/// Skip-link navigation block
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SkipLinks {
    links: Vec<SkipLink>,
}

impl Default for SkipLinks {
    fn default() -> Self {
        Self {
            links: vec![
                SkipLink::new("Skip to main content", "main-content"),
                SkipLink::new("Skip to navigation", "navigation"),
                SkipLink::new("Skip to footer", "footer"),
            ],
        }
    }
}

impl SkipLinks {
    pub fn new(links: Vec<SkipLink>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &[SkipLink] {
        &self.links
    }

    /// Build `<nav aria-label=...>` with one anchor per link under `parent`
    pub fn render<H: RegionHost>(&self, host: &mut H, parent: NodeId) -> Result<NodeId, A11yError> {
        let nav = host.append_element(parent, "nav", &[
            ("aria-label", "Skip navigation links"),
            ("class", "skip-links"),
        ])?;
        for link in &self.links {
            let href = link.href();
            let anchor = host.append_element(nav, "a", &[("href", &href), ("class", "skip-link")])?;
            host.set_text_content(anchor, &link.label)?;
        }
        Ok(nav)
    }

    /// Move focus to the element `href` points at
    ///
    /// Landmarks are rarely focusable on their own; those get
    /// `tabindex="-1"` so they can take programmatic focus.
    pub fn activate<H: RegionHost>(host: &mut H, href: &str) -> bool {
        let target = match host.query_selector(href) {
            Ok(Some(target)) => target,
            Ok(None) => {
                tracing::debug!("skip link target {} not found", href);
                return false;
            }
            Err(e) => {
                tracing::warn!("skip link href {:?} is not a selector: {}", href, e);
                return false;
            }
        };

        if host.focus(target) {
            return true;
        }
        if host.get_attribute(target, "tabindex").is_none() {
            if let Err(e) = host.set_attribute(target, "tabindex", "-1") {
                tracing::warn!("failed to make {:?} focusable: {}", target, e);
                return false;
            }
        }
        host.focus(target)
    }

    /// Activate from the anchor element itself
    pub fn activate_anchor<H: RegionHost>(host: &mut H, anchor: NodeId) -> bool {
        match host.get_attribute(anchor, "href") {
            Some(href) if href.starts_with('#') && href.len() > 1 => Self::activate(host, &href),
            _ => false,
        }
    }
}

/// Landmarks a page is expected to expose for skip links
pub fn landmark_role(tag: &str) -> Option<AriaRole> {
    match tag {
        "main" => Some(AriaRole::Main),
        "nav" => Some(AriaRole::Navigation),
        "header" => Some(AriaRole::Banner),
        "footer" => Some(AriaRole::ContentInfo),
        _ => None,
    }
}

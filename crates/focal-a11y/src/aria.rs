//! ARIA Support
//!
//! The roles and live-region values the focus layer reads and writes.

use serde::Deserialize;

use focal_dom::{DomError, NodeId};

use crate::host::RegionHost;

/// ARIA role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    // Landmark roles
    Banner,
    ContentInfo,
    Main,
    Navigation,
    Region,

    // Widget / live roles
    Alert,
    AlertDialog,
    Button,
    Dialog,
    Status,
    Tab,
    TabList,
    TabPanel,

    // Document structure
    List,
    ListItem,
    Presentation,
}

impl AriaRole {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_lowercase().as_str() {
            "banner" => Self::Banner,
            "contentinfo" => Self::ContentInfo,
            "main" => Self::Main,
            "navigation" => Self::Navigation,
            "region" => Self::Region,
            "alert" => Self::Alert,
            "alertdialog" => Self::AlertDialog,
            "button" => Self::Button,
            "dialog" => Self::Dialog,
            "status" => Self::Status,
            "tab" => Self::Tab,
            "tablist" => Self::TabList,
            "tabpanel" => Self::TabPanel,
            "list" => Self::List,
            "listitem" => Self::ListItem,
            "none" | "presentation" => Self::Presentation,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Banner => "banner",
            Self::ContentInfo => "contentinfo",
            Self::Main => "main",
            Self::Navigation => "navigation",
            Self::Region => "region",
            Self::Alert => "alert",
            Self::AlertDialog => "alertdialog",
            Self::Button => "button",
            Self::Dialog => "dialog",
            Self::Status => "status",
            Self::Tab => "tab",
            Self::TabList => "tablist",
            Self::TabPanel => "tabpanel",
            Self::List => "list",
            Self::ListItem => "listitem",
            Self::Presentation => "presentation",
        }
    }
}

/// Live region politeness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveRegionMode {
    Off,
    #[default]
    Polite,
    Assertive,
}

impl LiveRegionMode {
    pub fn parse(s: &str) -> Self {
        match s {
            "polite" => Self::Polite,
            "assertive" => Self::Assertive,
            _ => Self::Off,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

/// Dialog labelling applied to a modal container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogAria {
    pub labelled_by: String,
    pub described_by: Option<String>,
}

impl DialogAria {
    /// Write `role`, `aria-modal`, `aria-labelledby` and `aria-describedby`
    pub fn apply<H: RegionHost>(&self, host: &mut H, container: NodeId) -> Result<(), DomError> {
        host.set_attribute(container, "role", AriaRole::Dialog.as_str())?;
        host.set_attribute(container, "aria-modal", "true")?;
        host.set_attribute(container, "aria-labelledby", &self.labelled_by)?;
        match &self.described_by {
            Some(id) => host.set_attribute(container, "aria-describedby", id),
            None => host.remove_attribute(container, "aria-describedby"),
        }
    }
}

/// Live-region attributes read back from an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveAttributes {
    pub role: Option<AriaRole>,
    pub live: LiveRegionMode,
    pub atomic: bool,
}

impl LiveAttributes {
    pub fn read<H: RegionHost>(host: &H, id: NodeId) -> Self {
        Self {
            role: host.get_attribute(id, "role").and_then(|r| AriaRole::parse(&r)),
            live: host
                .get_attribute(id, "aria-live")
                .map(|v| LiveRegionMode::parse(&v))
                .unwrap_or(LiveRegionMode::Off),
            atomic: host.get_attribute(id, "aria-atomic").as_deref() == Some("true"),
        }
    }
}

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{Level, debug, instrument};

// site configuration
//
// every timing, threshold and breakpoint used by the page controllers lives here.  all
// fields have defaults matching the production site, so a config document only needs to
// name the values it overrides
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    pub slideshow: SlideshowConfig,
    pub navigation: NavigationConfig,
    pub portfolio: PortfolioConfig,
    pub sidebar: SidebarConfig,
    pub reveal: RevealConfig,
    pub preview: PreviewConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SlideshowConfig {
    pub autoplay_ms: u32,
    pub settle_ms: u32,
    pub restart_debounce_ms: u32,
    pub swipe_min_x: f64,
    pub swipe_max_y: f64,
    pub preload_timeout_ms: u32,
    pub fade_transition: String,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        SlideshowConfig {
            autoplay_ms: 5000,
            settle_ms: 250,
            restart_debounce_ms: 1000,
            swipe_min_x: 50.0,
            swipe_max_y: 100.0,
            preload_timeout_ms: 8000,
            fade_transition: String::from("opacity 0.8s ease-in-out"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct NavigationConfig {
    // in document order; the first one is the fallback active section
    pub sections: Vec<String>,
    pub scroll_duration_ms: u32,
    pub recheck_ms: u32,
    pub external_scroll_delay_ms: u32,
    pub scrolled_threshold: f64,
    pub menu_transition_ms: u32,
    pub menu_swipe_close: f64,
    pub desktop_breakpoint: f64,
    pub external_link_patterns: Vec<String>,
    pub press_feedback_ms: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            sections: ["home", "about", "portfolio", "info", "contact"]
                .into_iter()
                .map(String::from)
                .collect(),
            scroll_duration_ms: 100,
            recheck_ms: 100,
            external_scroll_delay_ms: 100,
            scrolled_threshold: 100.0,
            menu_transition_ms: 300,
            menu_swipe_close: 100.0,
            desktop_breakpoint: 768.0,
            external_link_patterns: [".html", "http://", "https://", "mailto:", "tel:"]
                .into_iter()
                .map(String::from)
                .collect(),
            press_feedback_ms: 100,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct PortfolioConfig {
    pub filter_lock_ms: u32,
    pub stagger_ms: u32,
    pub modal_fade_ms: u32,
    pub modal_fade_opacity: String,
    pub modal_load_timeout_ms: u32,
    pub items_per_page: usize,
    pub navigate_delay_ms: u32,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        PortfolioConfig {
            filter_lock_ms: 100,
            stagger_ms: 30,
            modal_fade_ms: 150,
            modal_fade_opacity: String::from("0.3"),
            modal_load_timeout_ms: 8000,
            items_per_page: 100,
            navigate_delay_ms: 100,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SidebarConfig {
    pub breakpoint: f64,
    pub footer_min_delta: f64,
    pub resize_debounce_ms: u32,
    pub initial_delay_ms: u32,
    pub press_ms: u32,
    pub desktop_press: String,
    pub mobile_press: String,
    pub focus_color: String,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        SidebarConfig {
            breakpoint: 900.0,
            footer_min_delta: 10.0,
            resize_debounce_ms: 100,
            initial_delay_ms: 50,
            press_ms: 200,
            desktop_press: String::from("translateX(8px) scale(1.05)"),
            mobile_press: String::from("translateY(-5px) scale(1.05)"),
            focus_color: String::from("var(--color-terracotta)"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct RevealConfig {
    pub selectors: Vec<String>,
    pub class: String,
    pub threshold: f64,
    // positive values shrink the bottom of the viewport, negative values extend it
    pub bottom_margin: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        RevealConfig {
            selectors: [
                ".step-container",
                ".pricing-content",
                ".pricing-image",
                ".package",
                ".fade-in",
                ".slide-up",
                "[data-animate]",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            class: String::from("animate"),
            threshold: 0.1,
            bottom_margin: 50.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub images: Vec<String>,
    pub preload_timeout_ms: u32,
    pub photo_threshold: f64,
    pub photo_margin: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        PreviewConfig {
            images: [
                "../images/background_eventos.webp",
                "../images/background_fiestas.webp",
                "../images/background_retratos.webp",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            preload_timeout_ms: 6000,
            photo_threshold: 0.1,
            photo_margin: -50.0,
        }
    }
}

// in order to extract the config table from a larger document, we need to specify it
// as a subtable of the root node, i.e. a substruct
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfigFile {
    #[serde(default)]
    config: SiteConfig,
}

#[instrument(level=Level::DEBUG, skip(doc))]
pub fn read_config(doc: &str) -> anyhow::Result<SiteConfig> {
    debug!("parsing site config");

    let data: TomlConfigFile = toml::from_str(doc).context("failed to parse site config")?;

    debug!("successfully parsed site config");
    Ok(data.config)
}

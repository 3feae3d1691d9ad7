use crate::dom::{Layout, Viewport};

// the part of the document visible below the fixed navigation bar
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band {
    pub top: f64,
    pub bottom: f64,
}

impl Band {
    pub fn below_navbar(viewport: Viewport, navbar_height: f64) -> Band {
        Band {
            top: viewport.scroll_y + navbar_height,
            bottom: viewport.scroll_y + viewport.height,
        }
    }

    // fraction of the section's own height inside the band
    pub fn fraction(&self, section: Layout) -> f64 {
        if section.height <= 0.0 {
            return 0.0;
        }

        let visible = (self.bottom.min(section.bottom()) - self.top.max(section.top)).max(0.0);
        visible / section.height
    }
}

// the section with the greatest visible fraction
//
// a tie that includes the previous section keeps it; otherwise the earliest tied section
// wins.  when nothing is visible at all the first section is used.  None only when there are
// no sections
pub fn pick_active<'a>(fractions: &[(&'a str, f64)], previous: &str) -> Option<&'a str> {
    let (first, _) = fractions.first()?;

    let best = fractions.iter().map(|(_, f)| *f).fold(0.0, f64::max);
    if best <= 0.0 {
        return Some(first);
    }

    let mut tied = fractions.iter().filter(|(_, f)| *f == best).map(|(id, _)| *id);

    let earliest = tied.next()?;
    if earliest == previous || tied.any(|id| id == previous) {
        fractions.iter().map(|(id, _)| *id).find(|id| *id == previous)
    } else {
        Some(earliest)
    }
}

pub fn ease_out_cubic(progress: f64) -> f64 {
    let progress = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - progress).powi(3)
}

// where to scroll so the section starts right below the navbar
pub fn scroll_destination(section_top: f64, navbar_height: f64) -> f64 {
    (section_top - navbar_height).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(top: f64, height: f64) -> Layout {
        Layout { top, height }
    }

    #[test]
    fn fraction_is_relative_to_the_section_height() {
        let viewport = Viewport {
            scroll_y: 760.0,
            width: 1280.0,
            height: 880.0,
        };
        let band = Band::below_navbar(viewport, 80.0);
        assert_eq!(band, Band { top: 840.0, bottom: 1640.0 });

        assert!((band.fraction(layout(0.0, 1000.0)) - 0.16).abs() < 1e-9);
        assert!((band.fraction(layout(1000.0, 1000.0)) - 0.64).abs() < 1e-9);
        assert_eq!(band.fraction(layout(2000.0, 1000.0)), 0.0);
        assert_eq!(band.fraction(layout(900.0, 0.0)), 0.0);
    }

    #[test]
    fn most_visible_section_wins() {
        let fractions = [("home", 0.16), ("about", 0.64), ("portfolio", 0.0)];
        assert_eq!(pick_active(&fractions, "home"), Some("about"));
    }

    #[test]
    fn ties_keep_the_previous_section() {
        let fractions = [("about", 0.5), ("info", 1.0), ("contact", 1.0)];
        assert_eq!(pick_active(&fractions, "contact"), Some("contact"));
        assert_eq!(pick_active(&fractions, "info"), Some("info"));
        assert_eq!(pick_active(&fractions, "about"), Some("info"));
    }

    #[test]
    fn nothing_visible_falls_back_to_the_first_section() {
        let fractions = [("home", 0.0), ("about", 0.0)];
        assert_eq!(pick_active(&fractions, "about"), Some("home"));
        assert_eq!(pick_active(&[], "home"), None);
    }

    #[test]
    fn easing_and_destination() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(0.5), 0.875);
        assert_eq!(ease_out_cubic(3.0), 1.0);

        assert_eq!(scroll_destination(1000.0, 80.0), 920.0);
        assert_eq!(scroll_destination(40.0, 80.0), 0.0);
    }
}

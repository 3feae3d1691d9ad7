// the sidebar switches to its dark variant once the hero, about and portfolio blocks have
// scrolled past the navbar
pub fn hero_end(hero: f64, about: f64, portfolio: f64, navbar: f64) -> f64 {
    hero + about + portfolio - navbar
}

pub fn past_hero(scroll_y: f64, hero_end: f64) -> bool {
    scroll_y > hero_end
}

// the footer counts as reached as soon as its top edge enters the viewport
pub fn footer_entered(footer_top: f64, viewport_height: f64) -> bool {
    footer_top <= viewport_height
}

// drops scroll positions that moved less than min_delta since the last admitted one
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollGate {
    min_delta: f64,
    last: f64,
}

impl ScrollGate {
    pub fn new(min_delta: f64) -> Self {
        ScrollGate { min_delta, last: 0.0 }
    }

    pub fn admit(&mut self, scroll_y: f64) -> bool {
        if (scroll_y - self.last).abs() < self.min_delta {
            return false;
        }
        self.last = scroll_y;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_end_subtracts_the_navbar() {
        let end = hero_end(800.0, 600.0, 1000.0, 80.0);
        assert_eq!(end, 2320.0);
        assert!(!past_hero(2320.0, end));
        assert!(past_hero(2321.0, end));
    }

    #[test]
    fn footer_edge_is_inclusive() {
        assert!(footer_entered(800.0, 800.0));
        assert!(footer_entered(-20.0, 800.0));
        assert!(!footer_entered(800.5, 800.0));
    }

    #[test]
    fn gate_needs_a_minimum_move() {
        let mut gate = ScrollGate::new(10.0);
        assert!(!gate.admit(9.0));
        assert!(gate.admit(10.0));
        assert!(!gate.admit(1.0));
        assert!(gate.admit(0.0));
        assert!(gate.admit(500.0));
    }
}

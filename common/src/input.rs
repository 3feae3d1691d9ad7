// keys the page controllers react to, decoded from KeyboardEvent.key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Enter,
    Home,
    End,
    Escape,
    Other,
}

impl From<&str> for Key {
    fn from(key: &str) -> Key {
        match key {
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            " " | "Spacebar" => Key::Space,
            "Enter" => Key::Enter,
            "Home" => Key::Home,
            "End" => Key::End,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

impl Key {
    // keys that activate a focused button-like element
    pub fn activates(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Swipe {
    // finger moved right to left
    Left,
    // finger moved left to right
    Right,
}

// a horizontal swipe must travel more than min_x while drifting less than max_y vertically
pub fn horizontal_swipe(start: Point, end: Point, min_x: f64, max_y: f64) -> Option<Swipe> {
    let delta_x = start.x - end.x;
    let delta_y = (start.y - end.y).abs();

    if delta_x.abs() > min_x && delta_y < max_y {
        if delta_x > 0.0 {
            Some(Swipe::Left)
        } else {
            Some(Swipe::Right)
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_browser_key_names() {
        assert_eq!(Key::from("ArrowLeft"), Key::ArrowLeft);
        assert_eq!(Key::from(" "), Key::Space);
        assert_eq!(Key::from("Esc"), Key::Escape);
        assert_eq!(Key::from("a"), Key::Other);
        assert!(Key::Enter.activates());
        assert!(!Key::Escape.activates());
    }

    #[test]
    fn swipe_needs_distance_and_little_drift() {
        let start = Point::new(300.0, 200.0);

        assert_eq!(horizontal_swipe(start, Point::new(200.0, 210.0), 50.0, 100.0), Some(Swipe::Left));
        assert_eq!(horizontal_swipe(start, Point::new(400.0, 190.0), 50.0, 100.0), Some(Swipe::Right));

        // too short
        assert_eq!(horizontal_swipe(start, Point::new(260.0, 200.0), 50.0, 100.0), None);
        // exactly on the threshold does not count
        assert_eq!(horizontal_swipe(start, Point::new(250.0, 200.0), 50.0, 100.0), None);
        // mostly vertical
        assert_eq!(horizontal_swipe(start, Point::new(100.0, 350.0), 50.0, 100.0), None);
    }
}
